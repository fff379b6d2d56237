//! Account management and credential service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        account::{Account, CreateAccount, LoginRequest, UpdateAccount},
        book::Book,
    },
    repository::Repository,
    sanitize::strip_html,
};

#[derive(Clone)]
pub struct AccountsService {
    repository: Repository,
}

impl AccountsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        self.repository.accounts.list().await
    }

    /// Get account by ID
    pub async fn get_account(&self, user_id: i32) -> AppResult<Account> {
        self.repository.accounts.get_by_id(user_id).await
    }

    /// Create a new account with a hashed password.
    ///
    /// Sanitization runs before validation so that markup-only input
    /// (e.g. a username of "<br>") is rejected as empty rather than
    /// persisted as an empty string.
    pub async fn create_account(&self, account: CreateAccount) -> AppResult<Account> {
        // Passwords go through the same sanitizer as usernames; markup-like
        // characters are neutralized before hashing
        let account = CreateAccount {
            username: strip_html(&account.username),
            password: strip_html(&account.password),
        };
        account.validate()?;

        let hash = hash_password(&account.password)?;
        self.repository.accounts.create(&account.username, &hash).await
    }

    /// Update username and password; the password is re-hashed on every
    /// update, even when unchanged
    pub async fn update_account(&self, user_id: i32, account: UpdateAccount) -> AppResult<Account> {
        let account = UpdateAccount {
            username: strip_html(&account.username),
            password: strip_html(&account.password),
        };
        account.validate()?;

        let hash = hash_password(&account.password)?;
        self.repository.accounts.update(user_id, &account.username, &hash).await
    }

    /// Delete an account; blocked while it holds borrowed books unless
    /// `force` auto-returns them
    pub async fn delete_account(&self, user_id: i32, force: bool) -> AppResult<()> {
        self.repository.accounts.delete(user_id, force).await
    }

    /// Verify a login attempt.
    ///
    /// Unknown username and wrong password are indistinguishable to the
    /// caller.
    pub async fn verify_login(&self, login: LoginRequest) -> AppResult<Account> {
        login.validate()?;

        let username = strip_html(&login.username);
        let password = strip_html(&login.password);

        let account = self
            .repository
            .accounts
            .get_by_username(&username)
            .await?
            .ok_or_else(|| AppError::UserNotFound("Incorrect username or password".to_string()))?;

        if !verify_password(&password, &account.password)? {
            return Err(AppError::UserNotFound(
                "Incorrect username or password".to_string(),
            ));
        }

        Ok(account)
    }

    /// Books currently held by the account
    pub async fn borrowed_books(&self, user_id: i32) -> AppResult<Vec<Book>> {
        // Verify user exists
        self.repository.accounts.get_by_id(user_id).await?;
        self.repository.accounts.borrowed_books(user_id).await
    }

}

/// Hash a password using Argon2 with a fresh random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("incorrect horse", &hash).unwrap());
    }

    #[test]
    fn salts_are_fresh_per_call() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret", &first).unwrap());
        assert!(verify_password("secret", &second).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-phc-string").is_err());
    }

    #[test]
    fn markup_only_credentials_fail_validation_after_stripping() {
        let account = CreateAccount {
            username: strip_html("<br>"),
            password: strip_html("hunter2"),
        };
        assert!(account.validate().is_err());

        let account = CreateAccount {
            username: strip_html("alice"),
            password: strip_html("<script>alert(1)</script>"),
        };
        assert!(account.validate().is_err());
    }
}

//! Accounts repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{account::Account, book::Book},
};

use super::next_free_id;

const CREATE_RETRIES: u32 = 3;

#[derive(Clone)]
pub struct AccountsRepository {
    pool: Pool<Postgres>,
}

impl AccountsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all accounts
    pub async fn list(&self) -> AppResult<Vec<Account>> {
        let accounts =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY user_id")
                .fetch_all(&self.pool)
                .await?;

        Ok(accounts)
    }

    /// Get account by ID
    pub async fn get_by_id(&self, user_id: i32) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", user_id)))
    }

    /// Get account by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Create a new account with an allocated user ID.
    ///
    /// Username uniqueness is enforced by the unique index, not by a
    /// check-then-act lookup: concurrent creates for the same username
    /// resolve to exactly one winner.
    pub async fn create(&self, username: &str, password_hash: &str) -> AppResult<Account> {
        for attempt in 0..CREATE_RETRIES {
            let mut tx = self.pool.begin().await?;

            let used: Vec<i32> = sqlx::query_scalar("SELECT user_id FROM accounts")
                .fetch_all(&mut *tx)
                .await?;
            let user_id = next_free_id(&used);

            let inserted = sqlx::query_as::<_, Account>(
                r#"
                INSERT INTO accounts (user_id, username, password)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok(created) => {
                    tx.commit().await?;
                    return Ok(created);
                }
                Err(e) if violates_constraint(&e, "accounts_username_key") => {
                    return Err(AppError::Conflict("Username already exists".to_string()));
                }
                Err(e) if is_unique_violation(&e) => {
                    tx.rollback().await?;
                    tracing::debug!(attempt, "user id allocation lost insert race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a user id under contention".to_string(),
        ))
    }

    /// Update username and password hash
    pub async fn update(
        &self,
        user_id: i32,
        username: &str,
        password_hash: &str,
    ) -> AppResult<Account> {
        let updated = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts SET username = $2, password = $3
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(AppError::UserNotFound(format!(
                "User with id {} not found",
                user_id
            ))),
            Err(e) if violates_constraint(&e, "accounts_username_key") => {
                Err(AppError::Conflict("Username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an account.
    ///
    /// Blocked while the account holds borrowed books unless `force` is set,
    /// in which case the books are released first and the cascade clears the
    /// borrow rows.
    pub async fn delete(&self, user_id: i32, force: bool) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let borrowed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowed_books WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if borrowed > 0 {
            if !force {
                return Err(AppError::Conflict(
                    "User has borrowed books. Use force=true to auto-return them.".to_string(),
                ));
            }

            sqlx::query(
                r#"
                UPDATE books SET is_available = true
                WHERE book_id IN (SELECT book_id FROM borrowed_books WHERE user_id = $1)
                "#,
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query("DELETE FROM accounts WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Books currently held by the account, in borrow order
    pub async fn borrowed_books(&self, user_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.*
            FROM borrowed_books bb
            JOIN books b ON b.book_id = bb.book_id
            WHERE bb.user_id = $1
            ORDER BY bb.borrowed_date, bb.book_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn violates_constraint(e: &sqlx::Error, name: &str) -> bool {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .map(|c| c == name)
        .unwrap_or(false)
}

//! Borrow/return coordination service

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a batch of books for a user.
    ///
    /// Returns the normalized (deduplicated) list of book ids actually
    /// borrowed.
    pub async fn borrow_books(&self, user_id: i32, book_ids: Vec<i32>) -> AppResult<Vec<i32>> {
        let book_ids = normalize_ids(book_ids)?;

        // Verify user exists
        self.repository.accounts.get_by_id(user_id).await?;
        self.repository.borrows.borrow(user_id, &book_ids).await?;
        Ok(book_ids)
    }

    /// Return a batch of books for a user.
    ///
    /// Returns the normalized (deduplicated) list of book ids actually
    /// returned.
    pub async fn return_books(&self, user_id: i32, book_ids: Vec<i32>) -> AppResult<Vec<i32>> {
        let book_ids = normalize_ids(book_ids)?;

        // Verify user exists
        self.repository.accounts.get_by_id(user_id).await?;
        self.repository.borrows.give_back(user_id, &book_ids).await?;
        Ok(book_ids)
    }
}

/// Reject empty input and drop repeated ids, keeping first-seen order
fn normalize_ids(book_ids: Vec<i32>) -> AppResult<Vec<i32>> {
    if book_ids.is_empty() {
        return Err(AppError::BadRequest(
            "Provide a non-empty array of book_ids".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    Ok(book_ids.into_iter().filter(|id| seen.insert(*id)).collect())
}

#[cfg(test)]
mod tests {
    use super::normalize_ids;

    #[test]
    fn empty_input_is_rejected() {
        assert!(normalize_ids(vec![]).is_err());
    }

    #[test]
    fn duplicates_are_dropped_in_order() {
        assert_eq!(normalize_ids(vec![3, 1, 3, 2, 1]).unwrap(), vec![3, 1, 2]);
    }
}

//! Borrow/return coordinator storage.
//!
//! Keeps a book's availability flag and the borrower's borrowed_books rows
//! mutually consistent: every transition runs in a single transaction whose
//! conditional write doubles as the precondition check. A request that no
//! longer holds at write time rolls back and reports the offending subset.

use std::collections::HashSet;

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a batch of books for a user, all-or-nothing.
    ///
    /// Returns the number of books borrowed. Books that are unknown or not
    /// available are reported together in the error and nothing is changed.
    pub async fn borrow(&self, user_id: i32, book_ids: &[i32]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let flipped: Vec<i32> = sqlx::query_scalar(
            r#"
            UPDATE books SET is_available = false
            WHERE book_id = ANY($1) AND is_available
            RETURNING book_id
            "#,
        )
        .bind(book_ids)
        .fetch_all(&mut *tx)
        .await?;

        if flipped.len() != book_ids.len() {
            tx.rollback().await?;
            return Err(AppError::Unavailable {
                book_ids: missing_from(book_ids, &flipped),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO borrowed_books (user_id, book_id)
            SELECT $1, unnest($2::int[])
            "#,
        )
        .bind(user_id)
        .bind(book_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(flipped.len() as u64)
    }

    /// Return a batch of books for a user, all-or-nothing.
    ///
    /// Every requested book must currently be held by this user; otherwise
    /// the mismatched subset is reported and nothing is changed.
    pub async fn give_back(&self, user_id: i32, book_ids: &[i32]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed: Vec<i32> = sqlx::query_scalar(
            r#"
            DELETE FROM borrowed_books
            WHERE user_id = $1 AND book_id = ANY($2)
            RETURNING book_id
            "#,
        )
        .bind(user_id)
        .bind(book_ids)
        .fetch_all(&mut *tx)
        .await?;

        if removed.len() != book_ids.len() {
            tx.rollback().await?;
            return Err(AppError::NotBorrowed {
                book_ids: missing_from(book_ids, &removed),
            });
        }

        sqlx::query("UPDATE books SET is_available = true WHERE book_id = ANY($1)")
            .bind(book_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(removed.len() as u64)
    }
}

/// Requested ids the conditional write did not reach, in request order
fn missing_from(requested: &[i32], affected: &[i32]) -> Vec<i32> {
    let affected: HashSet<i32> = affected.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !affected.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::missing_from;

    #[test]
    fn reports_only_unreached_ids() {
        assert_eq!(missing_from(&[101, 102, 103], &[102]), vec![101, 103]);
        assert_eq!(missing_from(&[101, 102], &[101, 102]), Vec::<i32>::new());
        assert_eq!(missing_from(&[7], &[]), vec![7]);
    }
}

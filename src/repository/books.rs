//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::next_free_id;

/// Attempts made when an allocated ID loses the insert race
const CREATE_RETRIES: u32 = 3;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books, newest first
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY created_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, book_id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    /// Create a new book.
    ///
    /// When no `book_id` is supplied the smallest free positive integer is
    /// allocated. The primary-key constraint is the authority on uniqueness:
    /// an allocated candidate that loses a concurrent race is retried, a
    /// caller-supplied duplicate is a conflict.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        for attempt in 0..CREATE_RETRIES {
            let mut tx = self.pool.begin().await?;

            let book_id = match book.book_id {
                Some(id) => id,
                None => {
                    let used: Vec<i32> = sqlx::query_scalar("SELECT book_id FROM books")
                        .fetch_all(&mut *tx)
                        .await?;
                    next_free_id(&used)
                }
            };

            let inserted = sqlx::query_as::<_, Book>(
                r#"
                INSERT INTO books (book_id, title, author, genre, publisher, publication_date, is_available)
                VALUES ($1, $2, $3, $4, $5, $6, true)
                RETURNING *
                "#,
            )
            .bind(book_id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.genre)
            .bind(&book.publisher)
            .bind(&book.publication_date)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok(created) => {
                    tx.commit().await?;
                    return Ok(created);
                }
                Err(e) if is_unique_violation(&e) => {
                    tx.rollback().await?;
                    if book.book_id.is_some() {
                        return Err(AppError::Conflict("BookID already exists".to_string()));
                    }
                    tracing::debug!(attempt, "book id allocation lost insert race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a book id under contention".to_string(),
        ))
    }

    /// Partially update a book; absent fields keep their value
    pub async fn update(&self, book_id: i32, update: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                genre = COALESCE($4, genre),
                publisher = COALESCE($5, publisher),
                publication_date = COALESCE($6, publication_date)
            WHERE book_id = $1
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.genre)
        .bind(&update.publisher)
        .bind(&update.publication_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    /// Apply the same partial update to several books, returning the number
    /// matched
    pub async fn update_many(&self, book_ids: &[i32], update: &UpdateBook) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                genre = COALESCE($4, genre),
                publisher = COALESCE($5, publisher),
                publication_date = COALESCE($6, publication_date)
            WHERE book_id = ANY($1)
            "#,
        )
        .bind(book_ids)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.genre)
        .bind(&update.publisher)
        .bind(&update.publication_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a single book; borrowed books are protected by the
    /// borrowed_books foreign key
    pub async fn delete(&self, book_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(map_borrowed_fk)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        Ok(())
    }

    /// Delete several books at once, returning the number deleted
    pub async fn delete_many(&self, book_ids: &[i32]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = ANY($1)")
            .bind(book_ids)
            .execute(&self.pool)
            .await
            .map_err(map_borrowed_fk)?;

        Ok(result.rows_affected())
    }

    /// Legacy bulk availability flip. Does not touch borrowed_books, so it
    /// can desynchronize the availability invariant; kept for the inherited
    /// endpoints only.
    pub async fn set_availability(&self, book_ids: &[i32], is_available: bool) -> AppResult<u64> {
        let result = sqlx::query("UPDATE books SET is_available = $2 WHERE book_id = ANY($1)")
            .bind(book_ids)
            .bind(is_available)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn map_borrowed_fk(e: sqlx::Error) -> AppError {
    let is_fk = e
        .as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false);

    if is_fk {
        AppError::Conflict("Book is currently borrowed and cannot be deleted".to_string())
    } else {
        e.into()
    }
}

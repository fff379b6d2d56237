//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
    sanitize::strip_html,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books, newest first
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get book by ID
    pub async fn get_book(&self, book_id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(book_id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let book = CreateBook {
            book_id: book.book_id,
            title: strip_html(&book.title),
            author: strip_html(&book.author),
            genre: strip_html(&book.genre),
            publisher: strip_html(&book.publisher),
            publication_date: book.publication_date,
        };
        book.validate()?;

        self.repository.books.create(&book).await
    }

    /// Partially update a book
    pub async fn update_book(&self, book_id: i32, update: UpdateBook) -> AppResult<Book> {
        let update = UpdateBook {
            title: update.title.as_deref().map(strip_html),
            author: update.author.as_deref().map(strip_html),
            genre: update.genre.as_deref().map(strip_html),
            publisher: update.publisher.as_deref().map(strip_html),
            publication_date: update.publication_date,
        };
        update.validate()?;

        self.repository.books.update(book_id, &update).await
    }

    /// Apply one partial update to several books
    pub async fn update_books(&self, book_ids: &[i32], update: UpdateBook) -> AppResult<u64> {
        if book_ids.is_empty() {
            return Err(AppError::BadRequest(
                "Provide a non-empty array of book_ids".to_string(),
            ));
        }

        let update = UpdateBook {
            title: update.title.as_deref().map(strip_html),
            author: update.author.as_deref().map(strip_html),
            genre: update.genre.as_deref().map(strip_html),
            publisher: update.publisher.as_deref().map(strip_html),
            publication_date: update.publication_date,
        };
        update.validate()?;

        self.repository.books.update_many(book_ids, &update).await
    }

    /// Delete a single book
    pub async fn delete_book(&self, book_id: i32) -> AppResult<()> {
        self.repository.books.delete(book_id).await
    }

    /// Delete several books, returning the number deleted
    pub async fn delete_books(&self, book_ids: &[i32]) -> AppResult<u64> {
        if book_ids.is_empty() {
            return Err(AppError::BadRequest(
                "Provide a non-empty array of book_ids".to_string(),
            ));
        }

        self.repository.books.delete_many(book_ids).await
    }

    /// Legacy bulk availability flip; bypasses the borrow coordinator
    pub async fn set_availability(&self, book_ids: &[i32], is_available: bool) -> AppResult<u64> {
        if book_ids.is_empty() {
            return Err(AppError::BadRequest(
                "Provide a non-empty array of book_ids".to_string(),
            ));
        }

        self.repository.books.set_availability(book_ids, is_available).await
    }
}

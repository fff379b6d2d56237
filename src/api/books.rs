//! Catalog (books) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookIds, CreateBook, UpdateBook},
};

/// Bulk delete request
#[derive(Deserialize, ToSchema)]
pub struct DeleteBooksRequest {
    /// IDs of the books to delete
    pub book_ids: Vec<i32>,
}

/// Delete response with affected count
#[derive(Serialize, ToSchema)]
pub struct DeleteBooksResponse {
    /// Number of books deleted
    pub deleted: u64,
    /// IDs the delete was requested for
    pub deleted_ids: Vec<i32>,
}

/// Borrow/return request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Borrowing user
    pub user_id: i32,
    /// Book IDs; a bare integer is accepted as a one-element list
    pub book_ids: BookIds,
}

/// Borrow/return response with counts
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Status message
    pub message: String,
    /// Number of books affected
    pub count: u64,
    /// IDs the operation applied to
    pub book_ids: Vec<i32>,
}

/// Bulk update request: one set of field changes for several books
#[derive(Deserialize, ToSchema)]
pub struct UpdateBooksRequest {
    pub book_ids: Vec<i32>,
    #[serde(flatten)]
    pub fields: UpdateBook,
}

/// Bulk update response
#[derive(Serialize, ToSchema)]
pub struct UpdateBooksResponse {
    /// Number of books matched by the update
    pub matched: u64,
}

/// Legacy availability flip request
#[derive(Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    pub book_ids: Vec<i32>,
    pub is_available: bool,
}

/// Legacy availability flip response
#[derive(Serialize, ToSchema)]
pub struct SetAvailabilityResponse {
    /// Number of books matched
    pub matched: u64,
}

/// List all books, newest first
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books in the catalog", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing fields or invalid publication date"),
        (status = 409, description = "Supplied book_id already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid publication date"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.catalog.update_book(id, update).await?;
    Ok(Json(updated))
}

/// Apply one partial update to several books
#[utoipa::path(
    patch,
    path = "/books",
    tag = "books",
    request_body = UpdateBooksRequest,
    responses(
        (status = 200, description = "Books updated", body = UpdateBooksResponse),
        (status = 400, description = "Empty id list or invalid publication date")
    )
)]
pub async fn update_books(
    State(state): State<crate::AppState>,
    Json(request): Json<UpdateBooksRequest>,
) -> AppResult<Json<UpdateBooksResponse>> {
    let matched = state
        .services
        .catalog
        .update_books(&request.book_ids, request.fields)
        .await?;

    Ok(Json(UpdateBooksResponse { matched }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = DeleteBooksResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is currently borrowed")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DeleteBooksResponse>> {
    state.services.catalog.delete_book(id).await?;
    Ok(Json(DeleteBooksResponse {
        deleted: 1,
        deleted_ids: vec![id],
    }))
}

/// Delete several books at once
#[utoipa::path(
    delete,
    path = "/books",
    tag = "books",
    request_body = DeleteBooksRequest,
    responses(
        (status = 200, description = "Books deleted", body = DeleteBooksResponse),
        (status = 400, description = "Empty or malformed id list"),
        (status = 409, description = "A requested book is currently borrowed")
    )
)]
pub async fn delete_books(
    State(state): State<crate::AppState>,
    Json(request): Json<DeleteBooksRequest>,
) -> AppResult<Json<DeleteBooksResponse>> {
    let deleted = state.services.catalog.delete_books(&request.book_ids).await?;
    Ok(Json(DeleteBooksResponse {
        deleted,
        deleted_ids: request.book_ids,
    }))
}

/// Borrow books for a user
#[utoipa::path(
    patch,
    path = "/books/borrow",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Books borrowed", body = BorrowResponse),
        (status = 400, description = "Empty id list, or some books unavailable (subset reported)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn borrow_books(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<BorrowResponse>> {
    let book_ids = state
        .services
        .borrows
        .borrow_books(request.user_id, request.book_ids.into())
        .await?;

    Ok(Json(BorrowResponse {
        message: "Successfully borrowed books".to_string(),
        count: book_ids.len() as u64,
        book_ids,
    }))
}

/// Return borrowed books for a user
#[utoipa::path(
    patch,
    path = "/books/return",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Books returned", body = BorrowResponse),
        (status = 400, description = "Empty id list, or some books not borrowed by this user (subset reported)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn return_books(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<BorrowResponse>> {
    let book_ids = state
        .services
        .borrows
        .return_books(request.user_id, request.book_ids.into())
        .await?;

    Ok(Json(BorrowResponse {
        message: "Successfully returned books".to_string(),
        count: book_ids.len() as u64,
        book_ids,
    }))
}

/// Flip availability flags directly (legacy).
///
/// Bypasses the borrow coordinator and does not touch any account's
/// borrowed list.
#[utoipa::path(
    patch,
    path = "/books/availability",
    tag = "books",
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Flags updated", body = SetAvailabilityResponse),
        (status = 400, description = "Empty id list")
    )
)]
pub async fn set_availability(
    State(state): State<crate::AppState>,
    Json(request): Json<SetAvailabilityRequest>,
) -> AppResult<Json<SetAvailabilityResponse>> {
    let matched = state
        .services
        .catalog
        .set_availability(&request.book_ids, request.is_available)
        .await?;

    Ok(Json(SetAvailabilityResponse { matched }))
}

//! User account endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        account::{Account, CreateAccount, LoginRequest, UpdateAccount},
        book::Book,
    },
};

#[derive(Deserialize)]
pub struct DeleteUserParams {
    pub force: Option<bool>,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Status message
    pub message: String,
    /// Authenticated user's ID
    pub user_id: i32,
}

/// List all user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All accounts, passwords omitted", body = Vec<Account>)
    )
)]
pub async fn list_users(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Account>>> {
    let accounts = state.services.accounts.list_accounts().await?;
    Ok(Json(accounts))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account details", body = Account),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Account>> {
    let account = state.services.accounts.get_account(id).await?;
    Ok(Json(account))
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(account): Json<CreateAccount>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let created = state.services.accounts.create_account(account).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an account's username and password
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateAccount,
    responses(
        (status = 200, description = "Account updated", body = Account),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(account): Json<UpdateAccount>,
) -> AppResult<Json<Account>> {
    let updated = state.services.accounts.update_account(id, account).await?;
    Ok(Json(updated))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID"),
        ("force" = Option<bool>, Query, description = "Auto-return borrowed books before deleting")
    ),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User has borrowed books")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteUserParams>,
) -> AppResult<StatusCode> {
    state
        .services
        .accounts
        .delete_account(id, params.force.unwrap_or(false))
        .await?;
    Ok(StatusCode::OK)
}

/// Verify a username/password pair.
///
/// The response never says whether the username or the password was wrong.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 404, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let account = state.services.accounts.verify_login(request).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user_id: account.user_id,
    }))
}

/// Books currently borrowed by an account, in borrow order
#[utoipa::path(
    get,
    path = "/users/borrowedBooks/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Borrowed books", body = Vec<Book>),
        (status = 404, description = "User not found")
    )
)]
pub async fn borrowed_books(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.accounts.borrowed_books(id).await?;
    Ok(Json(books))
}

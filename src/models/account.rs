//! User account model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    /// Externally visible user identifier
    pub user_id: i32,
    /// Unique across all accounts
    pub username: String,
    /// Argon2 PHC hash, never returned to callers
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password: String,
    pub created_date: DateTime<Utc>,
}

/// Fields for creating an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccount {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Fields for updating an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccount {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

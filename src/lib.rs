//! Libris Library Management System
//!
//! A Rust implementation of the Libris library management server, providing
//! a REST JSON API for managing a book catalog, user accounts, and
//! borrow/return bookkeeping.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod sanitize;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

//! Data models for Libris

pub mod account;
pub mod book;

// Re-export commonly used types
pub use account::Account;
pub use book::Book;

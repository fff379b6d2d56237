//! Book (catalog entry) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A catalog record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Externally visible book identifier
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publisher: String,
    /// Publication date, "YYYY-MM-DD"
    pub publication_date: String,
    pub is_available: bool,
    pub created_date: DateTime<Utc>,
}

/// Fields for creating a book
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    /// Book ID; allocated when absent, rejected on collision when supplied
    #[validate(range(min = 1, message = "book_id must be positive"))]
    pub book_id: Option<i32>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "genre must not be empty"))]
    pub genre: String,
    #[validate(length(min = 1, message = "publisher must not be empty"))]
    pub publisher: String,
    #[validate(custom(function = "validate_publication_date"))]
    pub publication_date: String,
}

/// Fields for a partial book update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    #[validate(custom(function = "validate_publication_date"))]
    pub publication_date: Option<String>,
}

/// Borrow/return accept either a list of ids or a bare id, which is
/// normalized to a single-element sequence
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum BookIds {
    Many(Vec<i32>),
    One(i32),
}

impl From<BookIds> for Vec<i32> {
    fn from(ids: BookIds) -> Self {
        match ids {
            BookIds::Many(ids) => ids,
            BookIds::One(id) => vec![id],
        }
    }
}

static DATE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date regex"));

/// Validate a "YYYY-MM-DD" publication date.
///
/// The format is regex-gated first, then the components must form a real
/// calendar date (rejects e.g. "2023-02-30").
pub fn validate_publication_date(date: &str) -> Result<(), ValidationError> {
    if !DATE_FORMAT.is_match(date) {
        let mut err = ValidationError::new("date_format");
        err.message = Some("Invalid date format. Use YYYY-MM-DD.".into());
        return Err(err);
    }

    let mut parts = date.split('-');
    let year: i32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let month: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let day: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);

    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        let mut err = ValidationError::new("date_calendar");
        err.message = Some("Invalid date: does not exist in the calendar.".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_publication_date, BookIds, CreateBook};

    #[test]
    fn bare_book_id_normalizes_to_single_element() {
        let one: BookIds = serde_json::from_str("101").unwrap();
        assert_eq!(Vec::<i32>::from(one), vec![101]);

        let many: BookIds = serde_json::from_str("[101, 102]").unwrap();
        assert_eq!(Vec::<i32>::from(many), vec![101, 102]);
    }

    #[test]
    fn valid_dates_pass() {
        assert!(validate_publication_date("2023-10-25").is_ok());
        assert!(validate_publication_date("2024-02-29").is_ok());
        assert!(validate_publication_date("1970-01-01").is_ok());
    }

    #[test]
    fn wrong_separators_rejected() {
        assert!(validate_publication_date("2023/10/25").is_err());
        assert!(validate_publication_date("25-10-2023").is_err());
        assert!(validate_publication_date("2023-1-5").is_err());
        assert!(validate_publication_date("not a date").is_err());
    }

    #[test]
    fn impossible_calendar_dates_rejected() {
        assert!(validate_publication_date("2023-02-30").is_err());
        assert!(validate_publication_date("2023-13-01").is_err());
        assert!(validate_publication_date("2023-00-10").is_err());
        assert!(validate_publication_date("2023-04-31").is_err());
    }

    #[test]
    fn supplied_book_id_must_be_positive() {
        use validator::Validate;

        let book = |id| CreateBook {
            book_id: id,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Science Fiction".to_string(),
            publisher: "Chilton Books".to_string(),
            publication_date: "1965-08-01".to_string(),
        };

        assert!(book(Some(-5)).validate().is_err());
        assert!(book(Some(0)).validate().is_err());
        assert!(book(Some(1)).validate().is_ok());
        assert!(book(None).validate().is_ok());
    }
}

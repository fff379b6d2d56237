//! Repository layer for database operations

pub mod accounts;
pub mod books;
pub mod borrows;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub accounts: accounts::AccountsRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            accounts: accounts::AccountsRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Smallest positive integer not present in `used`.
///
/// Run fresh on every create, inside the insert transaction; the primary-key
/// constraint plus retry-on-conflict covers concurrent callers computing the
/// same candidate.
pub fn next_free_id(used: &[i32]) -> i32 {
    let mut candidate = 1;
    while used.contains(&candidate) {
        candidate += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::next_free_id;

    #[test]
    fn empty_set_yields_one() {
        assert_eq!(next_free_id(&[]), 1);
    }

    #[test]
    fn fills_first_gap() {
        assert_eq!(next_free_id(&[1, 2, 4]), 3);
        assert_eq!(next_free_id(&[2, 3]), 1);
    }

    #[test]
    fn appends_when_dense() {
        assert_eq!(next_free_id(&[1, 2, 3]), 4);
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(next_free_id(&[4, 1, 2]), 3);
    }
}

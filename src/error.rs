use thiserror::Error;

use crate::model::{EntityKind, Identifier};

/// Result type alias using `CatalogError`
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Expected, recoverable failures of catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Registration with an identifier that is already taken
    #[error("{kind} id {id} is already registered")]
    DuplicateId {
        /// Book or patron
        kind: EntityKind,
        /// The clashing identifier
        id: Identifier,
    },

    /// No patron with this identifier
    #[error("patron {0} not found")]
    PatronNotFound(Identifier),

    /// No book with this identifier
    #[error("book {0} not found")]
    BookNotFound(Identifier),

    /// Returning a book that is already on the shelf
    #[error("book '{title}' (id {id}) is already available")]
    AlreadyAvailable {
        /// Book identifier
        id: Identifier,
        /// Book title
        title: String,
    },

    /// The book is marked as out but no patron's ledger holds it
    #[error("no active loan found for book {0}")]
    NoActiveLoan(Identifier),

    /// Search on a field other than title or author
    #[error("invalid search criterion '{0}', use 'title' or 'author'")]
    InvalidSearchCriterion(String),

    /// Removing a patron who still holds books
    #[error("patron {id} still holds {count} book(s)")]
    ActiveLoans {
        /// Patron identifier
        id: Identifier,
        /// Number of books held
        count: usize,
    },
}

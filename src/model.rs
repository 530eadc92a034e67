use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ledger::LoanLedger;

/// Identifier shared by books and patrons.
///
/// Numeric identifiers stay numeric so `9 < 10` holds; anything that does not
/// parse as an integer is kept as trimmed text. Every number orders before
/// every text identifier, which keeps the order total across both forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Integer identifier
    Number(i64),
    /// Free-form identifier
    Text(String),
}

impl Identifier {
    /// Parse free text the way the front end hands it over
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed.parse::<i64>().map_or_else(|_| Self::Text(trimmed.to_string()), Self::Number)
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Lower-cased, trimmed form used as the title and author index key
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A catalogued book
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    /// Unique identifier
    pub id: Identifier,
    /// Title as registered
    pub title: String,
    /// Author as registered
    pub author: String,
    /// Genre as registered
    pub genre: String,
    /// Publication year, kept as entered
    pub year: String,
    /// Whether the book is on the shelf
    pub available: bool,
}

impl Book {
    /// Create an available book
    #[must_use]
    pub fn new(
        id: Identifier,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            year: year.into(),
            available: true,
        }
    }

    /// Short human-readable status
    #[must_use]
    pub const fn status(&self) -> &'static str {
        if self.available { "Available" } else { "On loan" }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by {} (id {})", self.title, self.author, self.id)
    }
}

/// A registered borrower
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Patron {
    /// Unique identifier
    pub id: Identifier,
    /// Display name
    pub name: String,
    /// Contact string (usually an email address)
    pub contact: String,
    /// Books currently held, most recent last
    pub loans: LoanLedger,
}

impl Patron {
    /// Create a patron with an empty ledger
    #[must_use]
    pub fn new(id: Identifier, name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self { id, name: name.into(), contact: contact.into(), loans: LoanLedger::new() }
    }
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

/// Which kind of record an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A book
    Book,
    /// A patron
    Patron,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book => f.write_str("book"),
            Self::Patron => f.write_str("patron"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_numbers_numeric() {
        assert_eq!(Identifier::parse(" 42 "), Identifier::Number(42));
        assert_eq!(Identifier::parse(" isbn-7 "), Identifier::Text("isbn-7".to_string()));
        assert_eq!(Identifier::parse("-3"), Identifier::Number(-3));
    }

    #[test]
    fn test_numbers_sort_numerically_and_before_text() {
        let mut ids = vec![
            Identifier::parse("b"),
            Identifier::Number(10),
            Identifier::parse("a"),
            Identifier::Number(9),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                Identifier::Number(9),
                Identifier::Number(10),
                Identifier::Text("a".to_string()),
                Identifier::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  The Hobbit "), "the hobbit");
    }

    #[test]
    fn test_new_book_is_available() {
        let book = Book::new(Identifier::Number(1), "Dune", "Herbert", "SF", "1965");
        assert!(book.available);
        assert_eq!(book.status(), "Available");
        assert_eq!(book.to_string(), "'Dune' by Herbert (id 1)");
    }
}

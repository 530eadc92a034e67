use serde::{Deserialize, Serialize};

use crate::model::Identifier;

/// Stack of book identifiers held by one patron
///
/// The most recent loan sits on top. Returns normally pop the top, but a
/// patron may hand books back out of order, so the ledger also supports
/// removing the most recent occurrence of an arbitrary book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LoanLedger {
    /// Book identifiers, oldest first
    entries: Vec<Identifier>,
}

impl LoanLedger {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Records a loan on top of the stack
    pub fn push(&mut self, book: Identifier) {
        self.entries.push(book);
    }

    /// Removes and returns the most recent loan
    pub fn pop_last(&mut self) -> Option<Identifier> {
        self.entries.pop()
    }

    /// Returns the most recent loan without removing it
    #[must_use]
    pub fn peek_last(&self) -> Option<&Identifier> {
        self.entries.last()
    }

    /// Returns true if `book` appears anywhere in the ledger
    #[must_use]
    pub fn contains(&self, book: &Identifier) -> bool {
        self.entries.contains(book)
    }

    /// Removes the most recent occurrence of `book`, scanning from the top
    ///
    /// # Returns
    /// * `true` if an entry was removed
    /// * `false` if `book` is not in the ledger
    pub fn remove_most_recent(&mut self, book: &Identifier) -> bool {
        match self.entries.iter().rposition(|entry| entry == book) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the patron holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to most recent
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Identifier> {
        self.entries.iter()
    }
}

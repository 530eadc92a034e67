use std::{
    collections::{VecDeque, vec_deque},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::model::Identifier;

/// A loan request that could not be served immediately
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct LoanRequest {
    /// Patron waiting for the book
    pub patron: Identifier,
    /// Book the patron asked for
    pub book: Identifier,
}

impl LoanRequest {
    /// Create a request
    #[must_use]
    pub const fn new(patron: Identifier, book: Identifier) -> Self {
        Self { patron, book }
    }
}

impl fmt::Display for LoanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patron {} -> book {}", self.patron, self.book)
    }
}

/// First-in-first-out queue of deferred loan requests
///
/// The same (patron, book) pair may be queued more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RequestBacklog {
    /// Requests in arrival order
    queue: VecDeque<LoanRequest>,
}

impl RequestBacklog {
    /// Creates an empty backlog
    #[must_use]
    pub const fn new() -> Self {
        Self { queue: VecDeque::new() }
    }

    /// Appends a request and returns its 1-based position in the queue
    pub fn enqueue(&mut self, request: LoanRequest) -> usize {
        self.queue.push_back(request);
        self.queue.len()
    }

    /// Removes the oldest request
    pub fn dequeue(&mut self) -> Option<LoanRequest> {
        self.queue.pop_front()
    }

    /// Moves every queued request out, leaving the backlog empty
    pub fn take(&mut self) -> vec_deque::IntoIter<LoanRequest> {
        std::mem::take(&mut self.queue).into_iter()
    }

    /// Requests waiting for `book`, oldest first
    pub fn pending_for<'a>(&'a self, book: &'a Identifier) -> impl Iterator<Item = &'a LoanRequest> {
        self.queue.iter().filter(move |request| request.book == *book)
    }

    /// Number of queued requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Requests in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &LoanRequest> {
        self.queue.iter()
    }
}

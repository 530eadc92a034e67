use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{backlog::LoanRequest, model::Identifier};

/// Something that changed the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// A book was added to the catalog
    BookRegistered {
        /// Book identifier
        book: Identifier,
        /// Title as registered
        title: String,
    },
    /// A patron was registered
    PatronRegistered {
        /// Patron identifier
        patron: Identifier,
        /// Patron name
        name: String,
    },
    /// A patron record was removed
    PatronRemoved {
        /// Patron identifier
        patron: Identifier,
    },
    /// A book went out on loan
    Loaned {
        /// Borrower
        patron: Identifier,
        /// Book handed out
        book: Identifier,
    },
    /// A loan request was queued because the book was out
    Deferred {
        /// Waiting patron
        patron: Identifier,
        /// Requested book
        book: Identifier,
        /// 1-based position in the backlog
        position: usize,
    },
    /// A book came back
    Returned {
        /// Patron who held it
        patron: Identifier,
        /// Book returned
        book: Identifier,
    },
    /// A returned book went straight to the next waiting patron
    Reassigned {
        /// New holder
        patron: Identifier,
        /// Book reassigned
        book: Identifier,
    },
    /// A queued request was discarded during a backlog drain
    RequestDropped {
        /// The discarded request
        request: LoanRequest,
    },
}

impl fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BookRegistered { book, title } => write!(f, "book {book} '{title}' registered"),
            Self::PatronRegistered { patron, name } => {
                write!(f, "patron {patron} '{name}' registered")
            }
            Self::PatronRemoved { patron } => write!(f, "patron {patron} removed"),
            Self::Loaned { patron, book } => write!(f, "book {book} loaned to patron {patron}"),
            Self::Deferred { patron, book, position } => {
                write!(f, "patron {patron} queued for book {book} at position {position}")
            }
            Self::Returned { patron, book } => write!(f, "book {book} returned by patron {patron}"),
            Self::Reassigned { patron, book } => {
                write!(f, "book {book} reassigned to patron {patron}")
            }
            Self::RequestDropped { request } => write!(f, "request dropped: {request}"),
        }
    }
}

/// Wall-clock time as seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TimeStamp {
    /// Seconds since Unix epoch
    pub seconds: u64,
    /// Nanoseconds part
    pub nanos: u32,
}

impl TimeStamp {
    /// The current system time; clocks set before 1970 read as the epoch
    #[must_use]
    pub fn now() -> Self {
        let duration = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Self { seconds: duration.as_secs(), nanos: duration.subsec_nanos() }
    }
}

/// An event together with when it happened
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventRecord {
    /// What happened
    pub event: CatalogEvent,
    /// When it happened
    pub timestamp: TimeStamp,
}

impl EventRecord {
    /// Stamp `event` with the current time
    #[must_use]
    pub fn now(event: CatalogEvent) -> Self {
        Self { event, timestamp: TimeStamp::now() }
    }
}

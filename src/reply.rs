use std::fmt;

use serde::Serialize;

use crate::error::CatalogResult;

/// Result of a mutating operation that a presentation layer can show
pub trait Outcome: fmt::Display {
    /// Whether the request was fulfilled
    ///
    /// Outcomes with a side effect but no fulfilment, such as a queued loan,
    /// report `false`.
    fn is_success(&self) -> bool {
        true
    }
}

/// Success flag plus a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Whether the request was fulfilled
    pub success: bool,
    /// Message naming the records involved
    pub message: String,
}

impl Reply {
    /// A successful reply
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    /// A failed reply
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

impl<T: Outcome> From<CatalogResult<T>> for Reply {
    fn from(result: CatalogResult<T>) -> Self {
        match result {
            Ok(outcome) => Self { success: outcome.is_success(), message: outcome.to_string() },
            Err(e) => Self::failed(format!("Error: {e}")),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

//! In-memory library catalog.
//!
//! This crate keeps books and patrons in ordered search-tree indexes, tracks
//! each patron's loans in a last-in-first-out ledger, queues loan requests
//! for books that are out, and records who borrowed what in an undirected
//! interaction graph. [`Catalog`] ties these together.

pub mod backlog;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod ledger;
pub mod model;
pub mod observers;
pub mod ordered_map;
pub mod reply;
pub mod visualization;

pub use backlog::{LoanRequest, RequestBacklog};
pub use catalog::{Catalog, LoanOutcome, Receipt, ReturnOutcome, SearchField};
pub use command::Command;
pub use config::{CatalogConfig, ConfigError, DuplicateRequestPolicy};
pub use error::{CatalogError, CatalogResult};
pub use events::{CatalogEvent, EventRecord};
pub use graph::{InteractionGraph, NodeRef};
pub use ledger::LoanLedger;
pub use model::{Book, EntityKind, Identifier, Patron};
pub use observers::{ActivityLogger, CatalogObserver};
pub use ordered_map::OrderedMap;
pub use reply::Reply;
pub use visualization::CatalogVisualization;

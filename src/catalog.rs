use std::{collections::VecDeque, fmt, str::FromStr};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{
    backlog::{LoanRequest, RequestBacklog},
    config::{CatalogConfig, DuplicateRequestPolicy},
    error::{CatalogError, CatalogResult},
    events::{CatalogEvent, EventRecord},
    graph::{InteractionGraph, NodeRef},
    model::{Book, EntityKind, Identifier, Patron, normalize},
    observers::CatalogObserver,
    ordered_map::OrderedMap,
    reply::Outcome,
};

/// Field selector for the generic search entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Match against book titles
    Title,
    /// Match against author names
    Author,
}

impl FromStr for SearchField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            _ => Err(CatalogError::InvalidSearchCriterion(s.trim().to_string())),
        }
    }
}

/// What a registration or removal did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptAction {
    /// A record was added
    Registered,
    /// A record was removed
    Removed,
}

/// Confirmation of a registration or removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// What happened
    pub action: ReceiptAction,
    /// Book or patron
    pub kind: EntityKind,
    /// Identifier of the record
    pub id: Identifier,
    /// Title or name of the record
    pub label: String,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match self.kind {
            EntityKind::Book => "Book",
            EntityKind::Patron => "Patron",
        };
        let verb = match self.action {
            ReceiptAction::Registered => "registered",
            ReceiptAction::Removed => "removed",
        };
        write!(f, "{noun} '{}' (id {}) {verb}.", self.label, self.id)
    }
}

impl Outcome for Receipt {}

/// Result of a loan request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanOutcome {
    /// The patron now holds the book
    Granted {
        /// Book identifier
        book: Identifier,
        /// Book title
        title: String,
        /// Borrower identifier
        patron: Identifier,
        /// Borrower name
        patron_name: String,
    },
    /// The book was out; the request joined the backlog
    Deferred {
        /// Book identifier
        book: Identifier,
        /// Book title
        title: String,
        /// Waiting patron
        patron: Identifier,
        /// 1-based position in the backlog
        position: usize,
    },
}

impl fmt::Display for LoanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted { book, title, patron, patron_name } => {
                write!(f, "Book '{title}' (id {book}) loaned to {patron_name} (id {patron}).")
            }
            Self::Deferred { book, title, patron, position } => write!(
                f,
                "Book '{title}' (id {book}) is not available; request from patron {patron} \
                 queued at position {position}."
            ),
        }
    }
}

impl Outcome for LoanOutcome {
    fn is_success(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Result of a successful return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnOutcome {
    /// Book identifier
    pub book: Identifier,
    /// Book title
    pub title: String,
    /// Patron who handed the book back
    pub returned_by: Identifier,
    /// Name of that patron
    pub returned_by_name: String,
    /// Patron the book was passed on to, if any
    pub reassigned_to: Option<Identifier>,
    /// Backlog entries discarded while looking for the next holder
    pub dropped: Vec<LoanRequest>,
}

impl ReturnOutcome {
    /// Returns true if the book went straight to a waiting patron
    #[must_use]
    pub const fn reassigned(&self) -> bool {
        self.reassigned_to.is_some()
    }
}

impl fmt::Display for ReturnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book '{}' (id {}) returned by {} (id {})",
            self.title, self.book, self.returned_by_name, self.returned_by
        )?;
        if let Some(patron) = &self.reassigned_to {
            write!(f, " and reassigned to waiting patron {patron}")?;
        }
        f.write_str(".")?;
        if !self.dropped.is_empty() {
            write!(f, " {} stale request(s) dropped.", self.dropped.len())?;
        }
        Ok(())
    }
}

impl Outcome for ReturnOutcome {}

/// The library catalog
///
/// Owns the four search trees, the request backlog and the interaction graph,
/// and keeps them consistent: a book is unavailable exactly when one patron's
/// ledger holds it, and every fulfilled loan leaves an edge in the graph.
pub struct Catalog {
    /// Books keyed by identifier
    books_by_id: OrderedMap<Identifier, Book>,
    /// Patrons keyed by identifier
    patrons_by_id: OrderedMap<Identifier, Patron>,
    /// Book identifiers keyed by normalized title
    books_by_title: OrderedMap<String, Vec<Identifier>>,
    /// Book identifiers keyed by normalized author
    books_by_author: OrderedMap<String, Vec<Identifier>>,
    /// Loan requests waiting for a return
    backlog: RequestBacklog,
    /// Who borrowed what
    graph: InteractionGraph,
    /// Most recent events, oldest first
    history: VecDeque<EventRecord>,
    /// Registered activity observers
    observers: Vec<Box<dyn CatalogObserver>>,
    /// Behaviour switches
    config: CatalogConfig,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("books_by_id", &self.books_by_id)
            .field("patrons_by_id", &self.patrons_by_id)
            .field("books_by_title", &self.books_by_title)
            .field("books_by_author", &self.books_by_author)
            .field("backlog", &self.backlog)
            .field("graph", &self.graph)
            .field("history_len", &self.history.len())
            .field("observers_count", &self.observers.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Create an empty catalog
    #[must_use]
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            books_by_id: OrderedMap::new(),
            patrons_by_id: OrderedMap::new(),
            books_by_title: OrderedMap::new(),
            books_by_author: OrderedMap::new(),
            backlog: RequestBacklog::new(),
            graph: InteractionGraph::new(),
            history: VecDeque::new(),
            observers: Vec::new(),
            config,
        }
    }

    /// Register an observer to be notified of catalog events
    pub fn register_observer(&mut self, observer: Box<dyn CatalogObserver>) {
        self.observers.push(observer);
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Add a book to the catalog and its title and author indexes
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if a book with `id` exists
    pub fn register_book(
        &mut self,
        id: Identifier,
        title: &str,
        author: &str,
        genre: &str,
        year: &str,
    ) -> CatalogResult<Receipt> {
        if self.books_by_id.contains_key(&id) {
            return Err(CatalogError::DuplicateId { kind: EntityKind::Book, id });
        }

        let book = Book::new(id.clone(), title, author, genre, year);
        self.books_by_id.insert(id.clone(), book);
        self.books_by_title.insert_or_append(normalize(title), vec![id.clone()]);
        self.books_by_author.insert_or_append(normalize(author), vec![id.clone()]);
        self.graph.add_node(NodeRef::Book(id.clone()));

        self.emit(CatalogEvent::BookRegistered { book: id.clone(), title: title.to_string() });
        Ok(Receipt {
            action: ReceiptAction::Registered,
            kind: EntityKind::Book,
            id,
            label: title.to_string(),
        })
    }

    /// Register a patron with an empty ledger
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if a patron with `id` exists
    pub fn register_patron(
        &mut self,
        id: Identifier,
        name: &str,
        contact: &str,
    ) -> CatalogResult<Receipt> {
        if self.patrons_by_id.contains_key(&id) {
            return Err(CatalogError::DuplicateId { kind: EntityKind::Patron, id });
        }

        self.patrons_by_id.insert(id.clone(), Patron::new(id.clone(), name, contact));
        self.graph.add_node(NodeRef::Patron(id.clone()));

        self.emit(CatalogEvent::PatronRegistered { patron: id.clone(), name: name.to_string() });
        Ok(Receipt {
            action: ReceiptAction::Registered,
            kind: EntityKind::Patron,
            id,
            label: name.to_string(),
        })
    }

    /// Remove a patron who holds no books
    ///
    /// The patron's graph history stays. Backlog requests from the patron
    /// become stale and are dropped by the next return that reaches them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::PatronNotFound` for an unknown id and
    /// `CatalogError::ActiveLoans` if the patron still holds books
    pub fn remove_patron(&mut self, id: &Identifier) -> CatalogResult<Receipt> {
        let patron =
            self.patrons_by_id.get(id).ok_or_else(|| CatalogError::PatronNotFound(id.clone()))?;
        if !patron.loans.is_empty() {
            return Err(CatalogError::ActiveLoans { id: id.clone(), count: patron.loans.len() });
        }

        let patron =
            self.patrons_by_id.remove(id).ok_or_else(|| CatalogError::PatronNotFound(id.clone()))?;
        self.emit(CatalogEvent::PatronRemoved { patron: id.clone() });
        Ok(Receipt {
            action: ReceiptAction::Removed,
            kind: EntityKind::Patron,
            id: patron.id,
            label: patron.name,
        })
    }

    /// Lend a book, or queue the request if the book is out
    ///
    /// A queued request is reported as `LoanOutcome::Deferred`, which is not
    /// an error but does not count as success either.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::PatronNotFound` or `CatalogError::BookNotFound`
    /// if either identifier is unknown
    pub fn loan(&mut self, patron_id: &Identifier, book_id: &Identifier) -> CatalogResult<LoanOutcome> {
        let patron = self
            .patrons_by_id
            .get_mut(patron_id)
            .ok_or_else(|| CatalogError::PatronNotFound(patron_id.clone()))?;
        let book = self
            .books_by_id
            .get_mut(book_id)
            .ok_or_else(|| CatalogError::BookNotFound(book_id.clone()))?;

        // Queue the request
        if !book.available {
            let title = book.title.clone();
            let position =
                self.backlog.enqueue(LoanRequest::new(patron_id.clone(), book_id.clone()));
            self.emit(CatalogEvent::Deferred {
                patron: patron_id.clone(),
                book: book_id.clone(),
                position,
            });
            return Ok(LoanOutcome::Deferred {
                book: book_id.clone(),
                title,
                patron: patron_id.clone(),
                position,
            });
        }

        // Lend the book
        book.available = false;
        patron.loans.push(book_id.clone());
        let outcome = LoanOutcome::Granted {
            book: book_id.clone(),
            title: book.title.clone(),
            patron: patron_id.clone(),
            patron_name: patron.name.clone(),
        };
        self.graph.add_edge(NodeRef::Patron(patron_id.clone()), NodeRef::Book(book_id.clone()));

        self.emit(CatalogEvent::Loaned { patron: patron_id.clone(), book: book_id.clone() });
        Ok(outcome)
    }

    /// Take a book back and pass it to the first valid waiting request
    ///
    /// The holder is the first patron, by ascending id, whose most recent
    /// loan is the book; failing that, the first patron holding it anywhere
    /// in their ledger.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::BookNotFound` for an unknown id,
    /// `CatalogError::AlreadyAvailable` if the book is on the shelf, and
    /// `CatalogError::NoActiveLoan` if no ledger holds the book
    pub fn return_book(&mut self, book_id: &Identifier) -> CatalogResult<ReturnOutcome> {
        let book =
            self.books_by_id.get(book_id).ok_or_else(|| CatalogError::BookNotFound(book_id.clone()))?;
        if book.available {
            return Err(CatalogError::AlreadyAvailable {
                id: book_id.clone(),
                title: book.title.clone(),
            });
        }
        let title = book.title.clone();

        // Find who holds the book
        let holder =
            self.find_holder(book_id).ok_or_else(|| CatalogError::NoActiveLoan(book_id.clone()))?;
        // Take it off their ledger
        let holder_name = match self.patrons_by_id.get_mut(&holder) {
            Some(patron) => {
                if patron.loans.peek_last() == Some(book_id) {
                    patron.loans.pop_last();
                } else {
                    log::debug!("book {book_id} returned out of order by patron {holder}");
                    patron.loans.remove_most_recent(book_id);
                }
                patron.name.clone()
            }
            None => return Err(CatalogError::NoActiveLoan(book_id.clone())),
        };
        // Back on the shelf until the backlog claims it
        self.set_available(book_id, true);
        self.emit(CatalogEvent::Returned { patron: holder.clone(), book: book_id.clone() });

        let (reassigned_to, dropped) = self.reassign_from_backlog(book_id);

        Ok(ReturnOutcome {
            book: book_id.clone(),
            title,
            returned_by: holder,
            returned_by_name: holder_name,
            reassigned_to,
            dropped,
        })
    }

    /// Patron currently holding `book_id`
    fn find_holder(&self, book_id: &Identifier) -> Option<Identifier> {
        self.patrons_by_id
            .values()
            .find(|patron| patron.loans.peek_last() == Some(book_id))
            .or_else(|| self.patrons_by_id.values().find(|patron| patron.loans.contains(book_id)))
            .map(|patron| patron.id.clone())
    }

    /// Drain the backlog, granting `book_id` to the first request whose
    /// patron still exists
    ///
    /// Requests for other books are re-queued in order. Requests for this
    /// book from unknown patrons are dropped, and so are requests behind the
    /// reassigned one unless the config retains them.
    fn reassign_from_backlog(&mut self, book_id: &Identifier) -> (Option<Identifier>, Vec<LoanRequest>) {
        let mut reassigned_to = None;
        let mut dropped = Vec::new();

        for request in self.backlog.take() {
            // Requests for other books keep their place
            if request.book != *book_id {
                self.backlog.enqueue(request);
                continue;
            }
            // At most one reassignment per return
            if reassigned_to.is_some() {
                match self.config.duplicate_requests {
                    DuplicateRequestPolicy::Retain => {
                        self.backlog.enqueue(request);
                    }
                    DuplicateRequestPolicy::Drop => dropped.push(request),
                }
                continue;
            }
            match self.patrons_by_id.get_mut(&request.patron) {
                Some(patron) => {
                    patron.loans.push(book_id.clone());
                    reassigned_to = Some(request.patron);
                }
                None => dropped.push(request),
            }
        }

        // Record the handover
        if let Some(patron) = &reassigned_to {
            self.set_available(book_id, false);
            self.graph.add_edge(NodeRef::Patron(patron.clone()), NodeRef::Book(book_id.clone()));
            self.emit(CatalogEvent::Reassigned { patron: patron.clone(), book: book_id.clone() });
        }
        for request in &dropped {
            self.emit(CatalogEvent::RequestDropped { request: request.clone() });
        }

        (reassigned_to, dropped)
    }

    /// Flip the availability flag of a known book
    fn set_available(&mut self, book_id: &Identifier, available: bool) {
        if let Some(book) = self.books_by_id.get_mut(book_id) {
            book.available = available;
        }
    }

    /// Books whose title contains `fragment`, ignoring case and surrounding
    /// whitespace
    #[must_use]
    pub fn search_by_title(&self, fragment: &str) -> Vec<&Book> {
        self.search_index(&self.books_by_title, fragment)
    }

    /// Books whose author contains `fragment`, ignoring case and surrounding
    /// whitespace
    #[must_use]
    pub fn search_by_author(&self, fragment: &str) -> Vec<&Book> {
        self.search_index(&self.books_by_author, fragment)
    }

    /// Search on a field named by free text (`title` or `author`)
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidSearchCriterion` for any other field
    pub fn search(&self, field: &str, fragment: &str) -> CatalogResult<Vec<&Book>> {
        Ok(match field.parse::<SearchField>()? {
            SearchField::Title => self.search_by_title(fragment),
            SearchField::Author => self.search_by_author(fragment),
        })
    }

    /// Exact-key hit first, then every key containing the fragment, with
    /// duplicates removed
    fn search_index(&self, index: &OrderedMap<String, Vec<Identifier>>, fragment: &str) -> Vec<&Book> {
        let needle = normalize(fragment);
        let exact = index.get(needle.as_str()).into_iter().flatten();
        let partial = index
            .iter()
            .filter(|(key, _)| key.contains(needle.as_str()))
            .flat_map(|(_, ids)| ids);

        exact
            .chain(partial)
            .collect::<IndexSet<&Identifier>>()
            .into_iter()
            .filter_map(|id| self.books_by_id.get(id))
            .collect()
    }

    /// Look up a book
    #[must_use]
    pub fn book(&self, id: &Identifier) -> Option<&Book> {
        self.books_by_id.get(id)
    }

    /// Look up a patron
    #[must_use]
    pub fn patron(&self, id: &Identifier) -> Option<&Patron> {
        self.patrons_by_id.get(id)
    }

    /// All books by ascending id
    #[must_use]
    pub fn list_books(&self) -> Vec<&Book> {
        self.books_by_id.values().collect()
    }

    /// All patrons by ascending id
    #[must_use]
    pub fn list_patrons(&self) -> Vec<&Patron> {
        self.patrons_by_id.values().collect()
    }

    /// Graph neighbours of `node` in the order they were connected
    #[must_use]
    pub fn connections_of(&self, node: &NodeRef) -> Vec<NodeRef> {
        self.graph.neighbors_of(node).cloned().collect()
    }

    /// Every patron who has ever borrowed `book`
    #[must_use]
    pub fn borrowers_of(&self, book: &Identifier) -> Vec<Identifier> {
        self.connections_of(&NodeRef::Book(book.clone())).into_iter().map(|node| node.id().clone()).collect()
    }

    /// Pending loan requests
    #[must_use]
    pub const fn backlog(&self) -> &RequestBacklog {
        &self.backlog
    }

    /// The interaction graph
    #[must_use]
    pub const fn graph(&self) -> &InteractionGraph {
        &self.graph
    }

    /// Recorded events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &EventRecord> {
        self.history.iter()
    }

    /// Notify observers and append to the bounded history
    fn emit(&mut self, event: CatalogEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
        if self.config.history_limit == 0 {
            return;
        }
        self.history.push_back(EventRecord::now(event));
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }
}

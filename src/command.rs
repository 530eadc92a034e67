use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    catalog::Catalog,
    graph::NodeRef,
    model::{Book, EntityKind, Identifier},
    reply::Reply,
};

/// A single front-end request, as read from a JSON script
///
/// Identifiers may be given as JSON numbers or as free text; text is parsed
/// with [`Identifier::parse`], so `" 7 "` and `7` name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Register a new book
    RegisterBook {
        /// Book identifier
        #[serde(deserialize_with = "free_text_id")]
        id: Identifier,
        /// Title
        title: String,
        /// Author
        author: String,
        /// Genre
        #[serde(default)]
        genre: String,
        /// Publication year
        #[serde(default)]
        year: String,
    },
    /// Register a new patron
    RegisterPatron {
        /// Patron identifier
        #[serde(deserialize_with = "free_text_id")]
        id: Identifier,
        /// Display name
        name: String,
        /// Contact string
        #[serde(default)]
        contact: String,
    },
    /// Lend a book, or queue the request
    Loan {
        /// Borrowing patron
        #[serde(deserialize_with = "free_text_id")]
        patron: Identifier,
        /// Requested book
        #[serde(deserialize_with = "free_text_id")]
        book: Identifier,
    },
    /// Return a book
    Return {
        /// Returned book
        #[serde(deserialize_with = "free_text_id")]
        book: Identifier,
    },
    /// Search books by `title` or `author`
    Search {
        /// Field name
        field: String,
        /// Substring to look for
        text: String,
    },
    /// Remove a patron with no active loans
    RemovePatron {
        /// Patron identifier
        #[serde(deserialize_with = "free_text_id")]
        id: Identifier,
    },
    /// List every book by ascending id
    ListBooks,
    /// List every patron by ascending id
    ListPatrons,
    /// List the interaction-graph neighbours of a patron or book
    Connections {
        /// Whether `id` names a patron or a book
        kind: EntityKind,
        /// Identifier of the record
        #[serde(deserialize_with = "free_text_id")]
        id: Identifier,
    },
}

/// Accept either a JSON number or free text and normalise it
fn free_text_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Identifier, D::Error> {
    Ok(match Identifier::deserialize(deserializer)? {
        Identifier::Text(raw) => Identifier::parse(&raw),
        number @ Identifier::Number(_) => number,
    })
}

impl Command {
    /// Parse a JSON array of commands
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an array of well-formed commands
    pub fn parse_script(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Run the command against `catalog`
    pub fn apply(&self, catalog: &mut Catalog) -> Reply {
        match self {
            Self::RegisterBook { id, title, author, genre, year } => {
                catalog.register_book(id.clone(), title, author, genre, year).into()
            }
            Self::RegisterPatron { id, name, contact } => {
                catalog.register_patron(id.clone(), name, contact).into()
            }
            Self::Loan { patron, book } => catalog.loan(patron, book).into(),
            Self::Return { book } => catalog.return_book(book).into(),
            Self::RemovePatron { id } => catalog.remove_patron(id).into(),
            Self::Search { field, text } => match catalog.search(field, text) {
                Ok(books) if books.is_empty() => {
                    Reply::failed(format!("No books found for {} '{}'.", field.trim(), text.trim()))
                }
                Ok(books) => Reply::ok(render_books(&books)),
                Err(e) => Reply::failed(format!("Error: {e}")),
            },
            Self::ListBooks => {
                let books = catalog.list_books();
                if books.is_empty() {
                    Reply::failed("No books registered.")
                } else {
                    Reply::ok(render_books(&books))
                }
            }
            Self::ListPatrons => {
                let patrons = catalog.list_patrons();
                if patrons.is_empty() {
                    return Reply::failed("No patrons registered.");
                }
                let mut out = String::new();
                for patron in patrons {
                    out.push_str(&format!(
                        "{} | {} | {} | {} on loan\n",
                        patron.id,
                        patron.name,
                        patron.contact,
                        patron.loans.len()
                    ));
                }
                Reply::ok(out.trim_end())
            }
            Self::Connections { kind, id } => {
                let node = match kind {
                    EntityKind::Patron => NodeRef::Patron(id.clone()),
                    EntityKind::Book => NodeRef::Book(id.clone()),
                };
                let neighbours = catalog.connections_of(&node);
                if neighbours.is_empty() {
                    Reply::ok(format!("No connections for {node}."))
                } else {
                    let names: Vec<String> = neighbours.iter().map(ToString::to_string).collect();
                    Reply::ok(format!("Connections of {node}: {}", names.join(", ")))
                }
            }
        }
    }
}

/// One `id | title | author | status` line per book
fn render_books(books: &[&Book]) -> String {
    let mut out = String::new();
    for book in books {
        out.push_str(&format!("{} | {} | {} | {}\n", book.id, book.title, book.author, book.status()));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        {"op": "register_book", "id": 1, "title": "Dune", "author": "Frank Herbert", "genre": "SF", "year": "1965"},
        {"op": "register_patron", "id": " 10 ", "name": "Ana", "contact": "ana@example.org"},
        {"op": "register_patron", "id": "11", "name": "Luis"},
        {"op": "loan", "patron": 10, "book": "1"},
        {"op": "loan", "patron": 11, "book": 1},
        {"op": "return", "book": 1},
        {"op": "connections", "kind": "book", "id": 1}
    ]"#;

    #[test]
    fn test_parse_script_normalises_ids() {
        let commands = Command::parse_script(SCRIPT).unwrap();
        assert_eq!(commands.len(), 7);
        assert_eq!(
            commands[1],
            Command::RegisterPatron {
                id: Identifier::Number(10),
                name: "Ana".to_string(),
                contact: "ana@example.org".to_string(),
            }
        );
        assert_eq!(
            commands[3],
            Command::Loan { patron: Identifier::Number(10), book: Identifier::Number(1) }
        );
    }

    #[test]
    fn test_script_replays_reassignment() {
        let mut catalog = Catalog::new();
        let replies: Vec<Reply> =
            Command::parse_script(SCRIPT).unwrap().iter().map(|c| c.apply(&mut catalog)).collect();

        let flags: Vec<bool> = replies.iter().map(|r| r.success).collect();
        assert_eq!(flags, vec![true, true, true, true, false, true, true]);
        assert_eq!(replies[6].message, "Connections of book:1: patron:10, patron:11");
        assert!(!catalog.book(&Identifier::Number(1)).unwrap().available);
    }

    #[test]
    fn test_list_patrons_renders_one_line_each() {
        let mut catalog = Catalog::new();
        for command in Command::parse_script(SCRIPT).unwrap() {
            command.apply(&mut catalog);
        }

        let listing = Command::ListPatrons.apply(&mut catalog);
        assert!(listing.success);
        assert_eq!(
            listing.message,
            "10 | Ana | ana@example.org | 0 on loan\n11 | Luis |  | 1 on loan"
        );
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(Command::parse_script(r#"[{"op": "burn", "id": 1}]"#).is_err());
    }

    #[test]
    fn test_search_and_listings() {
        let mut catalog = Catalog::new();
        assert!(!Command::ListBooks.apply(&mut catalog).success);
        assert!(!Command::ListPatrons.apply(&mut catalog).success);

        Command::RegisterBook {
            id: Identifier::Number(2),
            title: "Dunkirk Diaries".to_string(),
            author: "Someone".to_string(),
            genre: String::new(),
            year: String::new(),
        }
        .apply(&mut catalog);

        let hit = Command::Search { field: "Title".to_string(), text: "dun".to_string() }.apply(&mut catalog);
        assert!(hit.success);
        assert_eq!(hit.message, "2 | Dunkirk Diaries | Someone | Available");

        let miss = Command::Search { field: "author".to_string(), text: "nobody".to_string() }.apply(&mut catalog);
        assert!(!miss.success);

        let bad = Command::Search { field: "isbn".to_string(), text: "x".to_string() }.apply(&mut catalog);
        assert!(!bad.success);
        assert!(bad.message.starts_with("Error: "));

        let lonely = Command::Connections { kind: EntityKind::Patron, id: Identifier::Number(99) }.apply(&mut catalog);
        assert_eq!(lonely.message, "No connections for patron:99.");
    }
}

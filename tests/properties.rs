use std::collections::BTreeMap;

use library_catalog::{Catalog, Identifier, InteractionGraph, LoanLedger, OrderedMap};
use proptest::prelude::*;

const BOOKS: i64 = 4;
const PATRONS: i64 = 4;

/// A random front-end action against a small catalog
#[derive(Debug, Clone)]
enum Action {
    Loan { patron: i64, book: i64 },
    Return { book: i64 },
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..PATRONS, 0..BOOKS).prop_map(|(patron, book)| Action::Loan { patron, book }),
        (0..BOOKS).prop_map(|book| Action::Return { book }),
    ]
}

fn seeded_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for id in 0..BOOKS {
        catalog.register_book(Identifier::Number(id), &format!("Book {id}"), "Author", "", "").unwrap();
    }
    for id in 0..PATRONS {
        catalog.register_patron(Identifier::Number(id), &format!("Patron {id}"), "").unwrap();
    }
    catalog
}

fn assert_availability_invariant(catalog: &Catalog) -> Result<(), TestCaseError> {
    for book in catalog.list_books() {
        let holders = catalog.list_patrons().iter().filter(|p| p.loans.contains(&book.id)).count();
        prop_assert_eq!(!book.available, holders == 1, "book {} has {} holders", book.id, holders);
        prop_assert!(holders <= 1);
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_map_iterates_in_key_order(
        inserts in prop::collection::vec((any::<i16>(), any::<u8>()), 0..64),
        removals in prop::collection::vec(any::<i16>(), 0..32)
    ) {
        let mut map = OrderedMap::new();
        let mut model = BTreeMap::new();
        for (k, v) in inserts {
            prop_assert_eq!(map.insert(k, v), model.insert(k, v));
        }
        for k in removals {
            prop_assert_eq!(map.remove(&k), model.remove(&k));
        }

        let keys: Vec<i16> = map.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(map.len(), model.len());
        prop_assert_eq!(
            map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            model.into_iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_map_lookup_after_insert_and_remove(keys in prop::collection::hash_set(any::<i32>(), 1..64)) {
        let mut map = OrderedMap::new();
        for &k in &keys {
            prop_assert!(map.insert(k, k.to_string()).is_none());
        }
        for k in &keys {
            prop_assert_eq!(map.get(k), Some(&k.to_string()));
        }
        for k in &keys {
            prop_assert_eq!(map.remove(k), Some(k.to_string()));
            prop_assert!(map.get(k).is_none());
        }
        prop_assert!(map.is_empty());
    }

    #[test]
    fn test_ledger_is_last_in_first_out(books in prop::collection::vec(any::<i64>(), 0..32)) {
        let mut ledger = LoanLedger::new();
        for &book in &books {
            ledger.push(Identifier::Number(book));
        }

        if let Some(&last) = books.last() {
            prop_assert_eq!(ledger.peek_last(), Some(&Identifier::Number(last)));
            prop_assert_eq!(ledger.len(), books.len());
        }

        let popped: Vec<Identifier> = std::iter::from_fn(|| ledger.pop_last()).collect();
        let expected: Vec<Identifier> = books.iter().rev().map(|&b| Identifier::Number(b)).collect();
        prop_assert_eq!(popped, expected);
        prop_assert!(ledger.is_empty());
    }

    #[test]
    fn test_availability_matches_ledgers(actions in prop::collection::vec(action(), 0..48)) {
        let mut catalog = seeded_catalog();
        for action in actions {
            match action {
                Action::Loan { patron, book } => {
                    catalog.loan(&Identifier::Number(patron), &Identifier::Number(book)).ok();
                }
                Action::Return { book } => {
                    catalog.return_book(&Identifier::Number(book)).ok();
                }
            }
            assert_availability_invariant(&catalog)?;
        }
    }

    #[test]
    fn test_graph_edges_are_symmetric(edges in prop::collection::vec((0u8..16, 0u8..16), 0..64)) {
        let mut graph = InteractionGraph::<u8>::new();
        for (a, b) in edges {
            graph.add_edge(a, b);
        }

        for a in graph.nodes() {
            for b in graph.neighbors_of(a) {
                prop_assert!(graph.neighbors_of(b).any(|n| n == a), "{} -> {} has no way back", a, b);
            }
        }
        prop_assert_eq!(graph.edges().count(), graph.edge_count());
    }
}

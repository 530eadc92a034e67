use std::{fs::File, io::Write, path::Path};

use crate::{catalog::Catalog, events::EventRecord, graph::NodeRef};

/// Rendering helpers for catalog contents and the interaction graph
#[derive(Debug)]
pub struct CatalogVisualization;

impl CatalogVisualization {
    /// Generate a DOT graph of who borrowed what
    ///
    /// Patrons are drawn as boxes, books as ellipses; books currently on
    /// loan are filled. When `focus` is given, that node and its edges are
    /// highlighted.
    #[must_use]
    pub fn generate_dot(catalog: &Catalog, focus: Option<&NodeRef>) -> String {
        let mut dot = String::from("graph interactions {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [style=filled, fillcolor=white];\n");

        // Add nodes
        for node in catalog.graph().nodes() {
            let (shape, label, fill) = match node {
                NodeRef::Patron(id) => {
                    let name = catalog.patron(id).map_or("(removed)", |p| p.name.as_str());
                    ("box", format!("{name}\\n#{id}"), "lightblue")
                }
                NodeRef::Book(id) => {
                    let (title, fill) = catalog
                        .book(id)
                        .map_or(("(unknown)", "white"), |b| {
                            (b.title.as_str(), if b.available { "white" } else { "lightsalmon" })
                        });
                    ("ellipse", format!("{title}\\n#{id}"), fill)
                }
            };
            let label = label.replace('"', "\\\"");
            let extra = if focus == Some(node) { ", peripheries=2, penwidth=2.0" } else { "" };
            dot.push_str(&format!(
                "  \"{node}\" [shape={shape}, label=\"{label}\", fillcolor={fill}{extra}];\n"
            ));
        }

        // Add edges
        for (a, b) in catalog.graph().edges() {
            let style = if focus.is_some_and(|f| f == a || f == b) {
                "color=red, penwidth=2.0"
            } else {
                "color=black"
            };
            dot.push_str(&format!("  \"{a}\" -- \"{b}\" [{style}];\n"));
        }

        dot.push_str("}\n");
        dot
    }

    /// Save the DOT representation to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to
    pub fn save_dot_to_file(dot: &str, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path)?;
        file.write_all(dot.as_bytes())?;
        Ok(())
    }

    /// Markdown table of every book by ascending id
    #[must_use]
    pub fn books_table(catalog: &Catalog) -> String {
        let books = catalog.list_books();
        if books.is_empty() {
            return "No books registered.".to_string();
        }

        let mut table = String::from("| Id | Title | Author | Genre | Year | Status |\n");
        table.push_str("|----|-------|--------|-------|------|--------|\n");
        for book in books {
            table.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                book.id,
                book.title,
                book.author,
                book.genre,
                book.year,
                book.status()
            ));
        }
        table
    }

    /// Markdown table of every patron by ascending id
    #[must_use]
    pub fn patrons_table(catalog: &Catalog) -> String {
        let patrons = catalog.list_patrons();
        if patrons.is_empty() {
            return "No patrons registered.".to_string();
        }

        let mut table = String::from("| Id | Name | Contact | Loans |\n");
        table.push_str("|----|------|---------|-------|\n");
        for patron in patrons {
            table.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                patron.id,
                patron.name,
                patron.contact,
                patron.loans.len()
            ));
        }
        table
    }

    /// Markdown table of recorded events
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn history_table<'a>(records: impl IntoIterator<Item = &'a EventRecord>) -> String {
        let mut rows = String::new();
        for (i, record) in records.into_iter().enumerate() {
            rows.push_str(&format!("| {} | {} | {} |\n", i + 1, record.timestamp.seconds, record.event));
        }
        if rows.is_empty() {
            return "No events recorded yet.".to_string();
        }

        let mut table = String::from("| # | Time | Event |\n");
        table.push_str("|---|------|-------|\n");
        table.push_str(&rows);
        table
    }

    /// Print a summary of catalog statistics
    pub fn print_stats(catalog: &Catalog) {
        let books = catalog.list_books();
        let on_loan = books.iter().filter(|b| !b.available).count();
        println!("=== Catalog Statistics ===");
        println!("Books: {} ({on_loan} on loan)", books.len());
        println!("Patrons: {}", catalog.list_patrons().len());
        println!("Pending requests: {}", catalog.backlog().len());
        println!(
            "Interaction graph: {} nodes, {} edges",
            catalog.graph().node_count(),
            catalog.graph().edge_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identifier;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        assert!(catalog.register_book(Identifier::Number(1), "Dune", "Herbert", "SF", "1965").is_ok());
        assert!(catalog.register_book(Identifier::Number(2), "Say \"Hi\"", "Anon", "Misc", "2000").is_ok());
        assert!(catalog.register_patron(Identifier::Number(10), "Ana", "ana@example.org").is_ok());
        assert!(catalog.loan(&Identifier::Number(10), &Identifier::Number(1)).is_ok());
        catalog
    }

    #[test]
    fn test_dot_contains_nodes_and_edges() {
        let catalog = sample_catalog();
        let dot = CatalogVisualization::generate_dot(&catalog, None);

        assert!(dot.starts_with("graph interactions {"));
        assert!(dot.contains("\"book:1\" [shape=ellipse, label=\"Dune\\n#1\", fillcolor=lightsalmon]"));
        assert!(dot.contains("\"patron:10\" [shape=box"));
        assert!(dot.contains("\"patron:10\" -- \"book:1\" [color=black];"));
        assert!(dot.contains("Say \\\"Hi\\\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_dot_highlights_focus() {
        let catalog = sample_catalog();
        let focus = NodeRef::Book(Identifier::Number(1));
        let dot = CatalogVisualization::generate_dot(&catalog, Some(&focus));
        assert!(dot.contains("\"patron:10\" -- \"book:1\" [color=red, penwidth=2.0];"));
        assert!(dot.contains("peripheries=2"));
    }

    #[test]
    fn test_tables() {
        let catalog = sample_catalog();
        let books = CatalogVisualization::books_table(&catalog);
        assert!(books.contains("| 1 | Dune | Herbert | SF | 1965 | On loan |"));
        assert!(books.contains("| Available |"));

        let patrons = CatalogVisualization::patrons_table(&catalog);
        assert!(patrons.contains("| 10 | Ana | ana@example.org | 1 |"));

        let history = CatalogVisualization::history_table(catalog.history());
        assert!(history.contains("book 1 loaned to patron 10"));

        assert_eq!(CatalogVisualization::books_table(&Catalog::new()), "No books registered.");
        assert_eq!(
            CatalogVisualization::history_table(std::iter::empty::<&EventRecord>()),
            "No events recorded yet."
        );
    }
}

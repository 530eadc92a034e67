use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use colored::Colorize;
use library_catalog::{
    ActivityLogger, Catalog, CatalogConfig, CatalogVisualization, Command, EntityKind, Identifier,
};

/// Command-line arguments for the catalog demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file; defaults apply when missing or invalid
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of commands to run instead of the built-in scenario
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Write the interaction graph as Graphviz DOT to this file
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    println!("{}", "Library Catalog Demonstration".green().bold());
    println!("=====================================\n");

    let config = args.config.as_deref().map_or_else(CatalogConfig::default, CatalogConfig::load_or_default);
    let mut catalog = Catalog::with_config(config);
    catalog.register_observer(Box::new(ActivityLogger));

    let commands = match &args.script {
        Some(path) => {
            log::info!("Running script {}", path.display());
            Command::parse_script(&fs::read_to_string(path)?)?
        }
        None => dune_scenario(),
    };

    for command in &commands {
        let reply = command.apply(&mut catalog);
        if reply.success {
            println!("{} {}", "ok ".green().bold(), reply.message);
        } else {
            println!("{} {}", "!! ".red().bold(), reply.message);
        }
    }

    println!("\n{}", "Books".yellow().bold());
    println!("{}", CatalogVisualization::books_table(&catalog));
    println!("{}", "Patrons".yellow().bold());
    println!("{}", CatalogVisualization::patrons_table(&catalog));
    println!("{}", "History".yellow().bold());
    println!("{}", CatalogVisualization::history_table(catalog.history()));
    CatalogVisualization::print_stats(&catalog);

    if let Some(path) = &args.dot {
        let dot = CatalogVisualization::generate_dot(&catalog, None);
        CatalogVisualization::save_dot_to_file(&dot, path)?;
        println!("\nInteraction graph written to {}", path.display().to_string().cyan());
    }

    println!("\n{}", "Demonstration complete!".green().bold());
    Ok(())
}

/// One book, two patrons: the second loan is queued and picked up on return
fn dune_scenario() -> Vec<Command> {
    let book = Identifier::Number(1);
    let ana = Identifier::Number(10);
    let luis = Identifier::Number(11);

    vec![
        Command::RegisterBook {
            id: book.clone(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: "Science fiction".to_string(),
            year: "1965".to_string(),
        },
        Command::RegisterBook {
            id: Identifier::Number(2),
            title: "Dunkirk Diaries".to_string(),
            author: "Anonymous".to_string(),
            genre: "History".to_string(),
            year: "1941".to_string(),
        },
        Command::RegisterPatron {
            id: ana.clone(),
            name: "Ana".to_string(),
            contact: "ana@example.org".to_string(),
        },
        Command::RegisterPatron {
            id: luis.clone(),
            name: "Luis".to_string(),
            contact: "luis@example.org".to_string(),
        },
        Command::Loan { patron: ana, book: book.clone() },
        Command::Loan { patron: luis, book: book.clone() },
        Command::Return { book: book.clone() },
        Command::Search { field: "title".to_string(), text: "dun".to_string() },
        Command::Connections { kind: EntityKind::Book, id: book },
        Command::ListPatrons,
    ]
}

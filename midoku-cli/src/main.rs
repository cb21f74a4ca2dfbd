//! midoku CLI
//!
//! Command-line interface for managing an audiobook library database.

mod commands;
mod error;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use commands::config::{run_config_set_database, run_config_show};
use commands::library::{run_add_book, run_books, run_chapters, run_progress, run_upgrade};
use error::CliError;
use settings::Settings;

#[derive(Parser)]
#[command(name = "midoku")]
#[command(about = "Manage an audiobook library", long_about = None)]
struct Cli {
    /// Library database file (defaults to the configured library)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the library schema
    Upgrade,

    /// List books with their chapter count and playing time
    Books,

    /// Add a book to the library
    AddBook {
        /// Book title
        title: String,

        /// Author name
        #[arg(short, long)]
        author: Option<String>,

        /// Narrator name
        #[arg(short, long)]
        reader: Option<String>,
    },

    /// List the chapters of a book
    Chapters {
        /// Book id (see `midoku books`)
        book_id: i64,
    },

    /// Show the most recent listening progress
    Progress,

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the settings file and the database in use
    Show,

    /// Save the library database path
    SetDatabase {
        /// Path of the library database
        path: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let database = || -> Result<PathBuf, CliError> {
        let settings = Settings::load().map_err(|e| CliError::config(e.to_string()))?;
        Ok(settings.resolve_database(cli.database.clone()))
    };

    match cli.command {
        Commands::Upgrade => run_upgrade(&database()?),
        Commands::Books => run_books(&database()?),
        Commands::AddBook {
            title,
            author,
            reader,
        } => run_add_book(&database()?, title, author, reader),
        Commands::Chapters { book_id } => run_chapters(&database()?, book_id),
        Commands::Progress => run_progress(&database()?),
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(cli.database.clone()),
            ConfigAction::SetDatabase { path } => run_config_set_database(path),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!(
            "{} {}",
            "Error:".if_supports_color(Stderr, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

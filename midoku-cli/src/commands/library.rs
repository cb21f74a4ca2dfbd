use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use midoku_library::{Book, Progress, open_library, upgrade_schema};
use midoku_orm::{Database, Model};

use super::format_duration;
use crate::error::CliError;

fn ensure_parent(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Open the library at `path`, creating or upgrading it as needed.
pub(crate) fn open(path: &Path) -> Result<Database, CliError> {
    ensure_parent(path)?;
    log::debug!("Opening library {}", path.display());
    Ok(open_library(path)?)
}

pub(crate) fn run_upgrade(path: &Path) -> Result<(), CliError> {
    ensure_parent(path)?;
    let db = Database::open(path)?;
    let outcome = upgrade_schema(&db)?;
    println!(
        "{}: {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        outcome,
    );
    Ok(())
}

pub(crate) fn run_books(path: &Path) -> Result<(), CliError> {
    let db = open(path)?;
    let books = Book::list(&db)?;

    println!("{}", "Books:".if_supports_color(Stdout, |t| t.bold()));
    if books.is_empty() {
        println!("  {}", "(none)".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    for book in &books {
        let chapters = book.chapter_count(&db)?;
        let total = book.total_time(&db)?;
        println!(
            "  {:>4}  {}{}  {} chapters, {}",
            book.id().unwrap_or(-1),
            book.title().if_supports_color(Stdout, |t| t.bold()),
            match book.author() {
                Some(author) => format!(" by {author}"),
                None => String::new(),
            },
            chapters,
            format_duration(total),
        );
    }
    Ok(())
}

pub(crate) fn run_add_book(
    path: &Path,
    title: String,
    author: Option<String>,
    reader: Option<String>,
) -> Result<(), CliError> {
    let db = open(path)?;
    let mut book = Book::new(title, author, reader, None);
    let id = book.save(&db)?;
    log::debug!("Inserted book {id}");

    println!(
        "{} added {} (id {})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        book.title().if_supports_color(Stdout, |t| t.bold()),
        id,
    );
    Ok(())
}

pub(crate) fn run_chapters(path: &Path, book_id: i64) -> Result<(), CliError> {
    let db = open(path)?;
    if !Book::exists(&db, book_id)? {
        return Err(CliError::other(format!("No book with id {book_id}")));
    }
    let book = Book::load(&db, book_id)?;

    println!("{}", book.title().if_supports_color(Stdout, |t| t.bold()));
    let chapters = book.chapters(&db)?;
    if chapters.is_empty() {
        println!("  {}", "(no chapters)".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    let mut start = 0;
    for chapter in &chapters {
        println!(
            "  {:>3}  {}  {}  {}",
            chapter.number(),
            format_duration(start).if_supports_color(Stdout, |t| t.dimmed()),
            chapter.title().unwrap_or("-"),
            chapter.media().if_supports_color(Stdout, |t| t.cyan()),
        );
        start += chapter.length();
    }
    println!("  Total: {}", format_duration(start));
    Ok(())
}

pub(crate) fn run_progress(path: &Path) -> Result<(), CliError> {
    let db = open(path)?;
    let Some(progress) = Progress::find_most_recent(&db)? else {
        println!("{}", "No listening progress yet".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    };

    let book = progress.book(&db)?;
    let chapter = progress.chapter(&db)?;
    let position = chapter.total_offset(&db)? + progress.time();

    println!(
        "{}",
        "Most recent progress:".if_supports_color(Stdout, |t| t.bold()),
    );
    println!("  Book: {}", book.title().if_supports_color(Stdout, |t| t.bold()));
    println!(
        "  Chapter {} at {} ({} / {})",
        chapter.number(),
        format_duration(progress.time()),
        format_duration(position),
        format_duration(book.total_time(&db)?),
    );
    if let Some(stamp) = progress.timestamp() {
        println!("  Last played: {}", stamp.if_supports_color(Stdout, |t| t.dimmed()));
    }
    Ok(())
}

//! Library tables and their upgrade path.

use std::path::Path;

use midoku_orm::prelude::*;
use midoku_orm::{Migrator, Step, Upgrade};

table! {
    pub mod blob => "Blob" {
        data: Vec<u8>,
    }
}

table! {
    pub mod book => "Book" {
        title: String,
        author: Option<String>,
        reader: Option<String>,
        cover_blob_id: Option<i64>,
    }
    constraints {
        foreign_key(cover_blob_id) references blob(id);
    }
}

table! {
    pub mod chapter => "Chapter" {
        book_id: i64,
        /// Chapter number, unique within its book.
        chapter: i64,
        /// Playing time in seconds.
        length: i64,
        /// Path of the media file holding this chapter.
        media: String,
        /// Start of this chapter within `media`, in seconds.
        media_offset: Option<i64>,
        /// Chapter index within `media`, for files holding several chapters.
        media_chapter: Option<i64>,
        title: Option<String>,
        cover_blob_id: Option<i64>,
    }
    constraints {
        foreign_key(book_id) references book(id);
        foreign_key(cover_blob_id) references blob(id);
        unique(book_id, chapter);
    }
}

table! {
    pub mod progress => "Progress" {
        book_id: i64,
        chapter_id: i64,
        /// Position within the chapter, in seconds.
        time: i64,
        /// Local time of the last update, ISO-8601.
        timestamp: Option<String>,
    }
    constraints {
        foreign_key(book_id) references book(id);
        foreign_key(chapter_id) references chapter(id);
    }
}

/// Current schema version. Increment when adding migration steps.
pub const CURRENT_VERSION: i64 = 3;

/// Upgrade plan from any earlier schema version.
pub fn migrator() -> Migrator {
    Migrator::new(CURRENT_VERSION)
        .create_table::<blob::table>()
        .create_table::<book::table>()
        .create_table::<chapter::table>()
        .create_table::<progress::table>()
        .step(2, "reading progress", Step::create_table::<progress::table>())
        .step(
            3,
            "chapter media offsets",
            Step::add_column::<chapter::media_offset>(),
        )
}

pub fn upgrade_schema(db: &Database) -> DbResult<Upgrade> {
    let outcome = migrator().upgrade(db)?;
    log::info!("Library database: {outcome}");
    Ok(outcome)
}

/// Open or create a library database at the given path.
pub fn open_library(path: &Path) -> DbResult<Database> {
    let db = Database::open(path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    upgrade_schema(&db)?;
    Ok(db)
}

/// Open an in-memory library with the full schema. Useful for testing.
pub fn open_memory() -> DbResult<Database> {
    let db = Database::open_in_memory()?;
    upgrade_schema(&db)?;
    Ok(db)
}

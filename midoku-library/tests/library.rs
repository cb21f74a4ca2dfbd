use chrono::NaiveDate;
use midoku_library::schema::{self, chapter, progress};
use midoku_library::*;
use midoku_orm::{Database, DbError, Model, Sql, Upgrade, read_version, write_version};

/// A saved book with three chapters of 600, 300 and 900 seconds, inserted
/// out of order.
fn dune(db: &Database) -> (Book, Vec<Chapter>) {
    let mut book = Book::new("Dune", Some("Frank Herbert".into()), None, None);
    book.save(db).unwrap();

    let mut chapters = Vec::new();
    for (number, length) in [(2, 300), (1, 600), (3, 900)] {
        let mut chapter = Chapter::new(&book, number, length, format!("dune-{number}.ogg"));
        chapter.save(db).unwrap();
        chapters.push(chapter);
    }
    chapters.sort_by_key(Chapter::number);
    (book, chapters)
}

fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn table_names(db: &Database) -> Vec<String> {
    db.query(
        &Sql::new("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;"),
        |row| row.get(0),
    )
    .unwrap()
}

fn chapter_columns(db: &Database) -> Vec<String> {
    db.query(&Sql::new("PRAGMA table_info(Chapter);"), |row| row.get(1))
        .unwrap()
}

#[test]
fn memory_library_is_at_current_version() {
    let db = open_memory().unwrap();
    assert_eq!(read_version(&db).unwrap(), CURRENT_VERSION);
    assert_eq!(table_names(&db), vec!["Blob", "Book", "Chapter", "Progress"]);
}

#[test]
fn upgrade_from_first_release() {
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE Blob (id INTEGER PRIMARY KEY, data BLOB NOT NULL);
         CREATE TABLE Book (id INTEGER PRIMARY KEY, title TEXT NOT NULL, author TEXT, reader TEXT,
             cover_blob_id INTEGER, FOREIGN KEY (cover_blob_id) REFERENCES Blob (id));
         CREATE TABLE Chapter (id INTEGER PRIMARY KEY, book_id INTEGER NOT NULL,
             chapter INTEGER NOT NULL, length INTEGER NOT NULL, media TEXT NOT NULL,
             media_chapter INTEGER, title TEXT, cover_blob_id INTEGER,
             FOREIGN KEY (book_id) REFERENCES Book (id),
             FOREIGN KEY (cover_blob_id) REFERENCES Blob (id),
             UNIQUE (book_id, chapter));
         INSERT INTO Book (title) VALUES ('Dune');
         INSERT INTO Chapter (book_id, chapter, length, media) VALUES (1, 1, 600, 'dune.ogg');",
    )
    .unwrap();
    write_version(&db, 1).unwrap();

    let outcome = upgrade_schema(&db).unwrap();
    assert_eq!(
        outcome,
        Upgrade::Migrated {
            from: 1,
            to: 3,
            applied: 2
        }
    );
    assert!(table_names(&db).contains(&"Progress".to_string()));
    assert_eq!(chapter_columns(&db).len(), 9);

    let chapter = Chapter::load(&db, 1).unwrap();
    assert_eq!(chapter.media_offset(), 0);
    assert_eq!(chapter.book(&db).unwrap().title(), "Dune");
}

#[test]
fn upgrade_from_version_two_only_adds_media_offset() {
    let db = Database::open_in_memory().unwrap();
    for table in schema::migrator().tables() {
        db.execute(&table.create_table(false)).unwrap();
    }
    db.execute_batch("ALTER TABLE Chapter DROP COLUMN media_offset;")
        .unwrap();
    write_version(&db, 2).unwrap();

    let outcome = upgrade_schema(&db).unwrap();
    assert_eq!(
        outcome,
        Upgrade::Migrated {
            from: 2,
            to: 3,
            applied: 1
        }
    );
    assert!(chapter_columns(&db).contains(&"media_offset".to_string()));
}

#[test]
fn unknown_future_version_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    write_version(&db, CURRENT_VERSION + 1).unwrap();
    assert!(matches!(
        upgrade_schema(&db),
        Err(DbError::SchemaVersion { found: 4, target: 3 })
    ));
    assert!(table_names(&db).is_empty());
}

#[test]
fn library_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");
    {
        let db = open_library(&path).unwrap();
        dune(&db);
    }
    let db = open_library(&path).unwrap();
    assert_eq!(read_version(&db).unwrap(), CURRENT_VERSION);
    assert_eq!(Book::list(&db).unwrap().len(), 1);
}

#[test]
fn chapters_are_ordered_by_number() {
    let db = open_memory().unwrap();
    let (book, _) = dune(&db);
    let numbers: Vec<i64> = book
        .chapters(&db)
        .unwrap()
        .iter()
        .map(Chapter::number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(book.chapter_count(&db).unwrap(), 3);
    assert_eq!(book.total_time(&db).unwrap(), 1800);
}

#[test]
fn first_chapter_uses_lowest_number() {
    let db = open_memory().unwrap();
    let (book, chapters) = dune(&db);
    let first = book.first_chapter(&db).unwrap();
    assert_eq!(first.number(), 1);
    assert_eq!(first.id(), chapters[0].id());
}

#[test]
fn chapter_at_walks_chapter_lengths() {
    let db = open_memory().unwrap();
    let (book, _) = dune(&db);

    let (chapter, offset) = book.chapter_at(&db, 0).unwrap();
    assert_eq!((chapter.number(), offset), (1, 0));

    let (chapter, offset) = book.chapter_at(&db, 650).unwrap();
    assert_eq!((chapter.number(), offset), (2, 50));

    let (chapter, offset) = book.chapter_at(&db, 1799).unwrap();
    assert_eq!((chapter.number(), offset), (3, 899));

    assert!(matches!(
        book.chapter_at(&db, 1800),
        Err(LibraryError::PastEnd { time: 1800 })
    ));
}

#[test]
fn neighbouring_chapters_and_offsets() {
    let db = open_memory().unwrap();
    let (_, chapters) = dune(&db);

    let middle = &chapters[1];
    assert_eq!(middle.next_chapter(&db).unwrap().unwrap().number(), 3);
    assert_eq!(middle.previous_chapter(&db).unwrap().unwrap().number(), 1);
    assert!(chapters[0].previous_chapter(&db).unwrap().is_none());
    assert!(chapters[2].next_chapter(&db).unwrap().is_none());

    assert_eq!(chapters[0].total_offset(&db).unwrap(), 0);
    assert_eq!(chapters[1].total_offset(&db).unwrap(), 600);
    assert_eq!(chapters[2].total_offset(&db).unwrap(), 900);
}

#[test]
fn empty_book() {
    let db = open_memory().unwrap();
    let mut book = Book::new("Untitled", None, None, None);
    book.save(&db).unwrap();
    let id = book.id().unwrap();

    assert_eq!(book.chapter_count(&db).unwrap(), 0);
    assert_eq!(book.total_time(&db).unwrap(), 0);
    assert!(matches!(
        book.first_chapter(&db),
        Err(LibraryError::NoChapters { book_id }) if book_id == id
    ));
    assert!(matches!(
        book.progress(&db),
        Err(LibraryError::NoChapters { .. })
    ));
    assert!(matches!(
        book.chapter_at(&db, 0),
        Err(LibraryError::PastEnd { time: 0 })
    ));
}

#[test]
fn chapter_numbers_are_unique_per_book() {
    let db = open_memory().unwrap();
    let (book, _) = dune(&db);
    let mut duplicate = Chapter::new(&book, 2, 10, "extra.ogg");
    assert!(matches!(duplicate.save(&db), Err(DbError::Driver(_))));
    assert_eq!(duplicate.id(), None);
}

#[test]
fn chapters_require_an_existing_book() {
    let db = open_memory().unwrap();
    let unsaved = Book::new("Nowhere", None, None, None);
    let mut orphan = Chapter::new(&unsaved, 1, 10, "orphan.ogg");
    assert!(orphan.save(&db).is_err());
}

#[test]
fn cover_art() {
    let db = open_memory().unwrap();
    let mut cover = Blob::new(b"\x89PNG\r\n\x1a\nrest-of-image".to_vec());
    cover.save(&db).unwrap();
    assert!(cover.is_png());

    let mut book = Book::new("Dune", None, None, Some(&cover));
    book.save(&db).unwrap();
    let loaded = book.cover(&db).unwrap().unwrap();
    assert_eq!(loaded.data(), cover.data());

    book.set_cover(None);
    book.save(&db).unwrap();
    assert!(Book::load(&db, book.id().unwrap()).unwrap().cover(&db).unwrap().is_none());
}

#[test]
fn progress_starts_at_first_chapter() {
    let db = open_memory().unwrap();
    let (book, chapters) = dune(&db);

    let progress = book.progress(&db).unwrap();
    assert_eq!(progress.id(), None);
    assert_eq!(progress.chapter_id(), chapters[0].id().unwrap());
    assert_eq!(progress.book_id(), book.id().unwrap());
    assert_eq!(progress.time(), 0);
    assert!(progress.timestamp_date().unwrap().is_some());
    assert!(book.most_recent_progress(&db).unwrap().is_none());
}

#[test]
fn progress_updates_are_saved() {
    let db = open_memory().unwrap();
    let (book, chapters) = dune(&db);

    let mut progress = book.progress(&db).unwrap();
    progress.update_time(&db, 42).unwrap();
    let id = progress.id().unwrap();
    assert_eq!(Progress::load(&db, id).unwrap().time(), 42);

    progress.update_chapter(&db, &chapters[1]).unwrap();
    let saved = Progress::load(&db, id).unwrap();
    assert_eq!(saved.chapter_id(), chapters[1].id().unwrap());
    assert_eq!(saved.time(), 0);

    progress.update(&db, &chapters[2], 120).unwrap();
    let saved = book.progress(&db).unwrap();
    assert_eq!(saved.id(), Some(id));
    assert_eq!(saved.chapter(&db).unwrap().number(), 3);
    assert_eq!(saved.time(), 120);
    assert_eq!(saved.book(&db).unwrap().title(), "Dune");
}

#[test]
fn most_recent_progress_follows_timestamps() {
    let db = open_memory().unwrap();
    let (dune_book, dune_chapters) = dune(&db);
    let mut emma = Book::new("Emma", Some("Jane Austen".into()), None, None);
    emma.save(&db).unwrap();
    let mut emma_chapter = Chapter::new(&emma, 1, 1000, "emma.ogg");
    emma_chapter.save(&db).unwrap();

    Progress::new(&dune_chapters[0], 10, at(9, 0)).save(&db).unwrap();
    Progress::new(&dune_chapters[1], 20, at(11, 0)).save(&db).unwrap();
    Progress::new(&dune_chapters[2], 30, at(10, 0)).save(&db).unwrap();
    Progress::new(&emma_chapter, 5, at(12, 30)).save(&db).unwrap();

    let latest = Progress::find_most_recent_for_book(&db, &dune_book)
        .unwrap()
        .unwrap();
    assert_eq!(latest.time(), 20);
    assert_eq!(latest.timestamp(), Some("2024-03-01T11:00:00"));
    assert_eq!(latest.timestamp_date().unwrap(), Some(at(11, 0)));

    let overall = Progress::find_most_recent(&db).unwrap().unwrap();
    assert_eq!(overall.book_id(), emma.id().unwrap());
    assert_eq!(dune_book.progress(&db).unwrap().time(), 20);
}

#[test]
fn malformed_timestamp_is_reported() {
    let db = open_memory().unwrap();
    let (_, chapters) = dune(&db);
    let mut progress = Progress::new(&chapters[0], 0, at(8, 0));
    progress.set(progress::timestamp, Some("yesterday".to_string()));
    assert!(matches!(
        progress.timestamp_date(),
        Err(LibraryError::Timestamp(_))
    ));
}

#[test]
fn chapter_metadata_columns() {
    let db = open_memory().unwrap();
    let (book, _) = dune(&db);
    let mut chapter = Chapter::new(&book, 4, 60, "appendix.m4b");
    chapter.set(chapter::title, Some("Appendix".to_string()));
    chapter.set(chapter::media_offset, Some(3600_i64));
    chapter.set(chapter::media_chapter, Some(7_i64));
    let id = chapter.save(&db).unwrap();

    let loaded = Chapter::load(&db, id).unwrap();
    assert_eq!(loaded.title(), Some("Appendix"));
    assert_eq!(loaded.media(), "appendix.m4b");
    assert_eq!(loaded.media_offset(), 3600);
    assert_eq!(*loaded.get(chapter::media_chapter), Some(7));
}

use chrono::{Local, NaiveDateTime};
use midoku_orm::prelude::*;

use crate::book::Book;
use crate::chapter::Chapter;
use crate::error::LibraryResult;
use crate::schema::progress;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

record! {
    /// Listening position within a book.
    Progress => progress
}

impl Progress {
    pub fn new(chapter: &Chapter, time: i64, when: NaiveDateTime) -> Self {
        Self::create(progress::Row {
            id: None,
            book_id: chapter.book_id(),
            chapter_id: chapter.id().unwrap_or(-1),
            time,
            timestamp: Some(when.format(TIMESTAMP_FORMAT).to_string()),
        })
    }

    pub fn book_id(&self) -> i64 {
        *self.get(progress::book_id)
    }

    pub fn chapter_id(&self) -> i64 {
        *self.get(progress::chapter_id)
    }

    /// Seconds into the current chapter.
    pub fn time(&self) -> i64 {
        *self.get(progress::time)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get(progress::timestamp).as_deref()
    }

    pub fn timestamp_date(&self) -> LibraryResult<Option<NaiveDateTime>> {
        match self.timestamp() {
            Some(stamp) => Ok(Some(stamp.parse()?)),
            None => Ok(None),
        }
    }

    pub fn book(&self, db: &Database) -> LibraryResult<Book> {
        Ok(Book::load(db, self.book_id())?)
    }

    pub fn chapter(&self, db: &Database) -> LibraryResult<Chapter> {
        Ok(Chapter::load(db, self.chapter_id())?)
    }

    /// Move within the current chapter.
    pub fn update_time(&mut self, db: &Database, time: i64) -> LibraryResult<()> {
        self.set(progress::time, time);
        self.touch_and_save(db)
    }

    /// Jump to the start of `chapter`.
    pub fn update_chapter(&mut self, db: &Database, chapter: &Chapter) -> LibraryResult<()> {
        self.update(db, chapter, 0)
    }

    pub fn update(&mut self, db: &Database, chapter: &Chapter, time: i64) -> LibraryResult<()> {
        self.set(progress::chapter_id, chapter.id().unwrap_or(-1));
        self.set(progress::time, time);
        self.touch_and_save(db)
    }

    fn touch_and_save(&mut self, db: &Database) -> LibraryResult<()> {
        self.set(
            progress::timestamp,
            Some(now().format(TIMESTAMP_FORMAT).to_string()),
        );
        self.save(db)?;
        Ok(())
    }

    pub fn find_most_recent_for_book(db: &Database, book: &Book) -> LibraryResult<Option<Progress>> {
        let query = select(progress::table)
            .filter(progress::book_id.eq(book.id().unwrap_or(-1)))
            .order_by_desc(datetime(progress::timestamp))
            .limit(1);
        Ok(Progress::fetch_optional(db, &query)?)
    }

    pub fn find_most_recent(db: &Database) -> LibraryResult<Option<Progress>> {
        let query = select(progress::table)
            .order_by_desc(datetime(progress::timestamp))
            .limit(1);
        Ok(Progress::fetch_optional(db, &query)?)
    }

    /// The most recent progress for `book`, or a new, unsaved progress at
    /// the start of its first chapter.
    pub fn for_book(db: &Database, book: &Book) -> LibraryResult<Progress> {
        match Self::find_most_recent_for_book(db, book)? {
            Some(progress) => Ok(progress),
            None => {
                let first = book.first_chapter(db)?;
                log::debug!(
                    "No progress for book {:?}, starting at chapter {}",
                    book.id(),
                    first.number()
                );
                Ok(Progress::new(&first, 0, now()))
            }
        }
    }
}

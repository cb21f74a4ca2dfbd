use midoku_orm::prelude::*;

use crate::blob::Blob;
use crate::chapter::Chapter;
use crate::error::{LibraryError, LibraryResult};
use crate::progress::Progress;
use crate::schema::{book, chapter};

record! {
    /// An audiobook: metadata plus an ordered list of chapters.
    Book => book
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: Option<String>,
        reader: Option<String>,
        cover: Option<&Blob>,
    ) -> Self {
        Self::create(book::Row {
            id: None,
            title: title.into(),
            author,
            reader,
            cover_blob_id: cover.and_then(Blob::id),
        })
    }

    /// Primary key, or -1 for a book that was never saved.
    fn key(&self) -> i64 {
        self.id().unwrap_or(-1)
    }

    pub fn title(&self) -> &str {
        self.get(book::title)
    }

    pub fn author(&self) -> Option<&str> {
        self.get(book::author).as_deref()
    }

    pub fn reader(&self) -> Option<&str> {
        self.get(book::reader).as_deref()
    }

    /// All chapters, by chapter number.
    pub fn chapters(&self, db: &Database) -> LibraryResult<Vec<Chapter>> {
        let query = select(chapter::table)
            .filter(chapter::book_id.eq(self.key()))
            .order_by(chapter::chapter);
        Ok(Chapter::fetch(db, &query)?)
    }

    pub fn chapter_count(&self, db: &Database) -> LibraryResult<i64> {
        let query = select(project(chapter::table, (count(),)))
            .filter(chapter::book_id.eq(self.key()));
        Ok(db.query_scalar(&query.sql_query())?.unwrap_or(0))
    }

    /// Total playing time in seconds. A book without chapters has none.
    pub fn total_time(&self, db: &Database) -> LibraryResult<i64> {
        let query = select(project(chapter::table, (sum(chapter::length),)))
            .filter(chapter::book_id.eq(self.key()));
        let total: Option<Option<i64>> = db.query_scalar(&query.sql_query())?;
        Ok(total.flatten().unwrap_or(0))
    }

    /// The chapter with the lowest number.
    pub fn first_chapter(&self, db: &Database) -> LibraryResult<Chapter> {
        let lowest = select(project(chapter::table, (min(chapter::chapter),)))
            .filter(chapter::book_id.eq(self.key()));
        Chapter::select_one(
            db,
            chapter::book_id
                .eq(self.key())
                .and(chapter::chapter.eq(lowest)),
        )?
        .ok_or(LibraryError::NoChapters {
            book_id: self.key(),
        })
    }

    /// The chapter playing at `time` seconds into the book, and the offset
    /// into that chapter.
    pub fn chapter_at(&self, db: &Database, time: i64) -> LibraryResult<(Chapter, i64)> {
        let mut offset = time;
        for chapter in self.chapters(db)? {
            let length = chapter.length();
            if offset < length {
                return Ok((chapter, offset));
            }
            offset -= length;
        }
        Err(LibraryError::PastEnd { time })
    }

    pub fn cover(&self, db: &Database) -> LibraryResult<Option<Blob>> {
        match *self.get(book::cover_blob_id) {
            Some(id) => Ok(Some(Blob::load(db, id)?)),
            None => Ok(None),
        }
    }

    pub fn set_cover(&mut self, cover: Option<&Blob>) {
        self.set(book::cover_blob_id, cover.and_then(Blob::id));
    }

    pub fn most_recent_progress(&self, db: &Database) -> LibraryResult<Option<Progress>> {
        Progress::find_most_recent_for_book(db, self)
    }

    /// Where to resume: the most recent progress, or the start of the book.
    pub fn progress(&self, db: &Database) -> LibraryResult<Progress> {
        Progress::for_book(db, self)
    }
}

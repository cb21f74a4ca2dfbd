use midoku_orm::prelude::*;

use crate::book::Book;
use crate::error::LibraryResult;
use crate::schema::chapter;

record! {
    /// A numbered section of a book, backed by (part of) a media file.
    Chapter => chapter
}

impl Chapter {
    /// A chapter of `book` spanning a whole media file.
    pub fn new(book: &Book, number: i64, length: i64, media: impl Into<String>) -> Self {
        Self::create(chapter::Row {
            id: None,
            book_id: book.id().unwrap_or(-1),
            chapter: number,
            length,
            media: media.into(),
            media_offset: None,
            media_chapter: None,
            title: None,
            cover_blob_id: None,
        })
    }

    pub fn book_id(&self) -> i64 {
        *self.get(chapter::book_id)
    }

    pub fn number(&self) -> i64 {
        *self.get(chapter::chapter)
    }

    pub fn length(&self) -> i64 {
        *self.get(chapter::length)
    }

    pub fn media(&self) -> &str {
        self.get(chapter::media)
    }

    pub fn media_offset(&self) -> i64 {
        self.get(chapter::media_offset).unwrap_or(0)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(chapter::title).as_deref()
    }

    pub fn book(&self, db: &Database) -> LibraryResult<Book> {
        Ok(Book::load(db, self.book_id())?)
    }

    pub fn next_chapter(&self, db: &Database) -> LibraryResult<Option<Chapter>> {
        self.sibling(db, self.number() + 1)
    }

    pub fn previous_chapter(&self, db: &Database) -> LibraryResult<Option<Chapter>> {
        self.sibling(db, self.number() - 1)
    }

    fn sibling(&self, db: &Database, number: i64) -> LibraryResult<Option<Chapter>> {
        let filter = chapter::book_id
            .eq(self.book_id())
            .and(chapter::chapter.eq(number));
        Ok(Chapter::select_one(db, filter)?)
    }

    /// Seconds into the book at which this chapter starts.
    pub fn total_offset(&self, db: &Database) -> LibraryResult<i64> {
        let query = select(project(chapter::table, (sum(chapter::length),))).filter(
            chapter::book_id
                .eq(self.book_id())
                .and(chapter::chapter.lt(self.number())),
        );
        let offset: Option<Option<i64>> = db.query_scalar(&query.sql_query())?;
        Ok(offset.flatten().unwrap_or(0))
    }
}

use midoku_orm::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Timestamp {time} is past the end of the book")]
    PastEnd { time: i64 },

    #[error("Book {book_id} has no chapters")]
    NoChapters { book_id: i64 },

    #[error("Invalid progress timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

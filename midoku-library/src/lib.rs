//! Audiobook library persisted in SQLite.
//!
//! Books are split into chapters, each backed by a media file; listening
//! progress is recorded per book. Cover art lives in blobs shared between
//! books and chapters.

/// Declare a record type stored in one of the [`schema`] tables.
macro_rules! record {
    ($(#[$meta:meta])* $name:ident => $table:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name(midoku_orm::RowStorage<$crate::schema::$table::table>);

        impl midoku_orm::Model for $name {
            type Table = $crate::schema::$table::table;

            fn from_storage(storage: midoku_orm::RowStorage<Self::Table>) -> Self {
                Self(storage)
            }

            fn storage(&self) -> &midoku_orm::RowStorage<Self::Table> {
                &self.0
            }

            fn storage_mut(&mut self) -> &mut midoku_orm::RowStorage<Self::Table> {
                &mut self.0
            }
        }
    };
}

pub mod blob;
pub mod book;
pub mod chapter;
pub mod error;
pub mod progress;
pub mod schema;

pub use blob::Blob;
pub use book::Book;
pub use chapter::Chapter;
pub use error::{LibraryError, LibraryResult};
pub use progress::Progress;
pub use schema::{CURRENT_VERSION, open_library, open_memory, upgrade_schema};

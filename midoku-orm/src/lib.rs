//! Typed relational mapping over SQLite.
//!
//! Tables are declared once with [`table!`]; their columns then serve as
//! typed expressions for the query builder, and records implementing
//! [`Model`] load and save themselves with dirty-tracked upserts.
//! [`Migrator`] creates and upgrades the schema, keyed on SQLite's
//! `user_version`.

#[macro_use]
mod macros;

pub mod database;
pub mod error;
pub mod expr;
pub mod migrate;
pub mod model;
pub mod query;
pub mod row;
pub mod schema;
pub mod sql;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use expr::{AsExpression, BoolExpressionMethods, Expression, ExpressionMethods};
pub use migrate::{Migration, Migrator, Step, Upgrade, read_version, write_version};
pub use model::Model;
pub use query::{Select, project, select};
pub use row::{RowStorage, TableRow};
pub use schema::{Column, ColumnInfo, KeyedTable, Table, TableConstraint, TableSchema};
pub use sql::{Nullable, Sql, SqlType};

#[doc(hidden)]
pub use rusqlite;

/// Everything needed to declare tables and query them.
pub mod prelude {
    pub use crate::expr::{
        BoolExpressionMethods, ExpressionMethods, count, datetime, max, min, sum,
    };
    pub use crate::model::Model;
    pub use crate::query::{project, select};
    pub use crate::schema::{Column, KeyedTable, Table};
    pub use crate::{Database, DbError, DbResult, table};
}

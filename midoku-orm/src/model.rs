//! Records backed by a single table row.

use rusqlite::types::Value;

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::expr::{Expression, ExpressionMethods, count};
use crate::query::{Constraint, Select, Where, project, select};
use crate::row::{RowStorage, TableRow};
use crate::schema::{Column, KeyedTable, Table};
use crate::sql::Sql;
use crate::sql::kind::Bool;

type RowOf<M> = <<M as Model>::Table as Table>::Row;

fn primary_key<T: KeyedTable>() -> T::PrimaryKey {
    T::PrimaryKey::default()
}

/// A typed record stored in [`Model::Table`].
///
/// Implementors only provide access to their [`RowStorage`]; loading,
/// querying and saving come with the trait. Every operation takes the
/// database handle explicitly.
///
/// A record's lifecycle is `new (all dirty) -> saved (clean) -> modified
/// (some dirty) -> saved`. Only a save the driver reports as successful
/// moves a record back to clean.
pub trait Model: Sized {
    type Table: KeyedTable;

    fn from_storage(storage: RowStorage<Self::Table>) -> Self;

    fn storage(&self) -> &RowStorage<Self::Table>;

    fn storage_mut(&mut self) -> &mut RowStorage<Self::Table>;

    /// A record that has not been saved yet.
    fn create(row: RowOf<Self>) -> Self {
        Self::from_storage(RowStorage::new(row))
    }

    /// Primary key, or `None` until the record is first saved.
    fn id(&self) -> Option<i64> {
        *self.storage().get(primary_key::<Self::Table>())
    }

    fn get<C: Column<Table = Self::Table>>(&self, column: C) -> &C::Value {
        self.storage().get(column)
    }

    fn set<C: Column<Table = Self::Table>>(&mut self, column: C, value: impl Into<C::Value>) {
        self.storage_mut().set(column, value);
    }

    fn is_dirty<C: Column<Table = Self::Table>>(&self, column: C) -> bool {
        self.storage().is_dirty(column)
    }

    fn row(&self) -> &RowOf<Self> {
        self.storage().row()
    }

    /// Load the record with the given primary key.
    fn load(db: &Database, id: i64) -> DbResult<Self> {
        let query = select(Self::Table::default()).filter(primary_key::<Self::Table>().eq(id));
        Self::fetch_optional(db, &query)?.ok_or(DbError::NotFound {
            table: <Self::Table as Table>::NAME,
            id,
        })
    }

    /// Every record of the table.
    fn list(db: &Database) -> DbResult<Vec<Self>> {
        Self::fetch(db, &select(Self::Table::default()))
    }

    /// Every record matching `filter`.
    fn select<E: Expression<Kind = Bool>>(db: &Database, filter: E) -> DbResult<Vec<Self>> {
        Self::fetch(db, &select(Self::Table::default()).filter(filter))
    }

    /// The first record matching `filter`. No match is not an error.
    fn select_one<E: Expression<Kind = Bool>>(db: &Database, filter: E) -> DbResult<Option<Self>> {
        Self::fetch_optional(db, &select(Self::Table::default()).filter(filter).limit(1))
    }

    /// Run a select over the full table and wrap each row as a clean record.
    fn fetch<W, O, L>(db: &Database, query: &Select<Self::Table, W, O, L>) -> DbResult<Vec<Self>>
    where
        W: Constraint,
        O: Constraint,
        L: Constraint,
    {
        db.query(&query.sql_query(), |row| {
            <RowOf<Self> as TableRow>::from_row(row)
                .map(|row| Self::from_storage(RowStorage::loaded(row)))
        })
    }

    /// Like [`fetch`](Model::fetch), keeping only the first row.
    fn fetch_optional<W, O, L>(
        db: &Database,
        query: &Select<Self::Table, W, O, L>,
    ) -> DbResult<Option<Self>>
    where
        W: Constraint,
        O: Constraint,
        L: Constraint,
    {
        db.query_optional(&query.sql_query(), |row| {
            <RowOf<Self> as TableRow>::from_row(row)
                .map(|row| Self::from_storage(RowStorage::loaded(row)))
        })
    }

    /// Whether a row with this primary key exists. Negative keys never do.
    fn exists(db: &Database, id: i64) -> DbResult<bool> {
        if id < 0 {
            return Ok(false);
        }
        let query = select(project(Self::Table::default(), (count(),)))
            .filter(primary_key::<Self::Table>().eq(id));
        let found: Option<i64> = db.query_scalar(&query.sql_query())?;
        Ok(found.unwrap_or(0) > 0)
    }

    /// Delete the row with this primary key.
    fn remove(db: &Database, id: i64) -> DbResult<()> {
        let mut sql = Sql::new(format!("DELETE FROM {} ", <Self::Table as Table>::NAME));
        sql.append(Where(primary_key::<Self::Table>().eq(id)).to_sql());
        sql.push_str(";");
        match db.execute(&sql)? {
            0 => Err(DbError::NotFound {
                table: <Self::Table as Table>::NAME,
                id,
            }),
            _ => Ok(()),
        }
    }

    /// Delete this record's row. An unsaved record is reported as not found.
    fn delete(self, db: &Database) -> DbResult<()> {
        Self::remove(db, self.id().unwrap_or(-1))
    }

    /// Persist the record and return its primary key.
    ///
    /// Without a primary key (unset or negative) this is a plain `INSERT`
    /// (the key is bound as `NULL`) and the key assigned by SQLite is stored
    /// back into the record. With one, the `INSERT` carries an `ON CONFLICT`
    /// clause that updates exactly the dirty columns, in declaration order.
    /// The primary key itself is never part of the update set: changing the
    /// key of a stored record fails with [`DbError::PrimaryKeyChanged`].
    ///
    /// On failure the record is left untouched, dirty bits included.
    fn save(&mut self, db: &Database) -> DbResult<i64> {
        let columns = <Self::Table as Table>::COLUMNS;
        let key = <<Self::Table as KeyedTable>::PrimaryKey as Column>::INDEX;
        let key_name = <<Self::Table as KeyedTable>::PrimaryKey as Column>::name();
        let id = self.id().filter(|id| *id >= 0);

        if self.storage().is_persisted() && self.storage().dirty()[key] {
            return Err(DbError::PrimaryKeyChanged {
                table: <Self::Table as Table>::NAME,
                id: self.id().unwrap_or(-1),
            });
        }

        let mut values = self.storage().row().values();
        if id.is_none() {
            values[key] = Value::Null;
        }

        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let mut sql = Sql::with_binds(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                <Self::Table as Table>::NAME,
                names.join(", "),
                placeholders
            ),
            values.clone(),
        );

        if id.is_some() {
            let updates: Vec<usize> = self
                .storage()
                .dirty_indices()
                .filter(|index| *index != key)
                .collect();
            log::trace!(
                "Saving {} {}: dirty columns {:?}",
                <Self::Table as Table>::NAME,
                id.unwrap_or_default(),
                updates.iter().map(|i| columns[*i].name).collect::<Vec<_>>()
            );
            if updates.is_empty() {
                sql.push_str(&format!(" ON CONFLICT({key_name}) DO NOTHING"));
            } else {
                sql.push_str(&format!(" ON CONFLICT({key_name}) DO UPDATE SET "));
                sql.append(Sql::join(
                    ", ",
                    updates.iter().map(|&i| {
                        Sql::with_binds(format!("{} = ?", columns[i].name), vec![values[i].clone()])
                    }),
                ));
            }
        }
        sql.push_str(";");

        db.execute(&sql)?;

        let id = match id {
            Some(id) => id,
            None => {
                let id = db.last_insert_id();
                self.storage_mut().set(primary_key::<Self::Table>(), Some(id));
                id
            }
        };
        self.storage_mut().mark_saved();
        Ok(id)
    }
}

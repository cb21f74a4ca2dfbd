//! In-memory storage for one row plus its dirty bits.

use std::fmt;

use rusqlite::types::Value;

use crate::schema::{Column, ColumnInfo, Table};

/// The row struct of a table: one field per column, in declaration order.
pub trait TableRow: Sized + Clone + fmt::Debug {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Column values in declaration order.
    fn values(&self) -> Vec<Value>;
}

type Observer = Box<dyn FnMut(&'static ColumnInfo)>;

/// One row of `T` together with a dirty bit per column.
///
/// Freshly constructed rows start all-dirty, rows read back from the database
/// start clean and persisted. Every typed [`set`](RowStorage::set) marks its
/// column dirty (even when the value is unchanged) and notifies the
/// subscribed observers.
pub struct RowStorage<T: Table> {
    row: T::Row,
    dirty: Vec<bool>,
    persisted: bool,
    observers: Vec<Observer>,
}

impl<T: Table> RowStorage<T> {
    /// A record that has never been saved.
    pub fn new(row: T::Row) -> Self {
        Self::with_state(row, false)
    }

    /// A record just read from the database.
    pub fn loaded(row: T::Row) -> Self {
        Self::with_state(row, true)
    }

    fn with_state(row: T::Row, persisted: bool) -> Self {
        Self {
            row,
            dirty: vec![!persisted; T::COLUMNS.len()],
            persisted,
            observers: Vec::new(),
        }
    }

    pub fn get<C: Column<Table = T>>(&self, _column: C) -> &C::Value {
        C::value(&self.row)
    }

    pub fn set<C: Column<Table = T>>(&mut self, _column: C, value: impl Into<C::Value>) {
        *C::value_mut(&mut self.row) = value.into();
        self.dirty[C::INDEX] = true;
        let info = C::info();
        for observer in &mut self.observers {
            observer(info);
        }
    }

    /// Register a callback invoked with the column of every `set`.
    pub fn subscribe(&mut self, observer: impl FnMut(&'static ColumnInfo) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn is_dirty<C: Column<Table = T>>(&self, _column: C) -> bool {
        self.dirty[C::INDEX]
    }

    pub fn dirty(&self) -> &[bool] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty.iter().any(|d| *d)
    }

    /// Indices of the dirty columns, in declaration order.
    pub fn dirty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.then_some(i))
    }

    pub fn reset_dirty(&mut self) {
        self.dirty.fill(false);
    }

    /// Whether this row was read from, or written to, the database.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Record a successful write: clean and persisted.
    pub fn mark_saved(&mut self) {
        self.reset_dirty();
        self.persisted = true;
    }

    pub fn row(&self) -> &T::Row {
        &self.row
    }

    pub fn into_row(self) -> T::Row {
        self.row
    }
}

impl<T: Table> fmt::Debug for RowStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStorage")
            .field("table", &T::NAME)
            .field("row", &self.row)
            .field("dirty", &self.dirty)
            .field("persisted", &self.persisted)
            .field("observers", &self.observers.len())
            .finish()
    }
}

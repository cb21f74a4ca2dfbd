//! Table and column definitions, and their projection into DDL.
//!
//! Tables and columns are zero-sized marker types (usually declared with
//! [`table!`](crate::table)); everything here is static metadata and never
//! touches a connection.

use std::fmt;

use crate::expr::Expression;
use crate::row::TableRow;
use crate::sql::kind::Integer;
use crate::sql::{Sql, SqlType};

/// Column-level constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    Unique,
}

impl ColumnConstraint {
    pub fn sql(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::Unique => "UNIQUE",
        }
    }
}

/// Static description of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub constraints: &'static [ColumnConstraint],
}

impl ColumnInfo {
    pub const fn new<V: SqlType>(
        name: &'static str,
        constraints: &'static [ColumnConstraint],
    ) -> Self {
        Self {
            name,
            sql_type: V::SQL_NAME,
            nullable: V::NULLABLE,
            constraints,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::PrimaryKey)
    }

    /// Column definition for `CREATE TABLE`: `name TYPE [NOT NULL] [constraints...]`.
    pub fn ddl(&self) -> String {
        let mut parts = vec![self.name, self.sql_type];
        if !self.nullable {
            parts.push("NOT NULL");
        }
        parts.extend(self.constraints.iter().map(|c| c.sql()));
        parts.join(" ")
    }
}

/// A database table.
pub trait Table: Copy + Default + fmt::Debug + 'static {
    type Row: TableRow;

    const NAME: &'static str;

    /// Columns in declaration order. Never empty.
    const COLUMNS: &'static [ColumnInfo];

    fn constraints() -> Vec<TableConstraint> {
        Vec::new()
    }

    fn schema() -> TableSchema {
        TableSchema::of::<Self>()
    }
}

/// A table with a single integer primary key, assigned by SQLite when a row
/// is inserted without one.
pub trait KeyedTable: Table {
    type PrimaryKey: Column<Table = Self, Value = Option<i64>> + Expression<Kind = Integer>;
}

/// A column of [`Self::Table`]. Every column is also an expression.
pub trait Column: Expression + Copy + Default + fmt::Debug + 'static {
    type Table: Table;
    type Value: SqlType;

    /// Position in [`Table::COLUMNS`] and in the table's row.
    const INDEX: usize;

    fn value(row: &<Self::Table as Table>::Row) -> &Self::Value;

    fn value_mut(row: &mut <Self::Table as Table>::Row) -> &mut Self::Value;

    fn info() -> &'static ColumnInfo {
        &<Self::Table as Table>::COLUMNS[Self::INDEX]
    }

    fn name() -> &'static str {
        Self::info().name
    }
}

/// One or more columns of the same table, named as a tuple of column types.
///
/// `Kinds` is the tuple of the columns' value kinds, so two lists with the
/// same `Kinds` have the same arity and pairwise compatible types.
pub trait ColumnList {
    type Table: Table;
    type Kinds;

    fn names() -> Vec<&'static str>;
}

macro_rules! impl_column_list {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: Column $(, $rest: Column<Table = $first::Table>)*> ColumnList for ($first, $($rest,)*) {
            type Table = $first::Table;
            type Kinds = ($first::Kind, $($rest::Kind,)*);

            fn names() -> Vec<&'static str> {
                vec![$first::name() $(, $rest::name())*]
            }
        }
    };
}

impl_column_list!(A);
impl_column_list!(A, B);
impl_column_list!(A, B, C);
impl_column_list!(A, B, C, D);

/// Table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey(Vec<&'static str>),
    Unique(Vec<&'static str>),
    ForeignKey {
        columns: Vec<&'static str>,
        table: &'static str,
        references: Vec<&'static str>,
    },
}

impl TableConstraint {
    pub fn primary_key<C: ColumnList>() -> Self {
        TableConstraint::PrimaryKey(C::names())
    }

    pub fn unique<C: ColumnList>() -> Self {
        TableConstraint::Unique(C::names())
    }

    /// `FOREIGN KEY (C...) REFERENCES R::Table (R...)`. Both lists must
    /// have the same arity and kinds.
    pub fn foreign_key<C, R>() -> Self
    where
        C: ColumnList,
        R: ColumnList<Kinds = C::Kinds>,
    {
        TableConstraint::ForeignKey {
            columns: C::names(),
            table: <R::Table as Table>::NAME,
            references: R::names(),
        }
    }

    /// The table a foreign key points at, if this is one.
    pub fn referenced_table(&self) -> Option<&'static str> {
        match self {
            TableConstraint::ForeignKey { table, .. } => Some(table),
            _ => None,
        }
    }

    pub fn ddl(&self) -> String {
        match self {
            TableConstraint::PrimaryKey(columns) => {
                format!("PRIMARY KEY ({})", columns.join(", "))
            }
            TableConstraint::Unique(columns) => format!("UNIQUE ({})", columns.join(", ")),
            TableConstraint::ForeignKey {
                columns,
                table,
                references,
            } => format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                columns.join(", "),
                table,
                references.join(", ")
            ),
        }
    }
}

/// Shorthand for [`Table::schema`].
pub fn schema<T: Table>() -> TableSchema {
    T::schema()
}

/// Runtime projection of a [`Table`] used for statement generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnInfo],
    pub constraints: Vec<TableConstraint>,
}

impl TableSchema {
    pub fn of<T: Table>() -> Self {
        Self {
            name: T::NAME,
            columns: T::COLUMNS,
            constraints: T::constraints(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn columns_ddl(&self) -> String {
        self.columns
            .iter()
            .map(ColumnInfo::ddl)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn constraints_ddl(&self) -> String {
        self.constraints
            .iter()
            .map(TableConstraint::ddl)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Tables referenced by this table's foreign keys.
    pub fn references(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constraints
            .iter()
            .filter_map(TableConstraint::referenced_table)
    }

    /// `CREATE TABLE [IF NOT EXISTS] name (columns, constraints);`
    pub fn create_table(&self, if_not_exists: bool) -> Sql {
        let mut body = self.columns_ddl();
        let constraints = self.constraints_ddl();
        if !constraints.is_empty() {
            body.push_str(", ");
            body.push_str(&constraints);
        }
        Sql::new(format!(
            "CREATE TABLE{} {} ({});",
            if if_not_exists { " IF NOT EXISTS" } else { "" },
            self.name,
            body
        ))
    }

    /// `ALTER TABLE name ADD COLUMN <column ddl>;`
    ///
    /// SQLite refuses a `NOT NULL` column here once the table has rows; see
    /// [`Step::add_column`](crate::migrate::Step::add_column).
    pub fn add_column(&self, column: &ColumnInfo) -> Sql {
        Sql::new(format!(
            "ALTER TABLE {} ADD COLUMN {};",
            self.name,
            column.ddl()
        ))
    }
}

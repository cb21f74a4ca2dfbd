//! Versioned schema upgrades.
//!
//! The schema version lives in SQLite's `PRAGMA user_version` slot. A
//! database at version 0 gets every table created from scratch; an older
//! version gets the steps above it applied in order; a newer version is
//! rejected without touching the schema.

use std::fmt;

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::schema::{Column, ColumnInfo, Table, TableSchema};
use crate::sql::{Nullable, Sql};

/// Read the persisted schema version. A new database reads as 0.
pub fn read_version(db: &Database) -> DbResult<i64> {
    let version = db.query_optional(&Sql::new("PRAGMA user_version;"), |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

pub fn write_version(db: &Database, version: i64) -> DbResult<()> {
    db.execute_batch(&format!("PRAGMA user_version = {version};"))
}

/// A single schema change.
#[derive(Debug, Clone)]
pub enum Step {
    CreateTable(TableSchema),
    /// Skipped when the column already exists. Built with
    /// [`Step::add_column`], which only accepts nullable columns.
    AddColumn {
        table: TableSchema,
        column: &'static ColumnInfo,
    },
    /// Parameterless SQL, run as a batch.
    Sql(&'static str),
}

impl Step {
    pub fn create_table<T: Table>() -> Self {
        Step::CreateTable(T::schema())
    }

    /// Add column `C` to its table. Existing rows get `NULL`, so `C` must
    /// be nullable:
    ///
    /// ```compile_fail
    /// midoku_orm::table! {
    ///     pub mod item => "Item" {
    ///         weight: i64,
    ///     }
    /// }
    ///
    /// fn main() {
    ///     let _ = midoku_orm::Step::add_column::<item::weight>();
    /// }
    /// ```
    pub fn add_column<C>() -> Self
    where
        C: Column,
        C::Value: Nullable,
    {
        Step::AddColumn {
            table: <C::Table as Table>::schema(),
            column: C::info(),
        }
    }

    fn apply(&self, db: &Database) -> DbResult<()> {
        match self {
            Step::CreateTable(table) => {
                db.execute(&table.create_table(true))?;
            }
            Step::AddColumn { table, column } => {
                if table_columns(db, table.name)?.iter().any(|c| c == column.name) {
                    log::info!("Column {}.{} already exists", table.name, column.name);
                } else {
                    db.execute(&table.add_column(column))?;
                }
            }
            Step::Sql(sql) => db.execute_batch(sql)?,
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CreateTable(table) => write!(f, "create table {}", table.name),
            Step::AddColumn { table, column } => {
                write!(f, "add column {}.{}", table.name, column.name)
            }
            Step::Sql(sql) => write!(f, "run `{sql}`"),
        }
    }
}

/// Names of the columns a table currently has in the database.
fn table_columns(db: &Database, table: &str) -> DbResult<Vec<String>> {
    db.query(&Sql::new(format!("PRAGMA table_info({table});")), |row| {
        row.get(1)
    })
}

/// A step gated on the schema version it brings the database to.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub step: Step,
}

/// What [`Migrator::upgrade`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upgrade {
    /// Empty database, all tables created.
    Fresh { version: i64 },
    UpToDate { version: i64 },
    Migrated { from: i64, to: i64, applied: usize },
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upgrade::Fresh { version } => write!(f, "created schema version {version}"),
            Upgrade::UpToDate { version } => write!(f, "schema version {version} is up to date"),
            Upgrade::Migrated { from, to, applied } => write!(
                f,
                "migrated schema from version {from} to {to} ({applied} steps)"
            ),
        }
    }
}

/// The full upgrade plan of a schema.
#[derive(Debug, Clone)]
pub struct Migrator {
    target: i64,
    tables: Vec<TableSchema>,
    migrations: Vec<Migration>,
}

impl Migrator {
    pub fn new(target: i64) -> Self {
        Self {
            target,
            tables: Vec::new(),
            migrations: Vec::new(),
        }
    }

    /// Add a table to the fresh-install list. Tables are created in the
    /// order they are added, so referenced tables must come first.
    pub fn create_table<T: Table>(mut self) -> Self {
        self.tables.push(T::schema());
        self
    }

    /// Add a step run when upgrading from a version below `version`.
    pub fn step(mut self, version: i64, description: &'static str, step: Step) -> Self {
        self.migrations.push(Migration {
            version,
            description,
            step,
        });
        self
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Check the plan itself: every foreign key must point at a table created
    /// earlier in the list (or at its own table), and no step may be gated
    /// beyond the target version.
    pub fn validate(&self) -> DbResult<()> {
        for (i, table) in self.tables.iter().enumerate() {
            for referenced in table.references() {
                let created = referenced == table.name
                    || self.tables[..i].iter().any(|t| t.name == referenced);
                if !created {
                    return Err(DbError::InvalidSchema(format!(
                        "table {} references {} before it is created",
                        table.name, referenced
                    )));
                }
            }
        }
        if let Some(migration) = self
            .migrations
            .iter()
            .find(|m| m.version < 1 || m.version > self.target)
        {
            return Err(DbError::InvalidSchema(format!(
                "step \"{}\" targets version {}, outside 1..={}",
                migration.description, migration.version, self.target
            )));
        }
        Ok(())
    }

    /// Bring the database up to the target version.
    ///
    /// The new version is only written once every step has succeeded; the
    /// first failing step aborts the upgrade.
    pub fn upgrade(&self, db: &Database) -> DbResult<Upgrade> {
        self.validate()?;

        let version = read_version(db)?;
        if version == 0 {
            log::info!("Creating schema version {}", self.target);
            for table in &self.tables {
                db.execute(&table.create_table(true))?;
            }
            write_version(db, self.target)?;
            return Ok(Upgrade::Fresh {
                version: self.target,
            });
        }
        if version == self.target {
            return Ok(Upgrade::UpToDate { version });
        }
        if version > self.target {
            return Err(DbError::SchemaVersion {
                found: version,
                target: self.target,
            });
        }

        let mut pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| m.version > version)
            .collect();
        pending.sort_by_key(|m| m.version);

        for migration in &pending {
            log::info!(
                "Migrating to version {}: {} ({})",
                migration.version,
                migration.description,
                migration.step
            );
            migration.step.apply(db)?;
        }
        write_version(db, self.target)?;

        Ok(Upgrade::Migrated {
            from: version,
            to: self.target,
            applied: pending.len(),
        })
    }
}

//! The connection handle every persistence operation goes through.

use std::path::Path;

use rusqlite::types::FromSql;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};

use crate::error::DbResult;
use crate::sql::Sql;

/// One SQLite connection. Statements run synchronously in autocommit mode.
///
/// There is no process-wide default database: callers pass a `&Database` to
/// every operation, and serialize access themselves if they share it.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database file.
    pub fn open(path: &Path) -> DbResult<Self> {
        log::debug!("Opening database {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database. Useful for testing.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a statement that returns no rows. Returns the number of changed rows.
    pub fn execute(&self, sql: &Sql) -> DbResult<usize> {
        log::debug!("SQL: {} {:?}", sql.text, sql.binds);
        let mut stmt = self.conn.prepare(&sql.text)?;
        Ok(stmt.execute(params_from_iter(sql.binds.iter()))?)
    }

    /// Run parameterless statements, e.g. DDL or pragmas.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        log::debug!("SQL: {}", sql);
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Run a query and map every row.
    pub fn query<T, F>(&self, sql: &Sql, mut map: F) -> DbResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        log::debug!("SQL: {} {:?}", sql.text, sql.binds);
        let mut stmt = self.conn.prepare(&sql.text)?;
        let rows = stmt.query_map(params_from_iter(sql.binds.iter()), |row| map(row))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Run a query and map its first row, if there is one.
    pub fn query_optional<T, F>(&self, sql: &Sql, map: F) -> DbResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        log::debug!("SQL: {} {:?}", sql.text, sql.binds);
        let mut stmt = self.conn.prepare(&sql.text)?;
        Ok(stmt
            .query_row(params_from_iter(sql.binds.iter()), map)
            .optional()?)
    }

    /// First column of the first row, e.g. an aggregate.
    pub fn query_scalar<T: FromSql>(&self, sql: &Sql) -> DbResult<Option<T>> {
        self.query_optional(sql, |row| row.get(0))
    }

    /// Rowid of the most recent successful `INSERT` on this connection.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::types::Value;

    use super::*;

    #[test]
    fn foreign_keys_enabled() {
        let db = Database::open_in_memory().unwrap();
        let fk: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn binds_are_positional() {
        let db = Database::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (a INTEGER, b TEXT);").unwrap();
        let insert = Sql::with_binds(
            "INSERT INTO t (a, b) VALUES (?, ?);",
            vec![Value::Integer(7), Value::Text("seven".into())],
        );
        assert_eq!(db.execute(&insert).unwrap(), 1);
        assert_eq!(db.last_insert_id(), 1);

        let rows = db
            .query(&Sql::new("SELECT a, b FROM t;"), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .unwrap();
        assert_eq!(rows, vec![(7, "seven".to_string())]);
    }

    #[test]
    fn query_optional_without_rows_is_none() {
        let db = Database::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (a INTEGER);").unwrap();
        let row = db
            .query_optional(&Sql::new("SELECT a FROM t;"), |row| row.get::<_, i64>(0))
            .unwrap();
        assert_eq!(row, None);
    }

    #[test]
    fn scalar_of_empty_aggregate_is_null() {
        let db = Database::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (a INTEGER);").unwrap();
        let sum: Option<Option<i64>> = db.query_scalar(&Sql::new("SELECT sum(a) FROM t;")).unwrap();
        assert_eq!(sum, Some(None));
    }

    #[test]
    fn driver_errors_are_reported() {
        let db = Database::open_in_memory().unwrap();
        let err = db.execute(&Sql::new("SELECT FROM nowhere;")).unwrap_err();
        assert!(matches!(err, crate::DbError::Driver(_)));
    }
}

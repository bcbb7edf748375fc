//! Database connection and query execution.

use crate::{DbError, QueryResult, Row, Value};
use serde::de::DeserializeOwned;

/// SQLite database connection.
///
/// Inside a Spin component this wraps the host SQLite connection. Natively it
/// wraps an embedded SQLite handle so the same queries run in tests and tools.
pub struct Db {
    #[cfg(target_arch = "wasm32")]
    conn: spin_sdk::sqlite::Connection,
    #[cfg(not(target_arch = "wasm32"))]
    conn: rusqlite::Connection,
}

#[cfg(target_arch = "wasm32")]
fn to_spin(params: &[Value]) -> Vec<spin_sdk::sqlite::Value> {
    params
        .iter()
        .map(|v| match v {
            Value::Null => spin_sdk::sqlite::Value::Null,
            Value::Integer(i) => spin_sdk::sqlite::Value::Integer(*i),
            Value::Real(f) => spin_sdk::sqlite::Value::Real(*f),
            Value::Text(s) => spin_sdk::sqlite::Value::Text(s.clone()),
            Value::Blob(b) => spin_sdk::sqlite::Value::Blob(b.clone()),
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
impl Db {
    /// Open the default SQLite database.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::open_default()?;
    /// ```
    pub fn open_default() -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open_default()
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open a named SQLite database.
    pub fn open(name: &str) -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open(name)
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Execute a statement and return the number of rows it changed.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        self.conn
            .execute(sql, to_spin(params).as_slice())
            .map_err(|e| DbError::from_driver_message(e.to_string()))?;

        let changes = self.query("SELECT changes() AS changes", &[])?;
        Ok(changes
            .first()
            .and_then(|row| row.get("changes"))
            .and_then(Value::as_integer)
            .unwrap_or(0) as u64)
    }

    /// Execute several `;`-separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            self.conn
                .execute(statement, &[])
                .map_err(|e| DbError::from_driver_message(e.to_string()))?;
        }
        Ok(())
    }

    /// Execute a SQL query and return raw results.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let result = self
            .conn
            .execute(sql, to_spin(params).as_slice())
            .map_err(|e| DbError::from_driver_message(e.to_string()))?;

        let columns: Vec<String> = result.columns.iter().map(|c| c.to_string()).collect();

        let rows: Vec<Row> = result
            .rows
            .iter()
            .map(|row| {
                let values: Vec<Value> = row
                    .values
                    .iter()
                    .map(|v| match v {
                        spin_sdk::sqlite::Value::Null => Value::Null,
                        spin_sdk::sqlite::Value::Integer(i) => Value::Integer(*i),
                        spin_sdk::sqlite::Value::Real(f) => Value::Real(*f),
                        spin_sdk::sqlite::Value::Text(s) => Value::Text(s.clone()),
                        spin_sdk::sqlite::Value::Blob(b) => Value::Blob(b.clone()),
                    })
                    .collect();
                Row::new(columns.clone(), values)
            })
            .collect();

        Ok(QueryResult::new(columns, rows))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, ValueRef};
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn from_sqlite(value: rusqlite::types::ValueRef<'_>) -> Value {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Db {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, DbError> {
        let conn = rusqlite::Connection::open(path.as_ref())
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Execute a statement and return the number of rows it changed.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let changed = self
            .conn
            .execute(sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(changed as u64)
    }

    /// Execute several `;`-separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Execute a SQL query and return raw results.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(from_sqlite(row.get_ref(i)?));
            }
            rows.push(Row::new(columns.clone(), values));
        }

        Ok(QueryResult::new(columns, rows))
    }
}

impl Db {
    /// Execute a SQL query and deserialize results into a vector.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let products: Vec<Product> = db.query_as(
    ///     "SELECT id, name, price FROM products WHERE price < ?",
    ///     params![100.0]
    /// )?;
    /// ```
    pub fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        let result = self.query(sql, params)?;
        result.deserialize_all()
    }

    /// Execute a SQL query and return a single row.
    ///
    /// Returns an error if no rows are returned.
    pub fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        let result = self.query(sql, params)?;
        result.first().ok_or(DbError::NotFound)?.deserialize()
    }

    /// Execute a SQL query and return an optional single row.
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let result = self.query(sql, params)?;
        match result.first() {
            Some(row) => Ok(Some(row.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Run `f` inside `BEGIN IMMEDIATE`/`COMMIT`.
    ///
    /// Any error returned by `f` rolls the transaction back and is passed
    /// through unchanged.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Db) -> Result<T, E>,
        E: From<DbError>,
    {
        self.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                // The rollback error is secondary to the one that caused it.
                let _ = self.execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::params;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    fn db() -> Db {
        let db = Db::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_execute_reports_changes() {
        let db = db();
        assert_eq!(db.execute("INSERT INTO items (id, name) VALUES (?, ?)", params![1, "a"]).unwrap(), 1);
        assert_eq!(db.execute("INSERT INTO items (id, name) VALUES (?, ?)", params![2, "b"]).unwrap(), 1);
        assert_eq!(db.execute("UPDATE items SET name = name || '!'", params![]).unwrap(), 2);
        assert_eq!(db.execute("DELETE FROM items WHERE id = ?", params![99]).unwrap(), 0);
    }

    #[test]
    fn test_query_as_and_optional() {
        let db = db();
        db.execute("INSERT INTO items (id, name) VALUES (?, ?)", params![1, "castle"]).unwrap();

        let items: Vec<Item> = db.query_as("SELECT id, name FROM items", params![]).unwrap();
        assert_eq!(items, vec![Item { id: 1, name: "castle".into() }]);

        let missing: Option<Item> = db
            .query_optional("SELECT id, name FROM items WHERE id = ?", params![2])
            .unwrap();
        assert!(missing.is_none());

        let err = db
            .query_one::<Item>("SELECT id, name FROM items WHERE id = ?", params![2])
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[test]
    fn test_unique_violation_is_constraint() {
        let db = db();
        db.execute("INSERT INTO items (id, name) VALUES (?, ?)", params![1, "a"]).unwrap();
        let err = db
            .execute("INSERT INTO items (id, name) VALUES (?, ?)", params![2, "a"])
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = db();
        let result: Result<(), DbError> = db.transaction(|tx| {
            tx.execute("INSERT INTO items (id, name) VALUES (?, ?)", params![1, "a"])?;
            Err(DbError::NotFound)
        });
        assert!(result.is_err());
        let rows = db.query("SELECT id FROM items", params![]).unwrap();
        assert!(rows.is_empty());

        db.transaction(|tx| {
            tx.execute("INSERT INTO items (id, name) VALUES (?, ?)", params![1, "a"])
                .map(|_| ())
        })
        .unwrap();
        assert_eq!(db.query("SELECT id FROM items", params![]).unwrap().len(), 1);
    }

    #[test]
    fn test_nulls_and_blobs_round_trip() {
        let db = Db::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (a INTEGER, b BLOB)").unwrap();
        db.execute("INSERT INTO t (a, b) VALUES (?, ?)", params![None::<i64>, vec![1u8, 2]])
            .unwrap();
        let result = db.query("SELECT a, b FROM t", params![]).unwrap();
        let row = result.first().unwrap();
        assert!(row.get("a").unwrap().is_null());
        assert_eq!(row.get("b"), Some(&Value::Blob(vec![1, 2])));
    }
}

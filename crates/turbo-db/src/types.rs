//! Database value types and conversions.

use crate::DbError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;

/// A database value that can be used as a parameter or result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real/float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Try to get the value as an i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get the value as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a boolean (SQLite stores booleans as 0/1).
    pub fn as_bool(&self) -> Option<bool> {
        self.as_integer().map(|i| i != 0)
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// Conversions from Rust types to Value
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(if v { 1 } else { 0 })
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A row from a query result.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row from columns and values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    fn require(&self, column: &str) -> Result<&Value, DbError> {
        self.get(column)
            .ok_or_else(|| DbError::TypeError(format!("missing column `{}`", column)))
    }

    /// Get a non-null text column.
    pub fn text(&self, column: &str) -> Result<String, DbError> {
        self.require(column)?
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| DbError::TypeError(format!("column `{}` is not text", column)))
    }

    /// Get a non-null integer column.
    pub fn integer(&self, column: &str) -> Result<i64, DbError> {
        self.require(column)?
            .as_integer()
            .ok_or_else(|| DbError::TypeError(format!("column `{}` is not an integer", column)))
    }

    /// Get a nullable integer column.
    pub fn optional_integer(&self, column: &str) -> Result<Option<i64>, DbError> {
        let value = self.require(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_integer()
            .map(Some)
            .ok_or_else(|| DbError::TypeError(format!("column `{}` is not an integer", column)))
    }

    /// Get a boolean column stored as 0/1.
    pub fn boolean(&self, column: &str) -> Result<bool, DbError> {
        self.require(column)?
            .as_bool()
            .ok_or_else(|| DbError::TypeError(format!("column `{}` is not a boolean", column)))
    }

    /// Get a text column holding JSON and decode it.
    pub fn json<T: DeserializeOwned>(&self, column: &str) -> Result<T, DbError> {
        let raw = self.text(column)?;
        serde_json::from_str(&raw).map_err(|e| {
            DbError::DeserializeError(format!("column `{}`: {}", column, e))
        })
    }

    /// Try to deserialize the row into a type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        // Convert row to JSON value, then deserialize
        let map: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect();

        let json = serde_json::Value::Object(map);
        serde_json::from_value(json).map_err(|e| DbError::DeserializeError(e.to_string()))
    }
}

/// Query result containing rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// The column names.
    pub columns: Vec<String>,
    /// The rows.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new query result.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the first row.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Deserialize all rows into a vector of a type.
    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(|row| row.deserialize()).collect()
    }
}

/// Convert a Value to a serde_json::Value.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => String::from_utf8(b.clone())
            .map(serde_json::Value::String)
            .unwrap_or_else(|_| serde_json::Value::String(STANDARD.encode(b))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn row() -> Row {
        Row::new(
            vec![
                "id".into(),
                "notified".into(),
                "notified_at".into(),
                "variants".into(),
            ],
            vec![
                Value::Text("rn_1".into()),
                Value::Integer(1),
                Value::Null,
                Value::Text(r#"[{"id":"v1"}]"#.into()),
            ],
        )
    }

    #[test]
    fn test_typed_getters() {
        let row = row();
        assert_eq!(row.text("id").unwrap(), "rn_1");
        assert!(row.boolean("notified").unwrap());
        assert_eq!(row.optional_integer("notified_at").unwrap(), None);
        assert!(matches!(row.integer("id"), Err(DbError::TypeError(_))));
        assert!(matches!(row.text("missing"), Err(DbError::TypeError(_))));
    }

    #[test]
    fn test_json_column() {
        #[derive(Deserialize)]
        struct V {
            id: String,
        }
        let variants: Vec<V> = row().json("variants").unwrap();
        assert_eq!(variants[0].id, "v1");
    }

    #[test]
    fn test_row_deserialize() {
        #[derive(Deserialize)]
        struct Partial {
            id: String,
            notified_at: Option<i64>,
        }
        let partial: Partial = row().deserialize().unwrap();
        assert_eq!(partial.id, "rn_1");
        assert_eq!(partial.notified_at, None);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::Integer(0).as_bool(), Some(false));
    }
}

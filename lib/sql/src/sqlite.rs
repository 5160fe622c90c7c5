use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::{Row, SqlError, SqlStore, Value};

/// SqliteStore is a SqlStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SqlError> {
        let conn = Connection::open(path)
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        // WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SqlError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SqlError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

impl SqlStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                let mut columns = Vec::new();
                for (i, name) in column_names.iter().enumerate() {
                    let val = row_value_at(row, i);
                    columns.push((name.clone(), val));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| SqlError::Query(e.to_string()))?);
        }
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Execution(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = conn
            .execute(sql, param_refs.as_slice())
            .map_err(|e| SqlError::Execution(e.to_string()))?;

        Ok(affected as u64)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Execution(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        conn.execute(sql, param_refs.as_slice())
            .map_err(|e| SqlError::Execution(e.to_string()))?;

        Ok(conn.last_insert_rowid())
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> Value {
    // Try integer first, then real, then text, then blob, then null.
    if let Ok(i) = row.get::<_, i64>(idx) {
        return Value::Integer(i);
    }
    if let Ok(f) = row.get::<_, f64>(idx) {
        return Value::Real(f);
    }
    if let Ok(s) = row.get::<_, String>(idx) {
        return Value::Text(s);
    }
    if let Ok(b) = row.get::<_, Vec<u8>>(idx) {
        return Value::Blob(b);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_table() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec(
                "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, score REAL)",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn exec_and_query_roundtrip() {
        let store = store_with_table();

        let affected = store
            .exec(
                "INSERT INTO items (name, score) VALUES (?1, ?2)",
                &[Value::Text("a".into()), Value::Real(1.5)],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = store
            .query("SELECT name, score FROM items", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name"), Some("a"));
    }

    #[test]
    fn insert_returns_rowid() {
        let store = store_with_table();

        let first = store
            .insert("INSERT INTO items (name) VALUES (?1)", &[Value::Text("a".into())])
            .unwrap();
        let second = store
            .insert("INSERT INTO items (name) VALUES (?1)", &[Value::Text("b".into())])
            .unwrap();
        assert_eq!(second, first + 1);
    }

    #[test]
    fn null_binds_as_sql_null() {
        let store = store_with_table();

        store
            .exec(
                "INSERT INTO items (name) VALUES (?1)",
                &[Value::opt_text(None)],
            )
            .unwrap();

        let rows = store
            .query("SELECT COUNT(*) AS cnt FROM items WHERE name IS NULL", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(1));
    }

    #[test]
    fn affected_count_on_update() {
        let store = store_with_table();
        store
            .exec("INSERT INTO items (name) VALUES ('x'), ('x'), ('y')", &[])
            .unwrap();

        let affected = store
            .exec(
                "UPDATE items SET score = 1.0 WHERE name = ?1",
                &[Value::Text("x".into())],
            )
            .unwrap();
        assert_eq!(affected, 2);
    }
}

#![cfg(feature = "sqlite")]

//! SQLite sink, backed by `rusqlite`.

use rusqlite::{Connection, params_from_iter};

use crate::connection::{ConnectionDescriptor, DbKind};
use crate::error::{LoadError, LoadResult};
use crate::types::{TabularData, Value};

use super::{Sink, WriteOptions, batch_ranges, dialect, fail_after};

/// Writes tabular data into a SQLite database file.
pub struct SqliteSink {
    descriptor: ConnectionDescriptor,
}

impl SqliteSink {
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Sink for SqliteSink {
    fn write(
        &mut self,
        data: &TabularData,
        table: &str,
        options: &WriteOptions,
    ) -> LoadResult<usize> {
        let ConnectionDescriptor::Sqlite { path } = &self.descriptor else {
            return Err(LoadError::Connection {
                message: "sqlite sink given a non-sqlite descriptor".to_string(),
            });
        };
        let mut conn = Connection::open(path).map_err(|e| LoadError::Connection {
            message: format!("cannot open sqlite database {}: {e}", path.display()),
        })?;

        prepare_destination(&conn, data, table, options)?;

        let insert = dialect::insert_sql(DbKind::Sqlite, table, data);
        let mut written = 0usize;
        for range in batch_ranges(data.row_count(), options.batch_size) {
            match insert_batch(&mut conn, &insert, data, range.clone()) {
                Ok(()) => written += range.len(),
                Err(e) => return Err(fail_after(written, e)),
            }
        }
        Ok(written)
    }
}

fn prepare_destination(
    conn: &Connection,
    data: &TabularData,
    table: &str,
    options: &WriteOptions,
) -> LoadResult<()> {
    let exists = table_exists(conn, table)?;

    if !exists {
        if !options.create_if_missing {
            return Err(LoadError::SchemaMismatch {
                message: format!("table '{table}' does not exist and create_if_missing is off"),
            });
        }
        conn.execute_batch(&dialect::create_table_sql(DbKind::Sqlite, table, data))?;
        return Ok(());
    }

    let existing_cols: usize = conn.query_row(
        "SELECT count(*) FROM pragma_table_info(?1)",
        [table],
        |row| row.get::<_, i64>(0),
    )? as usize;
    if existing_cols != data.column_count() {
        return Err(LoadError::SchemaMismatch {
            message: format!(
                "table '{table}' has {existing_cols} column(s), data has {}",
                data.column_count()
            ),
        });
    }

    if options.truncate_first {
        conn.execute(&dialect::truncate_sql(DbKind::Sqlite, table), [])?;
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> LoadResult<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([table])?)
}

fn insert_batch(
    conn: &mut Connection,
    insert: &str,
    data: &TabularData,
    range: std::ops::Range<usize>,
) -> LoadResult<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(insert)?;
        for i in range {
            stmt.execute(params_from_iter(data.row(i).into_iter().map(bind_value)))
                .map_err(|e| classify(i, e))?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn bind_value(v: &Value) -> rusqlite::types::Value {
    match v {
        Value::Null => rusqlite::types::Value::Null,
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Float(f) => rusqlite::types::Value::Real(*f),
        Value::Date(d) => rusqlite::types::Value::Text(d.format("%Y-%m-%d").to_string()),
        Value::Boolean(b) => rusqlite::types::Value::Integer(i64::from(*b)),
    }
}

fn classify(row_index: usize, e: rusqlite::Error) -> LoadError {
    match &e {
        rusqlite::Error::SqliteFailure(ffi, _)
            if ffi.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            LoadError::Integrity {
                row_index: Some(row_index),
                message: e.to_string(),
            }
        }
        _ => LoadError::Sqlite(e),
    }
}

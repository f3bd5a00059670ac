#![cfg(feature = "access")]

//! Access (`.accdb`/`.mdb`) reading through the Microsoft Access ODBC driver.
//!
//! The selected table is pulled with `SELECT *`; every column arrives as text
//! and goes through the same per-column type inference as delimited files.

use std::path::Path;

use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};

use crate::error::{LoadError, LoadResult};
use crate::types::TabularData;

use super::delimited::columns_from_strings;

/// Read one table from an Access database file into a [`TabularData`].
///
/// Requires a working ODBC manager plus the Microsoft Access ODBC driver.
pub fn read_access_from_path(path: impl AsRef<Path>, table: &str) -> LoadResult<TabularData> {
    let path = path.as_ref();
    let env = Environment::new()?;
    let conn_str = format!(
        "Driver={{Microsoft Access Driver (*.mdb, *.accdb)}};DBQ={};",
        path.display()
    );
    let conn = env
        .connect_with_connection_string(&conn_str, ConnectionOptions::default())
        .map_err(|e| LoadError::Connection {
            message: format!("cannot open access file {}: {e}", path.display()),
        })?;

    let query = format!("SELECT * FROM [{table}]");
    let mut cursor = conn
        .execute(&query, ())?
        .ok_or_else(|| LoadError::SchemaMismatch {
            message: format!("table '{table}' produced no result set"),
        })?;

    let headers: Vec<String> = cursor
        .column_names()?
        .collect::<Result<Vec<String>, odbc_api::Error>>()?;
    let ncols = headers.len();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut buf: Vec<u8> = Vec::new();
    while let Some(mut row) = cursor.next_row()? {
        let mut out = Vec::with_capacity(ncols);
        for i in 1..=ncols {
            buf.clear();
            let non_null = row.get_text(i as u16, &mut buf)?;
            if non_null {
                out.push(String::from_utf8_lossy(&buf).into_owned());
            } else {
                out.push(String::new());
            }
        }
        rows.push(out);
    }

    columns_from_strings(headers, &rows)
}

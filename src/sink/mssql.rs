#![cfg(feature = "mssql")]

//! SQL Server sink, reached through ODBC (`odbc-api`).
//!
//! Values are bound as text parameters and converted server-side, the same
//! contract a `VARCHAR`-heavy bulk loader gets from any ODBC driver. Booleans
//! bind as `1`/`0` so they convert into `BIT` columns.

use odbc_api::parameter::InputParameter;
use odbc_api::{ConnectionOptions, Cursor, Environment, IntoParameter};

use crate::connection::{ConnectionDescriptor, DbKind};
use crate::error::{LoadError, LoadResult};
use crate::types::{TabularData, Value};

use super::{Sink, WriteOptions, batch_ranges, dialect, fail_after};

/// Writes tabular data into a SQL Server table.
pub struct MssqlSink {
    descriptor: ConnectionDescriptor,
}

impl MssqlSink {
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Sink for MssqlSink {
    fn write(
        &mut self,
        data: &TabularData,
        table: &str,
        options: &WriteOptions,
    ) -> LoadResult<usize> {
        let ConnectionDescriptor::SqlServer {
            host,
            port,
            user,
            password,
            dbname,
            driver,
        } = &self.descriptor
        else {
            return Err(LoadError::Connection {
                message: "mssql sink given a non-sqlserver descriptor".to_string(),
            });
        };

        let env = Environment::new()?;
        let server = match port {
            Some(p) => format!("{host},{p}"),
            None => host.clone(),
        };
        let conn_str = format!(
            "Driver={{{driver}}};Server={server};Database={dbname};UID={user};PWD={password};"
        );
        let conn = env
            .connect_with_connection_string(&conn_str, ConnectionOptions::default())
            .map_err(|e| LoadError::Connection {
                message: format!("cannot connect to sql server at {server}: {e}"),
            })?;

        conn.set_autocommit(false)?;
        prepare_destination(&conn, data, table, options)?;
        conn.commit()?;

        let insert = dialect::insert_sql(DbKind::SqlServer, table, data);
        let mut prepared = conn.prepare(&insert)?;

        let mut written = 0usize;
        for range in batch_ranges(data.row_count(), options.batch_size) {
            for i in range.clone() {
                let params: Vec<Box<dyn InputParameter>> =
                    data.row(i).into_iter().map(bind_value).collect();
                if let Err(e) = prepared.execute(params.as_slice()) {
                    let _ = conn.rollback();
                    return Err(fail_after(written, classify(i, e)));
                }
            }
            if let Err(e) = conn.commit() {
                return Err(fail_after(written, LoadError::Odbc(e)));
            }
            written += range.len();
        }
        Ok(written)
    }
}

fn prepare_destination(
    conn: &odbc_api::Connection<'_>,
    data: &TabularData,
    table: &str,
    options: &WriteOptions,
) -> LoadResult<()> {
    let exists = query_count(
        conn,
        "SELECT count(*) FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = ?",
        table,
    )? > 0;

    if !exists {
        if !options.create_if_missing {
            return Err(LoadError::SchemaMismatch {
                message: format!("table '{table}' does not exist and create_if_missing is off"),
            });
        }
        conn.execute(&dialect::create_table_sql(DbKind::SqlServer, table, data), ())?;
        return Ok(());
    }

    let existing_cols = query_count(
        conn,
        "SELECT count(*) FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = ?",
        table,
    )?;
    if existing_cols as usize != data.column_count() {
        return Err(LoadError::SchemaMismatch {
            message: format!(
                "table '{table}' has {existing_cols} column(s), data has {}",
                data.column_count()
            ),
        });
    }

    if options.truncate_first {
        conn.execute(&dialect::truncate_sql(DbKind::SqlServer, table), ())?;
    }
    Ok(())
}

fn query_count(conn: &odbc_api::Connection<'_>, sql: &str, param: &str) -> LoadResult<i64> {
    let mut cursor = conn
        .execute(sql, &param.into_parameter())?
        .ok_or_else(|| LoadError::SchemaMismatch {
            message: "catalog query produced no result set".to_string(),
        })?;
    let mut buf: Vec<u8> = Vec::new();
    if let Some(mut row) = cursor.next_row()? {
        if row.get_text(1, &mut buf)? {
            let text = String::from_utf8_lossy(&buf);
            return Ok(text.trim().parse::<i64>().unwrap_or(0));
        }
    }
    Ok(0)
}

fn bind_value(v: &Value) -> Box<dyn InputParameter> {
    let text: Option<String> = match v {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
    };
    Box::new(text.into_parameter())
}

fn classify(row_index: usize, e: odbc_api::Error) -> LoadError {
    // Best-effort: SQLSTATE class 23 / the usual SQL Server constraint
    // messages show up in the diagnostic text.
    let text = e.to_string();
    let constraint = text.contains("23000")
        || text.contains("Violation of")
        || text.contains("Cannot insert the value NULL");
    if constraint {
        LoadError::Integrity {
            row_index: Some(row_index),
            message: text,
        }
    } else {
        LoadError::Odbc(e)
    }
}

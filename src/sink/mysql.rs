#![cfg(feature = "mysql")]

//! MySQL sink, backed by the synchronous `mysql` client.

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, TxOpts};

use crate::connection::{ConnectionDescriptor, DbKind};
use crate::error::{LoadError, LoadResult};
use crate::types::{TabularData, Value};

use super::{Sink, WriteOptions, batch_ranges, dialect, fail_after};

/// Writes tabular data into a MySQL table.
pub struct MysqlSink {
    descriptor: ConnectionDescriptor,
}

impl MysqlSink {
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Sink for MysqlSink {
    fn write(
        &mut self,
        data: &TabularData,
        table: &str,
        options: &WriteOptions,
    ) -> LoadResult<usize> {
        let ConnectionDescriptor::Mysql {
            host,
            port,
            user,
            password,
            dbname,
        } = &self.descriptor
        else {
            return Err(LoadError::Connection {
                message: "mysql sink given a non-mysql descriptor".to_string(),
            });
        };
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(host.clone()))
            .tcp_port(*port)
            .user(Some(user.clone()))
            .pass(Some(password.clone()))
            .db_name(Some(dbname.clone()));
        let mut conn = Conn::new(opts).map_err(|e| LoadError::Connection {
            message: format!("cannot connect to mysql at {host}:{port}: {e}"),
        })?;

        prepare_destination(&mut conn, data, table, options)?;

        let insert = dialect::insert_sql(DbKind::Mysql, table, data);
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
    conn: &mut Conn,
    data: &TabularData,
    table: &str,
    options: &WriteOptions,
) -> LoadResult<()> {
    let exists: Option<i64> = conn.exec_first(
        "SELECT count(*) FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_name = ?",
        (table,),
    )?;
    let exists = exists.unwrap_or(0) > 0;

    if !exists {
        if !options.create_if_missing {
            return Err(LoadError::SchemaMismatch {
                message: format!("table '{table}' does not exist and create_if_missing is off"),
            });
        }
        conn.query_drop(dialect::create_table_sql(DbKind::Mysql, table, data))?;
        return Ok(());
    }

    let existing_cols: Option<i64> = conn.exec_first(
        "SELECT count(*) FROM information_schema.columns \
         WHERE table_schema = DATABASE() AND table_name = ?",
        (table,),
    )?;
    let existing_cols = existing_cols.unwrap_or(0);
    if existing_cols as usize != data.column_count() {
        return Err(LoadError::SchemaMismatch {
            message: format!(
                "table '{table}' has {existing_cols} column(s), data has {}",
                data.column_count()
            ),
        });
    }

    if options.truncate_first {
        conn.query_drop(dialect::truncate_sql(DbKind::Mysql, table))?;
    }
    Ok(())
}

fn insert_batch(
    conn: &mut Conn,
    insert: &str,
    data: &TabularData,
    range: std::ops::Range<usize>,
) -> LoadResult<()> {
    let mut tx = conn.start_transaction(TxOpts::default())?;
    for i in range {
        let params: Vec<mysql::Value> = data.row(i).into_iter().map(bind_value).collect();
        tx.exec_drop(insert, params).map_err(|e| classify(i, e))?;
    }
    tx.commit()?;
    Ok(())
}

fn bind_value(v: &Value) -> mysql::Value {
    match v {
        Value::Null => mysql::Value::NULL,
        Value::Text(s) => mysql::Value::Bytes(s.clone().into_bytes()),
        Value::Integer(i) => mysql::Value::Int(*i),
        Value::Float(f) => mysql::Value::Double(*f),
        Value::Date(d) => {
            use chrono::Datelike;
            mysql::Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::Boolean(b) => mysql::Value::Int(i64::from(*b)),
    }
}

fn classify(row_index: usize, e: mysql::Error) -> LoadError {
    // 1048 not-null, 1062 duplicate key, 1452 foreign key.
    let constraint = matches!(
        &e,
        mysql::Error::MySqlError(server) if matches!(server.code, 1048 | 1062 | 1169 | 1452)
    );
    if constraint {
        LoadError::Integrity {
            row_index: Some(row_index),
            message: e.to_string(),
        }
    } else {
        LoadError::Mysql(e)
    }
}

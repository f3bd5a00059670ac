#![cfg(feature = "postgres")]

//! PostgreSQL sink, backed by the synchronous `postgres` client.

use postgres::types::ToSql;
use postgres::{Client, NoTls};

use crate::connection::{ConnectionDescriptor, DbKind};
use crate::error::{LoadError, LoadResult};
use crate::types::{DataType, TabularData, Value};

use super::{Sink, WriteOptions, batch_ranges, dialect, fail_after};

/// Writes tabular data into a PostgreSQL table.
pub struct PostgresSink {
    descriptor: ConnectionDescriptor,
}

impl PostgresSink {
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Sink for PostgresSink {
    fn write(
        &mut self,
        data: &TabularData,
        table: &str,
        options: &WriteOptions,
    ) -> LoadResult<usize> {
        let ConnectionDescriptor::Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = &self.descriptor
        else {
            return Err(LoadError::Connection {
                message: "postgres sink given a non-postgres descriptor".to_string(),
            });
        };
        let params =
            format!("host={host} port={port} user={user} password={password} dbname={dbname}");
        let mut client = Client::connect(&params, NoTls).map_err(|e| LoadError::Connection {
            message: format!("cannot connect to postgres at {host}:{port}: {e}"),
        })?;

        prepare_destination(&mut client, data, table, options)?;

        let mut written = 0usize;
        for range in batch_ranges(data.row_count(), options.batch_size) {
            match insert_batch(&mut client, table, data, range.clone()) {
                Ok(()) => written += range.len(),
                Err(e) => return Err(fail_after(written, e)),
            }
        }
        Ok(written)
    }
}

fn prepare_destination(
    client: &mut Client,
    data: &TabularData,
    table: &str,
    options: &WriteOptions,
) -> LoadResult<()> {
    let exists: bool = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1)",
            &[&table],
        )?
        .get(0);

    if !exists {
        if !options.create_if_missing {
            return Err(LoadError::SchemaMismatch {
                message: format!("table '{table}' does not exist and create_if_missing is off"),
            });
        }
        client.batch_execute(&dialect::create_table_sql(DbKind::Postgres, table, data))?;
        return Ok(());
    }

    let existing_cols: i64 = client
        .query_one(
            "SELECT count(*) FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1",
            &[&table],
        )?
        .get(0);
    if existing_cols as usize != data.column_count() {
        return Err(LoadError::SchemaMismatch {
            message: format!(
                "table '{table}' has {existing_cols} column(s), data has {}",
                data.column_count()
            ),
        });
    }

    if options.truncate_first {
        client.batch_execute(&dialect::truncate_sql(DbKind::Postgres, table))?;
    }
    Ok(())
}

/// The extended-query protocol counts bind parameters in a u16.
const MAX_PARAMS_PER_STATEMENT: usize = 65_535;

/// One multi-row `INSERT ... VALUES (...),(...)` per round trip
/// (`execute_values` style), split further only when a statement would
/// overflow the protocol's parameter limit. The whole batch commits at once.
fn insert_batch(
    client: &mut Client,
    table: &str,
    data: &TabularData,
    range: std::ops::Range<usize>,
) -> LoadResult<()> {
    let ncols = data.column_count().max(1);
    let rows_per_stmt = (MAX_PARAMS_PER_STATEMENT / ncols).max(1);

    let mut tx = client.transaction()?;
    let mut start = range.start;
    while start < range.end {
        let end = (start + rows_per_stmt).min(range.end);
        let sql = dialect::multirow_insert_sql(DbKind::Postgres, table, data, end - start);

        let mut boxed: Vec<Box<dyn ToSql + Sync>> = Vec::with_capacity((end - start) * ncols);
        for i in start..end {
            for c in data.columns() {
                boxed.push(bind_value(c.data_type, &c.values[i]));
            }
        }
        let params: Vec<&(dyn ToSql + Sync)> = boxed.iter().map(|b| b.as_ref()).collect();
        tx.execute(sql.as_str(), &params).map_err(classify)?;
        start = end;
    }
    tx.commit()?;
    Ok(())
}

/// Parameters are typed; nulls bind as the column's type to satisfy the
/// binary protocol's type checks.
fn bind_value(data_type: DataType, v: &Value) -> Box<dyn ToSql + Sync> {
    match v {
        Value::Null => match data_type {
            DataType::Text => Box::new(None::<String>),
            DataType::Integer => Box::new(None::<i64>),
            DataType::Float => Box::new(None::<f64>),
            DataType::Date => Box::new(None::<chrono::NaiveDate>),
            DataType::Boolean => Box::new(None::<bool>),
        },
        Value::Text(s) => Box::new(s.clone()),
        Value::Integer(i) => Box::new(*i),
        Value::Float(f) => Box::new(*f),
        Value::Date(d) => Box::new(*d),
        Value::Boolean(b) => Box::new(*b),
    }
}

fn classify(e: postgres::Error) -> LoadError {
    // SQLSTATE class 23 covers integrity constraint violations. Multi-row
    // statements cannot pin the offending row.
    let constraint = e
        .code()
        .map(|c| c.code().starts_with("23"))
        .unwrap_or(false);
    if constraint {
        LoadError::Integrity {
            row_index: None,
            message: e.to_string(),
        }
    } else {
        LoadError::Postgres(e)
    }
}

#![cfg(feature = "oracle")]

//! Oracle sink, backed by the `oracle` crate (ODPI-C).

use oracle::Connection;
use oracle::sql_type::ToSql;

use crate::connection::{ConnectionDescriptor, DbKind};
use crate::error::{LoadError, LoadResult};
use crate::types::{DataType, TabularData, Value};

use super::{Sink, WriteOptions, batch_ranges, dialect, fail_after};

/// Writes tabular data into an Oracle table.
pub struct OracleSink {
    descriptor: ConnectionDescriptor,
}

impl OracleSink {
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Sink for OracleSink {
    fn write(
        &mut self,
        data: &TabularData,
        table: &str,
        options: &WriteOptions,
    ) -> LoadResult<usize> {
        let ConnectionDescriptor::Oracle {
            host,
            port,
            service,
            user,
            password,
        } = &self.descriptor
        else {
            return Err(LoadError::Connection {
                message: "oracle sink given a non-oracle descriptor".to_string(),
            });
        };
        let connect_string = format!("//{host}:{port}/{service}");
        let conn = Connection::connect(user, password, &connect_string).map_err(|e| {
            LoadError::Connection {
                message: format!("cannot connect to oracle at {connect_string}: {e}"),
            }
        })?;

        prepare_destination(&conn, data, table, options)?;

        let insert = dialect::insert_sql(DbKind::Oracle, table, data);
        let mut written = 0usize;
        for range in batch_ranges(data.row_count(), options.batch_size) {
            match insert_batch(&conn, &insert, data, range.clone()) {
                Ok(()) => written += range.len(),
                Err(e) => {
                    let _ = conn.rollback();
                    return Err(fail_after(written, e));
                }
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
    let exists: i64 = conn.query_row_as::<i64>(
        "SELECT count(*) FROM user_tables WHERE table_name = :1",
        &[&table],
    )?;

    if exists == 0 {
        if !options.create_if_missing {
            return Err(LoadError::SchemaMismatch {
                message: format!("table '{table}' does not exist and create_if_missing is off"),
            });
        }
        conn.execute(&dialect::create_table_sql(DbKind::Oracle, table, data), &[])?;
        return Ok(());
    }

    let existing_cols: i64 = conn.query_row_as::<i64>(
        "SELECT count(*) FROM user_tab_columns WHERE table_name = :1",
        &[&table],
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
        conn.execute(&dialect::truncate_sql(DbKind::Oracle, table), &[])?;
    }
    Ok(())
}

fn insert_batch(
    conn: &Connection,
    insert: &str,
    data: &TabularData,
    range: std::ops::Range<usize>,
) -> LoadResult<()> {
    let first_row = range.start;
    let mut batch = conn.batch(insert, range.len()).build()?;
    for i in range {
        let boxed: Vec<Box<dyn ToSql>> = data
            .columns()
            .iter()
            .map(|c| bind_value(c.data_type, &c.values[i]))
            .collect();
        let refs: Vec<&dyn ToSql> = boxed.iter().map(|b| b.as_ref()).collect();
        batch.append_row(&refs).map_err(|e| classify(i, e))?;
    }
    batch.execute().map_err(|e| classify(first_row, e))?;
    conn.commit()?;
    Ok(())
}

fn bind_value(data_type: DataType, v: &Value) -> Box<dyn ToSql> {
    match v {
        Value::Null => match data_type {
            DataType::Text => Box::new(None::<String>),
            DataType::Integer => Box::new(None::<i64>),
            DataType::Float => Box::new(None::<f64>),
            DataType::Date => Box::new(None::<chrono::NaiveDate>),
            DataType::Boolean => Box::new(None::<i64>),
        },
        Value::Text(s) => Box::new(s.clone()),
        Value::Integer(i) => Box::new(*i),
        Value::Float(f) => Box::new(*f),
        Value::Date(d) => Box::new(*d),
        Value::Boolean(b) => Box::new(i64::from(*b)),
    }
}

fn classify(row_index: usize, e: oracle::Error) -> LoadError {
    // ORA-00001 unique, ORA-01400 not-null, ORA-02291 foreign key.
    let code = match &e {
        oracle::Error::OciError(db) | oracle::Error::DpiError(db) => db.code(),
        _ => 0,
    };
    if matches!(code, 1 | 1400 | 2291) {
        LoadError::Integrity {
            row_index: Some(row_index),
            message: e.to_string(),
        }
    } else {
        LoadError::Oracle(e)
    }
}

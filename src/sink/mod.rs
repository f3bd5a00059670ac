//! Database sinks: persist a [`TabularData`] into a destination table.
//!
//! [`open_sink`] dispatches a [`crate::connection::ConnectionDescriptor`] to
//! the matching driver implementation. All sinks share the same write
//! algorithm: optionally create the table (typed per [`dialect`]), optionally
//! truncate, then insert row batches with one commit per batch. A failure
//! after at least one committed batch surfaces as
//! [`LoadError::PartialWrite`]; committed batches are never rolled back.
//!
//! Driver modules:
//! - [`sqlite`] (feature `sqlite`)
//! - [`postgres`] (feature `postgres`)
//! - [`mysql`] (feature `mysql`)
//! - [`mssql`] (feature `mssql`, via ODBC)
//! - [`oracle`] (feature `oracle`)

pub mod dialect;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "oracle")]
pub mod oracle;

use std::ops::Range;

use crate::connection::ConnectionDescriptor;
use crate::error::{LoadError, LoadResult};
use crate::types::TabularData;

/// Default rows per round trip / per commit.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Flags controlling a single write.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Create the destination table when it does not exist.
    pub create_if_missing: bool,
    /// Remove all existing rows before inserting.
    pub truncate_first: bool,
    /// Rows per round trip; each batch is committed on its own.
    pub batch_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            truncate_first: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Capability interface for writing tabular data to one database target.
///
/// One implementation per supported database; the loader facades only see
/// this trait, so their behavior is testable with a fake sink.
pub trait Sink {
    /// Write all rows of `data` into `table`, returning the row count written.
    ///
    /// The connection is opened inside the call and released on every exit
    /// path, success or failure.
    fn write(&mut self, data: &TabularData, table: &str, options: &WriteOptions)
    -> LoadResult<usize>;
}

/// Build the sink matching a connection descriptor.
///
/// Targets whose cargo feature is disabled fail with
/// [`LoadError::Connection`] naming the feature to enable.
pub fn open_sink(descriptor: &ConnectionDescriptor) -> LoadResult<Box<dyn Sink>> {
    match descriptor {
        ConnectionDescriptor::Sqlite { .. } => {
            #[cfg(feature = "sqlite")]
            {
                Ok(Box::new(sqlite::SqliteSink::new(descriptor.clone())))
            }
            #[cfg(not(feature = "sqlite"))]
            {
                Err(disabled("sqlite"))
            }
        }
        ConnectionDescriptor::Postgres { .. } => {
            #[cfg(feature = "postgres")]
            {
                Ok(Box::new(postgres::PostgresSink::new(descriptor.clone())))
            }
            #[cfg(not(feature = "postgres"))]
            {
                Err(disabled("postgres"))
            }
        }
        ConnectionDescriptor::Mysql { .. } => {
            #[cfg(feature = "mysql")]
            {
                Ok(Box::new(mysql::MysqlSink::new(descriptor.clone())))
            }
            #[cfg(not(feature = "mysql"))]
            {
                Err(disabled("mysql"))
            }
        }
        ConnectionDescriptor::SqlServer { .. } => {
            #[cfg(feature = "mssql")]
            {
                Ok(Box::new(mssql::MssqlSink::new(descriptor.clone())))
            }
            #[cfg(not(feature = "mssql"))]
            {
                Err(disabled("mssql"))
            }
        }
        ConnectionDescriptor::Oracle { .. } => {
            #[cfg(feature = "oracle")]
            {
                Ok(Box::new(oracle::OracleSink::new(descriptor.clone())))
            }
            #[cfg(not(feature = "oracle"))]
            {
                Err(disabled("oracle"))
            }
        }
    }
}

/// Write `data` into `table` on the described database.
///
/// Convenience over [`open_sink`] + [`Sink::write`].
pub fn write_table(
    data: &TabularData,
    descriptor: &ConnectionDescriptor,
    table: &str,
    options: &WriteOptions,
) -> LoadResult<usize> {
    open_sink(descriptor)?.write(data, table, options)
}

#[allow(dead_code)]
fn disabled(feature: &str) -> LoadError {
    LoadError::Connection {
        message: format!("{feature} support not enabled (enable cargo feature '{feature}')"),
    }
}

/// Split `row_count` rows into consecutive batches of at most `batch_size`.
pub(crate) fn batch_ranges(row_count: usize, batch_size: usize) -> Vec<Range<usize>> {
    let step = batch_size.max(1);
    let mut out = Vec::with_capacity(row_count.div_ceil(step));
    let mut start = 0;
    while start < row_count {
        let end = (start + step).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}

/// Wrap a mid-write failure: once any batch has committed, the error becomes
/// a partial write carrying the committed row count.
pub(crate) fn fail_after(written: usize, err: LoadError) -> LoadError {
    if written > 0 {
        LoadError::PartialWrite {
            written,
            source: Box::new(err),
        }
    } else {
        err
    }
}

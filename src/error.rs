use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by readers, sinks, and the loader facades.
///
/// This is a single error enum shared across all supported file formats and
/// database targets. Nothing is retried or recovered internally; every failure
/// is surfaced to the caller with the path/table/diagnostic needed to act on it.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file extension does not map to a supported source format.
    #[error("unsupported source format '{extension}'")]
    UnsupportedFormat { extension: String },

    /// The source file does not exist.
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The source file exists but cannot be opened for reading.
    #[error("access denied: {}", .path.display())]
    AccessDenied { path: PathBuf },

    /// Underlying I/O error other than not-found/permission-denied.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// DBF reading error.
    #[error("dbf error: {0}")]
    Dbf(#[from] dbase::Error),

    #[cfg(feature = "excel")]
    /// Excel/workbook reading error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[cfg(any(feature = "access", feature = "mssql"))]
    /// ODBC error from the Access reader or the SQL Server sink.
    #[error("odbc error: {0}")]
    Odbc(#[from] odbc_api::Error),

    #[cfg(feature = "sqlite")]
    /// SQLite driver error (feature-gated behind `sqlite`).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    /// PostgreSQL driver error (feature-gated behind `postgres`).
    #[error("postgres error: {0}")]
    Postgres(#[from] postgres::Error),

    #[cfg(feature = "mysql")]
    /// MySQL driver error (feature-gated behind `mysql`).
    #[error("mysql error: {0}")]
    Mysql(#[from] mysql::Error),

    #[cfg(feature = "oracle")]
    /// Oracle driver error (feature-gated behind `oracle`).
    #[error("oracle error: {0}")]
    Oracle(#[from] oracle::Error),

    /// A cell could not be converted into the inferred/declared column type.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    Parse {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A connection config file is missing, malformed, or lacks required parameters.
    #[error("config error: {message}")]
    Config { message: String },

    /// Could not open a connection to the target database.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// The data does not line up with the destination table (or with itself).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A constraint violation during insert (duplicate key, not-null, ...).
    ///
    /// `row_index` is the 0-based index of the offending row when the driver
    /// lets us determine it.
    #[error("integrity error{}: {message}", .row_index.map(|i| format!(" at row {i}")).unwrap_or_default())]
    Integrity {
        row_index: Option<usize>,
        message: String,
    },

    /// Some batches were committed before a later batch failed.
    ///
    /// Committed rows are NOT rolled back. Callers that need all-or-nothing
    /// semantics must wrap the load in their own transaction boundary.
    #[error("partial write: {written} row(s) committed before failure: {source}")]
    PartialWrite {
        written: usize,
        source: Box<LoadError>,
    },
}

//! Loader facades: the two caller-facing entry points.
//!
//! - [`DataLoader`] persists an already-built [`TabularData`].
//! - [`FileLoader`] composes the format readers with a database sink:
//!   read -> normalize -> write.
//!
//! Neither adds behavior beyond parameter defaulting, optional name
//! normalization, and observer reporting. A read failure never opens a
//! database connection; a write failure discards the read result.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::connection::ConnectionDescriptor;
use crate::error::LoadResult;
use crate::normalize::normalize_identifier;
use crate::observability::{
    LoadContext, LoadObserver, LoadSeverity, LoadStage, LoadStats, severity_for_error,
};
use crate::reader::{ReadOptions, read_from_path};
use crate::sink::{DEFAULT_BATCH_SIZE, Sink, WriteOptions, open_sink};
use crate::types::TabularData;

/// Destination table plus per-load behavior flags.
///
/// Constructed per invocation; never persisted.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Destination table name.
    pub table: String,
    /// Create the destination table when it does not exist.
    pub create_if_missing: bool,
    /// Remove all existing rows before inserting.
    pub truncate_first: bool,
    /// Rows per round trip; each batch commits on its own.
    pub batch_size: usize,
    /// Normalize column names (and the table name) into safe SQL identifiers.
    pub normalize_names: bool,
}

impl LoadRequest {
    /// A request with the default flags: create if missing, no truncate,
    /// batches of [`DEFAULT_BATCH_SIZE`], names normalized.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            create_if_missing: true,
            truncate_first: false,
            batch_size: DEFAULT_BATCH_SIZE,
            normalize_names: true,
        }
    }
}

/// Loads an already-in-memory [`TabularData`] into a database table.
///
/// # Examples
///
/// ```no_run
/// use tabload::loader::{DataLoader, LoadRequest};
/// use tabload::connection::ConnectionDescriptor;
/// use tabload::types::{Column, DataType, TabularData, Value};
///
/// # fn main() -> Result<(), tabload::LoadError> {
/// let data = TabularData::new(vec![Column::new(
///     "id",
///     DataType::Integer,
///     vec![Value::Integer(1), Value::Integer(2)],
/// )])?;
///
/// let target = ConnectionDescriptor::Sqlite { path: "local.db".into() };
/// let written = DataLoader::new(data).load(&target, &LoadRequest::new("ids"))?;
/// assert_eq!(written, 2);
/// # Ok(())
/// # }
/// ```
pub struct DataLoader {
    data: TabularData,
    observer: Option<Arc<dyn LoadObserver>>,
    alert_at_or_above: LoadSeverity,
}

impl DataLoader {
    /// Create a loader for `data`.
    ///
    /// Well-formedness (equal column lengths, values matching declared
    /// types) is enforced by [`TabularData::new`], so any value accepted
    /// here is already valid.
    pub fn new(data: TabularData) -> Self {
        Self {
            data,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }

    /// Report load outcomes to `observer`, alerting at `threshold` or above.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>, threshold: LoadSeverity) -> Self {
        self.observer = Some(observer);
        self.alert_at_or_above = threshold;
        self
    }

    /// Write all rows to the described database, returning the count written.
    pub fn load(&self, target: &ConnectionDescriptor, request: &LoadRequest) -> LoadResult<usize> {
        let mut sink = open_sink(target)?;
        self.load_into(sink.as_mut(), request)
    }

    /// Write through an explicit [`Sink`].
    ///
    /// This is the seam the facade tests use with a fake sink.
    pub fn load_into(&self, sink: &mut dyn Sink, request: &LoadRequest) -> LoadResult<usize> {
        write_stage(
            &self.data,
            "<memory>",
            sink,
            request,
            self.observer.as_deref(),
            self.alert_at_or_above,
        )
    }
}

/// Reads a source file and loads it into a database table.
///
/// # Examples
///
/// ```no_run
/// use tabload::loader::{FileLoader, LoadRequest};
/// use tabload::connection::ConnectionDescriptor;
/// use tabload::reader::ReadOptions;
///
/// # fn main() -> Result<(), tabload::LoadError> {
/// let loader = FileLoader::new("people.csv", ReadOptions::default());
/// let target = ConnectionDescriptor::Sqlite { path: "local.db".into() };
/// let written = loader.load(&target, &LoadRequest::new("people"))?;
/// println!("loaded {written} rows");
/// # Ok(())
/// # }
/// ```
pub struct FileLoader {
    path: PathBuf,
    options: ReadOptions,
    observer: Option<Arc<dyn LoadObserver>>,
    alert_at_or_above: LoadSeverity,
}

impl FileLoader {
    /// Create a loader for the file at `path`.
    pub fn new(path: impl AsRef<Path>, options: ReadOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }

    /// Report load outcomes to `observer`, alerting at `threshold` or above.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>, threshold: LoadSeverity) -> Self {
        self.observer = Some(observer);
        self.alert_at_or_above = threshold;
        self
    }

    /// Read and normalize the source file without touching any database.
    pub fn read(&self) -> LoadResult<TabularData> {
        let ctx = LoadContext {
            stage: LoadStage::Read,
            source: self.path.display().to_string(),
            table: None,
        };
        let result = read_from_path(&self.path, &self.options);
        self.report(&ctx, &result, |data| data.row_count());
        result
    }

    /// Read the file, then write all rows to the described database.
    ///
    /// Fails with whichever error the first failing stage produces. If
    /// reading fails, no connection is opened; if writing fails, the read
    /// result is discarded.
    pub fn load(&self, target: &ConnectionDescriptor, request: &LoadRequest) -> LoadResult<usize> {
        let data = self.read()?;
        let mut sink = open_sink(target)?;
        write_stage(
            &data,
            &self.path.display().to_string(),
            sink.as_mut(),
            request,
            self.observer.as_deref(),
            self.alert_at_or_above,
        )
    }

    /// Read the file, then write through an explicit [`Sink`].
    pub fn load_into(&self, sink: &mut dyn Sink, request: &LoadRequest) -> LoadResult<usize> {
        let data = self.read()?;
        write_stage(
            &data,
            &self.path.display().to_string(),
            sink,
            request,
            self.observer.as_deref(),
            self.alert_at_or_above,
        )
    }

    fn report<T>(
        &self,
        ctx: &LoadContext,
        result: &LoadResult<T>,
        rows: impl Fn(&T) -> usize,
    ) {
        notify(self.observer.as_deref(), self.alert_at_or_above, ctx, result, rows);
    }
}

fn write_stage(
    data: &TabularData,
    source: &str,
    sink: &mut dyn Sink,
    request: &LoadRequest,
    observer: Option<&dyn LoadObserver>,
    alert_at_or_above: LoadSeverity,
) -> LoadResult<usize> {
    let (data, table): (Cow<'_, TabularData>, String) = if request.normalize_names {
        let mut normalized = data.clone();
        normalized.normalize_column_names();
        (Cow::Owned(normalized), normalize_identifier(&request.table))
    } else {
        (Cow::Borrowed(data), request.table.clone())
    };

    let options = WriteOptions {
        create_if_missing: request.create_if_missing,
        truncate_first: request.truncate_first,
        batch_size: request.batch_size,
    };

    let ctx = LoadContext {
        stage: LoadStage::Write,
        source: source.to_string(),
        table: Some(table.clone()),
    };
    let result = sink.write(&data, &table, &options);
    notify(observer, alert_at_or_above, &ctx, &result, |written| *written);
    result
}

fn notify<T>(
    observer: Option<&dyn LoadObserver>,
    alert_at_or_above: LoadSeverity,
    ctx: &LoadContext,
    result: &LoadResult<T>,
    rows: impl Fn(&T) -> usize,
) {
    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(value) => obs.on_success(ctx, LoadStats { rows: rows(value) }),
        Err(e) => {
            let severity = severity_for_error(e);
            obs.on_failure(ctx, severity, e);
            if severity >= alert_at_or_above {
                obs.on_alert(ctx, severity, e);
            }
        }
    }
}

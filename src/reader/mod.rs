//! Source format dispatch and unified reading.
//!
//! Most callers should use [`read_from_path`], which inspects the file
//! extension (case-insensitive), routes to the matching format reader, and
//! returns an in-memory [`crate::types::TabularData`].
//!
//! Format-specific functions are also available under:
//! - [`delimited`]
//! - [`dbf`]
//! - [`excel`] (feature `excel`)
//! - [`access`] (feature `access`)

pub mod delimited;
pub mod dbf;
#[cfg(feature = "excel")]
pub mod excel;
#[cfg(feature = "access")]
pub mod access;

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::types::TabularData;

pub use delimited::TextEncoding;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (CSV/TSV/flat files).
    Delimited,
    /// dBASE table file.
    Dbf,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
    /// Microsoft Access database file (feature-gated behind `access`).
    Access,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" | "tsv" | "tab" | "dat" => Some(Self::Delimited),
            "dbf" => Some(Self::Dbf),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            "accdb" | "mdb" => Some(Self::Access),
            _ => None,
        }
    }
}

/// Options controlling how a source file is read.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// If `None`, the format is inferred from the file extension.
    pub format: Option<SourceFormat>,
    /// Field delimiter for delimited text. If `None`, `.tsv`/`.tab` files get
    /// a tab and everything else a comma.
    pub delimiter: Option<u8>,
    /// Honor `"` quoting in delimited text. Off by default, matching flat
    /// exports that use bare separators.
    pub quoting: bool,
    /// Text encoding for delimited files. If `None`, UTF-8 is tried first
    /// with a fallback to Windows-1252.
    pub encoding: Option<TextEncoding>,
    /// Excel sheet to read. If `None`, the first sheet is used.
    pub sheet: Option<String>,
    /// Table to extract from an Access database. Required for Access sources.
    pub access_table: Option<String>,
    /// Normalize column names into safe SQL identifiers after reading.
    pub normalize_names: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            quoting: false,
            encoding: None,
            sheet: None,
            access_table: None,
            normalize_names: false,
        }
    }
}

/// Read a source file into an in-memory [`TabularData`].
///
/// - If `options.format` is `None`, the format is inferred from the file
///   extension; unrecognized extensions fail with
///   [`LoadError::UnsupportedFormat`] before the file (or any database) is
///   touched.
/// - A missing file is [`LoadError::NotFound`]; an unreadable one is
///   [`LoadError::AccessDenied`].
///
/// # Examples
///
/// ```no_run
/// use tabload::reader::{read_from_path, ReadOptions};
///
/// # fn main() -> Result<(), tabload::LoadError> {
/// // Uses `.csv` to select the delimited-text reader.
/// let data = read_from_path("people.csv", &ReadOptions::default())?;
/// println!("rows={}", data.row_count());
/// # Ok(())
/// # }
/// ```
pub fn read_from_path(path: impl AsRef<Path>, options: &ReadOptions) -> LoadResult<TabularData> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    probe_readable(path)?;

    let mut data = match fmt {
        SourceFormat::Delimited => delimited::read_delimited_from_path(path, options)?,
        SourceFormat::Dbf => dbf::read_dbf_from_path(path)?,
        SourceFormat::Excel => read_excel_dispatch(path, options.sheet.as_deref())?,
        SourceFormat::Access => read_access_dispatch(path, options.access_table.as_deref())?,
    };

    if options.normalize_names {
        data.normalize_column_names();
    }
    Ok(data)
}

fn infer_format_from_path(path: &Path) -> LoadResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LoadError::UnsupportedFormat {
            extension: format!("<none> ({})", path.display()),
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| LoadError::UnsupportedFormat {
        extension: ext.to_string(),
    })
}

/// Classify missing/unreadable files before handing the path to a format
/// library. The handle is dropped immediately; readers reopen the file.
fn probe_readable(path: &Path) -> LoadResult<()> {
    match File::open(path) {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Err(LoadError::NotFound {
                path: path.to_path_buf(),
            }),
            ErrorKind::PermissionDenied => Err(LoadError::AccessDenied {
                path: path.to_path_buf(),
            }),
            _ => Err(LoadError::Io(e)),
        },
    }
}

fn read_excel_dispatch(path: &Path, sheet: Option<&str>) -> LoadResult<TabularData> {
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        excel::read_excel_from_path(path, sheet)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(LoadError::Config {
            message: "excel reading not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

fn read_access_dispatch(path: &Path, table: Option<&str>) -> LoadResult<TabularData> {
    let _ = (path, table);

    #[cfg(feature = "access")]
    {
        let table = table.ok_or_else(|| LoadError::Config {
            message: "access sources need ReadOptions::access_table".to_string(),
        })?;
        access::read_access_from_path(path, table)
    }

    #[cfg(not(feature = "access"))]
    {
        Err(LoadError::Config {
            message: "access reading not enabled (enable cargo feature 'access')".to_string(),
        })
    }
}

//! Delimited text (CSV/TSV/flat file) reading.
//!
//! A header row is required. Column types are inferred by scanning every
//! value: a column where all non-empty cells parse as integers becomes
//! [`DataType::Integer`], then float, boolean, ISO date, and finally text.
//! Empty cells become [`Value::Null`].

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;

use crate::error::{LoadError, LoadResult};
use crate::types::{Column, DataType, TabularData, Value};

/// Text encoding of a delimited source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 (strict).
    Utf8,
    /// Windows-1252 / CP1252, the usual fallback for legacy flat exports.
    Cp1252,
}

/// Read a delimited text file into an in-memory [`TabularData`].
///
/// The delimiter defaults to a tab for `.tsv`/`.tab` files and a comma
/// otherwise. When no encoding is given, UTF-8 is tried first and the file is
/// re-decoded as CP1252 if that fails (CP1252 decoding is total).
pub fn read_delimited_from_path(
    path: impl AsRef<Path>,
    options: &super::ReadOptions,
) -> LoadResult<TabularData> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let text = decode(bytes, options.encoding)?;
    let delimiter = options.delimiter.unwrap_or_else(|| default_delimiter(path));
    read_delimited_from_str(&text, delimiter, options.quoting)
}

/// Read delimited data from an in-memory string.
pub fn read_delimited_from_str(
    input: &str,
    delimiter: u8,
    quoting: bool,
) -> LoadResult<TabularData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .quoting(quoting)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    columns_from_strings(headers, &rows)
}

fn default_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

fn decode(bytes: Vec<u8>, encoding: Option<TextEncoding>) -> LoadResult<String> {
    match encoding {
        Some(TextEncoding::Utf8) => String::from_utf8(bytes).map_err(invalid_utf8),
        Some(TextEncoding::Cp1252) => Ok(WINDOWS_1252.decode(&bytes).0.into_owned()),
        None => match String::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(e) => Ok(WINDOWS_1252.decode(e.as_bytes()).0.into_owned()),
        },
    }
}

fn invalid_utf8(e: std::string::FromUtf8Error) -> LoadError {
    let pos = e.utf8_error().valid_up_to();
    let line = e.as_bytes()[..pos].iter().filter(|&&b| b == b'\n').count() + 1;
    LoadError::Io(io::Error::new(
        ErrorKind::InvalidData,
        format!("invalid utf-8 on line {line} (try TextEncoding::Cp1252)"),
    ))
}

/// Build typed columns from string cells by per-column type inference.
///
/// Shared with the Access reader, which also sees untyped text through ODBC.
pub(crate) fn columns_from_strings(
    headers: Vec<String>,
    rows: &[Vec<String>],
) -> LoadResult<TabularData> {
    let mut columns = Vec::with_capacity(headers.len());
    for (j, name) in headers.into_iter().enumerate() {
        let cells: Vec<&str> = rows
            .iter()
            .map(|r| r.get(j).map(String::as_str).unwrap_or(""))
            .collect();
        let data_type = infer_type(&cells);

        let mut values = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let value = typed_value(data_type, cell).map_err(|message| LoadError::Parse {
                // 1-based, +1 again because the header is row 1.
                row: i + 2,
                column: name.clone(),
                raw: (*cell).to_string(),
                message,
            })?;
            values.push(value);
        }
        columns.push(Column::new(name, data_type, values));
    }
    TabularData::new(columns)
}

/// Pick the narrowest type every non-empty cell parses as.
fn infer_type(cells: &[&str]) -> DataType {
    let mut non_empty = 0usize;
    let (mut int, mut float, mut boolean, mut date) = (true, true, true, true);
    for cell in cells {
        let t = cell.trim();
        if t.is_empty() {
            continue;
        }
        non_empty += 1;
        int = int && t.parse::<i64>().is_ok();
        float = float && t.parse::<f64>().is_ok();
        boolean = boolean && parse_bool(t).is_ok();
        date = date && NaiveDate::parse_from_str(t, "%Y-%m-%d").is_ok();
    }
    if non_empty == 0 {
        return DataType::Text;
    }
    if int {
        DataType::Integer
    } else if float {
        DataType::Float
    } else if boolean {
        DataType::Boolean
    } else if date {
        DataType::Date
    } else {
        DataType::Text
    }
}

fn typed_value(data_type: DataType, raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Text => Ok(Value::Text(trimmed.to_owned())),
        DataType::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| e.to_string()),
        DataType::Float => trimmed
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        DataType::Boolean => parse_bool(trimmed).map(Value::Boolean),
        DataType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| e.to_string()),
    }
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

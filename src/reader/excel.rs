#![cfg(feature = "excel")]

//! Excel/workbook reading (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
//!
//! Behavior:
//! - Picks the named sheet if provided; otherwise the first sheet
//! - Detects the first non-empty row as the header row
//! - Unifies cell types per column (ints, floats, bools, dates, else text)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use crate::error::{LoadError, LoadResult};
use crate::types::{Column, DataType, TabularData, Value};

/// Read one sheet of a workbook into an in-memory [`TabularData`].
pub fn read_excel_from_path(
    path: impl AsRef<Path>,
    sheet: Option<&str>,
) -> LoadResult<TabularData> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(s) => s.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::SchemaMismatch {
                message: "workbook has no sheets".to_string(),
            })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    read_sheet_range(&sheet_name, &range)
}

fn read_sheet_range(sheet: &str, range: &calamine::Range<Data>) -> LoadResult<TabularData> {
    let mut header_row_idx: Option<usize> = None;
    let mut headers: Vec<String> = Vec::new();
    for (idx0, row) in range.rows().enumerate() {
        if row.iter().any(|c| !matches!(c, Data::Empty)) {
            header_row_idx = Some(idx0);
            headers = row.iter().map(cell_to_header_string).collect();
            break;
        }
    }
    let header_row_idx = header_row_idx.ok_or_else(|| LoadError::SchemaMismatch {
        message: format!("sheet '{sheet}' has no non-empty rows (no header row found)"),
    })?;

    let body: Vec<&[Data]> = range
        .rows()
        .enumerate()
        .filter(|(idx0, _)| *idx0 > header_row_idx)
        .map(|(_, row)| row)
        .collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (j, name) in headers.into_iter().enumerate() {
        let data_type = unify_column_type(body.iter().map(|row| row.get(j).unwrap_or(&Data::Empty)));

        let mut values = Vec::with_capacity(body.len());
        for (i, row) in body.iter().enumerate() {
            // Report 1-based row numbers (Excel-like); +1 skips past the header.
            let user_row = header_row_idx + i + 2;
            let cell = row.get(j).unwrap_or(&Data::Empty);
            values.push(convert_cell(user_row, &name, data_type, cell)?);
        }
        columns.push(Column::new(name, data_type, values));
    }

    TabularData::new(columns)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    Date,
    Text,
}

fn classify(c: &Data) -> Option<CellKind> {
    match c {
        Data::Empty => None,
        Data::Int(_) => Some(CellKind::Int),
        Data::Float(f) => Some(if f.fract() == 0.0 {
            CellKind::Int
        } else {
            CellKind::Float
        }),
        Data::Bool(_) => Some(CellKind::Bool),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(CellKind::Date),
        Data::String(_) | Data::DurationIso(_) | Data::Error(_) => Some(CellKind::Text),
    }
}

/// Unify per-cell kinds into one column type: all-int stays integer, numeric
/// mixes widen to float, and any other mix degrades to text.
fn unify_column_type<'a>(cells: impl Iterator<Item = &'a Data>) -> DataType {
    let mut unified: Option<CellKind> = None;
    for kind in cells.filter_map(classify) {
        unified = Some(match unified {
            None => kind,
            Some(current) if current == kind => current,
            Some(CellKind::Int) if kind == CellKind::Float => CellKind::Float,
            Some(CellKind::Float) if kind == CellKind::Int => CellKind::Float,
            Some(_) => CellKind::Text,
        });
    }
    match unified {
        Some(CellKind::Int) => DataType::Integer,
        Some(CellKind::Float) => DataType::Float,
        Some(CellKind::Bool) => DataType::Boolean,
        Some(CellKind::Date) => DataType::Date,
        Some(CellKind::Text) | None => DataType::Text,
    }
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> LoadResult<Value> {
    if matches!(c, Data::Empty) {
        return Ok(Value::Null);
    }

    let parse_err = |raw: String, message: &str| LoadError::Parse {
        row,
        column: column.to_string(),
        raw,
        message: message.to_string(),
    };

    match data_type {
        DataType::Text => Ok(Value::Text(cell_to_string(c))),
        DataType::Integer => match c {
            Data::Int(i) => Ok(Value::Integer(*i)),
            Data::Float(f) if f.fract() == 0.0 => Ok(Value::Integer(*f as i64)),
            other => Err(parse_err(other.to_string(), "expected integer")),
        },
        DataType::Float => match c {
            Data::Int(i) => Ok(Value::Float(*i as f64)),
            Data::Float(f) => Ok(Value::Float(*f)),
            other => Err(parse_err(other.to_string(), "expected number")),
        },
        DataType::Boolean => match c {
            Data::Bool(b) => Ok(Value::Boolean(*b)),
            other => Err(parse_err(other.to_string(), "expected bool")),
        },
        DataType::Date => match c {
            Data::DateTime(edt) => edt
                .as_datetime()
                .map(|dt| Value::Date(dt.date()))
                .ok_or_else(|| parse_err(c.to_string(), "unrepresentable excel date")),
            Data::DateTimeIso(s) => {
                let head = s.get(..10).unwrap_or(s.as_str());
                NaiveDate::parse_from_str(head, "%Y-%m-%d")
                    .map(Value::Date)
                    .map_err(|e| parse_err(s.clone(), &e.to_string()))
            }
            other => Err(parse_err(other.to_string(), "expected date")),
        },
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

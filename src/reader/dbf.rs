//! DBF (dBASE/FoxPro table file) reading.
//!
//! Field names and types come from the table header; byte-level parsing is
//! delegated to the `dbase` crate, including character-encoding handling.

use std::path::Path;

use chrono::NaiveDate;
use dbase::{FieldType, FieldValue};

use crate::error::{LoadError, LoadResult};
use crate::types::{Column, DataType, TabularData, Value};

/// Read a DBF file into an in-memory [`TabularData`].
pub fn read_dbf_from_path(path: impl AsRef<Path>) -> LoadResult<TabularData> {
    let mut reader = dbase::Reader::from_path(path)?;

    let fields: Vec<(String, DataType)> = reader
        .fields()
        .iter()
        .map(|f| (f.name().to_string(), map_field_type(f.field_type())))
        .collect();

    let mut columns: Vec<Column> = fields
        .iter()
        .map(|(name, dt)| Column::new(name.clone(), *dt, Vec::new()))
        .collect();

    for (row_idx, result) in reader.iter_records().enumerate() {
        let record = result?;
        for (col, (name, _)) in columns.iter_mut().zip(fields.iter()) {
            let value = match record.get(name) {
                Some(fv) => convert_field(row_idx + 1, name, fv)?,
                None => Value::Null,
            };
            col.values.push(value);
        }
    }

    TabularData::new(columns)
}

fn map_field_type(ft: FieldType) -> DataType {
    match ft {
        FieldType::Character | FieldType::Memo => DataType::Text,
        FieldType::Numeric | FieldType::Float | FieldType::Double | FieldType::Currency => {
            DataType::Float
        }
        FieldType::Integer => DataType::Integer,
        FieldType::Logical => DataType::Boolean,
        FieldType::Date => DataType::Date,
        // DateTime and anything exotic round-trips as text.
        _ => DataType::Text,
    }
}

fn convert_field(row: usize, column: &str, fv: &FieldValue) -> LoadResult<Value> {
    let value = match fv {
        FieldValue::Character(opt) => opt.clone().map(Value::Text).unwrap_or(Value::Null),
        FieldValue::Memo(s) => Value::Text(s.clone()),
        FieldValue::Numeric(opt) => opt.map(Value::Float).unwrap_or(Value::Null),
        FieldValue::Float(opt) => opt.map(|f| Value::Float(f64::from(f))).unwrap_or(Value::Null),
        FieldValue::Double(d) => Value::Float(*d),
        FieldValue::Currency(c) => Value::Float(*c),
        FieldValue::Integer(i) => Value::Integer(i64::from(*i)),
        FieldValue::Logical(opt) => opt.map(Value::Boolean).unwrap_or(Value::Null),
        FieldValue::Date(opt) => match opt {
            Some(d) => Value::Date(naive_date(row, column, d)?),
            None => Value::Null,
        },
        FieldValue::DateTime(dt) => {
            let d = dt.date();
            let t = dt.time();
            Value::Text(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                d.year(),
                d.month(),
                d.day(),
                t.hours(),
                t.minutes(),
                t.seconds()
            ))
        }
        #[allow(unreachable_patterns)]
        other => Value::Text(format!("{other:?}")),
    };
    Ok(value)
}

fn naive_date(row: usize, column: &str, d: &dbase::Date) -> LoadResult<NaiveDate> {
    NaiveDate::from_ymd_opt(d.year() as i32, d.month(), d.day()).ok_or_else(|| LoadError::Parse {
        row,
        column: column.to_string(),
        raw: format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()),
        message: "invalid calendar date".to_string(),
    })
}

//! Core data model types.
//!
//! Readers produce an in-memory [`TabularData`] (ordered, typed, column-major
//! columns); sinks consume it. The only mutation supported after creation is
//! column-name normalization applied before persistence.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{LoadError, LoadResult};
use crate::normalize::normalize_identifier;

/// Logical data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// UTF-8 string.
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point number.
    Float,
    /// Calendar date (no time component).
    Date,
    /// Boolean.
    Boolean,
}

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// UTF-8 string.
    Text(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Boolean.
    Boolean(bool),
}

impl Value {
    /// Whether this value can live in a column of `data_type`.
    pub fn fits(&self, data_type: DataType) -> bool {
        matches!(
            (self, data_type),
            (Value::Null, _)
                | (Value::Text(_), DataType::Text)
                | (Value::Integer(_), DataType::Integer)
                | (Value::Float(_), DataType::Float)
                | (Value::Date(_), DataType::Date)
                | (Value::Boolean(_), DataType::Boolean)
        )
    }
}

impl fmt::Display for Value {
    /// Text rendering used for byte-length sizing and text-typed bindings.
    ///
    /// Nulls render empty; booleans render `TRUE`/`FALSE`; dates render ISO-8601.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// A named, typed column and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, verbatim from the source unless normalized.
    pub name: String,
    /// Declared data type; every value is of this type or [`Value::Null`].
    pub data_type: DataType,
    /// Column values, one per row.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from a name, type, and value vector.
    pub fn new(name: impl Into<String>, data_type: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            data_type,
            values,
        }
    }

    /// Maximum UTF-8 byte length of the rendered values.
    ///
    /// Used to size VARCHAR-family columns on dialects that need it.
    pub fn max_byte_len(&self) -> usize {
        self.values
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(0)
    }
}

/// In-memory table: ordered columns of equal length.
///
/// Invariants, checked by [`TabularData::new`]:
///
/// - every column has the same number of values
/// - every value matches its column's declared [`DataType`] (or is null)
#[derive(Debug, Clone, PartialEq)]
pub struct TabularData {
    columns: Vec<Column>,
}

impl TabularData {
    /// Create a table from columns, validating shape and types.
    pub fn new(columns: Vec<Column>) -> LoadResult<Self> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            for col in &columns {
                if col.values.len() != expected {
                    return Err(LoadError::SchemaMismatch {
                        message: format!(
                            "column '{}' has {} value(s), expected {}",
                            col.name,
                            col.values.len(),
                            expected
                        ),
                    });
                }
                if let Some(bad) = col.values.iter().position(|v| !v.fits(col.data_type)) {
                    return Err(LoadError::SchemaMismatch {
                        message: format!(
                            "column '{}' declared {:?} but row {bad} holds {:?}",
                            col.name, col.data_type, col.values[bad]
                        ),
                    });
                }
            }
        }
        Ok(Self { columns })
    }

    /// Columns in source order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// The values of row `i`, in column order.
    ///
    /// # Panics
    ///
    /// Panics if `i >= row_count()`.
    pub fn row(&self, i: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[i]).collect()
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> {
        (0..self.row_count()).map(|i| self.row(i))
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Rewrite every column name into a safe SQL identifier.
    ///
    /// Names that collide after normalization are disambiguated with a
    /// numeric suffix, in column order. Deterministic and total; calling it
    /// twice is a no-op.
    pub fn normalize_column_names(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.columns.len());
        for col in &mut self.columns {
            let base = normalize_identifier(&col.name);
            let mut candidate = base.clone();
            let mut n = 2;
            while seen.iter().any(|s| s == &candidate) {
                candidate = format!("{base}_{n}");
                n += 1;
            }
            seen.push(candidate.clone());
            col.name = candidate;
        }
    }
}

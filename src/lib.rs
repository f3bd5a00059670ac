//! `tabload` is a small library for loading tabular data into a relational
//! database. Sources can be files on disk (delimited text, DBF, Excel
//! workbooks, Access databases) or an already-built in-memory
//! [`types::TabularData`]. Targets are SQLite, PostgreSQL, MySQL, SQL Server,
//! and Oracle, each behind its own cargo feature.
//!
//! Parsing is delegated to format crates (`csv`, `dbase`, `calamine`,
//! `odbc-api`) and persistence to driver crates; this library's own job is
//! extension dispatch, column-name normalization, explicit type mapping per
//! dialect, and batched inserts.
//!
//! ## What you can load
//!
//! **File formats (auto-detected by extension):**
//!
//! - **Delimited text**: `.csv`, `.txt`, `.tsv`, `.tab`, `.dat`
//! - **DBF**: `.dbf`
//! - **Excel/workbooks** (requires the cargo feature `excel`): `.xlsx`,
//!   `.xls`, `.xlsm`, `.xlsb`, `.ods`
//! - **Access** (requires the cargo feature `access` and an ODBC driver):
//!   `.accdb`, `.mdb`
//!
//! **Column types:**
//!
//! Reading produces a [`types::TabularData`] whose columns carry a declared
//! [`types::DataType`] ([`types::DataType::Text`], [`types::DataType::Integer`],
//! [`types::DataType::Float`], [`types::DataType::Date`], or
//! [`types::DataType::Boolean`]), taken from the source's own typing for
//! DBF/Excel and inferred by value scanning for delimited text and Access.
//! Empty cells map to [`types::Value::Null`].
//!
//! ## Quick example: file to SQLite
//!
//! ```no_run
//! use tabload::loader::{FileLoader, LoadRequest};
//! use tabload::connection::ConnectionDescriptor;
//! use tabload::reader::ReadOptions;
//!
//! # fn main() -> Result<(), tabload::LoadError> {
//! let loader = FileLoader::new("people.csv", ReadOptions::default());
//! let target = ConnectionDescriptor::Sqlite { path: "staging.db".into() };
//!
//! // Creates the table if missing, inserts in batches, returns rows written.
//! let written = loader.load(&target, &LoadRequest::new("people"))?;
//! println!("loaded {written} rows");
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick example: in-memory data
//!
//! ```no_run
//! use tabload::loader::{DataLoader, LoadRequest};
//! use tabload::connection::ConnectionDescriptor;
//! use tabload::types::{Column, DataType, TabularData, Value};
//!
//! # fn main() -> Result<(), tabload::LoadError> {
//! let data = TabularData::new(vec![
//!     Column::new("name", DataType::Text, vec![
//!         Value::Text("Ada".to_string()),
//!         Value::Text("Grace".to_string()),
//!     ]),
//!     Column::new("age", DataType::Integer, vec![
//!         Value::Integer(36),
//!         Value::Integer(41),
//!     ]),
//! ])?;
//!
//! let target = ConnectionDescriptor::Sqlite { path: "staging.db".into() };
//! let mut request = LoadRequest::new("people");
//! request.truncate_first = true;
//! DataLoader::new(data).load(&target, &request)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Behavior worth knowing
//!
//! - **Unsupported extensions** fail with [`LoadError::UnsupportedFormat`]
//!   before the file or any database is touched.
//! - **Batches commit independently.** A failure after the first committed
//!   batch surfaces as [`LoadError::PartialWrite`] carrying the committed row
//!   count; nothing is rolled back. Wrap the load in your own transaction
//!   boundary if you need all-or-nothing semantics.
//! - **Name normalization** ([`normalize::normalize_identifier`]) is
//!   deterministic and total: lower-cased, ASCII-transliterated, punctuation
//!   folded to `_`, keywords suffixed. It is on by default in
//!   [`loader::LoadRequest`].
//! - **Connections and file handles are scoped** to each load call and
//!   released on every exit path.
//!
//! ## Modules
//!
//! - [`loader`]: the [`loader::DataLoader`] / [`loader::FileLoader`] facades
//! - [`reader`]: extension dispatch and format readers
//! - [`sink`]: the [`sink::Sink`] trait, per-database sinks, dialect tables
//! - [`types`]: the in-memory table model
//! - [`connection`]: target descriptors and credentials-file loading
//! - [`normalize`]: SQL identifier normalization
//! - [`observability`]: optional load outcome reporting
//! - [`error`]: the shared error type

pub mod connection;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod observability;
pub mod reader;
pub mod sink;
pub mod types;

pub use error::{LoadError, LoadResult};

use tabload::LoadError;
use tabload::loader::{DataLoader, FileLoader, LoadRequest};
use tabload::reader::ReadOptions;
use tabload::sink::{Sink, WriteOptions};
use tabload::types::{Column, DataType, TabularData, Value};

/// A sink that records what it was asked to write instead of touching a
/// database.
#[derive(Default)]
struct RecordingSink {
    table: Option<String>,
    column_names: Vec<String>,
    options: Option<WriteOptions>,
    rows_seen: usize,
    fail_with: Option<fn() -> LoadError>,
}

impl Sink for RecordingSink {
    fn write(
        &mut self,
        data: &TabularData,
        table: &str,
        options: &WriteOptions,
    ) -> Result<usize, LoadError> {
        if let Some(make) = self.fail_with {
            return Err(make());
        }
        self.table = Some(table.to_string());
        self.column_names = data.columns().iter().map(|c| c.name.clone()).collect();
        self.options = Some(options.clone());
        self.rows_seen = data.row_count();
        Ok(data.row_count())
    }
}

fn permits() -> TabularData {
    TabularData::new(vec![
        Column::new(
            "Permit #",
            DataType::Text,
            vec![Value::Text("A-1".into()), Value::Text("A-2".into())],
        ),
        Column::new(
            "Año",
            DataType::Integer,
            vec![Value::Integer(2020), Value::Integer(2021)],
        ),
    ])
    .unwrap()
}

#[test]
fn data_loader_normalizes_names_by_default() {
    let mut sink = RecordingSink::default();
    let written = DataLoader::new(permits())
        .load_into(&mut sink, &LoadRequest::new("2020 Permits"))
        .unwrap();

    assert_eq!(written, 2);
    assert_eq!(sink.table.as_deref(), Some("a2020_permits"));
    assert_eq!(sink.column_names, vec!["permit_no", "ano"]);
}

#[test]
fn data_loader_passes_names_verbatim_when_asked() {
    let mut sink = RecordingSink::default();
    let mut request = LoadRequest::new("2020 Permits");
    request.normalize_names = false;

    DataLoader::new(permits())
        .load_into(&mut sink, &request)
        .unwrap();

    assert_eq!(sink.table.as_deref(), Some("2020 Permits"));
    assert_eq!(sink.column_names, vec!["Permit #", "Año"]);
}

#[test]
fn data_loader_forwards_behavior_flags() {
    let mut sink = RecordingSink::default();
    let mut request = LoadRequest::new("permits");
    request.truncate_first = true;
    request.create_if_missing = false;
    request.batch_size = 7;

    DataLoader::new(permits())
        .load_into(&mut sink, &request)
        .unwrap();

    let opts = sink.options.unwrap();
    assert!(opts.truncate_first);
    assert!(!opts.create_if_missing);
    assert_eq!(opts.batch_size, 7);
}

#[test]
fn ragged_columns_are_rejected_at_construction() {
    let err = TabularData::new(vec![
        Column::new("a", DataType::Integer, vec![Value::Integer(1)]),
        Column::new("b", DataType::Integer, vec![]),
    ])
    .unwrap_err();
    assert!(matches!(err, LoadError::SchemaMismatch { .. }), "{err}");
}

#[test]
fn mistyped_values_are_rejected_at_construction() {
    let err = TabularData::new(vec![Column::new(
        "a",
        DataType::Integer,
        vec![Value::Text("oops".into())],
    )])
    .unwrap_err();
    assert!(matches!(err, LoadError::SchemaMismatch { .. }), "{err}");
}

#[test]
fn colliding_normalized_names_stay_distinct() {
    let data = TabularData::new(vec![
        Column::new("Name", DataType::Text, vec![Value::Null]),
        Column::new("name!", DataType::Text, vec![Value::Null]),
    ])
    .unwrap();

    let mut sink = RecordingSink::default();
    DataLoader::new(data)
        .load_into(&mut sink, &LoadRequest::new("t"))
        .unwrap();
    assert_eq!(sink.column_names, vec!["name", "name_2"]);
}

#[test]
fn file_loader_skips_the_sink_when_reading_fails() {
    let mut sink = RecordingSink::default();
    let loader = FileLoader::new("missing.csv", ReadOptions::default());
    let err = loader
        .load_into(&mut sink, &LoadRequest::new("t"))
        .unwrap_err();

    assert!(matches!(err, LoadError::NotFound { .. }), "{err}");
    assert!(sink.table.is_none(), "sink must not be reached");
}

#[test]
fn file_loader_reads_then_writes() {
    let mut sink = RecordingSink::default();
    let loader = FileLoader::new("tests/fixtures/people.csv", ReadOptions::default());
    let written = loader
        .load_into(&mut sink, &LoadRequest::new("people"))
        .unwrap();

    assert_eq!(written, 3);
    assert_eq!(sink.rows_seen, 3);
    assert_eq!(sink.column_names, vec!["name", "age"]);
}

#[test]
fn sink_failures_pass_through_unchanged() {
    let mut sink = RecordingSink {
        fail_with: Some(|| LoadError::Integrity {
            row_index: Some(1),
            message: "duplicate key".into(),
        }),
        ..Default::default()
    };
    let err = DataLoader::new(permits())
        .load_into(&mut sink, &LoadRequest::new("t"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Integrity { row_index: Some(1), .. }), "{err}");
}

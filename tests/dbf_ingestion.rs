use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dbase::{FieldValue, Record, TableWriterBuilder};
use tabload::reader::{ReadOptions, read_from_path};
use tabload::types::{DataType, Value};

fn tmp_file() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabload-dbf-{nanos}.dbf"))
}

fn write_people_dbf(path: &PathBuf) {
    let mut writer = TableWriterBuilder::new()
        .add_character_field("NAME".try_into().unwrap(), 50)
        .add_numeric_field("SCORE".try_into().unwrap(), 10, 2)
        .add_logical_field("ACTIVE".try_into().unwrap())
        .build_with_file_dest(path)
        .unwrap();

    let mut r1 = Record::default();
    r1.insert("NAME".to_string(), FieldValue::Character(Some("Ada".to_string())));
    r1.insert("SCORE".to_string(), FieldValue::Numeric(Some(98.5)));
    r1.insert("ACTIVE".to_string(), FieldValue::Logical(Some(true)));

    let mut r2 = Record::default();
    r2.insert("NAME".to_string(), FieldValue::Character(None));
    r2.insert("SCORE".to_string(), FieldValue::Numeric(None));
    r2.insert("ACTIVE".to_string(), FieldValue::Logical(Some(false)));

    writer.write_records(&[r1, r2]).unwrap();
}

#[test]
fn reads_field_types_from_the_table_header() {
    let path = tmp_file();
    write_people_dbf(&path);

    let data = read_from_path(&path, &ReadOptions::default()).unwrap();

    assert_eq!(data.row_count(), 2);
    let types: Vec<DataType> = data.columns().iter().map(|c| c.data_type).collect();
    assert_eq!(types, vec![DataType::Text, DataType::Float, DataType::Boolean]);

    assert_eq!(data.columns()[0].values[0], Value::Text("Ada".to_string()));
    assert_eq!(data.columns()[1].values[0], Value::Float(98.5));
    assert_eq!(data.columns()[2].values[1], Value::Boolean(false));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn empty_dbf_fields_become_nulls() {
    let path = tmp_file();
    write_people_dbf(&path);

    let data = read_from_path(&path, &ReadOptions::default()).unwrap();
    assert_eq!(data.columns()[0].values[1], Value::Null);
    assert_eq!(data.columns()[1].values[1], Value::Null);

    let _ = std::fs::remove_file(&path);
}

#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::Workbook;
use tabload::reader::{ReadOptions, read_from_path};
use tabload::types::{DataType, Value};

fn tmp_file() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabload-excel-{nanos}.xlsx"))
}

fn write_people_workbook(path: &PathBuf) {
    let mut wb = Workbook::new();

    let ws1 = wb.add_worksheet();
    ws1.set_name("People").unwrap();
    ws1.write_string(0, 0, "id").unwrap();
    ws1.write_string(0, 1, "name").unwrap();
    ws1.write_string(0, 2, "score").unwrap();
    ws1.write_string(0, 3, "active").unwrap();
    ws1.write_number(1, 0, 1).unwrap();
    ws1.write_string(1, 1, "Ada").unwrap();
    ws1.write_number(1, 2, 98.5).unwrap();
    ws1.write_boolean(1, 3, true).unwrap();
    ws1.write_number(2, 0, 2).unwrap();
    ws1.write_string(2, 1, "Grace").unwrap();
    ws1.write_number(2, 2, 87.25).unwrap();
    ws1.write_boolean(2, 3, false).unwrap();

    let ws2 = wb.add_worksheet();
    ws2.set_name("Notes").unwrap();
    ws2.write_string(0, 0, "nothing").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn reads_first_sheet_by_default() {
    let path = tmp_file();
    write_people_workbook(&path);

    let data = read_from_path(&path, &ReadOptions::default()).unwrap();

    assert_eq!(data.row_count(), 2);
    let types: Vec<DataType> = data.columns().iter().map(|c| c.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Integer,
            DataType::Text,
            DataType::Float,
            DataType::Boolean
        ]
    );
    assert_eq!(data.columns()[0].values[0], Value::Integer(1));
    assert_eq!(data.columns()[1].values[1], Value::Text("Grace".to_string()));
    assert_eq!(data.columns()[3].values[0], Value::Boolean(true));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn reads_a_named_sheet() {
    let path = tmp_file();
    write_people_workbook(&path);

    let opts = ReadOptions {
        sheet: Some("Notes".to_string()),
        ..Default::default()
    };
    let data = read_from_path(&path, &opts).unwrap();
    assert_eq!(data.column_count(), 1);
    assert_eq!(data.row_count(), 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_sheet_surfaces_the_library_diagnostic() {
    let path = tmp_file();
    write_people_workbook(&path);

    let opts = ReadOptions {
        sheet: Some("NoSuchSheet".to_string()),
        ..Default::default()
    };
    let err = read_from_path(&path, &opts).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("excel") || msg.contains("NoSuchSheet"), "{msg}");

    let _ = std::fs::remove_file(&path);
}

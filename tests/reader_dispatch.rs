use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tabload::LoadError;
use tabload::reader::{ReadOptions, SourceFormat, read_from_path};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabload-dispatch-{nanos}.{ext}"))
}

#[test]
fn routes_every_supported_extension() {
    for ext in ["csv", "txt", "tsv", "tab", "dat", "CSV", "Txt"] {
        assert_eq!(
            SourceFormat::from_extension(ext),
            Some(SourceFormat::Delimited),
            "extension {ext}"
        );
    }
    assert_eq!(SourceFormat::from_extension("dbf"), Some(SourceFormat::Dbf));
    assert_eq!(SourceFormat::from_extension("DBF"), Some(SourceFormat::Dbf));
    for ext in ["xlsx", "xls", "xlsm", "xlsb", "ods"] {
        assert_eq!(
            SourceFormat::from_extension(ext),
            Some(SourceFormat::Excel),
            "extension {ext}"
        );
    }
    assert_eq!(SourceFormat::from_extension("accdb"), Some(SourceFormat::Access));
    assert_eq!(SourceFormat::from_extension("mdb"), Some(SourceFormat::Access));
}

#[test]
fn unknown_extensions_do_not_route() {
    for ext in ["json", "parquet", "xml", ""] {
        assert_eq!(SourceFormat::from_extension(ext), None, "extension {ext}");
    }
}

#[test]
fn unsupported_extension_fails_before_touching_the_file() {
    // The path does not exist; dispatch must reject it on extension alone.
    let err = read_from_path("does_not_exist.json", &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }), "{err}");
}

#[test]
fn extensionless_path_is_unsupported() {
    let err = read_from_path("no_extension_here", &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }), "{err}");
}

#[test]
fn missing_file_with_supported_extension_is_not_found() {
    let err = read_from_path("definitely_missing.csv", &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }), "{err}");
}

#[test]
fn explicit_format_overrides_extension_inference() {
    let path = tmp_file("dump");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "id,name").unwrap();
    writeln!(f, "1,Ada").unwrap();
    drop(f);

    let opts = ReadOptions {
        format: Some(SourceFormat::Delimited),
        ..Default::default()
    };
    let data = read_from_path(&path, &opts).unwrap();
    assert_eq!(data.row_count(), 1);
    assert_eq!(data.column_count(), 2);

    let _ = std::fs::remove_file(&path);
}

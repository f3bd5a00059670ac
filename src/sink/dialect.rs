//! Per-dialect SQL building: type names, identifier quoting, placeholders.
//!
//! The mapping is an explicit table, not inferred from the driver. Text
//! columns on VARCHAR-family dialects are sized from the column's maximum
//! rendered byte length.

use crate::connection::DbKind;
use crate::types::{Column, DataType, TabularData};

/// Quote an identifier for the target dialect.
pub fn quote_ident(kind: DbKind, name: &str) -> String {
    match kind {
        DbKind::Mysql => format!("`{}`", name.replace('`', "``")),
        DbKind::SqlServer => format!("[{}]", name.replace(']', "]]")),
        _ => format!("\"{}\"", name.replace('"', "\"\"")),
    }
}

/// Positional placeholder for 1-based parameter `i`.
pub fn placeholder(kind: DbKind, i: usize) -> String {
    match kind {
        DbKind::Postgres => format!("${i}"),
        DbKind::Oracle => format!(":{i}"),
        _ => "?".to_string(),
    }
}

/// SQL column type for one column of the data.
pub fn column_type(kind: DbKind, column: &Column) -> String {
    match column.data_type {
        DataType::Text => text_type(kind, column.max_byte_len()),
        DataType::Integer => match kind {
            DbKind::Sqlite => "INTEGER".to_string(),
            DbKind::Oracle => "NUMBER(19)".to_string(),
            _ => "BIGINT".to_string(),
        },
        DataType::Float => match kind {
            DbKind::Sqlite => "REAL".to_string(),
            DbKind::Postgres => "DOUBLE PRECISION".to_string(),
            DbKind::Mysql => "DOUBLE".to_string(),
            DbKind::SqlServer => "FLOAT".to_string(),
            DbKind::Oracle => "BINARY_DOUBLE".to_string(),
        },
        DataType::Date => "DATE".to_string(),
        DataType::Boolean => match kind {
            DbKind::Postgres => "BOOLEAN".to_string(),
            DbKind::Mysql => "TINYINT(1)".to_string(),
            DbKind::SqlServer => "BIT".to_string(),
            DbKind::Oracle => "NUMBER(1)".to_string(),
            DbKind::Sqlite => "INTEGER".to_string(),
        },
    }
}

fn text_type(kind: DbKind, max_len: usize) -> String {
    match kind {
        DbKind::Oracle => {
            if max_len <= 1000 {
                "VARCHAR2(1000)".to_string()
            } else if max_len <= 4000 {
                "VARCHAR2(4000)".to_string()
            } else {
                "CLOB".to_string()
            }
        }
        DbKind::SqlServer => {
            if max_len <= 1000 {
                "VARCHAR(1000)".to_string()
            } else if max_len <= 4000 {
                "VARCHAR(4000)".to_string()
            } else {
                "VARCHAR(MAX)".to_string()
            }
        }
        DbKind::Mysql => {
            if max_len <= 65_535 {
                "TEXT".to_string()
            } else if max_len <= 16_777_215 {
                "MEDIUMTEXT".to_string()
            } else {
                "LONGTEXT".to_string()
            }
        }
        DbKind::Postgres | DbKind::Sqlite => "TEXT".to_string(),
    }
}

/// `CREATE TABLE` statement for the data's columns.
pub fn create_table_sql(kind: DbKind, table: &str, data: &TabularData) -> String {
    let cols = data
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(kind, &c.name), column_type(kind, c)))
        .collect::<Vec<_>>()
        .join(",");
    format!("CREATE TABLE {}({cols})", quote_ident(kind, table))
}

/// Positional-parameter `INSERT` statement for the data's columns.
pub fn insert_sql(kind: DbKind, table: &str, data: &TabularData) -> String {
    let names = data
        .columns()
        .iter()
        .map(|c| quote_ident(kind, &c.name))
        .collect::<Vec<_>>()
        .join(",");
    let marks = (1..=data.column_count())
        .map(|i| placeholder(kind, i))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "INSERT INTO {}({names}) VALUES ({marks})",
        quote_ident(kind, table)
    )
}

/// Multi-row `INSERT` covering `rows` rows in one statement.
///
/// Placeholders are numbered row-major: `VALUES ($1,$2),($3,$4),...`.
pub fn multirow_insert_sql(kind: DbKind, table: &str, data: &TabularData, rows: usize) -> String {
    let names = data
        .columns()
        .iter()
        .map(|c| quote_ident(kind, &c.name))
        .collect::<Vec<_>>()
        .join(",");
    let ncols = data.column_count();
    let groups = (0..rows)
        .map(|r| {
            let marks = (1..=ncols)
                .map(|c| placeholder(kind, r * ncols + c))
                .collect::<Vec<_>>()
                .join(",");
            format!("({marks})")
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "INSERT INTO {}({names}) VALUES {groups}",
        quote_ident(kind, table)
    )
}

/// Statement removing all rows. SQLite has no `TRUNCATE`.
pub fn truncate_sql(kind: DbKind, table: &str) -> String {
    match kind {
        DbKind::Sqlite => format!("DELETE FROM {}", quote_ident(kind, table)),
        _ => format!("TRUNCATE TABLE {}", quote_ident(kind, table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType, TabularData, Value};

    fn people() -> TabularData {
        TabularData::new(vec![
            Column::new(
                "name",
                DataType::Text,
                vec![Value::Text("Ada".into()), Value::Text("Grace".into())],
            ),
            Column::new(
                "age",
                DataType::Integer,
                vec![Value::Integer(36), Value::Integer(41)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn postgres_insert_uses_dollar_placeholders() {
        let sql = insert_sql(DbKind::Postgres, "people", &people());
        assert_eq!(sql, "INSERT INTO \"people\"(\"name\",\"age\") VALUES ($1,$2)");
    }

    #[test]
    fn multirow_insert_numbers_placeholders_row_major() {
        let sql = multirow_insert_sql(DbKind::Postgres, "people", &people(), 3);
        assert!(sql.ends_with("VALUES ($1,$2),($3,$4),($5,$6)"), "{sql}");
    }

    #[test]
    fn oracle_insert_uses_numbered_binds() {
        let sql = insert_sql(DbKind::Oracle, "people", &people());
        assert!(sql.ends_with("VALUES (:1,:2)"));
    }

    #[test]
    fn mysql_quotes_with_backticks() {
        let sql = create_table_sql(DbKind::Mysql, "people", &people());
        assert!(sql.starts_with("CREATE TABLE `people`(`name` TEXT,`age` BIGINT)"));
    }

    #[test]
    fn sqlite_create_maps_types() {
        let sql = create_table_sql(DbKind::Sqlite, "people", &people());
        assert_eq!(sql, "CREATE TABLE \"people\"(\"name\" TEXT,\"age\" INTEGER)");
    }

    #[test]
    fn oracle_text_widens_by_byte_length() {
        let long = "x".repeat(2000);
        let data = TabularData::new(vec![Column::new(
            "notes",
            DataType::Text,
            vec![Value::Text(long)],
        )])
        .unwrap();
        assert_eq!(column_type(DbKind::Oracle, &data.columns()[0]), "VARCHAR2(4000)");
    }

    #[test]
    fn truncate_is_delete_on_sqlite() {
        assert_eq!(truncate_sql(DbKind::Sqlite, "t"), "DELETE FROM \"t\"");
        assert_eq!(truncate_sql(DbKind::Postgres, "t"), "TRUNCATE TABLE \"t\"");
    }
}

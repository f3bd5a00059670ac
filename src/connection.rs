//! Target database description and credentials loading.
//!
//! A [`ConnectionDescriptor`] names one of the supported database kinds plus
//! the parameters that kind needs. Descriptors can be built directly or read
//! from a JSON credentials file keyed by dialect name (`"sqlite"`,
//! `"postgresql"`, `"mysql"`, `"sqlserver"`, `"oracle"`), e.g.:
//!
//! ```json
//! {
//!     "postgresql": { "host": "db1", "user": "loader", "password": "...", "dbname": "staging" },
//!     "sqlite": { "path": "local.db" }
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LoadError, LoadResult};

/// Supported database kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Sqlite,
    Postgres,
    Mysql,
    SqlServer,
    Oracle,
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgresql",
            DbKind::Mysql => "mysql",
            DbKind::SqlServer => "sqlserver",
            DbKind::Oracle => "oracle",
        };
        f.write_str(s)
    }
}

/// Identifies a target database and the parameters needed to connect to it.
///
/// Immutable once constructed; owned by the loader call that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionDescriptor {
    /// SQLite database file.
    Sqlite { path: PathBuf },
    /// PostgreSQL server.
    Postgres {
        host: String,
        port: u16,
        user: String,
        password: String,
        dbname: String,
    },
    /// MySQL server.
    Mysql {
        host: String,
        port: u16,
        user: String,
        password: String,
        dbname: String,
    },
    /// SQL Server instance, reached through ODBC.
    SqlServer {
        host: String,
        port: Option<u16>,
        user: String,
        password: String,
        dbname: String,
        /// ODBC driver name.
        driver: String,
    },
    /// Oracle service.
    Oracle {
        host: String,
        port: u16,
        service: String,
        user: String,
        password: String,
    },
}

impl ConnectionDescriptor {
    /// The database kind this descriptor targets.
    pub fn kind(&self) -> DbKind {
        match self {
            ConnectionDescriptor::Sqlite { .. } => DbKind::Sqlite,
            ConnectionDescriptor::Postgres { .. } => DbKind::Postgres,
            ConnectionDescriptor::Mysql { .. } => DbKind::Mysql,
            ConnectionDescriptor::SqlServer { .. } => DbKind::SqlServer,
            ConnectionDescriptor::Oracle { .. } => DbKind::Oracle,
        }
    }

    /// Load the entry named `key` from a JSON credentials file.
    ///
    /// The key doubles as the dialect name, matching how the original config
    /// files were laid out. A missing file, missing key, or missing parameter
    /// is a [`LoadError::Config`].
    pub fn from_json_file(path: impl AsRef<Path>, key: &str) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LoadError::Config {
            message: format!("cannot read credentials file {}: {e}", path.display()),
        })?;
        let doc: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| LoadError::Config {
                message: format!("invalid credentials file {}: {e}", path.display()),
            })?;
        let entry = doc.get(key).ok_or_else(|| LoadError::Config {
            message: format!("no '{key}' entry in {}", path.display()),
        })?;
        Self::from_keyed_value(key, entry)
    }

    fn from_keyed_value(key: &str, entry: &serde_json::Value) -> LoadResult<Self> {
        let bad = |e: serde_json::Error| LoadError::Config {
            message: format!("invalid '{key}' connection parameters: {e}"),
        };
        match key.to_ascii_lowercase().as_str() {
            "sqlite" => {
                let p: SqliteParams = serde_json::from_value(entry.clone()).map_err(bad)?;
                Ok(ConnectionDescriptor::Sqlite { path: p.path })
            }
            "postgresql" => {
                let p: ServerParams = serde_json::from_value(entry.clone()).map_err(bad)?;
                Ok(ConnectionDescriptor::Postgres {
                    host: p.host,
                    port: p.port.unwrap_or(5432),
                    user: p.user,
                    password: p.password,
                    dbname: p.dbname,
                })
            }
            "mysql" => {
                let p: ServerParams = serde_json::from_value(entry.clone()).map_err(bad)?;
                Ok(ConnectionDescriptor::Mysql {
                    host: p.host,
                    port: p.port.unwrap_or(3306),
                    user: p.user,
                    password: p.password,
                    dbname: p.dbname,
                })
            }
            "sqlserver" => {
                let p: SqlServerParams = serde_json::from_value(entry.clone()).map_err(bad)?;
                Ok(ConnectionDescriptor::SqlServer {
                    host: p.host,
                    port: p.port,
                    user: p.user,
                    password: p.password,
                    dbname: p.dbname,
                    driver: p
                        .driver
                        .unwrap_or_else(|| "ODBC Driver 17 for SQL Server".to_string()),
                })
            }
            "oracle" => {
                let p: OracleParams = serde_json::from_value(entry.clone()).map_err(bad)?;
                Ok(ConnectionDescriptor::Oracle {
                    host: p.host,
                    port: p.port.unwrap_or(1521),
                    service: p.service,
                    user: p.user,
                    password: p.password,
                })
            }
            other => Err(LoadError::Config {
                message: format!("database dialect '{other}' misspelled or not supported"),
            }),
        }
    }
}

#[derive(Deserialize)]
struct SqliteParams {
    path: PathBuf,
}

#[derive(Deserialize)]
struct ServerParams {
    host: String,
    port: Option<u16>,
    user: String,
    password: String,
    dbname: String,
}

#[derive(Deserialize)]
struct SqlServerParams {
    host: String,
    port: Option<u16>,
    user: String,
    password: String,
    dbname: String,
    driver: Option<String>,
}

#[derive(Deserialize)]
struct OracleParams {
    host: String,
    port: Option<u16>,
    service: String,
    user: String,
    password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_value_postgres_defaults_port() {
        let entry = serde_json::json!({
            "host": "db1", "user": "u", "password": "p", "dbname": "d"
        });
        let desc = ConnectionDescriptor::from_keyed_value("postgresql", &entry).unwrap();
        assert_eq!(desc.kind(), DbKind::Postgres);
        assert!(matches!(desc, ConnectionDescriptor::Postgres { port: 5432, .. }));
    }

    #[test]
    fn keyed_value_reports_missing_parameter() {
        let entry = serde_json::json!({ "host": "db1" });
        let err = ConnectionDescriptor::from_keyed_value("mysql", &entry).unwrap_err();
        assert!(err.to_string().contains("connection parameters"));
    }

    #[test]
    fn unknown_dialect_is_a_config_error() {
        let entry = serde_json::json!({});
        let err = ConnectionDescriptor::from_keyed_value("mariadb", &entry).unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }
}

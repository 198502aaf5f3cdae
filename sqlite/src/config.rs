//! Connection configuration for [`Database`](crate::Database).
//!
//! Configuration is plain serde data, loaded from YAML or JSON depending on
//! the file extension. Missing keys take their default values.
//!
//! # Example YAML
//!
//! ```yaml
//! path: data/app.db
//! create_if_missing: true
//! read_only: false
//! multi_statements: true
//! busy_timeout_ms: 5000
//! foreign_keys: true
//! escaping: quote_doubling
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};
use sqlstring_core::Escaping;

use crate::error::{Result, SqliteError};

/// Settings used when opening a [`Database`](crate::Database).
///
/// The default opens a private in-memory database.
///
/// # Examples
///
/// ```
/// # use sqlstring_sqlite::Config;
/// let config: Config = serde_yaml::from_str("multi_statements: true").unwrap();
/// assert!(config.multi_statements);
/// assert!(config.path.is_none());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// Create the file when it does not exist.
    pub create_if_missing: bool,
    /// Open without write access. Requires `create_if_missing: false`.
    pub read_only: bool,
    /// Allow several `;`-separated statements in one unparameterized query.
    pub multi_statements: bool,
    /// How long to wait on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Enforce foreign key constraints.
    pub foreign_keys: bool,
    /// String escaping for literals spliced into statements.
    ///
    /// SQLite does not treat backslashes specially, so quote doubling is the
    /// right choice unless the text is bound for a MySQL server.
    pub escaping: Escaping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            create_if_missing: true,
            read_only: false,
            multi_statements: false,
            busy_timeout_ms: 5000,
            foreign_keys: true,
            escaping: Escaping::QuoteDoubling,
        }
    }
}

impl Config {
    /// Configuration for a database file at `path` with default settings.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Loads configuration from a `.json` file, or YAML for any other extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SqliteError::IoError) if the file cannot be read,
    /// [`JsonError`](SqliteError::JsonError) or
    /// [`YamlError`](SqliteError::YamlError) if parsing fails, and
    /// [`InvalidConfig`](SqliteError::InvalidConfig) if the loaded values
    /// fail [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let config: Self = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration, as JSON for a `.json` path and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SqliteError::IoError) if the file cannot be
    /// written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Checks that the settings can be combined.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](SqliteError::InvalidConfig) when a read-only
    /// database is also asked to be created, or is in memory.
    pub fn validate(&self) -> Result<()> {
        if self.read_only && self.create_if_missing {
            return Err(SqliteError::InvalidConfig(
                "read_only and create_if_missing cannot both be set".to_string(),
            ));
        }
        if self.read_only && self.path.is_none() {
            return Err(SqliteError::InvalidConfig(
                "an in-memory database cannot be read-only".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if self.create_if_missing {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }
        flags
    }

    pub(crate) fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_in_memory() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert!(config.create_if_missing);
        assert!(!config.multi_statements);
        assert_eq!(config.escaping, Escaping::QuoteDoubling);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("busy_timeout_ms: 250\nescaping: backslash\n").unwrap();
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.escaping, Escaping::Backslash);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.yml");
        let mut config = Config::with_path("data/app.db");
        config.multi_statements = true;
        config.save(&file).unwrap();

        let loaded = Config::load(&file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.JSON");
        std::fs::write(&file, r#"{"path": "x.db", "read_only": true, "create_if_missing": false}"#)
            .unwrap();

        let loaded = Config::load(&file).unwrap();
        assert_eq!(loaded.path, Some(PathBuf::from("x.db")));
        assert!(loaded.read_only);
        assert!(loaded.open_flags().contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!loaded.open_flags().contains(OpenFlags::SQLITE_OPEN_CREATE));
    }

    #[test]
    fn test_load_rejects_conflicting_flags() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.yaml");
        std::fs::write(&file, "path: x.db\nread_only: true\n").unwrap();
        assert!(matches!(Config::load(&file), Err(SqliteError::InvalidConfig(_))));
    }

    #[test]
    fn test_read_only_in_memory_is_invalid() {
        let config = Config {
            read_only: true,
            create_if_missing: false,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(SqliteError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/sqlstring.yml"),
            Err(SqliteError::IoError(_))
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.yml");
        std::fs::write(&file, "busy_timeout_ms: [not, a, number]\n").unwrap();
        assert!(matches!(Config::load(&file), Err(SqliteError::YamlError(_))));
    }
}

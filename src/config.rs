//! Where the records database lives. The location is resolved once at startup
//! and handed to [`crate::db::Database`]; nothing else in the crate reads the
//! environment or the filesystem for configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-records";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "records.sqlite";
/// Optional settings file inside the application data directory.
const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment override for the database location.
pub const DB_ENV_VAR: &str = "STUDENT_RECORDS_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database_path: Option<PathBuf>,
}

impl Config {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    /// Resolve the database path: an explicit path wins, then the
    /// `STUDENT_RECORDS_DB` variable, then `config.toml`, then the default file
    /// in the data directory.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        if let Some(path) = env::var_os(DB_ENV_VAR).filter(|value| !value.is_empty()) {
            return Ok(Self::new(path));
        }

        let data_dir = data_dir()?;
        let file = read_config_file(&data_dir.join(CONFIG_FILE_NAME))?;
        let database_path = file
            .database_path
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));
        Ok(Self::new(database_path))
    }
}

/// Parse the settings file, treating a missing file as all defaults.
fn read_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_takes_precedence() {
        let config = Config::load(Some(PathBuf::from("/tmp/explicit.sqlite"))).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/explicit.sqlite"));
    }

    #[test]
    fn config_file_overrides_database_path() {
        let file: ConfigFile = toml::from_str("database_path = \"/srv/records.sqlite\"").unwrap();
        assert_eq!(
            file.database_path,
            Some(PathBuf::from("/srv/records.sqlite"))
        );
    }

    #[test]
    fn empty_config_file_uses_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert!(file.database_path.is_none());
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let file = read_config_file(Path::new("/nonexistent/student-records/config.toml")).unwrap();
        assert!(file.database_path.is_none());
    }
}

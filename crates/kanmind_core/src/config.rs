//! Runtime configuration resolved from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `KANMIND_DB_PATH` | `<temp dir>/kanmind.sqlite3` |
//! | `KANMIND_LOG_LEVEL` | `debug` in debug builds, `info` otherwise |
//! | `KANMIND_LOG_DIR` | unset: no file logging |

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "KANMIND_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "KANMIND_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "KANMIND_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "kanmind.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_VAR).map_or(defaults.db_path, PathBuf::from),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }
}

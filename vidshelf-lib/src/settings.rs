//! Application settings (database location, store tuning, scanner filters).
//!
//! The settings file is `~/.config/vidshelf/settings.toml`. Every key is
//! optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vidshelf_db::StoreConfig;
use vidshelf_db::config::DEFAULT_RETRY_DELAY_MS;

use crate::error::SettingsError;
use crate::scanner::{DEFAULT_MIN_SIZE, DEFAULT_SUFFIXES, ScanOptions};

/// Canonical path to the settings file: `~/.config/vidshelf/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("vidshelf").join("settings.toml")
}

/// Default catalog location: `~/.local/share/vidshelf/vidshelf.db`.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("vidshelf").join("vidshelf.db")
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub scanner: ScannerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub retry_delay_ms: u64,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            busy_timeout_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub min_size: u64,
    /// Zero means one worker per available CPU.
    pub workers: usize,
    pub suffixes: Vec<String>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            workers: 0,
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Load from [`settings_path`].
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = self.to_toml()?;
        // Write atomically
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// The settings as pretty-printed TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve the database path:
    ///
    /// 1. CLI override (if `Some`)
    /// 2. `database.path` from the settings file
    /// 3. [`default_database_path`]
    pub fn database_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.database.path.clone())
            .unwrap_or_else(default_database_path)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            retry_delay_ms: self.database.retry_delay_ms,
            busy_timeout_ms: self.database.busy_timeout_ms,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        let workers = match self.scanner.workers {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        };
        ScanOptions::new(self.scanner.min_size, &self.scanner.suffixes, workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::parse(
            r#"
            [database]
            path = "/srv/videos.db"

            [scanner]
            min_size = 1024
            "#,
        )
        .unwrap();
        assert_eq!(settings.database.path, Some(PathBuf::from("/srv/videos.db")));
        assert_eq!(settings.database.retry_delay_ms, DEFAULT_RETRY_DELAY_MS);
        assert_eq!(settings.scanner.min_size, 1024);
        assert_eq!(settings.scanner.suffixes.len(), DEFAULT_SUFFIXES.len());
    }

    #[test]
    fn database_path_priority() {
        let mut settings = Settings::default();
        assert_eq!(settings.database_path(None), default_database_path());

        settings.database.path = Some(PathBuf::from("/from/settings.db"));
        assert_eq!(settings.database_path(None), PathBuf::from("/from/settings.db"));
        assert_eq!(
            settings.database_path(Some(PathBuf::from("/from/cli.db"))),
            PathBuf::from("/from/cli.db")
        );
    }

    #[test]
    fn store_config_follows_database_section() {
        let settings = Settings::parse("[database]\nretry_delay_ms = 5\nbusy_timeout_ms = 100\n").unwrap();
        let config = settings.store_config();
        assert_eq!(config.retry_delay_ms, 5);
        assert_eq!(config.busy_timeout_ms, 100);
    }

    #[test]
    fn bad_types_are_rejected() {
        assert!(Settings::parse("[scanner]\nmin_size = \"big\"\n").is_err());
    }
}

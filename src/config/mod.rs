use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::utils::{ensure_dir, PathResolver};
use crate::errors::LedgerError;

const TMP_SUFFIX: &str = "tmp";
const MAX_DECIMAL_PLACES: u8 = 6;

/// User preferences persisted alongside the ledger data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    pub decimal_places: u8,
    pub data_file: String,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".into(),
            decimal_places: 2,
            data_file: "transactions".into(),
            backup_retention: 5,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 4] = [
        "currency_symbol",
        "decimal_places",
        "data_file",
        "backup_retention",
    ];

    /// Updates a single setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        let value = value.trim();
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "decimal_places" => {
                let places: u8 = value.parse().map_err(|_| invalid(key, value))?;
                if places > MAX_DECIMAL_PLACES {
                    return Err(invalid(key, value));
                }
                self.decimal_places = places;
            }
            "data_file" => {
                if value.is_empty() {
                    return Err(invalid(key, value));
                }
                self.data_file = value.to_string();
            }
            "backup_retention" => {
                let retention: usize = value.parse().map_err(|_| invalid(key, value))?;
                self.backup_retention = retention.max(1);
            }
            other => {
                return Err(LedgerError::Storage(format!(
                    "unknown config key `{}`",
                    other
                )))
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "currency_symbol" => Some(self.currency_symbol.clone()),
            "decimal_places" => Some(self.decimal_places.to_string()),
            "data_file" => Some(self.data_file.clone()),
            "backup_retention" => Some(self.backup_retention.to_string()),
            _ => None,
        }
    }
}

fn invalid(key: &str, value: &str) -> LedgerError {
    LedgerError::Storage(format!("invalid value `{}` for `{}`", value, key))
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Loads the stored configuration, falling back to defaults when none exists.
    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("currency_symbol", "$").unwrap();
        config.set("decimal_places", "3").unwrap();
        manager.save(&config).unwrap();
        assert!(manager.path().exists());
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "currency_symbol": "€" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.decimal_places, 2);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("decimal_places", "many").is_err());
        assert!(config.set("decimal_places", "12").is_err());
        assert!(config.set("data_file", " ").is_err());
        assert!(config.set("theme", "dark").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn get_reports_every_known_key() {
        let config = Config::default();
        for key in Config::KEYS {
            assert!(config.get(key).is_some(), "missing {key}");
        }
        assert_eq!(config.get("nope"), None);
    }
}

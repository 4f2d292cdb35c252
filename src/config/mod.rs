use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, config_file_in, data_dir_in, ensure_dir},
    domain::CalendarZone,
    errors::ConfigError,
    utils::DEFAULT_LOG_FILTER,
};

const TMP_SUFFIX: &str = "tmp";
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Fixed UTC offset for local-calendar interpretation. `None` follows the
    /// host's zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    /// Directory for persisted user documents. `None` keeps everything in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            data_dir: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(minutes) = self.utc_offset_minutes {
            if minutes.unsigned_abs() >= MAX_OFFSET_MINUTES.unsigned_abs() {
                return Err(ConfigError::Invalid(format!(
                    "utc_offset_minutes `{}` is outside ±18h",
                    minutes
                )));
            }
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }
        Ok(())
    }

    /// Zone used for local-calendar interpretation of transaction dates.
    pub fn zone(&self) -> CalendarZone {
        self.utc_offset_minutes
            .and_then(CalendarZone::from_offset_minutes)
            .unwrap_or_default()
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_base(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let config: Config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Persistence directory for `config`, falling back to `<base>/data`.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| data_dir_in(&self.base))
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

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(manager.data_dir(&config), dir.path().join("data"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            utc_offset_minutes: Some(-300),
            data_dir: Some(dir.path().join("docs")),
            log_filter: "fintrack_core=debug".into(),
        };
        manager.save(&config).unwrap();
        assert!(!manager.path().with_extension("json.tmp").exists());
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn rejects_impossible_offsets() {
        let config = Config {
            utc_offset_minutes: Some(24 * 60),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn hand_edited_extreme_offset_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"utc_offset_minutes": -2147483648}"#).unwrap();
        assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zone_uses_fixed_offset_when_configured() {
        let config = Config {
            utc_offset_minutes: Some(120),
            ..Config::default()
        };
        let instant = Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap();
        assert_eq!(
            config.zone().today(instant),
            chrono::NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
        assert_eq!(Config::default().zone(), CalendarZone::System);
    }
}

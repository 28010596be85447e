use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::forecast::DisplayZone;

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timezone = "Europe/Zurich"
/// ```
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// IANA zone used for forecast day/time labels. Unset means the system zone.
    pub timezone: Option<String>,

    /// Overrides the default location of the key-value store holding search history.
    pub store_file: Option<PathBuf>,
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timezone", &self.timezone)
            .field("store_file", &self.store_file)
            .finish()
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where search history lives unless `store_file` says otherwise.
    pub fn store_file_path(&self) -> Result<PathBuf> {
        match &self.store_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("store.json")),
        }
    }

    /// API key from the environment first, then the config file.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    pub fn api_key_with_env(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_timezone(&mut self, tz: Tz) {
        self.timezone = Some(tz.name().to_string());
    }

    /// Resolve the configured label zone. An unknown zone name is an error
    /// rather than a silent fallback to the system zone.
    pub fn display_zone(&self) -> Result<DisplayZone> {
        match self.timezone.as_deref() {
            None => Ok(DisplayZone::Local),
            Some(name) => parse_zone(name).map(DisplayZone::Named),
        }
    }
}

pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| {
        anyhow!(
            "Unknown timezone '{name}'.\n\
             Hint: use an IANA name such as `Europe/Paris` or `America/New_York`."
        )
    })
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_wins_over_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        assert_eq!(cfg.api_key_with_env(Some("ENV_KEY".into())).as_deref(), Some("ENV_KEY"));
        assert_eq!(cfg.api_key_with_env(None).as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let mut cfg = Config::default();
        assert_eq!(cfg.api_key_with_env(Some("  ".into())), None);

        cfg.set_api_key(String::new());
        assert_eq!(cfg.api_key_with_env(None), None);
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("SUPERSECRET".into());

        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("SUPERSECRET"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn unset_timezone_means_local() {
        let cfg = Config::default();
        assert_eq!(cfg.display_zone().expect("zone"), DisplayZone::Local);
    }

    #[test]
    fn named_timezone_is_parsed() {
        let mut cfg = Config::default();
        cfg.set_timezone(chrono_tz::Europe::Zurich);

        let zone = cfg.display_zone().expect("zone");
        assert_eq!(zone, DisplayZone::Named(chrono_tz::Europe::Zurich));
    }

    #[test]
    fn unknown_timezone_errors_with_hint() {
        let cfg = Config { timezone: Some("Mars/Olympus".into()), ..Config::default() };
        let err = cfg.display_zone().unwrap_err();
        assert!(err.to_string().contains("Unknown timezone 'Mars/Olympus'"));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            timezone: Some("Asia/Tokyo".into()),
            store_file: Some(PathBuf::from("/tmp/store.json")),
        };
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back: Config = toml::from_str(&text).expect("parse");

        assert_eq!(back.api_key.as_deref(), Some("KEY"));
        assert_eq!(back.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(back.store_file_path().expect("path"), PathBuf::from("/tmp/store.json"));
    }
}

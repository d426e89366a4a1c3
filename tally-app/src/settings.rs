//! Persistent host settings (JSON file in the user data directory).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_core::ResolverConfig;
use tracing::warn;

pub const ENV_FUZZY_FLOOR: &str = "TALLY_FUZZY_FLOOR";
pub const ENV_ALIAS_AUTOSAVE: &str = "TALLY_ALIAS_AUTOSAVE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub resolver: ResolverConfig,
    /// Pass the previous transcript along as `recentContext`.
    pub carry_recent_context: bool,
    pub pretty_json: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            carry_recent_context: true,
            pretty_json: false,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.resolver.normalize();
    }

    /// Apply `TALLY_*` overrides. Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_FUZZY_FLOOR) {
            match raw.trim().parse::<f64>() {
                Ok(floor) => self.resolver.fuzzy_floor = floor,
                Err(_) => warn!(value = %raw, "ignoring {ENV_FUZZY_FLOOR}"),
            }
        }
        if let Some(raw) = lookup(ENV_ALIAS_AUTOSAVE) {
            match parse_flag(&raw) {
                Some(flag) => self.resolver.allow_alias_auto_save = flag,
                None => warn!(value = %raw, "ignoring {ENV_ALIAS_AUTOSAVE}"),
            }
        }
        self.normalize();
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Lattice Labs")
            .join("Tally")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("tally")
            .join("settings.json")
    }
}

/// Missing or corrupt files fall back to defaults.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("absent.json"));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), AppSettings::default());
    }

    #[test]
    fn save_then_load_keeps_values_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = AppSettings::default();
        settings.resolver.fuzzy_floor = 1.7;
        settings.pretty_json = true;
        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path);
        assert_eq!(loaded.resolver.fuzzy_floor, 1.0);
        assert!(loaded.pretty_json);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"resolver": {"fuzzyFloor": 0.7}}"#).unwrap();

        let loaded = load_settings(&path);
        assert_eq!(loaded.resolver.fuzzy_floor, 0.7);
        assert_eq!(loaded.resolver.ambiguity_margin, 0.25);
        assert!(loaded.carry_recent_context);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut settings = AppSettings::default();
        settings.apply_overrides_from(|key| match key {
            ENV_FUZZY_FLOOR => Some("0.8".into()),
            ENV_ALIAS_AUTOSAVE => Some("off".into()),
            _ => None,
        });
        assert_eq!(settings.resolver.fuzzy_floor, 0.8);
        assert!(!settings.resolver.allow_alias_auto_save);
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut settings = AppSettings::default();
        settings.apply_overrides_from(|key| match key {
            ENV_FUZZY_FLOOR => Some("high".into()),
            ENV_ALIAS_AUTOSAVE => Some("maybe".into()),
            _ => None,
        });
        assert_eq!(settings, AppSettings::default());
    }
}

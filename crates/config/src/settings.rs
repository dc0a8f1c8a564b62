// Application settings
// Loaded from ~/.config/mousespeed/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "MOUSESPEED_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Preference store
    #[serde(rename = "store.program")]
    pub program: String,

    #[serde(rename = "store.schema")]
    pub schema: String,

    #[serde(rename = "store.key")]
    pub key: String,

    // Logging
    #[serde(rename = "log.level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program: "gsettings".to_string(),
            schema: "org.cinnamon.desktop.peripherals.mouse".to_string(),
            key: "speed".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Program used to read and write the preference
    "store.program": "gsettings",

    // GSettings schema and key of the pointer speed
    // GNOME: "org.gnome.desktop.peripherals.mouse"
    "store.schema": "org.cinnamon.desktop.peripherals.mouse",
    "store.key": "speed",

    // Log filter when MOUSESPEED_LOG is unset: "off", "error", "warn", "info", "debug"
    "log.level": "warn"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mousespeed")
            .join("settings.json")
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, creating a commented default file if it
    /// does not exist. Errors fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("warning: error parsing {}: {}", path.display(), e);
                    eprintln!("warning: using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("warning: error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("warning: error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            eprintln!("warning: error writing default settings file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_FILE).unwrap(), Settings::default());
    }

    #[test]
    fn missing_keys_use_defaults() {
        let s = Settings::parse(r#"{ "store.schema": "org.gnome.desktop.peripherals.mouse" }"#)
            .unwrap();
        assert_eq!(s.schema, "org.gnome.desktop.peripherals.mouse");
        assert_eq!(s.key, "speed");
        assert_eq!(s.program, "gsettings");
    }

    #[test]
    fn comment_lines_are_stripped() {
        let text = "{\n  // pick a program\n  \"store.program\": \"/usr/bin/gsettings\"\n}";
        let s = Settings::parse(text).unwrap();
        assert_eq!(s.program, "/usr/bin/gsettings");
    }

    #[test]
    fn load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings::load_from(&path);
        assert_eq!(s, Settings::default());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"store.key\": \"speed\""));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "log.level": "debug", "store.key": "accel" }"#).unwrap();
        let s = Settings::load_from(&path);
        assert_eq!(s.log_level, "debug");
        assert_eq!(s.key, "accel");
    }
}

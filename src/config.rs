//! Rule configuration.
//!
//! Configuration is stored in TOML. Categories are an array of tables so that
//! their order, which is the classification priority, is explicit in the file:
//!
//! ```toml
//! target_directory = "Organized_Files"
//! excluded_files = [".DS_Store", "desktop.ini"]
//! excluded_folders = ["Organized_Files"]
//!
//! [[categories]]
//! name = "Documents"
//! extensions = [".pdf", ".docx", ".txt"]
//!
//! [[categories]]
//! name = "Images"
//! extensions = [".jpg", ".png"]
//! ```
//!
//! A missing file is replaced by the default configuration, which is written
//! back to disk so it can be edited.

use crate::classifier::{Category, CategoryRules};
use crate::organizer::{ExclusionSet, Organizer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file at the given path.
    #[error("Configuration file not found: {}", .0.display())]
    Missing(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
    /// Configuration parsed but its values cannot be used.
    #[error("Invalid configuration value: {0}")]
    Validation(String),
    /// IO error while reading or writing configuration.
    #[error("IO error on configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One category entry of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category label and destination folder name.
    pub name: String,
    /// Extensions owned by the category, e.g. `".pdf"` (the leading dot is optional).
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Complete organizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Folder, relative to the source directory, that receives the category folders.
    #[serde(default = "default_target_directory")]
    pub target_directory: String,

    /// Exact file names that are never moved.
    #[serde(default)]
    pub excluded_files: Vec<String>,

    /// Exact folder names that are never moved.
    #[serde(default)]
    pub excluded_folders: Vec<String>,

    /// Default interval for `--schedule` when none is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<u64>,

    /// Categories in priority order.
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

fn default_target_directory() -> String {
    "Organized_Files".to_string()
}

fn category(name: &str, extensions: &[&str]) -> CategoryConfig {
    CategoryConfig {
        name: name.to_string(),
        extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_directory: default_target_directory(),
            excluded_files: vec![".DS_Store".to_string(), "desktop.ini".to_string()],
            excluded_folders: vec![default_target_directory()],
            interval_minutes: None,
            categories: vec![
                category(
                    "Documents",
                    &[".pdf", ".docx", ".txt", ".doc", ".rtf", ".odt"],
                ),
                category(
                    "Images",
                    &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp"],
                ),
                category("Videos", &[".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv"]),
                category("Audio", &[".mp3", ".wav", ".ogg", ".flac", ".aac"]),
                category("Archives", &[".zip", ".rar", ".7z", ".tar", ".gz"]),
                category(
                    "Code",
                    &[
                        ".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".go", ".php",
                    ],
                ),
            ],
        }
    }
}

impl Config {
    /// Default configuration location: `<config dir>/tidydesk/config.toml`.
    ///
    /// Falls back to `./tidydesk.toml` when the platform has no config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("tidydesk").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("tidydesk.toml"))
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the file does not exist.
    /// Returns `ConfigError::Invalid` if TOML parsing fails.
    /// Returns `ConfigError::Validation` if a value is unusable.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;

        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Loads the configuration at `path`, writing and returning the default if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Missing(_)) => {
                tracing::warn!(
                    path = %path.display(),
                    "Config file not found, creating default config"
                );
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Writes this configuration to `path` as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Checks that the target directory and category names can be used as folder names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let target = Path::new(&self.target_directory);
        if self.target_directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "target_directory must not be empty".to_string(),
            ));
        }
        if !target
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ConfigError::Validation(format!(
                "target_directory '{}' must be a relative path without '..'",
                self.target_directory
            )));
        }
        // "." or "./." would make the target the source itself
        if !target
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ConfigError::Validation(format!(
                "target_directory '{}' must name a folder inside the source directory",
                self.target_directory
            )));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            let name = category.name.as_str();
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "category name must not be empty".to_string(),
                ));
            }
            if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "category name '{}' is not a valid folder name",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "category '{}' is defined more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Ordered classification rules built from the category entries.
    pub fn category_rules(&self) -> CategoryRules {
        self.categories
            .iter()
            .map(|c| Category::new(c.name.clone(), &c.extensions))
            .collect()
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::new(
            self.excluded_files.iter().cloned(),
            self.excluded_folders.iter().cloned(),
        )
    }

    /// Builds an organizer for `source` from this configuration.
    pub fn organizer(&self, source: impl Into<PathBuf>) -> Organizer {
        Organizer::new(
            source,
            self.category_rules(),
            self.exclusions(),
            &self.target_directory,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_directory, "Organized_Files");
        assert!(config.excluded_folders.contains(&config.target_directory));
        assert_eq!(config.categories[0].name, "Documents");
    }

    #[test]
    fn test_default_rules_classify() {
        let rules = Config::default().category_rules();
        assert_eq!(rules.classify("report.PDF"), "Documents");
        assert_eq!(rules.classify("song.flac"), "Audio");
        assert_eq!(rules.classify("main.go"), "Code");
        assert_eq!(rules.classify("disk.iso"), "Other");
    }

    #[test]
    fn test_parse_preserves_category_order() {
        let content = r#"
            target_directory = "Sorted"
            excluded_files = ["Thumbs.db"]

            [[categories]]
            name = "Zeta"
            extensions = [".ts"]

            [[categories]]
            name = "Alpha"
            extensions = ["ts", "mp4"]
        "#;
        let config: Config = toml::from_str(content).expect("Failed to parse config");
        assert!(config.excluded_folders.is_empty());

        let rules = config.category_rules();
        assert_eq!(rules.classify("x.ts"), "Zeta");
        assert_eq!(rules.classify("x.MP4"), "Alpha");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("").expect("Empty config should parse");
        assert_eq!(config.target_directory, "Organized_Files");
        assert!(config.categories.is_empty());
        assert!(config.interval_minutes.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = Config::load(&temp_dir.path().join("config.toml"));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_or_create(&path).expect("Failed to create config");
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load(&path).expect("Failed to reload config");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "categories = [[[").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_escaping_target() {
        let config = Config {
            target_directory: "../elsewhere".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));

        let config = Config {
            target_directory: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_target_equal_to_source() {
        for target in [".", "./.", "./"] {
            let config = Config {
                target_directory: target.to_string(),
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "target {:?} should be rejected",
                target
            );
        }

        let config = Config {
            target_directory: "./Sorted".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "target_directory = \".\"\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_category_names() {
        let mut config = Config::default();
        config.categories.push(category("Documents", &[".md"]));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.categories.push(category("a/b", &[".md"]));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.categories.push(category("..", &[".md"]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_organizer_uses_target_directory() {
        let config = Config {
            target_directory: "Sorted".to_string(),
            ..Config::default()
        };
        let organizer = config.organizer("/tmp/desk");
        assert_eq!(organizer.target_dir(), PathBuf::from("/tmp/desk/Sorted"));
        assert_eq!(organizer.rules().len(), 6);
    }
}

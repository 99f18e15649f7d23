//! Configuration management for pmplan
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PMPLAN_*)
//! 3. Config file (~/.config/pmplan/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::{ExportOptions, PageSettings, DEFAULT_FILE_STEM};
use crate::{Error, Result};

/// Where plan state is kept
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file; defaults to the cache directory
    pub database_path: Option<PathBuf>,
}

/// Export settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exports are written to
    pub output_dir: PathBuf,

    /// File name stem for exports
    pub file_stem: String,

    /// Column at which document text wraps
    pub wrap_width: usize,

    /// Name printed in document title blocks when no manager is set
    pub author: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_stem: DEFAULT_FILE_STEM.to_string(),
            wrap_width: PageSettings::default().wrap_width,
            author: None,
        }
    }
}

impl ExportConfig {
    /// Exporter options for these settings
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            file_stem: self.file_stem.clone(),
            author: self.author.clone(),
            page: PageSettings {
                wrap_width: self.wrap_width,
                ..PageSettings::default()
            },
        }
    }
}

/// Section catalog source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// TOML catalog replacing the built-in one
    pub path: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub catalog: CatalogConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/pmplan/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pmplan").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PMPLAN_DB: Database file
    /// - PMPLAN_CATALOG: Catalog file
    /// - PMPLAN_OUTPUT_DIR: Export directory
    /// - PMPLAN_AUTHOR: Default document author
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PMPLAN_DB") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("PMPLAN_CATALOG") {
            self.catalog.path = Some(PathBuf::from(path));
        }

        if let Some(dir) = lookup("PMPLAN_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }

        if let Some(author) = lookup("PMPLAN_AUTHOR") {
            self.export.author = Some(author);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        database_path: Option<PathBuf>,
        catalog_path: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = database_path {
            self.storage.database_path = Some(path);
        }

        if let Some(path) = catalog_path {
            self.catalog.path = Some(path);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        database_path: Option<PathBuf>,
        catalog_path: Option<PathBuf>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(database_path, catalog_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.database_path.is_none());
        assert!(config.catalog.path.is_none());
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.export.file_stem, "project-plan");
        assert_eq!(config.export.wrap_width, 90);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some(PathBuf::from("/tmp/plan.db")),
            Some(PathBuf::from("/tmp/catalog.toml")),
        );

        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/tmp/plan.db"))
        );
        assert_eq!(config.catalog.path, Some(PathBuf::from("/tmp/catalog.toml")));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PMPLAN_OUTPUT_DIR", "/srv/exports"),
            ("PMPLAN_AUTHOR", "Grace Hopper"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.export.output_dir, PathBuf::from("/srv/exports"));
        assert_eq!(config.export.author.as_deref(), Some("Grace Hopper"));
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_cli_beats_env() {
        let config = Config::default()
            .with_overrides_from(|key| (key == "PMPLAN_DB").then(|| "/env.db".to_string()))
            .with_cli_overrides(Some(PathBuf::from("/cli.db")), None);

        assert_eq!(config.storage.database_path, Some(PathBuf::from("/cli.db")));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[storage]
database_path = "/var/lib/pmplan/plan.db"

[export]
output_dir = "out"
file_stem = "charter"
wrap_width = 72
author = "Ada Lovelace"

[catalog]
path = "/etc/pmplan/catalog.toml"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/var/lib/pmplan/plan.db"))
        );
        assert_eq!(config.export.file_stem, "charter");
        assert_eq!(config.export.wrap_width, 72);
        assert_eq!(
            config.catalog.path,
            Some(PathBuf::from("/etc/pmplan/catalog.toml"))
        );

        let options = config.export.options();
        assert_eq!(options.file_stem, "charter");
        assert_eq!(options.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(options.page.wrap_width, 72);
        assert_eq!(options.page.content_limit, 250.0);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[export]
author = "Ada"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.export.file_stem, "project-plan");
        assert_eq!(config.export.author.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[export\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\nwrap_width = 60\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.export.wrap_width, 60);
    }
}

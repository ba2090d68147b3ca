//! Configuration loading for the skill catalog
//!
//! Catalog definitions are loaded from TOML in two layers:
//! - **Builtin**: Embedded in the binary (read-only)
//! - **Custom**: User files in a config directory (editable)
//!
//! Custom definitions with the same id replace builtin ones.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::definitions::{CatalogConfig, CooldownGroup, SkillDefinition};
use super::{CatalogError, SkillCatalog};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Definitions accumulated from several files before validation
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    skills: Vec<SkillDefinition>,
    groups: Vec<CooldownGroup>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add definitions from a config, replacing any with the same id.
    /// Returns the ids that were replaced.
    pub fn add_config(&mut self, config: CatalogConfig) -> Vec<String> {
        let mut duplicates = Vec::new();

        for skill in config.skills {
            match self.skills.iter_mut().find(|s| s.id == skill.id) {
                Some(existing) => {
                    duplicates.push(skill.id.clone());
                    *existing = skill;
                }
                None => self.skills.push(skill),
            }
        }

        for group in config.groups {
            match self.groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) => {
                    duplicates.push(group.id.clone());
                    *existing = group;
                }
                None => self.groups.push(group),
            }
        }

        duplicates
    }

    /// Validate and index everything added so far
    pub fn into_catalog(self) -> Result<SkillCatalog, CatalogError> {
        SkillCatalog::new(CatalogConfig {
            skills: self.skills,
            groups: self.groups,
        })
    }
}

/// Parse the embedded builtin catalog
pub fn builtin_config() -> Result<CatalogConfig, ConfigError> {
    toml::from_str(BUILTIN_CATALOG).map_err(|e| ConfigError::ParseError {
        path: PathBuf::from("<builtin>"),
        source: e,
    })
}

/// Load the builtin catalog, then layer every TOML file from `custom_dir`.
///
/// Unreadable or malformed custom files are logged and skipped; a custom
/// layer that leaves the catalog inconsistent (e.g. a skill pointing at a
/// group nobody defines) is an error.
pub fn load_catalog(custom_dir: Option<&Path>) -> Result<SkillCatalog, ConfigError> {
    let mut set = CatalogSet::new();
    set.add_config(builtin_config()?);

    if let Some(dir) = custom_dir {
        if dir.exists() {
            load_directory(&mut set, dir)?;
        }
    }

    let catalog = set.into_catalog()?;
    tracing::debug!(
        skills = catalog.len(),
        groups = catalog.groups().count(),
        "Loaded skill catalog"
    );
    Ok(catalog)
}

/// Load all TOML files from a directory, in file name order
fn load_directory(set: &mut CatalogSet, dir: &Path) -> Result<(), ConfigError> {
    let entries = fs::read_dir(dir).map_err(|e| ConfigError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    for path in paths {
        match load_file(&path) {
            Ok(config) => {
                let replaced = set.add_config(config);
                if !replaced.is_empty() {
                    tracing::warn!(file = ?path.file_name(), ?replaced, "Custom catalog overrides definitions");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping catalog file");
            }
        }
    }

    Ok(())
}

/// Load a single TOML catalog file
pub fn load_file(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save a catalog config to a TOML file
pub fn save_file(path: &Path, config: &CatalogConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write(path, contents).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Get the default custom catalog directory
pub fn default_custom_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mitplan").join("catalog"))
}

/// Errors that can occur during config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Serialize error for {path:?}: {source}")]
    SerializeError {
        path: PathBuf,
        source: toml::ser::Error,
    },

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Settings error: {0}")]
    Settings(#[from] confy::ConfyError),
}

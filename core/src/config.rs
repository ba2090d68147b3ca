//! User settings
//!
//! Stored with `confy` under the app name `mitplan` (a TOML file in the
//! platform config directory).

use std::path::PathBuf;

use mitplan_types::Job;
use serde::{Deserialize, Serialize};

use crate::catalog::{ConfigError, default_custom_dir};
use crate::cooldown::BuildOptions;

pub const APP_NAME: &str = "mitplan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of custom catalog TOML files (None = platform default)
    pub catalog_dir: Option<PathBuf>,

    /// Draw the unusable lead-in before each exhausting use
    pub show_unusable_lead_in: bool,

    /// Job new placements are attributed to when none is given
    pub default_job: Option<Job>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_dir: None,
            show_unusable_lead_in: true,
            default_job: None,
        }
    }
}

impl AppConfig {
    /// Load settings, falling back to defaults when none are saved yet
    pub fn load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        Ok(confy::store(APP_NAME, None, self)?)
    }

    /// Custom catalog directory in effect
    pub fn catalog_dir(&self) -> Option<PathBuf> {
        self.catalog_dir.clone().or_else(default_custom_dir)
    }

    /// Build options from the saved settings. `hide_lead_in` (the
    /// `--no-lead-in` flag) overrides a saved `show_unusable_lead_in`.
    pub fn build_options(&self, hide_lead_in: bool) -> BuildOptions {
        BuildOptions {
            unusable_lead_in: self.show_unusable_lead_in && !hide_lead_in,
            ..BuildOptions::default()
        }
    }

    /// Job a placement is attributed to: the explicit one, else the default
    pub fn owner_job(&self, job: Option<Job>) -> Option<Job> {
        job.or(self.default_job)
    }
}

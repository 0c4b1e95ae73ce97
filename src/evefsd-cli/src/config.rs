//! Configuration management for the evefsd CLI
//!
//! Stored as `config.json` in the working tree root.

use anyhow::{Context, Result};
use chrono::Utc;
use evefsd::install::DEFAULT_SERVER;
use evefsd::Installation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
const DEFAULT_PYTHON: &str = "python3";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub install_path: Option<PathBuf>,
    pub server: Option<String>,
    pub setup_completed: bool,
    pub setup_completed_at: Option<String>,
    pub python: Option<String>,
    /// Replaces the built-in loader program when set
    pub decoder_command: Option<Vec<String>>,
}

impl Config {
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load configuration from the working tree, or defaults if there is none
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = Self::config_path(root);

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        serde_json::from_str(&contents).context("Failed to parse config file")
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let config_path = Self::config_path(root);

        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create working tree at {}", root.display()))?;

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    pub fn server(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_SERVER)
    }

    pub fn python(&self) -> &str {
        self.python.as_deref().unwrap_or(DEFAULT_PYTHON)
    }

    /// Record a validated installation and the time setup finished
    pub fn mark_setup(&mut self, install: &Installation) {
        self.install_path = Some(install.resource_root().to_path_buf());
        self.server = Some(install.server().to_string());
        self.setup_completed = true;
        self.setup_completed_at = Some(Utc::now().to_rfc3339());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch configuration, persisted as pretty JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DocsortError, Result};
use crate::types::CategoryOptions;

/// File name used inside the configuration directory.
pub const CONFIG_FILE: &str = "config.json";

fn default_require_identity() -> bool {
    true
}

fn default_max_workers() -> usize {
    4
}

/// Settings for a sorting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Categories the classifier is allowed to return.
    #[serde(default)]
    pub categories: CategoryOptions,
    /// Refuse to run a batch unless both names are supplied.
    #[serde(default = "default_require_identity")]
    pub require_identity: bool,
    /// Upper bound on documents processed at once in concurrent runs.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Directory holding the OCR model files. `None` uses the ocrs cache dir.
    #[serde(default)]
    pub ocr_model_dir: Option<PathBuf>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            categories: CategoryOptions::all_enabled(),
            require_identity: default_require_identity(),
            max_workers: default_max_workers(),
            ocr_model_dir: None,
        }
    }
}

impl SortConfig {
    /// Read a config file. Fields missing from the file take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(DocsortError::Config("max_workers must be at least 1".into()));
        }
        Ok(())
    }
}

/// Default location of the config file.
///
/// `$XDG_CONFIG_HOME/docsort/config.json`, falling back to
/// `~/.config/docsort/config.json`.
pub fn default_config_path() -> PathBuf {
    config_base().join("docsort").join(CONFIG_FILE)
}

fn config_base() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}

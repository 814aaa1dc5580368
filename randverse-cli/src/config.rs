use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use randverse_core::{CategorySpec, DEFAULT_CATEGORIES};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_PORT: u16 = 1616;
const CONFIG_FILE: &str = "config.toml";

/// Settings read from `config.toml`; command-line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub corpus_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub color: bool,
    pub remaining: bool,
    pub categories: Option<Vec<CategorySpec>>,
}

impl Config {
    /// Reads `explicit` when given (it must exist), otherwise the file in the
    /// platform config directory if there is one.
    pub fn load(explicit: Option<&Path>, dirs: Option<&ProjectDirs>) -> Result<Self> {
        let (path, required) = match (explicit, dirs) {
            (Some(path), _) => (path.to_path_buf(), true),
            (None, Some(dirs)) => (dirs.config_dir().join(CONFIG_FILE), false),
            (None, None) => return Ok(Self::default()),
        };
        if !required && !path.exists() {
            debug!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_toml(&raw).with_context(|| format!("failed to parse config file {:?}", path))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn categories(&self) -> &[CategorySpec] {
        self.categories.as_deref().unwrap_or(DEFAULT_CATEGORIES.as_slice())
    }

    pub fn port(&self, flag: Option<u16>) -> u16 {
        flag.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn corpus_dir(&self, flag: Option<PathBuf>, dirs: Option<&ProjectDirs>) -> Result<PathBuf> {
        flag.or_else(|| self.corpus_dir.clone())
            .or_else(|| dirs.map(|dirs| dirs.data_dir().join("corpus")))
            .ok_or_else(|| anyhow!("no corpus directory configured; pass --corpus"))
    }
}

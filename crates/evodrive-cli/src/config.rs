//! Configuration management for the evodrive CLI.

use anyhow::{Context, Result};
use evodrive::prelude::{CircuitConfig, ManagerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "evodrive.toml";

/// Project configuration, read from `evodrive.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub circuit: CircuitConfig,
}

/// Defaults for `evodrive run`; flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_generations")]
    pub generations: u32,
    /// Tick cap per generation, in case nobody finishes or crashes.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Agents the automatic selector picks as parents (1 or 2).
    #[serde(default = "default_select")]
    pub select: usize,
}

// Default value functions
fn default_generations() -> u32 { 5 }
fn default_max_ticks() -> u64 { 60 * 60 }
fn default_select() -> usize { 2 }

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            max_ticks: default_max_ticks(),
            select: default_select(),
        }
    }
}

impl Config {
    /// Load config from evodrive.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find evodrive.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Get the evodrive data directory (.evodrive/).
pub fn data_dir() -> Result<PathBuf> {
    let dir = std::env::current_dir()?.join(".evodrive");
    Ok(dir)
}

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::matcher::{MatchSettings, DEFAULT_PROXIMITY_MARGIN_METERS};
use crate::store::{ConnectedRule, ConnectedRules};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub connected_rules: Vec<ConnectedRule>,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchingConfig {
    pub proximity_margin_meters: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            proximity_margin_meters: DEFAULT_PROXIMITY_MARGIN_METERS,
        }
    }
}

/// A boundary file or directory to load at startup
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
}

impl Config {
    /// Read and validate a TOML config. Relative source paths are resolved
    /// against the config file's directory.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(dir) = path.parent() {
            for source in &mut config.sources {
                if source.path.is_relative() {
                    source.path = dir.join(&source.path);
                }
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let margin = self.matching.proximity_margin_meters;
        ensure!(
            margin.is_finite() && margin >= 0.0,
            "proximity_margin_meters must be a non-negative number, got {}",
            margin
        );
        ensure!(
            self.connected_rules.iter().all(|r| !r.all_of.is_empty()),
            "connected_rules entries need at least one term"
        );
        Ok(())
    }

    pub fn connected_rules(&self) -> ConnectedRules {
        ConnectedRules::new(&self.connected_rules)
    }

    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            proximity_margin_meters: self.matching.proximity_margin_meters,
        }
    }
}

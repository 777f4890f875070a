//! Snap configuration stored on the diagram.

use crate::error::{ConfigError, ConfigResult};
use crate::magnet::MagnetType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default snap distance in pixels.
pub const DEFAULT_THRESHOLD: f64 = 10.0;

/// Default grid cell size.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Snapping configuration.
///
/// `priority` decides which magnet type wins when several matches are
/// equally good; earlier entries win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default = "default_priority")]
    pub priority: Vec<MagnetType>,
    #[serde(default)]
    pub magnet_types: BTreeMap<MagnetType, bool>,
}

fn default_enabled() -> bool {
    true
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

fn default_priority() -> Vec<MagnetType> {
    MagnetType::TARGETS.to_vec()
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_THRESHOLD,
            grid_size: DEFAULT_GRID_SIZE,
            priority: default_priority(),
            magnet_types: MagnetType::TARGETS.iter().map(|&t| (t, true)).collect(),
        }
    }
}

impl SnapConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_type(mut self, magnet_type: MagnetType, enabled: bool) -> Self {
        self.magnet_types.insert(magnet_type, enabled);
        self
    }

    /// Whether a magnet type is switched on. Types missing from the map are on.
    pub fn is_type_enabled(&self, magnet_type: MagnetType) -> bool {
        self.magnet_types.get(&magnet_type).copied().unwrap_or(true)
    }

    /// Enabled target types in priority order.
    pub fn enabled_types(&self) -> Vec<MagnetType> {
        let mut types: Vec<MagnetType> = self
            .priority
            .iter()
            .copied()
            .filter(|&t| t != MagnetType::Source && self.is_type_enabled(t))
            .collect();
        // Types left out of the priority list still participate, last.
        for t in MagnetType::TARGETS {
            if !self.priority.contains(&t) && self.is_type_enabled(t) {
                types.push(t);
            }
        }
        types
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        Ok(())
    }

    /// Copy with an invalid threshold or grid size reset to its default.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if let Err(err) = self.validate() {
            log::warn!("{err}, falling back to defaults");
            if !config.threshold.is_finite() || config.threshold < 0.0 {
                config.threshold = DEFAULT_THRESHOLD;
            }
            if !config.grid_size.is_finite() || config.grid_size <= 0.0 {
                config.grid_size = DEFAULT_GRID_SIZE;
            }
        }
        config
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded snap config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

//! Simulation configuration.
//!
//! Everything has a default; a JSON document may override any subset of
//! fields.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::orbit_path::PathSampling;

/// Mean Earth radius; one render unit.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub km_per_unit: f64,
    pub reference_radius: f64,
    pub link_range: f64,
    pub max_links_per_satellite: usize,
    pub path_samples: usize,
    pub path_step_seconds: f64,
    pub show_links: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            km_per_unit: EARTH_RADIUS_KM,
            reference_radius: 1.0,
            link_range: 0.5,
            max_links_per_satellite: 4,
            path_samples: 100,
            path_step_seconds: 60.0,
            show_links: true,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        };
        positive("km_per_unit", self.km_per_unit)?;
        positive("link_range", self.link_range)?;
        positive("path_step_seconds", self.path_step_seconds)?;
        if !self.reference_radius.is_finite() || self.reference_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "reference_radius must be non-negative, got {}",
                self.reference_radius
            )));
        }
        if self.max_links_per_satellite == 0 {
            return Err(ConfigError::Invalid("max_links_per_satellite must be at least 1".to_string()));
        }
        if self.path_samples == 0 {
            return Err(ConfigError::Invalid("path_samples must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn path_sampling(&self) -> PathSampling {
        PathSampling {
            samples: self.path_samples,
            step_seconds: self.path_step_seconds,
        }
    }
}

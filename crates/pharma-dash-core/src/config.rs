//! Dashboard configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Thresholds and targets used by the section pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Inventory CSV loaded by the record store
    pub data_path: PathBuf,
    /// Rows expiring within this many days count as "expiring soon"
    pub expiry_window_days: i64,
    /// Length of the top-N rankings
    pub top_n: usize,
    /// Summed units sold above which a medicine is "high demand"
    pub high_demand_threshold: f64,
    /// Revenue target in dollars
    pub revenue_target: f64,
    /// Band edges of the 0–100 profit margin gauge
    pub gauge_bands: [f64; 2],
    /// Band edges of the revenue bullet, as fractions of the target
    pub revenue_bands: [f64; 2],
    /// Number of sample points on the expiry density curve
    pub density_points: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("enhanced_medicine_inventory_dataset.csv"),
            expiry_window_days: 30,
            top_n: 10,
            high_demand_threshold: 800.0,
            revenue_target: 5_000_000.0,
            gauge_bands: [50.0, 75.0],
            revenue_bands: [0.5, 0.8],
            density_points: 1000,
        }
    }
}

impl DashboardConfig {
    /// Load a config from a JSON file; omitted keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".into()));
        }
        if self.density_points < 2 {
            return Err(ConfigError::Invalid(
                "density_points must be at least 2".into(),
            ));
        }
        if !(self.revenue_target > 0.0) {
            return Err(ConfigError::Invalid(
                "revenue_target must be positive".into(),
            ));
        }
        for (name, [low, high]) in [
            ("gauge_bands", self.gauge_bands),
            ("revenue_bands", self.revenue_bands),
        ] {
            if !(low <= high) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be ordered, got [{low}, {high}]"
                )));
            }
        }
        Ok(())
    }
}

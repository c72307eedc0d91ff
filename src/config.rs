//! TOML configuration for a simulator session.
//!
//! Every field has a default, so an absent file or a partial one is valid.
//! Slider definitions are the exception: if a `[sliders]` table is present it
//! must define all three controls.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::OfflineModelConfig;
use crate::consts::{LOCAL_API_URL, SERIES_CAPACITY, WHATIF_PREDICT_PATH};
use crate::controller::SequencingPolicy;
use crate::features::SliderSet;
use crate::logging::LogConfig;
use crate::prelude::Result;
use crate::transform::BoostCurve;
use crate::Error;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub sliders: SliderSet,
    #[serde(default)]
    pub offline: OfflineModelConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Prediction service root, e.g. `http://127.0.0.1:5000`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the what-if prediction route
    #[serde(default = "default_path")]
    pub path: String,
    /// Per-request timeout in milliseconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    LOCAL_API_URL.to_string()
}

fn default_path() -> String {
    WHATIF_PREDICT_PATH.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            timeout_ms: None,
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Points kept on the chart
    #[serde(default = "default_series_capacity")]
    pub series_capacity: usize,
    /// How overlapping cycle completions are reconciled
    #[serde(default)]
    pub sequencing: SequencingPolicy,
    /// Presentation boost curve
    #[serde(default)]
    pub boost: BoostCurve,
}

fn default_series_capacity() -> usize {
    SERIES_CAPACITY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            series_capacity: default_series_capacity(),
            sequencing: SequencingPolicy::default(),
            boost: BoostCurve::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Setup preconditions: all sliders present and sane, usable capacity.
    pub fn validate(&self) -> Result<()> {
        if self.simulation.series_capacity == 0 {
            return Err(Error::InvalidCapacity(0));
        }
        self.sliders.validate()
    }
}

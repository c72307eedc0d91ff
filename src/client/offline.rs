//! Offline prediction model.
//!
//! Stands in for the remote service so the simulator can run without a
//! server. A fixed logistic score over age, BMI and insulin gives a smooth,
//! deterministic risk surface. Optional latency with deterministic jitter
//! lets overlapping cycles complete out of dispatch order, like a real
//! network would.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{PredictionClient, PredictionResult};
use crate::features::PredictionRequest;
use crate::PredictionError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OfflineModelConfig {
    #[serde(default = "default_intercept")]
    pub intercept: f64,
    #[serde(default = "default_age_coef")]
    pub age_coef: f64,
    #[serde(default = "default_bmi_coef")]
    pub bmi_coef: f64,
    #[serde(default = "default_insulin_coef")]
    pub insulin_coef: f64,
    /// Base response latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
    /// Upper bound of extra latency added per call, in milliseconds
    #[serde(default)]
    pub jitter_ms: u64,
}

fn default_intercept() -> f64 {
    -6.0
}
fn default_age_coef() -> f64 {
    0.035
}
fn default_bmi_coef() -> f64 {
    0.09
}
fn default_insulin_coef() -> f64 {
    0.004
}

impl Default for OfflineModelConfig {
    fn default() -> Self {
        Self {
            intercept: default_intercept(),
            age_coef: default_age_coef(),
            bmi_coef: default_bmi_coef(),
            insulin_coef: default_insulin_coef(),
            latency_ms: 0,
            jitter_ms: 0,
        }
    }
}

#[derive(Debug)]
pub struct OfflineModel {
    config: OfflineModelConfig,
    calls: AtomicU64,
}

impl OfflineModel {
    pub fn new(config: OfflineModelConfig) -> Self {
        Self {
            config,
            calls: AtomicU64::new(0),
        }
    }

    /// Raw model probability for a snapshot.
    pub fn score(&self, request: &PredictionRequest) -> f64 {
        let c = &self.config;
        let z = c.intercept
            + c.age_coef * request.age()
            + c.bmi_coef * request.bmi()
            + c.insulin_coef * request.insulin_level();
        1.0 / (1.0 + (-z).exp())
    }

    fn latency_for(&self, call: u64) -> Duration {
        let jitter = if self.config.jitter_ms > 0 {
            // Knuth multiplicative hash spreads consecutive calls
            call.wrapping_mul(2_654_435_761) % (self.config.jitter_ms + 1)
        } else {
            0
        };
        Duration::from_millis(self.config.latency_ms + jitter)
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for OfflineModel {
    fn default() -> Self {
        Self::new(OfflineModelConfig::default())
    }
}

#[async_trait]
impl PredictionClient for OfflineModel {
    async fn request_prediction(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let latency = self.latency_for(call);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let probability = self.score(request);
        trace!(call, latency_ms = latency.as_millis() as u64, probability, "Offline prediction");
        PredictionResult::from_probability(probability)
    }

    fn name(&self) -> &str {
        "offline"
    }
}

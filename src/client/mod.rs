//! Prediction service clients.
//!
//! - `http`: the remote what-if endpoint
//! - `offline`: a deterministic local model for running without a server

mod http;
mod offline;

pub use http::HttpPredictionClient;
pub use offline::{OfflineModel, OfflineModelConfig};

use async_trait::async_trait;

use crate::features::PredictionRequest;
use crate::PredictionError;

/// Successful model answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Probability of the positive class, in `[0, 1]`
    pub probability: f64,
}

impl PredictionResult {
    /// Validate a raw probability from the wire.
    pub fn from_probability(probability: f64) -> Result<Self, PredictionError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::malformed(format!(
                "probability {probability} outside [0, 1]"
            )));
        }
        Ok(Self { probability })
    }
}

/// Source of risk probabilities for a feature snapshot.
///
/// One call is one attempt. Implementations must turn every failure into a
/// [`PredictionError`] instead of panicking; retries belong to the caller.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn request_prediction(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError>;

    /// Identifier for logs.
    fn name(&self) -> &str;
}

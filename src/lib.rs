#![deny(unreachable_pub)]

// Core modules
mod errors;
mod prelude;
mod req;

pub mod consts;

// Feature modules
pub mod client;
pub mod config;
pub mod controller;
pub mod features;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod series;
pub mod transform;

// Re-exports
pub use client::{
    HttpPredictionClient, OfflineModel, OfflineModelConfig, PredictionClient, PredictionResult,
};
pub use config::{AppConfig, EndpointConfig, SimulationConfig};
pub use consts::{ASSUMED_HEIGHT_M, LOCAL_API_URL, SERIES_CAPACITY, WHATIF_PREDICT_PATH};
pub use controller::{ControlEvent, CycleId, CycleOutcome, SequencingPolicy, SimulationController};
pub use errors::{Error, HttpErrorKind, PredictionError};
pub use features::{
    format_slider_value, FeatureState, FeatureVector, PredictionRequest, RawDisplay, Slider,
    SliderSet, SliderSpec, WhatIfBody,
};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{SessionMetrics, SessionSummary};
pub use render::{Clock, RecordingSurface, RenderSurface, SystemClock, TerminalChart};
pub use req::HttpClient;
pub use series::{BoostedPoint, RollingSeries};
pub use transform::{boost, BoostCurve};

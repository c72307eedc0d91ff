//! Simulation controller - owns the update loop from slider input to chart.
//!
//! Submodules:
//! - `cycle`: dispatching prediction cycles and applying their completions
//! - `event_loop`: the session loop reacting to input events and completions
//!
//! Each input event starts an independent cycle without waiting for earlier
//! ones. Cycles run as spawned tasks and report back over a channel, so the
//! series and the render surface are only ever touched from the controller
//! itself, one completion at a time.

mod cycle;
mod event_loop;


use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::client::{PredictionClient, PredictionResult};
use crate::config::SimulationConfig;
use crate::features::{FeatureState, PredictionRequest, RawDisplay, Slider, SliderSet};
use crate::metrics::SessionMetrics;
use crate::prelude::Result;
use crate::render::{Clock, RenderSurface, SystemClock};
use crate::series::{BoostedPoint, RollingSeries};
use crate::transform::BoostCurve;
use crate::PredictionError;

/// Dispatch sequence number. Strictly increasing per controller.
pub type CycleId = u64;

/// How completions of overlapping cycles are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencingPolicy {
    /// Apply every successful completion in arrival order. The chart ends on
    /// whichever response resolved last, even if it was dispatched earlier.
    #[default]
    LastCompletedWins,
    /// Apply a completion only if it was dispatched after the last applied
    /// one. Late answers for superseded slider positions are dropped.
    LatestDispatchWins,
}

/// A finished cycle travelling back to the controller. Only the controller's
/// own spawned tasks build these.
#[derive(Debug, Clone)]
pub(crate) struct CycleCompletion {
    pub(crate) id: CycleId,
    /// Snapshot the request was built from
    pub(crate) request: PredictionRequest,
    pub(crate) outcome: std::result::Result<PredictionResult, PredictionError>,
}

/// What the controller did with a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Boosted point pushed and chart redrawn
    Applied { id: CycleId, point: BoostedPoint },
    /// Prediction failed; chart untouched
    Failed { id: CycleId, error: PredictionError },
    /// Superseded by a later dispatch that already landed; chart untouched
    Stale { id: CycleId, last_applied: CycleId },
}

impl CycleOutcome {
    pub fn id(&self) -> CycleId {
        match self {
            CycleOutcome::Applied { id, .. }
            | CycleOutcome::Failed { id, .. }
            | CycleOutcome::Stale { id, .. } => *id,
        }
    }
}

/// Input to the session loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// A slider moved to `value`
    Input { slider: Slider, value: f64 },
    /// Stop accepting input, drain in-flight cycles, return
    Shutdown,
}

/// Orchestrates feature state, prediction client, boost, series and chart.
pub struct SimulationController<R: RenderSurface> {
    features: FeatureState,
    series: RollingSeries,
    client: Arc<dyn PredictionClient>,
    surface: R,
    clock: Box<dyn Clock>,
    curve: BoostCurve,
    policy: SequencingPolicy,
    next_id: CycleId,
    last_applied: Option<CycleId>,
    in_flight: usize,
    completions_tx: UnboundedSender<CycleCompletion>,
    completions_rx: UnboundedReceiver<CycleCompletion>,
    metrics: Arc<SessionMetrics>,
}

impl<R: RenderSurface> SimulationController<R> {
    /// Wire up a controller. Fails if any slider is missing or the series
    /// capacity is unusable; nothing is dispatched until [`start`](Self::start).
    pub fn new(
        sliders: SliderSet,
        simulation: &SimulationConfig,
        client: Arc<dyn PredictionClient>,
        surface: R,
    ) -> Result<Self> {
        let features = FeatureState::new(sliders)?;
        let series = RollingSeries::new(simulation.series_capacity)?;
        let (completions_tx, completions_rx) = unbounded_channel();

        Ok(Self {
            features,
            series,
            client,
            surface,
            clock: Box::new(SystemClock),
            curve: simulation.boost,
            policy: simulation.sequencing,
            next_id: 0,
            last_applied: None,
            in_flight: 0,
            completions_tx,
            completions_rx,
            metrics: Arc::new(SessionMetrics::new()),
        })
    }

    /// Replace the wall-clock label source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn features(&self) -> &FeatureState {
        &self.features
    }

    pub fn display(&self) -> &RawDisplay {
        self.features.display()
    }

    pub fn policy(&self) -> SequencingPolicy {
        self.policy
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_applied(&self) -> Option<CycleId> {
        self.last_applied
    }

    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }
}

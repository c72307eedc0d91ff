//! Cycle dispatch and completion handling.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{CycleCompletion, CycleId, CycleOutcome, SequencingPolicy, SimulationController};
use crate::features::Slider;
use crate::render::RenderSurface;
use crate::series::BoostedPoint;

impl<R: RenderSurface> SimulationController<R> {
    /// Run the initial cycle from the starting slider values, so the chart
    /// is not empty before the first interaction.
    pub fn start(&mut self) -> CycleId {
        self.surface.show_inputs(self.features.display());
        info!(
            client = %self.client.name(),
            policy = ?self.policy,
            capacity = self.series.capacity(),
            "What-if simulator started"
        );
        self.dispatch()
    }

    /// Handle one slider input event.
    ///
    /// The raw value labels update before this returns; the chart catches up
    /// when the dispatched cycle completes.
    pub fn on_input(&mut self, slider: Slider, value: f64) -> CycleId {
        let applied = self.features.set(slider, value);
        self.surface.show_inputs(self.features.display());
        debug!(slider = %slider, requested = value, applied, "Slider input");
        self.dispatch()
    }

    /// Snapshot the current features and start a prediction cycle.
    pub(crate) fn dispatch(&mut self) -> CycleId {
        self.next_id += 1;
        let id = self.next_id;
        let request = self.features.snapshot();
        let client = Arc::clone(&self.client);
        let tx = self.completions_tx.clone();

        self.in_flight += 1;
        self.metrics.record_dispatched();
        debug!(
            cycle = id,
            age = request.age(),
            bmi = request.bmi(),
            insulin = request.insulin_level(),
            in_flight = self.in_flight,
            "Dispatching prediction cycle"
        );

        tokio::spawn(async move {
            let outcome = client.request_prediction(&request).await;
            // receiver gone means the controller was dropped; nothing to do
            let _ = tx.send(CycleCompletion {
                id,
                request,
                outcome,
            });
        });

        id
    }

    /// Fold a finished cycle into the chart according to the sequencing policy.
    pub(crate) fn apply_completion(&mut self, completion: CycleCompletion) -> CycleOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let CycleCompletion {
            id,
            request,
            outcome,
        } = completion;

        let result = match outcome {
            Ok(result) => result,
            Err(error) => {
                self.metrics.record_failed();
                warn!(
                    cycle = id,
                    kind = error.kind_str(),
                    error = %error,
                    "Prediction cycle failed, chart unchanged"
                );
                return CycleOutcome::Failed { id, error };
            }
        };

        if self.policy == SequencingPolicy::LatestDispatchWins {
            if let Some(last_applied) = self.last_applied.filter(|&last| id <= last) {
                self.metrics.record_stale();
                debug!(cycle = id, last_applied, "Discarding stale completion");
                return CycleOutcome::Stale { id, last_applied };
            }
        }

        // boost against the snapshot that produced the answer, not live sliders
        let value = self
            .curve
            .apply(result.probability, request.age(), request.weight());
        let point = BoostedPoint::new(self.clock.label(), value);

        if let Some(evicted) = self.series.push(point.clone()) {
            debug!(label = %evicted.label, "Evicted oldest chart point");
        }
        self.last_applied = Some(id);
        self.metrics.record_applied();

        self.surface
            .set_data(&self.series.labels(), &self.series.data());
        self.surface.redraw();

        debug!(
            cycle = id,
            raw = result.probability,
            boosted = value,
            points = self.series.len(),
            "Applied prediction cycle"
        );
        CycleOutcome::Applied { id, point }
    }
}

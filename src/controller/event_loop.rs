//! Session loop: input events in, completions applied, summary out.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use super::{ControlEvent, CycleOutcome, SimulationController};
use crate::metrics::SessionSummary;
use crate::render::RenderSurface;

impl<R: RenderSurface> SimulationController<R> {
    /// Wait for the next cycle to finish and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn process_next(&mut self) -> Option<CycleOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.apply_completion(completion))
    }

    /// Apply every in-flight cycle as it completes. No cancellation: a hung
    /// request holds this until it resolves or its timeout fires.
    pub async fn drain(&mut self) -> Vec<CycleOutcome> {
        let mut outcomes = Vec::with_capacity(self.in_flight);
        while let Some(outcome) = self.process_next().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Drive a whole session.
    ///
    /// Starts with the initial cycle, then reacts to input events and cycle
    /// completions as they arrive. Ends on [`ControlEvent::Shutdown`] or when
    /// the event channel closes, after draining in-flight cycles.
    pub async fn run(&mut self, events: &mut UnboundedReceiver<ControlEvent>) -> SessionSummary {
        self.start();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(ControlEvent::Input { slider, value }) => {
                        self.on_input(slider, value);
                    }
                    Some(ControlEvent::Shutdown) | None => {
                        debug!(in_flight = self.in_flight, "Input closed, draining cycles");
                        break;
                    }
                },
                Some(completion) = self.completions_rx.recv(), if self.in_flight > 0 => {
                    self.apply_completion(completion);
                }
            }
        }

        self.drain().await;
        self.metrics.log_summary();
        info!(points = self.series.len(), "What-if session finished");
        self.metrics.summary()
    }
}

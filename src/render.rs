//! Render surfaces for the risk chart, plus the clock that labels points.

use std::io::Write;

use chrono::Local;
use tracing::warn;

use crate::features::RawDisplay;

/// Chart primitive driven by the controller.
///
/// The controller always hands over complete, equal-length columns, then asks
/// for a redraw.
pub trait RenderSurface: Send {
    fn set_data(&mut self, labels: &[String], values: &[f64]);
    fn redraw(&mut self);

    /// Show the live slider values. Called synchronously on every input,
    /// independent of the chart.
    fn show_inputs(&mut self, _display: &RawDisplay) {}
}

/// Wall-clock label source for chart points.
pub trait Clock: Send {
    fn label(&self) -> String;
}

/// Local time as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn label(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }
}

/// Keeps every frame it is asked to draw. Used headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    labels: Vec<String>,
    values: Vec<f64>,
    frames: Vec<Vec<(String, f64)>>,
    inputs: Vec<RawDisplay>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every redraw so far, oldest first.
    pub fn frames(&self) -> &[Vec<(String, f64)>] {
        &self.frames
    }

    pub fn redraw_count(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&Vec<(String, f64)>> {
        self.frames.last()
    }

    /// Every slider display update so far.
    pub fn inputs(&self) -> &[RawDisplay] {
        &self.inputs
    }
}

impl RenderSurface for RecordingSurface {
    fn set_data(&mut self, labels: &[String], values: &[f64]) {
        self.labels = labels.to_vec();
        self.values = values.to_vec();
    }

    fn redraw(&mut self) {
        let frame = self
            .labels
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect();
        self.frames.push(frame);
    }

    fn show_inputs(&mut self, display: &RawDisplay) {
        self.inputs.push(display.clone());
    }
}

/// Horizontal bar chart printed to a terminal.
pub struct TerminalChart {
    out: Box<dyn Write + Send>,
    title: String,
    width: usize,
    labels: Vec<String>,
    values: Vec<f64>,
}

impl TerminalChart {
    pub fn stdout(width: usize) -> Self {
        Self::new(Box::new(std::io::stdout()), width)
    }

    pub fn new(out: Box<dyn Write + Send>, width: usize) -> Self {
        Self {
            out,
            title: "Predicted Diabetes Risk".to_string(),
            width: width.max(10),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    fn bar(&self, value: f64) -> String {
        let filled = (value.clamp(0.0, 1.0) * self.width as f64).round() as usize;
        format!("{}{}", "█".repeat(filled), "·".repeat(self.width - filled))
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!(error = %e, "Failed to write to terminal chart");
        }
    }

    fn render_frame(&self) -> String {
        let mut frame = format!("── {} ──\n", self.title);
        for (label, value) in self.labels.iter().zip(&self.values) {
            frame.push_str(&format!(
                "{label:>10} │{}│ {:>5.1}%\n",
                self.bar(*value),
                value * 100.0
            ));
        }
        frame
    }
}

impl RenderSurface for TerminalChart {
    fn set_data(&mut self, labels: &[String], values: &[f64]) {
        self.labels = labels.to_vec();
        self.values = values.to_vec();
    }

    fn redraw(&mut self) {
        let frame = self.render_frame();
        self.write(&frame);
    }

    fn show_inputs(&mut self, display: &RawDisplay) {
        let line = format!(
            "age {} | weight {} | insulin {}\n",
            display.age, display.weight, display.insulin
        );
        self.write(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_recording_surface_frames() {
        let mut surface = RecordingSurface::new();
        surface.set_data(&["a".to_string()], &[0.5]);
        surface.redraw();
        surface.set_data(&["a".to_string(), "b".to_string()], &[0.5, 0.7]);
        surface.redraw();

        assert_eq!(surface.redraw_count(), 2);
        assert_eq!(
            surface.last_frame().unwrap(),
            &vec![("a".to_string(), 0.5), ("b".to_string(), 0.7)]
        );
    }

    #[test]
    fn test_terminal_chart_output() {
        let buf = SharedBuf::default();
        let mut chart = TerminalChart::new(Box::new(buf.clone()), 10);
        chart.set_data(&["12:00:00".to_string()], &[0.5]);
        chart.redraw();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("12:00:00"));
        assert!(text.contains("█████·····"));
        assert!(text.contains("50.0%"));
    }

    #[test]
    fn test_terminal_chart_shows_inputs() {
        let buf = SharedBuf::default();
        let mut chart = TerminalChart::new(Box::new(buf.clone()), 10);
        chart.show_inputs(&RawDisplay {
            age: "55".to_string(),
            weight: "90".to_string(),
            insulin: "120".to_string(),
        });

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "age 55 | weight 90 | insulin 120\n");
    }

    #[test]
    fn test_system_clock_label_shape() {
        let label = SystemClock.label();
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }
}

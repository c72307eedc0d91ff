//! Slider-backed feature state and the request snapshots derived from it.
//!
//! Two data paths leave this module. The raw display strings always follow
//! the live slider values and are updated synchronously on input. A
//! [`PredictionRequest`] is an immutable copy taken at dispatch time, so a
//! response that arrives late is still paired with the inputs that produced it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::ASSUMED_HEIGHT_M;
use crate::prelude::Result;
use crate::Error;

/// The three tracked input controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    Age,
    Weight,
    Insulin,
}

impl Slider {
    pub const ALL: [Slider; 3] = [Slider::Age, Slider::Weight, Slider::Insulin];

    pub fn name(&self) -> &'static str {
        match self {
            Slider::Age => "age",
            Slider::Weight => "weight",
            Slider::Insulin => "insulin",
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Slider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age" => Ok(Slider::Age),
            "weight" => Ok(Slider::Weight),
            "insulin" | "insulin_level" => Ok(Slider::Insulin),
            other => Err(Error::UnknownSlider(other.to_string())),
        }
    }
}

/// Range control definition: bounds, granularity and starting position.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    pub initial: f64,
}

fn default_step() -> f64 {
    1.0
}

impl SliderSpec {
    pub fn new(min: f64, max: f64, step: f64, initial: f64) -> Self {
        Self {
            min,
            max,
            step,
            initial,
        }
    }

    fn validate(&self, slider: Slider) -> Result<()> {
        let finite = [self.min, self.max, self.step, self.initial]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::invalid_slider(slider.name(), "non-finite bound"));
        }
        if self.min > self.max {
            return Err(Error::invalid_slider(slider.name(), "min exceeds max"));
        }
        if self.step <= 0.0 {
            return Err(Error::invalid_slider(slider.name(), "step must be positive"));
        }
        if !(self.min..=self.max).contains(&self.initial) {
            return Err(Error::invalid_slider(
                slider.name(),
                "initial value outside [min, max]",
            ));
        }
        Ok(())
    }

    /// Clamp into range and snap to the step grid, the way a range input does.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = (self.min + steps * self.step).min(self.max);
        // strip float noise from step arithmetic (e.g. 0.1 + 0.2)
        (snapped * 1e9).round() / 1e9
    }
}

/// Slider definitions for all three controls.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SliderSet {
    pub age: Option<SliderSpec>,
    pub weight: Option<SliderSpec>,
    pub insulin: Option<SliderSpec>,
}

impl Default for SliderSet {
    fn default() -> Self {
        Self {
            age: Some(SliderSpec::new(18.0, 90.0, 1.0, 30.0)),
            weight: Some(SliderSpec::new(40.0, 150.0, 1.0, 70.0)),
            insulin: Some(SliderSpec::new(0.0, 300.0, 1.0, 80.0)),
        }
    }
}

impl SliderSet {
    pub fn get(&self, slider: Slider) -> Option<&SliderSpec> {
        match slider {
            Slider::Age => self.age.as_ref(),
            Slider::Weight => self.weight.as_ref(),
            Slider::Insulin => self.insulin.as_ref(),
        }
    }

    /// Check once at setup that every control exists and is usable.
    pub fn validate(&self) -> Result<()> {
        for slider in Slider::ALL {
            let spec = self
                .get(slider)
                .ok_or_else(|| Error::MissingInput(slider.name().to_string()))?;
            spec.validate(slider)?;
        }
        Ok(())
    }
}

/// Current numeric feature values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: f64,
    pub weight: f64,
    pub insulin_level: f64,
}

impl FeatureVector {
    pub fn new(age: f64, weight: f64, insulin_level: f64) -> Self {
        Self {
            age,
            weight,
            insulin_level,
        }
    }

    pub fn get(&self, slider: Slider) -> f64 {
        match slider {
            Slider::Age => self.age,
            Slider::Weight => self.weight,
            Slider::Insulin => self.insulin_level,
        }
    }

    fn set(&mut self, slider: Slider, value: f64) {
        match slider {
            Slider::Age => self.age = value,
            Slider::Weight => self.weight = value,
            Slider::Insulin => self.insulin_level = value,
        }
    }

    /// BMI under the fixed assumed height.
    pub fn bmi(&self) -> f64 {
        self.weight / ASSUMED_HEIGHT_M / ASSUMED_HEIGHT_M
    }
}

/// Text shown next to each slider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDisplay {
    pub age: String,
    pub weight: String,
    pub insulin: String,
}

/// Live slider state plus the value labels that mirror it.
#[derive(Debug, Clone)]
pub struct FeatureState {
    sliders: SliderSet,
    current: FeatureVector,
    display: RawDisplay,
}

impl FeatureState {
    /// Build from slider definitions. Fails if any control is missing.
    pub fn new(sliders: SliderSet) -> Result<Self> {
        sliders.validate()?;
        let initial = |s: Slider| sliders.get(s).map(|spec| spec.initial).unwrap_or_default();
        let current = FeatureVector::new(
            initial(Slider::Age),
            initial(Slider::Weight),
            initial(Slider::Insulin),
        );
        let mut state = Self {
            sliders,
            current,
            display: RawDisplay::default(),
        };
        state.refresh_display();
        Ok(state)
    }

    /// Move a slider. Returns the value the control settled on.
    ///
    /// Non-finite input leaves the slider where it was.
    pub fn set(&mut self, slider: Slider, raw: f64) -> f64 {
        if raw.is_finite() {
            if let Some(spec) = self.sliders.get(slider) {
                self.current.set(slider, spec.snap(raw));
            }
        }
        self.refresh_display();
        self.current.get(slider)
    }

    /// Rewrite the value labels from the live slider values.
    pub fn refresh_display(&mut self) {
        self.display = RawDisplay {
            age: format_slider_value(self.current.age),
            weight: format_slider_value(self.current.weight),
            insulin: format_slider_value(self.current.insulin_level),
        };
    }

    pub fn current(&self) -> FeatureVector {
        self.current
    }

    pub fn display(&self) -> &RawDisplay {
        &self.display
    }

    /// Freeze the current values into a request.
    pub fn snapshot(&self) -> PredictionRequest {
        PredictionRequest::new(self.current)
    }
}

/// Immutable per-cycle copy of the features sent to the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRequest {
    features: FeatureVector,
    bmi: f64,
}

/// Wire body for the what-if endpoint. Numbers travel as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfBody {
    #[serde(rename = "Age")]
    pub age: String,
    #[serde(rename = "BMI")]
    pub bmi: String,
    #[serde(rename = "Insulin")]
    pub insulin: String,
}

impl PredictionRequest {
    pub fn new(features: FeatureVector) -> Self {
        Self {
            bmi: features.bmi(),
            features,
        }
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn age(&self) -> f64 {
        self.features.age
    }

    pub fn weight(&self) -> f64 {
        self.features.weight
    }

    pub fn insulin_level(&self) -> f64 {
        self.features.insulin_level
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn body(&self) -> WhatIfBody {
        WhatIfBody {
            age: format_slider_value(self.features.age),
            bmi: format!("{:.1}", self.bmi),
            insulin: format_slider_value(self.features.insulin_level),
        }
    }
}

/// Render a slider value the way the control reports it: integers without a
/// decimal point, everything else in shortest form.
pub fn format_slider_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

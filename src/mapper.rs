//! Threshold a cancellation probability and derive its display attributes.

use serde::Serialize;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Cancelled,
    NotCancelled,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Cancelled => "Cancelled",
            Outcome::NotCancelled => "Not Cancelled",
        }
    }

    /// Bootstrap contextual color for the bar and text.
    pub fn color(&self) -> &'static str {
        match self {
            Outcome::Cancelled => "danger",
            Outcome::NotCancelled => "success",
        }
    }

    pub fn text_class(&self) -> &'static str {
        match self {
            Outcome::Cancelled => "text-center text-danger font-weight-bold",
            Outcome::NotCancelled => "text-center text-success font-weight-bold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub outcome: Outcome,
    pub display_label: &'static str,
    pub display_color: &'static str,
    pub display_percentage: f64,
}

impl PredictionResult {
    pub fn text_class(&self) -> &'static str {
        self.outcome.text_class()
    }

    /// e.g. "73.0% Risk", "45.67% Risk"
    pub fn caption(&self) -> String {
        format!("{}% Risk", format_percentage(self.display_percentage))
    }
}

/// probability * 100, rounded once to two decimals. Formatting rounds the
/// exact binary value, ties to even, so 0.125 becomes 0.12.
pub fn to_percentage(probability: f64) -> f64 {
    let pct = probability * 100.0;
    format!("{pct:.2}").parse().unwrap_or(pct)
}

/// Whole percentages keep one decimal place so the caption never reads "73%".
pub fn format_percentage(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{pct:.1}")
    } else {
        format!("{pct}")
    }
}

pub fn map(probability: f64, threshold: f64) -> PredictionResult {
    let outcome = if probability >= threshold {
        Outcome::Cancelled
    } else {
        Outcome::NotCancelled
    };
    PredictionResult {
        probability,
        outcome,
        display_label: outcome.label(),
        display_color: outcome.color(),
        display_percentage: to_percentage(probability),
    }
}

//! Presentation model for one prediction.
//!
//! Everything the page shows after a trigger is derived here as plain data:
//! verdict, percentage metric, gauge band, timestamp, map marker and the
//! importance chart (or the notice replacing it). Rendering to HTML/SVG lives
//! in the dashboard; this module stays free of markup so it can be tested and
//! serialized for the JSON API.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::coords::LatLon;
use crate::model::Classifier;
use crate::predict::Prediction;
use crate::schema::{InputRecord, COLUMNS};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const IMPORTANCE_UNAVAILABLE: &str = "Feature importance is not available for this model type.";

/// Shown in the result area before the first trigger.
pub const IDLE_HINT: &str = "Adjust earthquake parameters and click Run Tsunami Risk Prediction to begin.";

// ── Verdict ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    HighRisk,
    NoMajorRisk,
}

impl Verdict {
    pub fn from_prediction(p: &Prediction) -> Self {
        if p.is_tsunami() {
            Verdict::HighRisk
        } else {
            Verdict::NoMajorRisk
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Verdict::HighRisk => "High Tsunami Probability Detected",
            Verdict::NoMajorRisk => "No Major Tsunami Risk",
        }
    }

    pub fn advisory(self) -> &'static str {
        match self {
            Verdict::HighRisk => {
                "Immediate caution advised! The model detects a significant chance of tsunami occurrence."
            }
            Verdict::NoMajorRisk => "Safe conditions predicted, no significant tsunami risk detected.",
        }
    }
}

// ── Severity, gauge bands, risk bucket ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
        }
    }

    /// Marker colour on the epicentre map.
    pub fn map_color(self) -> &'static str {
        match self {
            Severity::Low => "green",
            Severity::Moderate => "orange",
            Severity::High => "red",
        }
    }
}

/// A fixed band on the probability gauge, `[lower, upper)` in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeBand {
    pub severity: Severity,
    pub lower: f64,
    pub upper: f64,
    pub color: &'static str,
}

pub const GAUGE_BANDS: [GaugeBand; 3] = [
    GaugeBand { severity: Severity::Low, lower: 0.0, upper: 40.0, color: "lightgreen" },
    GaugeBand { severity: Severity::Moderate, lower: 40.0, upper: 70.0, color: "gold" },
    GaugeBand { severity: Severity::High, lower: 70.0, upper: 100.0, color: "tomato" },
];

/// Band containing `percent`. The last band is closed, so 100 is High;
/// values outside [0, 100] fall into the nearest band.
pub fn gauge_band(percent: f64) -> GaugeBand {
    GAUGE_BANDS
        .into_iter()
        .find(|b| percent < b.upper)
        .unwrap_or(GAUGE_BANDS[GAUGE_BANDS.len() - 1])
}

/// Map severity from magnitude alone, independent of the model's output.
pub fn risk_bucket(magnitude: f64) -> Severity {
    if magnitude >= 7.0 {
        Severity::High
    } else if magnitude >= 5.0 {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.2} %")
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gauge {
    /// 0-100.
    pub value: f64,
    pub band: GaugeBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub location: LatLon,
    pub magnitude: f64,
    pub depth_km: f64,
    pub risk: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceBar {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportancePanel {
    /// Bars sorted by ascending importance.
    Chart { bars: Vec<ImportanceBar> },
    Unavailable { notice: &'static str },
}

impl ImportancePanel {
    /// Capability check: a chart only if the model exposes one weight per column.
    pub fn from_model(model: &dyn Classifier) -> Self {
        match model.feature_importances() {
            Some(weights) if weights.len() == COLUMNS.len() => {
                let mut bars: Vec<ImportanceBar> = COLUMNS
                    .iter()
                    .zip(weights)
                    .map(|(name, w)| ImportanceBar { feature: name.to_string(), importance: *w })
                    .collect();
                bars.sort_by(|a, b| a.importance.total_cmp(&b.importance));
                ImportancePanel::Chart { bars }
            }
            _ => ImportancePanel::Unavailable { notice: IMPORTANCE_UNAVAILABLE },
        }
    }
}

/// Everything rendered for one trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub inputs: InputRecord,
    pub prediction: Prediction,
    pub verdict: Verdict,
    pub headline: &'static str,
    pub advisory: &'static str,
    /// e.g. `"82.00 %"`.
    pub probability_label: String,
    pub gauge: Gauge,
    pub timestamp: String,
    pub map: MapPoint,
    pub importance: ImportancePanel,
}

impl Report {
    pub fn build(
        inputs: &InputRecord,
        prediction: &Prediction,
        model: &dyn Classifier,
        rendered_at: NaiveDateTime,
    ) -> Self {
        let verdict = Verdict::from_prediction(prediction);
        let percent = prediction.percent();
        Self {
            inputs: *inputs,
            prediction: *prediction,
            verdict,
            headline: verdict.headline(),
            advisory: verdict.advisory(),
            probability_label: format_percent(percent),
            gauge: Gauge { value: percent, band: gauge_band(percent) },
            timestamp: rendered_at.format(TIMESTAMP_FORMAT).to_string(),
            map: MapPoint {
                location: inputs.location(),
                magnitude: inputs.magnitude,
                depth_km: inputs.depth,
                risk: risk_bucket(inputs.magnitude),
            },
            importance: ImportancePanel::from_model(model),
        }
    }
}

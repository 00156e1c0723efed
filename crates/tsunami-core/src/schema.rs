//! The input schema the classifier was trained on, and the single-row
//! record assembled for each prediction.
//!
//! Column order and names are part of the model contract: the artifact
//! declares the columns it expects and [`check_columns`] rejects anything
//! that is not an exact match, so a reordered or renamed export fails at
//! load time instead of silently misbehaving at prediction time.

use serde::{Deserialize, Serialize};

use crate::coords::LatLon;
use crate::error::{ModelError, Result};

// ── Schema ────────────────────────────────────────────────────────────────────

/// Bumped whenever a column is added, removed, renamed or reordered.
pub const SCHEMA_VERSION: u32 = 1;

pub const N_FEATURES: usize = 12;

/// Training column names, in model input order.
pub const COLUMNS: [&str; N_FEATURES] = [
    "magnitude",
    "cdi",
    "mmi",
    "sig",
    "nst",
    "dmin",
    "gap",
    "depth",
    "latitude",
    "longitude",
    "Year",
    "Month",
];

/// Verify that `names` is exactly [`COLUMNS`]: same length, same names, same order.
pub fn check_columns(names: &[String]) -> Result<()> {
    if names.len() != N_FEATURES {
        return Err(ModelError::SchemaMismatch(format!(
            "model expects {} columns, dashboard provides {N_FEATURES}",
            names.len()
        )));
    }
    for (i, (found, expected)) in names.iter().zip(COLUMNS).enumerate() {
        if found != expected {
            return Err(ModelError::SchemaMismatch(format!(
                "column {i} is `{found}` in the model, `{expected}` in the dashboard"
            )));
        }
    }
    Ok(())
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One earthquake, as a single row of model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Moment magnitude (Mw), 4.0-10.0.
    pub magnitude: f64,
    /// Community decimal intensity, 0-10.
    pub cdi: u32,
    /// Modified Mercalli intensity, 0-10.
    pub mmi: u32,
    /// Event significance, 0-1000.
    pub sig: u32,
    /// Number of reporting stations, 0-1000.
    pub nst: u32,
    /// Distance to the nearest station in degrees, 0-10.
    pub dmin: f64,
    /// Azimuthal gap in degrees, 0-180.
    pub gap: f64,
    /// Hypocentre depth in km, 0-700.
    pub depth: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "Month")]
    pub month: u32,
}

impl InputRecord {
    /// The row handed to the classifier, in [`COLUMNS`] order.
    pub fn to_row(&self) -> [f64; N_FEATURES] {
        [
            self.magnitude,
            self.cdi as f64,
            self.mmi as f64,
            self.sig as f64,
            self.nst as f64,
            self.dmin,
            self.gap,
            self.depth,
            self.latitude,
            self.longitude,
            self.year as f64,
            self.month as f64,
        ]
    }

    /// Column names paired with their values, in [`COLUMNS`] order.
    pub fn columns(&self) -> [(&'static str, f64); N_FEATURES] {
        let row = self.to_row();
        std::array::from_fn(|i| (COLUMNS[i], row[i]))
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InputRecord {
        InputRecord {
            magnitude: 7.1,
            cdi: 6,
            mmi: 7,
            sig: 812,
            nst: 120,
            dmin: 2.5,
            gap: 18.0,
            depth: 35.0,
            latitude: -12.5,
            longitude: 166.2,
            year: 2019,
            month: 3,
        }
    }

    #[test]
    fn row_follows_column_order() {
        let row = record().to_row();
        assert_eq!(row, [7.1, 6.0, 7.0, 812.0, 120.0, 2.5, 18.0, 35.0, -12.5, 166.2, 2019.0, 3.0]);

        let names: Vec<&str> = record().columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, COLUMNS);
    }

    #[test]
    fn serialises_with_training_column_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["Year"], 2019);
        assert_eq!(json["Month"], 3);
        assert!(json.get("year").is_none());
    }

    #[test]
    fn exact_schema_accepted() {
        let names: Vec<String> = COLUMNS.iter().map(|s| s.to_string()).collect();
        assert!(check_columns(&names).is_ok());
    }

    #[test]
    fn reordered_schema_rejected() {
        let mut names: Vec<String> = COLUMNS.iter().map(|s| s.to_string()).collect();
        names.swap(0, 7);
        let err = check_columns(&names).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
        assert!(err.to_string().contains("column 0"));
    }

    #[test]
    fn renamed_or_short_schema_rejected() {
        let mut names: Vec<String> = COLUMNS.iter().map(|s| s.to_string()).collect();
        names[10] = "year".into();
        assert!(check_columns(&names).is_err());

        names.truncate(11);
        assert!(check_columns(&names).is_err());
    }
}

//! Parameter form: one bounded control per input column.
//!
//! The form is a state-to-value projection. Whatever the browser submits is
//! mapped back onto the declared controls, and every value is clamped to its
//! control's range, so downstream code never sees an out-of-range input.

use chrono::{Datelike, Local};
use serde::Serialize;

use crate::schema::{COLUMNS, N_FEATURES};

// ── Field specs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Real,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Slider,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDefault {
    Fixed(f64),
    /// The month of the local clock when the form is built.
    CurrentMonth,
}

/// One form control bound to one model column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Column name, also the submitted form key.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ValueKind,
    pub control: Control,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub fn default_value(&self, month: u32) -> f64 {
        match self.default {
            FieldDefault::Fixed(v) => v,
            FieldDefault::CurrentMonth => self.clamp(month as f64).unwrap_or(self.min),
        }
    }

    /// Project a raw value onto this control: integers are rounded, everything
    /// is clamped to `[min, max]`. Non-finite input has no projection.
    pub fn clamp(&self, raw: f64) -> Option<f64> {
        if !raw.is_finite() {
            return None;
        }
        let v = match self.kind {
            ValueKind::Real => raw,
            ValueKind::Integer => raw.round(),
        };
        Some(v.clamp(self.min, self.max))
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

const fn field(
    key: &'static str,
    label: &'static str,
    kind: ValueKind,
    control: Control,
    (min, max, step): (f64, f64, f64),
    default: FieldDefault,
) -> FieldSpec {
    FieldSpec { key, label, kind, control, min, max, step, default }
}

/// Form controls, indexed like [`COLUMNS`].
pub static FIELDS: [FieldSpec; N_FEATURES] = {
    use Control::*;
    use FieldDefault::*;
    use ValueKind::*;
    [
        field("magnitude", "Magnitude (Mw)", Real, Slider, (4.0, 10.0, 0.01), Fixed(6.5)),
        field("cdi", "CDI (Community Intensity)", Integer, Slider, (0.0, 10.0, 1.0), Fixed(5.0)),
        field("mmi", "MMI (Modified Mercalli)", Integer, Slider, (0.0, 10.0, 1.0), Fixed(5.0)),
        field("sig", "Significance (sig)", Integer, Number, (0.0, 1000.0, 1.0), Fixed(600.0)),
        field("nst", "Number of Stations (nst)", Integer, Number, (0.0, 1000.0, 1.0), Fixed(100.0)),
        field("dmin", "Dmin (Distance to nearest station)", Real, Number, (0.0, 10.0, 0.01), Fixed(1.0)),
        field("gap", "Gap (degrees)", Real, Slider, (0.0, 180.0, 1.0), Fixed(40.0)),
        field("depth", "Depth (km)", Real, Slider, (0.0, 700.0, 1.0), Fixed(50.0)),
        field("latitude", "Latitude", Real, Number, (-90.0, 90.0, 0.01), Fixed(0.0)),
        field("longitude", "Longitude", Real, Number, (-180.0, 180.0, 0.01), Fixed(0.0)),
        field("Year", "Year", Integer, Slider, (1900.0, 2025.0, 1.0), Fixed(2024.0)),
        field("Month", "Month", Integer, Slider, (1.0, 12.0, 1.0), CurrentMonth),
    ]
};

/// Order in which the controls are laid out in the sidebar.
pub const DISPLAY_ORDER: [usize; N_FEATURES] = [0, 7, 1, 2, 3, 4, 5, 6, 8, 9, 10, 11];

pub fn field_index(key: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| *c == key)
}

// ── Form state ────────────────────────────────────────────────────────────────

/// Current value of every control, indexed like [`COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: [f64; N_FEATURES],
}

impl Default for FormState {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FormState {
    /// Declared defaults, with `Month` taken from the local clock.
    pub fn defaults() -> Self {
        Self::defaults_for_month(Local::now().month())
    }

    pub fn defaults_for_month(month: u32) -> Self {
        Self { values: std::array::from_fn(|i| FIELDS[i].default_value(month)) }
    }

    /// Build the form from submitted key/value pairs. Unknown keys are
    /// ignored; missing or unparsable values keep their default.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut form = Self::defaults();
        form.apply_pairs(pairs);
        form
    }

    pub fn apply_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, raw) in pairs {
            let Ok(v) = raw.as_ref().trim().parse::<f64>() else { continue };
            self.set(key.as_ref(), v);
        }
    }

    /// Set a control by key. Returns false for unknown keys and non-finite values.
    pub fn set(&mut self, key: &str, raw: f64) -> bool {
        let Some(i) = field_index(key) else { return false };
        match FIELDS[i].clamp(raw) {
            Some(v) => {
                self.values[i] = v;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        field_index(key).map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.values
    }

    /// Controls paired with their current values, in sidebar order.
    pub fn controls(&self) -> impl Iterator<Item = (&'static FieldSpec, f64)> + '_ {
        DISPLAY_ORDER.into_iter().map(move |i| (&FIELDS[i], self.values[i]))
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn fields_line_up_with_columns() {
        for (spec, col) in FIELDS.iter().zip(COLUMNS) {
            assert_eq!(spec.key, col);
            assert!(spec.min < spec.max, "{}", spec.key);
        }
        let mut order = DISPLAY_ORDER.to_vec();
        order.sort_unstable();
        assert_eq!(order, (0..N_FEATURES).collect::<Vec<_>>());
    }

    #[test]
    fn defaults_match_declared_controls() {
        let form = FormState::defaults_for_month(7);
        assert_eq!(form.get("magnitude"), Some(6.5));
        assert_eq!(form.get("depth"), Some(50.0));
        assert_eq!(form.get("sig"), Some(600.0));
        assert_eq!(form.get("nst"), Some(100.0));
        assert_eq!(form.get("gap"), Some(40.0));
        assert_eq!(form.get("Year"), Some(2024.0));
        assert_eq!(form.get("Month"), Some(7.0));
        for (spec, v) in form.controls() {
            assert!(spec.contains(v), "{} default {v} out of range", spec.key);
        }
    }

    #[test]
    fn current_month_default_comes_from_clock() {
        let month = Local::now().month() as f64;
        assert_eq!(FormState::defaults().get("Month"), Some(month));
    }

    #[test]
    fn submitted_values_are_clamped_and_rounded() {
        let mut form = FormState::defaults_for_month(1);
        form.apply_pairs([
            ("magnitude", "11.2"),
            ("depth", "-5"),
            ("cdi", "6.6"),
            ("Year", "1850"),
            ("latitude", "-91"),
            ("Month", "12"),
        ]);
        assert_eq!(form.get("magnitude"), Some(10.0));
        assert_eq!(form.get("depth"), Some(0.0));
        assert_eq!(form.get("cdi"), Some(7.0));
        assert_eq!(form.get("Year"), Some(1900.0));
        assert_eq!(form.get("latitude"), Some(-90.0));
        assert_eq!(form.get("Month"), Some(12.0));
    }

    #[test]
    fn magnitude_keeps_two_decimals() {
        let magnitude = &FIELDS[field_index("magnitude").unwrap()];
        assert_eq!(magnitude.step, 0.01);

        let mut form = FormState::defaults_for_month(1);
        form.apply_pairs([("magnitude", "7.25")]);
        assert_eq!(form.get("magnitude"), Some(7.25));
    }

    #[test]
    fn garbage_and_unknown_keys_keep_defaults() {
        let mut form = FormState::defaults_for_month(4);
        form.apply_pairs([("magnitude", "strong"), ("gap", "NaN"), ("bogus", "3"), ("sig", "inf")]);
        assert_eq!(form, FormState::defaults_for_month(4));
        assert!(!form.set("bogus", 1.0));
    }

    #[test]
    fn random_submissions_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(0x75_4E_41_4D);
        for _ in 0..2_000 {
            let mut form = FormState::defaults_for_month(rng.gen_range(1..=12));
            for spec in &FIELDS {
                let span = spec.max - spec.min;
                let raw = rng.gen_range(spec.min - span..spec.max + span);
                form.set(spec.key, raw);
            }
            for (spec, v) in form.controls() {
                assert!(spec.contains(v), "{} = {v}", spec.key);
                if spec.kind == ValueKind::Integer {
                    assert_eq!(v, v.round(), "{} not integral", spec.key);
                }
            }
        }
    }
}

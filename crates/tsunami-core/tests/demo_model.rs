//! End-to-end checks against the shipped demo artifact.

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use tsunami_core::assemble::assemble;
use tsunami_core::form::FormState;
use tsunami_core::loader::{load_model, shared_model};
use tsunami_core::model::describe;
use tsunami_core::predict::predict;
use tsunami_core::report::{ImportancePanel, Report, Severity, Verdict};
use tsunami_core::{Classifier, TsunamiModel};

fn artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/tsunami_model.json")
}

fn demo() -> TsunamiModel {
    TsunamiModel::from_path(&artifact_path()).expect("demo artifact loads")
}

#[test]
fn demo_artifact_satisfies_the_contract() {
    let model = demo();
    assert_eq!(model.kind(), "random_forest");
    assert_eq!(model.classes(), [0i64, 1]);
    let d = describe(&model);
    assert_eq!(d.feature_names.len(), 12);
    assert!(d.has_feature_importances);
}

#[test]
fn default_form_predicts_tsunami() {
    let model = demo();
    let record = assemble(&FormState::defaults_for_month(6));
    let p = predict(&model, &record).unwrap();

    let expected = (0.8 + 0.45 + 70.0 / 130.0 + 70.0 / 190.0) / 4.0;
    assert_abs_diff_eq!(p.probability, expected, epsilon = 1e-12);
    assert_eq!(p.class, 1);
}

#[test]
fn old_deep_quiet_event_predicts_no_tsunami() {
    let model = demo();
    let mut form = FormState::defaults_for_month(6);
    form.apply_pairs([
        ("Year", "2000"),
        ("magnitude", "5.0"),
        ("depth", "300"),
        ("dmin", "0.5"),
        ("sig", "300"),
        ("gap", "10"),
    ]);
    let record = assemble(&form);
    let p = predict(&model, &record).unwrap();

    let expected = (20.0 / 250.0 + 40.0 / 190.0 + 45.0 / 175.0 + 0.4) / 4.0;
    assert_abs_diff_eq!(p.probability, expected, epsilon = 1e-12);
    assert_eq!(p.class, 0);

    let at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let report = Report::build(&record, &p, &model, at);
    assert_eq!(report.verdict, Verdict::NoMajorRisk);
    assert_eq!(report.gauge.band.severity, Severity::Low);
    assert_eq!(report.map.risk, Severity::Moderate);
}

#[test]
fn shallow_great_quake_reads_high_everywhere() {
    let model = demo();
    let mut form = FormState::defaults_for_month(3);
    form.apply_pairs([
        ("Year", "2020"),
        ("nst", "40"),
        ("depth", "20"),
        ("magnitude", "8.5"),
        ("dmin", "2"),
        ("mmi", "8"),
        ("sig", "900"),
    ]);
    let record = assemble(&form);
    let p = predict(&model, &record).unwrap();
    let at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let report = Report::build(&record, &p, &model, at);

    assert_eq!(report.verdict, Verdict::HighRisk);
    assert_eq!(report.gauge.band.severity, Severity::High);
    assert_eq!(report.map.risk, Severity::High);

    let ImportancePanel::Chart { bars } = report.importance else {
        panic!("demo forest exposes importances");
    };
    assert_eq!(bars.first().unwrap().feature, "Month");
    assert_eq!(bars.last().unwrap().feature, "Year");
}

#[test]
fn process_wide_load_is_memoized() {
    let first = load_model(&artifact_path()).unwrap();
    let second = load_model(&PathBuf::from("ignored/after/first/load.json")).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!(shared_model().is_some());
}

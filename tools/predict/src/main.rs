/// One-shot tsunami risk prediction: loads a model artifact, assembles the
/// record from flags (unset flags keep the dashboard defaults, out-of-range
/// values are clamped) and prints the report as JSON on stdout.
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tsunami_core::assemble::assemble;
use tsunami_core::form::FormState;
use tsunami_core::model::describe;
use tsunami_core::predict::predict;
use tsunami_core::report::Report;
use tsunami_core::TsunamiModel;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "predict", about = "Predict tsunami risk for one earthquake and print the report as JSON")]
struct Args {
    /// Path to the trained classifier artifact (JSON)
    #[arg(long, env = "TSUNAMI_MODEL", default_value = "models/tsunami_model.json")]
    model: PathBuf,

    /// Print the model contract (estimator, columns, classes, importances) and exit
    #[arg(long)]
    describe: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Moment magnitude (Mw), 4.0-10.0
    #[arg(long)]
    magnitude: Option<f64>,

    /// Community intensity, 0-10
    #[arg(long)]
    cdi: Option<u32>,

    /// Modified Mercalli intensity, 0-10
    #[arg(long)]
    mmi: Option<u32>,

    /// Event significance, 0-1000
    #[arg(long)]
    sig: Option<u32>,

    /// Number of reporting stations, 0-1000
    #[arg(long)]
    nst: Option<u32>,

    /// Distance to the nearest station, 0-10
    #[arg(long)]
    dmin: Option<f64>,

    /// Azimuthal gap in degrees, 0-180
    #[arg(long)]
    gap: Option<f64>,

    /// Depth in km, 0-700
    #[arg(long)]
    depth: Option<f64>,

    /// Epicentre latitude, -90 to 90
    #[arg(long, allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Epicentre longitude, -180 to 180
    #[arg(long, allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Year, 1900-2025
    #[arg(long)]
    year: Option<u32>,

    /// Month, 1-12 [default: current month]
    #[arg(long)]
    month: Option<u32>,
}

impl Args {
    /// Flags that were given, keyed by model column.
    fn overrides(&self) -> Vec<(&'static str, f64)> {
        let int = |v: Option<u32>| v.map(f64::from);
        [
            ("magnitude", self.magnitude),
            ("cdi", int(self.cdi)),
            ("mmi", int(self.mmi)),
            ("sig", int(self.sig)),
            ("nst", int(self.nst)),
            ("dmin", self.dmin),
            ("gap", self.gap),
            ("depth", self.depth),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("Year", int(self.year)),
            ("Month", int(self.month)),
        ]
        .into_iter()
        .filter_map(|(key, v)| v.map(|v| (key, v)))
        .collect()
    }

    fn form(&self) -> FormState {
        let mut form = FormState::defaults();
        for (key, v) in self.overrides() {
            form.set(key, v);
        }
        form
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    Ok(text?)
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let model = TsunamiModel::from_path(&args.model)
        .with_context(|| format!("loading model from {}", args.model.display()))?;

    if args.describe {
        println!("{}", to_json(&describe(&model), args.pretty)?);
        return Ok(());
    }

    let record = assemble(&args.form());
    let prediction = predict(&model, &record).context("prediction failed")?;
    let report = Report::build(&record, &prediction, &model, Local::now().naive_local());

    eprintln!("{} ({})", report.headline, report.probability_label);
    println!("{}", to_json(&report, args.pretty)?);
    Ok(())
}

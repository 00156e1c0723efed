//! HTML, SVG and map markup for the dashboard.
//!
//! Pages are plain strings: HTMX swaps fragments in, Leaflet draws the map,
//! and the gauge and importance chart are inline SVG.

use std::f64::consts::PI;
use std::fmt::Write as _;

use tsunami_core::form::{Control, FieldSpec, FormState, ValueKind, FIELDS};
use tsunami_core::report::{
    Gauge, ImportanceBar, ImportancePanel, MapPoint, Report, Verdict, GAUGE_BANDS, IDLE_HINT,
};
use tsunami_core::schema::InputRecord;

/// What the result area shows on a full page render.
pub enum ResultArea<'a> {
    Idle,
    Report(&'a Report),
    Error(&'a str),
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn format_value(kind: ValueKind, v: f64) -> String {
    match kind {
        ValueKind::Integer => format!("{}", v as i64),
        ValueKind::Real => format!("{v}"),
    }
}

// ── Page ──────────────────────────────────────────────────────────────────────

pub fn page(form: &FormState, result: ResultArea<'_>, model_kind: &str) -> String {
    let controls: String = form.controls().map(|(spec, v)| control(spec, v)).collect();
    let summary = summary_table(&tsunami_core::assemble::assemble(form));
    let result = match result {
        ResultArea::Idle => idle_hint(),
        ResultArea::Report(report) => report_fragment(report),
        ResultArea::Error(message) => error_fragment(message),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Tsunami Risk Prediction Dashboard</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://unpkg.com/htmx.org@1.9.10"></script>
  <style>{STYLE}</style>
</head>
<body>
  <aside class="sidebar">
    <h2>🌐 Earthquake Parameters</h2>
    <form id="params-form" action="/predict" method="post"
          hx-post="/predict" hx-target="#results" hx-swap="innerHTML">
{controls}
    </form>
    <p class="model-kind">Model: <code>{model_kind}</code></p>
  </aside>
  <main>
    <h1 class="main-title">🌋 Earthquake &amp; Tsunami Risk Prediction Dashboard</h1>
    <p class="subtitle">Use machine learning to estimate tsunami likelihood based on earthquake parameters.</p>
    <h2>📋 Input Summary</h2>
    <div id="summary" hx-get="/summary" hx-include="#params-form"
         hx-trigger="change from:#params-form, input from:#params-form delay:300ms">
{summary}
    </div>
    <button type="submit" form="params-form" class="run">🚀 Run Tsunami Risk Prediction</button>
    <div id="results">
{result}
    </div>
    <footer>Developed with ❤️ using axum, HTMX &amp; Leaflet | © 2025 Tsunami Risk Prediction AI</footer>
  </main>
</body>
</html>"##,
        model_kind = escape(model_kind),
    )
}

fn control(spec: &FieldSpec, value: f64) -> String {
    let value = format_value(spec.kind, value);
    let (key, label) = (spec.key, escape(spec.label));
    let bounds = format!(r#"min="{}" max="{}" step="{}" value="{value}""#, spec.min, spec.max, spec.step);
    match spec.control {
        Control::Slider => format!(
            r#"      <div class="control">
        <label for="{key}">{label} <output id="{key}-out">{value}</output></label>
        <input type="range" id="{key}" name="{key}" {bounds}
               oninput="document.getElementById('{key}-out').value = this.value">
      </div>
"#
        ),
        Control::Number => format!(
            r#"      <div class="control">
        <label for="{key}">{label}</label>
        <input type="number" id="{key}" name="{key}" {bounds}>
      </div>
"#
        ),
    }
}

fn idle_hint() -> String {
    format!(r#"<div class="callout info">{IDLE_HINT}</div>"#)
}

/// One-row table of the assembled record, in schema order.
pub fn summary_table(record: &InputRecord) -> String {
    let columns = record.columns();
    let mut head = String::new();
    let mut row = String::new();
    for ((name, v), spec) in columns.iter().zip(&FIELDS) {
        let _ = write!(head, "<th>{name}</th>");
        let _ = write!(row, "<td>{}</td>", format_value(spec.kind, *v));
    }
    format!(
        r#"<table class="summary"><thead><tr>{head}</tr></thead><tbody><tr>{row}</tr></tbody></table>"#
    )
}

pub fn error_fragment(message: &str) -> String {
    format!(
        r#"<div class="callout error"><strong>Prediction failed.</strong> {}</div>"#,
        escape(message)
    )
}

// ── Report ────────────────────────────────────────────────────────────────────

pub fn report_fragment(report: &Report) -> String {
    let (icon, callout) = match report.verdict {
        Verdict::HighRisk => ("🌊", "warning"),
        Verdict::NoMajorRisk => ("✅", "success"),
    };
    let importance = match &report.importance {
        ImportancePanel::Chart { bars } => importance_svg(bars),
        ImportancePanel::Unavailable { notice } => format!(r#"<div class="callout info">{notice}</div>"#),
    };

    format!(
        r#"<h2>🔍 Prediction Result</h2>
<div class="result-grid">
  <div class="verdict">
    <h3>{icon} <strong>{headline}</strong></h3>
    <div class="callout {callout}">{advisory}</div>
    <div class="metric">
      <span class="metric-label">Tsunami Risk Probability</span>
      <span class="metric-value">{label}</span>
    </div>
  </div>
  <div class="gauge-panel">{gauge}</div>
</div>
<div class="callout info">🕒 <strong>Last Updated:</strong> {timestamp}</div>
<h2>🌍 Global Earthquake Visualization</h2>
{map}
<h2>📊 Model Feature Importance</h2>
{importance}"#,
        headline = report.headline,
        advisory = report.advisory,
        label = report.probability_label,
        gauge = gauge_svg(&report.gauge),
        timestamp = report.timestamp,
        map = map_script(&report.map),
    )
}

// ── Gauge ─────────────────────────────────────────────────────────────────────

const GAUGE_CX: f64 = 160.0;
const GAUGE_CY: f64 = 170.0;
const GAUGE_R: f64 = 120.0;
const GAUGE_BAR_COLOR: &str = "#007BFF";

/// Point on the gauge arc for `percent`: 0 at the left end, 100 at the right.
fn gauge_point(percent: f64) -> (f64, f64) {
    let theta = PI * (1.0 - percent.clamp(0.0, 100.0) / 100.0);
    (GAUGE_CX + GAUGE_R * theta.cos(), GAUGE_CY - GAUGE_R * theta.sin())
}

fn arc_path(from: f64, to: f64) -> String {
    let (x0, y0) = gauge_point(from);
    let (x1, y1) = gauge_point(to);
    format!("M {x0:.2} {y0:.2} A {GAUGE_R} {GAUGE_R} 0 0 1 {x1:.2} {y1:.2}")
}

/// Half-ring gauge: the three severity bands with the value arc on top.
pub fn gauge_svg(gauge: &Gauge) -> String {
    let mut svg = String::from(
        r#"<svg class="gauge" viewBox="0 0 320 210" role="img" aria-label="Risk Level (%)">"#,
    );
    svg.push_str(r#"<text x="160" y="18" text-anchor="middle" class="gauge-title">Risk Level (%)</text>"#);
    for band in GAUGE_BANDS {
        let _ = write!(
            svg,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="34"/>"#,
            arc_path(band.lower, band.upper),
            band.color
        );
    }
    if gauge.value > 0.0 {
        let _ = write!(
            svg,
            r#"<path d="{}" fill="none" stroke="{GAUGE_BAR_COLOR}" stroke-width="12"/>"#,
            arc_path(0.0, gauge.value)
        );
    }
    for tick in (0..=100).step_by(20) {
        let theta = PI * (1.0 - tick as f64 / 100.0);
        let r = GAUGE_R + 28.0;
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="gauge-tick">{tick}</text>"#,
            GAUGE_CX + r * theta.cos(),
            GAUGE_CY - r * theta.sin() + 4.0
        );
    }
    let _ = write!(
        svg,
        r#"<text x="{GAUGE_CX}" y="{:.0}" text-anchor="middle" class="gauge-value">{:.2}</text>"#,
        GAUGE_CY - 10.0,
        gauge.value
    );
    let _ = write!(
        svg,
        r#"<text x="{GAUGE_CX}" y="{:.0}" text-anchor="middle" class="gauge-band">{}</text></svg>"#,
        GAUGE_CY + 22.0,
        gauge.band.severity.label()
    );
    svg
}

// ── Importance chart ──────────────────────────────────────────────────────────

const VIRIDIS: [(u8, u8, u8); 5] = [(68, 1, 84), (59, 82, 139), (33, 145, 140), (94, 201, 98), (253, 231, 37)];

/// Viridis colour at `t` in [0, 1].
pub fn viridis(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (VIRIDIS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let f = pos - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    format!("#{:02x}{:02x}{:02x}", lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Horizontal bars, ascending order bottom to top, coloured by weight.
pub fn importance_svg(bars: &[ImportanceBar]) -> String {
    const TOP: f64 = 36.0;
    const ROW: f64 = 26.0;
    const LABEL_W: f64 = 100.0;
    const PLOT_W: f64 = 380.0;

    let max = bars.iter().map(|b| b.importance).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { max } else { 1.0 };
    let height = TOP + ROW * bars.len() as f64 + 12.0;

    let mut svg = format!(
        r#"<svg class="importance" viewBox="0 0 {w} {height}" role="img" aria-label="Feature Influence on Tsunami Prediction">"#,
        w = LABEL_W + PLOT_W + 70.0,
    );
    let _ = write!(
        svg,
        r#"<text x="{:.0}" y="20" text-anchor="middle" class="chart-title">Feature Influence on Tsunami Prediction</text>"#,
        (LABEL_W + PLOT_W + 70.0) / 2.0
    );
    for (row, bar) in bars.iter().rev().enumerate() {
        let y = TOP + ROW * row as f64;
        let width = PLOT_W * bar.importance / scale;
        let name = escape(&bar.feature);
        let _ = write!(
            svg,
            r#"<text x="{:.0}" y="{:.1}" text-anchor="end" class="bar-label">{name}</text><rect x="{LABEL_W}" y="{:.1}" width="{width:.2}" height="{:.1}" fill="{}"><title>{name}: {:.4}</title></rect><text x="{:.2}" y="{:.1}" class="bar-value">{:.3}</text>"#,
            LABEL_W - 8.0,
            y + ROW * 0.6,
            y + 3.0,
            ROW - 6.0,
            viridis(bar.importance / scale),
            bar.importance,
            LABEL_W + width + 6.0,
            y + ROW * 0.6,
            bar.importance
        );
    }
    svg.push_str("</svg>");
    svg
}

// ── Map ───────────────────────────────────────────────────────────────────────

const MAP_ZOOM: f64 = 2.5;
const MARKER_MAX_RADIUS: f64 = 30.0;

/// Marker radius in pixels, proportional to magnitude (10 → largest).
pub fn marker_radius(magnitude: f64) -> f64 {
    (magnitude / 10.0 * MARKER_MAX_RADIUS).clamp(2.0, MARKER_MAX_RADIUS)
}

/// Map container plus the Leaflet script drawing the epicentre marker.
pub fn map_script(point: &MapPoint) -> String {
    let (lat, lon) = (point.location.lat, point.location.lon);
    let color = point.risk.map_color();
    format!(
        r#"<div id="quake-map" class="map"></div>
<script>
(function() {{
  var map = L.map('quake-map', {{ zoomSnap: 0.5 }}).setView([{lat}, {lon}], {MAP_ZOOM});
  L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    attribution: '&copy; OpenStreetMap contributors'
  }}).addTo(map);
  L.circleMarker([{lat}, {lon}], {{
    radius: {radius:.1},
    color: '{color}',
    fillColor: '{color}',
    weight: 1,
    fillOpacity: 0.7
  }}).bindTooltip('<b>{risk} risk</b><br>Magnitude: {magnitude}<br>Depth (km): {depth}').addTo(map);
}})();
</script>"#,
        radius = marker_radius(point.magnitude),
        risk = point.risk.label(),
        magnitude = point.magnitude,
        depth = point.depth_km,
    )
}

const STYLE: &str = r#"
body { margin: 0; display: flex; font-family: system-ui, sans-serif; color: #1f2933; }
.sidebar { width: 300px; min-height: 100vh; padding: 1rem 1.25rem; background: #f4f7fb; box-sizing: border-box; }
.sidebar h2 { font-size: 1.1rem; }
main { flex: 1; padding: 1.5rem 2rem; max-width: 1100px; }
.main-title { text-align: center; color: #003366; font-size: 2.2rem; margin-bottom: 0.2rem; }
.subtitle { text-align: center; color: #555; margin-top: 0; }
.control { margin-bottom: 0.8rem; }
.control label { display: block; font-size: 0.9rem; margin-bottom: 0.2rem; }
.control input { width: 100%; }
.control output { float: right; font-weight: 600; }
.model-kind { font-size: 0.8rem; color: #667; }
table.summary { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
table.summary th, table.summary td { border: 1px solid #d9e2ec; padding: 0.3rem 0.5rem; text-align: right; }
table.summary th { background: #f0f4f8; }
button.run { margin: 1rem 0; padding: 0.6rem 1.2rem; font-size: 1rem; border: 0; border-radius: 6px; background: #ff4b4b; color: white; cursor: pointer; }
.callout { padding: 0.75rem 1rem; border-radius: 6px; margin: 0.75rem 0; }
.callout.info { background: #e7f1fb; color: #0b4f8a; }
.callout.warning { background: #fff4e5; color: #8a5300; }
.callout.success { background: #e6f6ea; color: #1c6b32; }
.callout.error { background: #fdecea; color: #a1221a; }
.result-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; align-items: center; }
.metric-label { display: block; font-size: 0.9rem; color: #555; }
.metric-value { display: block; font-size: 2.2rem; font-weight: 700; color: #0d6efd; }
svg.gauge { width: 100%; max-width: 360px; }
.gauge-value { font-size: 34px; font-weight: 700; fill: #1f2933; }
.gauge-tick, .gauge-band { font-size: 12px; fill: #555; }
.gauge-title, .chart-title { font-size: 14px; font-weight: 600; fill: #1f2933; }
svg.importance { width: 100%; max-width: 640px; }
.bar-label, .bar-value { font-size: 12px; fill: #1f2933; }
.map { height: 420px; border-radius: 8px; }
footer { margin-top: 2rem; text-align: center; font-size: 0.8rem; color: #888; }
"#;

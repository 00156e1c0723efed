//! HTTP routes.
//!
//! Every request is its own render cycle: the submitted values are projected
//! onto the form, assembled into one record and, for the predict routes, run
//! through the shared model. A model failure aborts that request only.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Local;
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tsunami_core::assemble::assemble;
use tsunami_core::form::{FieldSpec, FormState, FIELDS};
use tsunami_core::model::{describe, ModelDescription};
use tsunami_core::predict::predict;
use tsunami_core::report::Report;
use tsunami_core::schema::SCHEMA_VERSION;
use tsunami_core::{Classifier, ModelError};

use crate::config::DashboardConfig;
use crate::render::{self, ResultArea};

type Pairs = Vec<(String, String)>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/summary", get(summary_handler))
        .route("/predict", post(predict_handler))
        .route("/api/predict", post(api_predict_handler))
        .route("/api/schema", get(api_schema_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: DashboardConfig, model: Arc<dyn Classifier>) -> anyhow::Result<()> {
    let app = create_router(AppState::new(model));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌊 Tsunami risk dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Predict for `form` and build the view-model stamped with the local time.
fn run_prediction(model: &dyn Classifier, form: &FormState) -> Result<Report, ModelError> {
    let record = assemble(form);
    let prediction = predict(model, &record)?;
    tracing::info!(
        class = prediction.class,
        probability = prediction.probability,
        magnitude = record.magnitude,
        "prediction served"
    );
    Ok(Report::build(&record, &prediction, model, Local::now().naive_local()))
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn index_handler(State(state): State<AppState>, Query(pairs): Query<Pairs>) -> Html<String> {
    let form = FormState::from_pairs(pairs);
    Html(render::page(&form, ResultArea::Idle, state.model.kind()))
}

async fn summary_handler(Query(pairs): Query<Pairs>) -> Html<String> {
    let form = FormState::from_pairs(pairs);
    Html(render::summary_table(&assemble(&form)))
}

/// HTMX swaps the fragment into the result area; a plain form post gets the
/// whole page back.
async fn predict_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Pairs>,
) -> Response {
    let form = FormState::from_pairs(pairs);
    let htmx = is_htmx(&headers);

    match run_prediction(state.model.as_ref(), &form) {
        Ok(report) if htmx => Html(render::report_fragment(&report)).into_response(),
        Ok(report) => {
            Html(render::page(&form, ResultArea::Report(&report), state.model.kind())).into_response()
        }
        Err(e) => {
            tracing::error!("prediction failed: {e}");
            let message = e.to_string();
            let body = if htmx {
                render::error_fragment(&message)
            } else {
                render::page(&form, ResultArea::Error(&message), state.model.kind())
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
        }
    }
}

/// Takes a JSON object of column → number; missing columns keep their defaults.
async fn api_predict_handler(
    State(state): State<AppState>,
    Json(values): Json<BTreeMap<String, f64>>,
) -> Response {
    let mut form = FormState::defaults();
    for (key, value) in &values {
        form.set(key, *value);
    }

    match run_prediction(state.model.as_ref(), &form) {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!("prediction failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

#[derive(Serialize)]
struct SchemaResponse {
    schema_version: u32,
    fields: &'static [FieldSpec],
    model: ModelDescription,
}

async fn api_schema_handler(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        schema_version: SCHEMA_VERSION,
        fields: &FIELDS,
        model: describe(state.model.as_ref()),
    })
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use tsunami_core::model::schema_feature_names;
    use tsunami_core::TsunamiModel;

    use super::*;

    const DEMO_MODEL: &str = include_str!("../../../models/tsunami_model.json");

    /// A binary model whose inference always fails.
    struct BrokenModel {
        names: Vec<String>,
    }

    impl Classifier for BrokenModel {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn classes(&self) -> &[i64] {
            &[0, 1]
        }

        fn predict_proba(&self, row: &[f64]) -> tsunami_core::Result<Vec<f64>> {
            Err(ModelError::FeatureCount { expected: 13, found: row.len() })
        }
    }

    fn demo_app() -> Router {
        let model = TsunamiModel::from_json(DEMO_MODEL).unwrap();
        create_router(AppState::new(Arc::new(model)))
    }

    fn broken_app() -> Router {
        create_router(AppState::new(Arc::new(BrokenModel { names: schema_feature_names() })))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(uri: &str, body: &str, htmx: bool) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/x-www-form-urlencoded");
        if htmx {
            builder = builder.header("HX-Request", "true");
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let response = demo_app().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn index_shows_form_summary_and_hint() {
        let response = demo_app()
            .oneshot(Request::get("/?magnitude=8.1&depth=12").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"name="magnitude""#));
        assert!(html.contains(r#"value="8.1""#));
        assert!(html.contains("Run Tsunami Risk Prediction to begin"));
        assert!(html.contains("<table"));
    }

    #[tokio::test]
    async fn summary_fragment_reflects_clamped_values() {
        let response = demo_app()
            .oneshot(Request::get("/summary?magnitude=12&Year=1800").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("<td>10</td>"));
        assert!(html.contains("<td>1900</td>"));
        assert!(!html.contains("<html"));
    }

    #[tokio::test]
    async fn htmx_predict_returns_fragment() {
        let body = "magnitude=8.5&depth=20&Year=2020&nst=40&dmin=2&mmi=8&sig=900";
        let response = demo_app().oneshot(form_post("/predict", body, true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("High Tsunami Probability Detected"));
        assert!(html.contains("Feature Influence on Tsunami Prediction"));
        assert!(html.contains("L.circleMarker"));
        assert!(!html.contains("<html"));
    }

    #[tokio::test]
    async fn plain_predict_returns_full_page() {
        let response = demo_app().oneshot(form_post("/predict", "magnitude=7.2", false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<html"));
        assert!(html.contains("Tsunami Risk Probability"));
    }

    #[tokio::test]
    async fn model_failure_is_a_500_panel_and_server_keeps_serving() {
        let app = broken_app();
        let response = app.clone().oneshot(form_post("/predict", "magnitude=7", true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = body_text(response).await;
        assert!(html.contains("Prediction failed"));
        assert!(html.contains("expected 13 input features"));

        let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_predict_returns_report_json() {
        let request = Request::post("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"magnitude": 5.0, "Year": 2000, "depth": 300, "dmin": 0.5, "sig": 300, "gap": 10}"#))
            .unwrap();
        let response = demo_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["verdict"], "no_major_risk");
        assert_eq!(json["prediction"]["class"], 0);
        assert_eq!(json["map"]["risk"], "moderate");
        assert_eq!(json["importance"]["status"], "chart");
    }

    #[tokio::test]
    async fn api_predict_failure_is_json_error() {
        let request = Request::post("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = broken_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["error"].as_str().unwrap().contains("expected 13"));
    }

    #[tokio::test]
    async fn schema_describes_fields_and_model() {
        let response =
            broken_app().oneshot(Request::get("/api/schema").body(Body::empty()).unwrap()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["fields"].as_array().unwrap().len(), 12);
        assert_eq!(json["fields"][10]["key"], "Year");
        assert_eq!(json["model"]["estimator"], "unknown");
        assert_eq!(json["model"]["has_feature_importances"], false);
    }
}

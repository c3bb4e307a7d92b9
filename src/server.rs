//! HTTP surface: router and prediction handlers.
//!
//! Thin glue between the inference engine and the decision synthesizer.
//! Handlers are stateless; everything shared lives in [`AppState`].

use crate::decision::DecisionSynthesizer;
use crate::error::{ApiError, ApiResult};
use crate::feature_extractor::FeatureExtractor;
use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::models::inference::{InferenceEngine, InferenceError};
use crate::types::analysis::DecisionAnalysis;
use crate::types::assessment::BiomarkerAssessment;
use crate::types::label::ImpairmentLevel;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<ServiceMetrics>,
    pub synthesizer: Arc<DecisionSynthesizer>,
    pub extractor: Arc<FeatureExtractor>,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            engine,
            metrics,
            synthesizer: Arc::new(DecisionSynthesizer::new()),
            extractor: Arc::new(FeatureExtractor::new()),
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/predict/biomarker", post(predict_biomarker))
        .route("/api/v1/predict/mri", post(predict_mri))
        .route("/api/v1/metrics", get(metrics_snapshot))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// MRI prediction request carrying a pre-extracted feature vector.
///
/// Image decoding and preprocessing happen upstream; this service only
/// sees the flattened input the classifier expects.
#[derive(Debug, Deserialize)]
pub struct MriPredictionRequest {
    /// Caller-supplied study identifier
    pub study_id: String,
    /// Flattened 128x128 RGB input
    pub features: Vec<f32>,
}

/// Response for both prediction endpoints
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// Unique id for this prediction
    pub prediction_id: String,
    /// Caller-supplied identifier echoed back
    pub reference_id: String,
    /// Model that produced the prediction
    pub model: String,
    /// Top-ranked class label
    pub prediction: ImpairmentLevel,
    /// Full decision analysis
    pub analysis: DecisionAnalysis,
    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    models_loaded: Vec<String>,
    timestamp: i64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        models_loaded: state.engine.model_names(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn predict_biomarker(
    State(state): State<AppState>,
    Json(assessment): Json<BiomarkerAssessment>,
) -> ApiResult<Json<PredictionResponse>> {
    if assessment.assessment_id.is_empty() {
        state.metrics.record_rejection();
        return Err(ApiError::ValidationError(
            "assessment_id must not be empty".to_string(),
        ));
    }

    let features = state.extractor.extract(&assessment);
    run_prediction(&state, "biomarker", assessment.assessment_id, &features).await
}

async fn predict_mri(
    State(state): State<AppState>,
    Json(request): Json<MriPredictionRequest>,
) -> ApiResult<Json<PredictionResponse>> {
    if request.features.is_empty() {
        state.metrics.record_rejection();
        return Err(ApiError::ValidationError(
            "features must not be empty".to_string(),
        ));
    }

    run_prediction(&state, "mri", request.study_id, &request.features).await
}

/// Shared handler pipeline: infer, synthesize, record, respond.
async fn run_prediction(
    state: &AppState,
    model: &str,
    reference_id: String,
    features: &[f32],
) -> ApiResult<Json<PredictionResponse>> {
    let start_time = Instant::now();

    let inference_start = Instant::now();
    let output = state.engine.predict(model, features).map_err(|e| {
        if matches!(
            e,
            InferenceError::UnknownModel(_) | InferenceError::FeatureCount { .. }
        ) {
            state.metrics.record_rejection();
        }
        ApiError::from(e)
    })?;
    state
        .metrics
        .record_model_time(&output.model, inference_start.elapsed());

    let analysis = state
        .synthesizer
        .synthesize(&output.scores, &output.class_order)?;

    let processing_time = start_time.elapsed();
    state
        .metrics
        .record_prediction(processing_time, analysis.confidence_tier.as_str());

    info!(
        model = %output.model,
        reference_id = %reference_id,
        prediction = %analysis.primary.label,
        confidence_tier = analysis.confidence_tier.as_str(),
        processing_time_us = processing_time.as_micros(),
        "Prediction served"
    );

    Ok(Json(PredictionResponse {
        prediction_id: uuid::Uuid::new_v4().to_string(),
        reference_id,
        model: output.model,
        prediction: analysis.primary.label,
        analysis,
        timestamp: chrono::Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mri_request_deserialization() {
        let json = r#"{"study_id": "study_42", "features": [0.1, 0.2, 0.3]}"#;
        let request: MriPredictionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.study_id, "study_42");
        assert_eq!(request.features.len(), 3);
    }

    #[test]
    fn test_prediction_response_serialization() {
        let synthesizer = DecisionSynthesizer::new();
        let labels = [
            ImpairmentLevel::NoImpairment,
            ImpairmentLevel::VeryMildImpairment,
            ImpairmentLevel::MildImpairment,
            ImpairmentLevel::ModerateImpairment,
        ];
        let analysis = synthesizer
            .synthesize(&[3.0, 0.5, 0.2, 0.1], &labels)
            .unwrap();

        let response = PredictionResponse {
            prediction_id: "p1".to_string(),
            reference_id: "pat_1001".to_string(),
            model: "biomarker".to_string(),
            prediction: analysis.primary.label,
            analysis,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"prediction\":\"No Impairment\""));
        assert!(json.contains("confidence_tier"));
    }
}

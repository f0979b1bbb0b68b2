use std::sync::Arc;
use axum::{
    Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::PulseEngine;
use crate::model::{LiveComment, User, Venue};
use crate::popup::VenuePopup;
use crate::reputation::{
    format_reputation, normalize_reputation, reputation_background_color, reputation_color,
    ReputationTier,
};
use crate::time_ago::time_ago;

/// Most experience values handed out per request
const MAX_EXPERIENCE_BATCH: usize = 1000;

/// JSON API consumed by the map frontend
pub struct WebServer {
    engine: Arc<PulseEngine>,
    config: Arc<Config>,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<PulseEngine>,
}

/// 400 with a JSON error body
struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.0 })),
        )
            .into_response()
    }
}

type ApiResult = Result<Json<serde_json::Value>, ApiError>;

#[derive(Deserialize)]
struct ReputationQuery {
    score: Option<f64>,
    trustability: Option<f64>,
}

#[derive(Deserialize)]
struct TimeAgoQuery {
    timestamp: String,
}

#[derive(Deserialize)]
struct NormalQuery {
    mean: f64,
    std_dev: f64,
}

#[derive(Deserialize)]
struct GammaQuery {
    alpha: f64,
    theta: f64,
}

#[derive(Deserialize)]
struct ExperienceQuery {
    count: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentRequest {
    #[serde(default)]
    comments: Vec<LiveComment>,
    user: Option<User>,
    text: String,
}

impl WebServer {
    pub fn new(engine: Arc<PulseEngine>, config: Arc<Config>) -> Self {
        Self { engine, config }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
        };

        Router::new()
            .route("/api/stats", get(api_stats))
            .route("/api/reputation", get(api_reputation))
            .route("/api/time-ago", get(api_time_ago))
            .route("/api/sample/normal", get(api_sample_normal))
            .route("/api/sample/gamma", get(api_sample_gamma))
            .route("/api/sample/experience", get(api_sample_experience))
            .route("/api/popup", post(api_popup))
            .route("/api/comments", post(api_add_comment))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.web.address, self.config.web.port);
        info!("🗺️ Web API listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

fn reject(state: &AppState, msg: impl Into<String>) -> ApiError {
    let msg = msg.into();
    warn!("Rejected request: {}", msg);
    state.engine.record_rejection();
    ApiError(msg)
}

/// Route query-string decode failures through the JSON error path.
fn query_params<T>(
    state: &AppState,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| reject(state, e.body_text()))
}

/// Same for request bodies; axum would otherwise answer 415/422 in plain text.
fn json_body<T>(state: &AppState, body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| reject(state, e.body_text()))
}

/// Stats API
async fn api_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.engine.get_stats())
}

/// Badge colours for a reputation score or a raw trustability
async fn api_reputation(
    State(state): State<AppState>,
    query: Result<Query<ReputationQuery>, QueryRejection>,
) -> ApiResult {
    let params = query_params(&state, query)?;
    let score = match (params.score, params.trustability) {
        (Some(score), _) => score,
        (None, Some(trust)) => normalize_reputation(trust),
        (None, None) => return Err(reject(&state, "either score or trustability is required")),
    };
    Ok(Json(serde_json::json!({
        "score": score,
        "tier": ReputationTier::from_score(score),
        "color": reputation_color(score),
        "background": reputation_background_color(score),
        "label": format_reputation(score),
    })))
}

async fn api_time_ago(
    State(state): State<AppState>,
    query: Result<Query<TimeAgoQuery>, QueryRejection>,
) -> ApiResult {
    let params = query_params(&state, query)?;
    let timestamp = DateTime::parse_from_rfc3339(&params.timestamp)
        .map_err(|e| reject(&state, format!("invalid timestamp '{}': {}", params.timestamp, e)))?
        .with_timezone(&Utc);
    Ok(Json(serde_json::json!({
        "text": time_ago(timestamp),
    })))
}

async fn api_sample_normal(
    State(state): State<AppState>,
    query: Result<Query<NormalQuery>, QueryRejection>,
) -> ApiResult {
    let params = query_params(&state, query)?;
    if !params.mean.is_finite() || !params.std_dev.is_finite() || params.std_dev < 0.0 {
        return Err(reject(&state, "mean must be finite and std_dev finite and non-negative"));
    }
    let value = state.engine.sample_normal(params.mean, params.std_dev);
    Ok(Json(serde_json::json!({ "value": value })))
}

async fn api_sample_gamma(
    State(state): State<AppState>,
    query: Result<Query<GammaQuery>, QueryRejection>,
) -> ApiResult {
    let params = query_params(&state, query)?;
    let value = state
        .engine
        .sample_gamma(params.alpha, params.theta)
        .map_err(|e| reject(&state, e.to_string()))?;
    Ok(Json(serde_json::json!({ "value": value })))
}

async fn api_sample_experience(
    State(state): State<AppState>,
    query: Result<Query<ExperienceQuery>, QueryRejection>,
) -> ApiResult {
    let params = query_params(&state, query)?;
    let count = params.count.unwrap_or(1);
    if count == 0 || count > MAX_EXPERIENCE_BATCH {
        return Err(reject(
            &state,
            format!("count must be between 1 and {}", MAX_EXPERIENCE_BATCH),
        ));
    }
    Ok(Json(serde_json::json!({
        "values": state.engine.sample_experience(count),
    })))
}

async fn api_popup(
    State(state): State<AppState>,
    body: Result<Json<Venue>, JsonRejection>,
) -> Result<Json<VenuePopup>, ApiError> {
    let venue = json_body(&state, body)?;
    Ok(Json(state.engine.render_popup(&venue, Utc::now())))
}

async fn api_add_comment(
    State(state): State<AppState>,
    body: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ApiResult {
    let req = json_body(&state, body)?;
    let comments = state
        .engine
        .add_comment(req.comments, req.user.as_ref(), &req.text, Utc::now())
        .map_err(|e| reject(&state, e.to_string()))?;
    Ok(Json(serde_json::json!({ "comments": comments })))
}

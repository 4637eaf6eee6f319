//! HTTP surface: router, shared state, and request/response shapes.
//!
//! Multi-source endpoints return 200 with per-source failures embedded in
//! the body; single-source endpoints surface errors as `500 {"detail": msg}`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::aggregate::{AggregateResponse, Aggregator};
use crate::ai::{
    build_chat_client, AnalysisRequest, DynAnalysisEngine, DynChatClient, StubAnalysisEngine,
    VisualizationKind,
};
use crate::config::AppConfig;
use crate::landsat::LandsatClient;
use crate::library::NasaLibraryClient;
use crate::sources::copernicus::CopernicusClient;
use crate::sources::ghsl::GhslClient;
use crate::sources::sedac::SedacClient;
use crate::sources::worldpop::WorldPopClient;
use crate::sources::worldview::WorldviewClient;
use crate::sources::wri::WriClient;
use crate::sources::{DataSource, LocationQuery};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub worldview: Arc<WorldviewClient>,
    pub worldpop: Arc<WorldPopClient>,
    pub landsat: Arc<LandsatClient>,
    pub library: Arc<NasaLibraryClient>,
    pub analysis: DynAnalysisEngine,
    pub chat: DynChatClient,
}

impl AppState {
    /// Wire every client around one shared, read-only HTTP handle.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("urban-atlas/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()?;

        let worldview = Arc::new(WorldviewClient::new(
            http.clone(),
            cfg.earthdata_token.clone(),
        ));
        let worldpop = Arc::new(WorldPopClient::new(http.clone()));

        // Declaration order fixes the summary ordering of the aggregate.
        let sources: Vec<Arc<dyn DataSource>> = vec![
            worldview.clone(),
            Arc::new(SedacClient::new(http.clone())),
            Arc::new(GhslClient::new(http.clone())),
            worldpop.clone(),
            Arc::new(CopernicusClient::new(http.clone())),
            Arc::new(WriClient::new(http.clone())),
        ];
        let aggregator = Arc::new(Aggregator::new(
            sources,
            Duration::from_secs(cfg.source_timeout_secs),
        ));

        Ok(Self {
            aggregator,
            worldview,
            worldpop,
            landsat: Arc::new(LandsatClient::new(http.clone())),
            library: Arc::new(NasaLibraryClient::new(http.clone())),
            analysis: Arc::new(StubAnalysisEngine),
            chat: build_chat_client(http, cfg.gemini_api_key.clone()),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/data-sources", get(data_sources))
        .route("/api/official/comprehensive", get(comprehensive))
        .route("/api/official/worldview", get(worldview_tile))
        .route("/api/population", get(population))
        .route("/api/population/trends", get(population_trends))
        .route("/api/satellite/imagery", get(satellite_imagery))
        .route("/api/satellite/vegetation", get(satellite_vegetation))
        .route("/api/satellite/heat-island", get(satellite_heat_island))
        .route("/api/satellite/bands", get(satellite_bands))
        .route("/api/library/search", get(library_search))
        .route("/api/ai/analyze-urban-data", post(analyze_urban_data))
        .route("/api/ai/chat", post(ai_chat))
        .route("/api/ai/visualization-data", get(visualization_data))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---------------------------------------------------------------
// Errors
// ---------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "detail": msg }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{e:#}"))
    }
}

fn checked_location(lat: f64, lng: f64) -> Result<LocationQuery, ApiError> {
    let q = LocationQuery::new(lat, lng);
    q.validate().map_err(ApiError::BadRequest)?;
    Ok(q)
}

// ---------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Urban Atlas API",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now().to_rfc3339() }))
}

async fn data_sources(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Urban Atlas API - Data Sources",
        "aggregated_sources": state.aggregator.source_names(),
        "endpoints": [
            "/api/official/comprehensive",
            "/api/official/worldview",
            "/api/population",
            "/api/population/trends",
            "/api/satellite/imagery",
            "/api/satellite/vegetation",
            "/api/satellite/heat-island",
            "/api/satellite/bands",
            "/api/library/search",
            "/api/ai/analyze-urban-data",
            "/api/ai/chat",
            "/api/ai/visualization-data",
        ],
    }))
}

// ---------------------------------------------------------------
// Aggregation + single-source endpoints
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct CoordsQuery {
    lat: f64,
    lng: f64,
}

async fn comprehensive(
    State(state): State<AppState>,
    Query(q): Query<CoordsQuery>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let location = checked_location(q.lat, q.lng)?;
    // Always 200: partial failure lives in the body summary.
    Ok(Json(state.aggregator.aggregate(location).await))
}

#[derive(Deserialize)]
struct WorldviewQuery {
    lat: f64,
    lng: f64,
    layer: Option<String>,
    date: Option<String>,
}

async fn worldview_tile(
    State(state): State<AppState>,
    Query(q): Query<WorldviewQuery>,
) -> Result<Json<Value>, ApiError> {
    let location = checked_location(q.lat, q.lng)?;
    let tile = state
        .worldview
        .tile_metadata(&location, q.layer.as_deref(), q.date.as_deref())
        .await?;
    Ok(Json(tile))
}

#[derive(Deserialize)]
struct PopulationQuery {
    #[serde(default = "default_country")]
    country: String,
    #[serde(default = "default_year")]
    year: u16,
}

fn default_country() -> String {
    "USA".to_string()
}
fn default_year() -> u16 {
    2020
}

async fn population(
    State(state): State<AppState>,
    Query(q): Query<PopulationQuery>,
) -> Result<Json<Value>, ApiError> {
    let data = state.worldpop.country_population(&q.country, q.year).await?;
    Ok(Json(data))
}

#[derive(Deserialize)]
struct TrendsQuery {
    #[serde(default = "default_country")]
    country: String,
    #[serde(default = "default_trend_start")]
    start_year: u16,
    #[serde(default = "default_year")]
    end_year: u16,
}

fn default_trend_start() -> u16 {
    2000
}

async fn population_trends(
    State(state): State<AppState>,
    Query(q): Query<TrendsQuery>,
) -> Result<Json<Value>, ApiError> {
    if q.start_year > q.end_year {
        return Err(ApiError::BadRequest(format!(
            "start_year {} is after end_year {}",
            q.start_year, q.end_year
        )));
    }
    let data = state
        .worldpop
        .growth_trends(&q.country, q.start_year, q.end_year)
        .await?;
    Ok(Json(data))
}

// ---------------------------------------------------------------
// Landsat / imagery endpoints
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct ImageryQuery {
    lat: f64,
    lng: f64,
    #[serde(default = "default_imagery_radius")]
    radius_km: f64,
    #[serde(default = "default_cloud_cover")]
    cloud_cover: u8,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_imagery_radius() -> f64 {
    5.0
}
fn default_cloud_cover() -> u8 {
    20
}
fn default_limit() -> usize {
    5
}

async fn satellite_imagery(
    State(state): State<AppState>,
    Query(q): Query<ImageryQuery>,
) -> Result<Json<Value>, ApiError> {
    let location = checked_location(q.lat, q.lng)?;
    let data = state
        .landsat
        .imagery(&location, q.radius_km, q.cloud_cover, q.limit)
        .await?;
    Ok(Json(data))
}

#[derive(Deserialize)]
struct RadiusQuery {
    lat: f64,
    lng: f64,
    radius_km: Option<f64>,
}

async fn satellite_vegetation(
    State(state): State<AppState>,
    Query(q): Query<RadiusQuery>,
) -> Result<Json<Value>, ApiError> {
    let location = checked_location(q.lat, q.lng)?;
    let data = state
        .landsat
        .vegetation(&location, q.radius_km.unwrap_or(5.0))
        .await?;
    Ok(Json(data))
}

async fn satellite_heat_island(
    State(state): State<AppState>,
    Query(q): Query<RadiusQuery>,
) -> Result<Json<Value>, ApiError> {
    let location = checked_location(q.lat, q.lng)?;
    let data = state
        .landsat
        .heat_island(&location, q.radius_km.unwrap_or(10.0))
        .await?;
    Ok(Json(data))
}

async fn satellite_bands(State(state): State<AppState>) -> Json<Value> {
    Json(state.landsat.band_catalog())
}

#[derive(Deserialize)]
struct LibraryQuery {
    q: String,
    #[serde(default = "default_media_type")]
    media_type: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_media_type() -> String {
    "image".to_string()
}

async fn library_search(
    State(state): State<AppState>,
    Query(q): Query<LibraryQuery>,
) -> Result<Json<Value>, ApiError> {
    if q.q.trim().is_empty() {
        return Err(ApiError::BadRequest("query 'q' must not be empty".into()));
    }
    let data = state.library.search(&q.q, &q.media_type, q.limit).await?;
    Ok(Json(data))
}

// ---------------------------------------------------------------
// AI endpoints
// ---------------------------------------------------------------

async fn analyze_urban_data(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<Value>, ApiError> {
    req.location().map_err(ApiError::BadRequest)?;
    let report = state.analysis.analyze(&req).await?;
    Ok(Json(json!({
        "engine": state.analysis.engine_name(),
        "report": report,
    })))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    context: Option<Value>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    provider: String,
    timestamp: String,
}

async fn ai_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    // Provider errors degrade to an error string in the body, never a 500.
    let response = match state.chat.reply(&req.message, req.context.as_ref()).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(provider = state.chat.provider_name(), error = ?e, "chat provider failed");
            format!("Chat provider error: {e:#}")
        }
    };
    Json(ChatResponse {
        response,
        provider: state.chat.provider_name().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Deserialize)]
struct VisualizationQuery {
    lat: f64,
    lng: f64,
    #[serde(default = "default_visualization")]
    analysis_type: String,
}

fn default_visualization() -> String {
    "dashboard".to_string()
}

async fn visualization_data(
    State(state): State<AppState>,
    Query(q): Query<VisualizationQuery>,
) -> Result<Json<Value>, ApiError> {
    let location = checked_location(q.lat, q.lng)?;
    let kind: VisualizationKind = q.analysis_type.parse().map_err(ApiError::BadRequest)?;
    let data = state.analysis.visualization(kind, &location);
    Ok(Json(json!({
        "analysis_type": q.analysis_type,
        "coordinates": { "lat": location.lat, "lng": location.lng },
        "data": data,
        "engine": state.analysis.engine_name(),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

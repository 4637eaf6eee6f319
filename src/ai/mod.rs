//! AI analysis layer: trait seams plus one real chat provider and one stub.
//!
//! The structured urban-analysis report is produced by `StubAnalysisEngine`
//! only — there is no real model behind it yet, and the stub is deliberately
//! a separate collaborator so handlers stay free of inline mock branches.

pub mod gemini;
pub mod stub;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sources::LocationQuery;

pub use gemini::GeminiChat;
pub use stub::{StubAnalysisEngine, StubChat};

/// Incoming analysis request: `[lat, lng]` coordinate pair as the client
/// application sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub coordinates: Vec<f64>,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    #[serde(default)]
    pub context: Option<Value>,
}

fn default_analysis_type() -> String {
    "comprehensive".to_string()
}

impl AnalysisRequest {
    /// Extract and range-check the coordinate pair.
    pub fn location(&self) -> Result<LocationQuery, String> {
        if self.coordinates.len() != 2 {
            return Err(format!(
                "coordinates must be [lat, lng], got {} values",
                self.coordinates.len()
            ));
        }
        let q = LocationQuery::new(self.coordinates[0], self.coordinates[1]);
        q.validate()?;
        Ok(q)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrbanInsights {
    pub urban_development_level: String,
    pub infrastructure_density: String,
    pub green_space_availability: String,
    pub transportation_accessibility: String,
    pub urban_heat_island_risk: String,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateAnalysis {
    pub temperature_trends: String,
    pub precipitation_patterns: String,
    pub air_quality_index: String,
    pub climate_risks: Vec<String>,
    pub adaptation_priorities: Vec<String>,
    pub climate_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationAnalysis {
    pub population_density: String,
    pub urbanization_level: String,
    pub demographic_trends: String,
    pub planning_implications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalAnalysis {
    pub land_use_patterns: String,
    pub vegetation_health: String,
    pub water_resources: String,
    pub environmental_concerns: Vec<String>,
    pub conservation_opportunities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRecommendations {
    pub short_term_actions: Vec<String>,
    pub medium_term_goals: Vec<String>,
    pub long_term_vision: Vec<String>,
    pub priority_areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub climate_risks: Value,
    pub urban_risks: Value,
    pub environmental_risks: Value,
    pub risk_mitigation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SustainabilityScore {
    pub overall_score: f32,
    pub environmental_score: f32,
    pub social_score: f32,
    pub economic_score: f32,
    pub governance_score: f32,
    pub sustainability_level: String,
    pub improvement_areas: Vec<String>,
}

/// The full structured report for one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub location: LocationQuery,
    pub analysis_type: String,
    pub generated_at: DateTime<Utc>,
    pub urban_insights: UrbanInsights,
    pub climate: ClimateAnalysis,
    pub population: PopulationAnalysis,
    pub environment: EnvironmentalAnalysis,
    pub recommendations: PlanningRecommendations,
    pub risk: RiskAssessment,
    pub sustainability: SustainabilityScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationKind {
    Map,
    Chart,
    Dashboard,
}

impl FromStr for VisualizationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "map" => Ok(Self::Map),
            "chart" => Ok(Self::Chart),
            "dashboard" => Ok(Self::Dashboard),
            other => Err(format!("unknown visualization type '{other}'")),
        }
    }
}

/// Analysis engine seam. Production currently binds the stub; a real model
/// integration implements the same trait.
#[async_trait::async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport>;
    fn visualization(&self, kind: VisualizationKind, query: &LocationQuery) -> Value;
    fn engine_name(&self) -> &'static str;
}

/// Conversational seam. `GeminiChat` when a key is configured, `StubChat`
/// otherwise.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    async fn reply(&self, message: &str, context: Option<&Value>) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

pub type DynAnalysisEngine = Arc<dyn AnalysisEngine>;
pub type DynChatClient = Arc<dyn ChatClient>;

/// Factory: real Gemini client when a key is present, stub otherwise.
pub fn build_chat_client(http: reqwest::Client, api_key: Option<String>) -> DynChatClient {
    match api_key {
        Some(key) if !key.trim().is_empty() => Arc::new(GeminiChat::new(http, key)),
        _ => {
            tracing::info!("GEMINI_API_KEY not set; chat falls back to stub replies");
            Arc::new(StubChat)
        }
    }
}

//! Stub collaborators: canned analysis and keyword-routed chat replies.
//!
//! These values are placeholders by design. They exist so the HTTP surface
//! and the client application can be exercised end to end before a real
//! model integration lands, and so tests have a deterministic double.

use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};

use crate::sources::LocationQuery;

use super::{
    AnalysisEngine, AnalysisReport, AnalysisRequest, ChatClient, ClimateAnalysis,
    EnvironmentalAnalysis, PlanningRecommendations, PopulationAnalysis, RiskAssessment,
    SustainabilityScore, UrbanInsights, VisualizationKind,
};

pub struct StubAnalysisEngine;

#[async_trait::async_trait]
impl AnalysisEngine for StubAnalysisEngine {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let location = request
            .location()
            .map_err(|msg| anyhow::anyhow!("invalid analysis request: {msg}"))?;
        Ok(canned_report(location, &request.analysis_type))
    }

    fn visualization(&self, kind: VisualizationKind, query: &LocationQuery) -> Value {
        match kind {
            VisualizationKind::Map => map_data(query),
            VisualizationKind::Chart => chart_data(),
            VisualizationKind::Dashboard => dashboard_data(),
        }
    }

    fn engine_name(&self) -> &'static str {
        "stub"
    }
}

fn canned_report(location: LocationQuery, analysis_type: &str) -> AnalysisReport {
    AnalysisReport {
        location,
        analysis_type: analysis_type.to_string(),
        generated_at: Utc::now(),
        urban_insights: UrbanInsights {
            urban_development_level: "Moderate".into(),
            infrastructure_density: "High".into(),
            green_space_availability: "Medium".into(),
            transportation_accessibility: "Good".into(),
            urban_heat_island_risk: "Medium".into(),
            insights: vec![
                "Area shows signs of active urban development".into(),
                "Good transportation connectivity present".into(),
                "Opportunities for green space enhancement".into(),
            ],
        },
        climate: ClimateAnalysis {
            temperature_trends: "Increasing".into(),
            precipitation_patterns: "Variable".into(),
            air_quality_index: "Moderate".into(),
            climate_risks: vec![
                "Heat waves".into(),
                "Heavy precipitation events".into(),
                "Air quality concerns".into(),
            ],
            adaptation_priorities: vec![
                "Urban heat island mitigation".into(),
                "Stormwater management".into(),
                "Air quality improvement".into(),
            ],
            climate_score: 7.5,
        },
        population: PopulationAnalysis {
            population_density: "High".into(),
            urbanization_level: "Moderate".into(),
            demographic_trends: "Growing".into(),
            planning_implications: vec![
                "Need for housing development".into(),
                "Transportation capacity planning".into(),
                "Service provision scaling".into(),
            ],
        },
        environment: EnvironmentalAnalysis {
            land_use_patterns: "Mixed urban".into(),
            vegetation_health: "Moderate".into(),
            water_resources: "Adequate".into(),
            environmental_concerns: vec![
                "Urban sprawl impact".into(),
                "Green space fragmentation".into(),
                "Water quality maintenance".into(),
            ],
            conservation_opportunities: vec![
                "Green corridor development".into(),
                "Urban forest expansion".into(),
                "Wetland restoration".into(),
            ],
        },
        recommendations: PlanningRecommendations {
            short_term_actions: vec![
                "Implement green infrastructure projects".into(),
                "Enhance public transportation connectivity".into(),
                "Develop mixed-use zoning policies".into(),
            ],
            medium_term_goals: vec![
                "Establish urban growth boundaries".into(),
                "Develop smart city infrastructure".into(),
                "Implement sustainable building codes".into(),
            ],
            long_term_vision: vec![
                "Achieve carbon neutrality".into(),
                "Create resilient urban systems".into(),
                "Establish climate-adaptive communities".into(),
            ],
            priority_areas: vec![
                "Transportation infrastructure".into(),
                "Green space development".into(),
                "Climate resilience".into(),
            ],
        },
        risk: RiskAssessment {
            climate_risks: json!({
                "heat_waves": "Medium",
                "flooding": "Low",
                "drought": "Low",
                "storms": "Medium",
            }),
            urban_risks: json!({
                "air_quality": "Medium",
                "traffic_congestion": "High",
                "infrastructure_aging": "Medium",
            }),
            environmental_risks: json!({
                "habitat_loss": "Medium",
                "water_pollution": "Low",
                "noise_pollution": "High",
            }),
            risk_mitigation: vec![
                "Develop early warning systems".into(),
                "Implement adaptive infrastructure".into(),
                "Establish monitoring networks".into(),
            ],
        },
        sustainability: SustainabilityScore {
            overall_score: 7.2,
            environmental_score: 7.5,
            social_score: 6.8,
            economic_score: 7.0,
            governance_score: 7.5,
            sustainability_level: "Good".into(),
            improvement_areas: vec![
                "Social equity".into(),
                "Economic diversity".into(),
                "Environmental conservation".into(),
            ],
        },
    }
}

fn map_data(query: &LocationQuery) -> Value {
    json!({
        "layers": [
            { "name": "Satellite Imagery", "type": "raster", "source": "Landsat STAC", "visible": true },
            { "name": "Population Density", "type": "heatmap", "source": "WorldPop", "visible": true },
            { "name": "Environmental Data", "type": "vector", "source": "EU Copernicus", "visible": false },
        ],
        "center": [query.lng, query.lat],
        "zoom": 12,
    })
}

fn chart_data() -> Value {
    json!({
        "sustainability_metrics": {
            "environmental": 7.5,
            "social": 6.8,
            "economic": 7.0,
            "governance": 7.5,
        },
        "climate_trends": {
            "temperature": [20, 21, 22, 23, 24],
            "precipitation": [100, 110, 95, 120, 105],
        },
        "population_growth": {
            "years": [2015, 2016, 2017, 2018, 2019, 2020],
            "population": [1000, 1050, 1100, 1150, 1200, 1250],
        },
    })
}

fn dashboard_data() -> Value {
    json!({
        "kpi_cards": [
            { "title": "Sustainability Score", "value": "7.2", "unit": "/10", "trend": "increasing" },
            { "title": "Population Density", "value": "High", "unit": "", "trend": "stable" },
            { "title": "Climate Risk", "value": "Medium", "unit": "", "trend": "stable" },
        ],
        "charts": chart_data(),
        "alerts": [
            "High population density detected",
            "Climate adaptation needed",
            "Green space opportunities available",
        ],
    })
}

/// Keyword-routed canned replies, used whenever no chat provider key is
/// configured (and as the deterministic double in tests).
pub struct StubChat;

#[async_trait::async_trait]
impl ChatClient for StubChat {
    async fn reply(&self, message: &str, _context: Option<&Value>) -> Result<String> {
        Ok(route_reply(message).to_string())
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

fn route_reply(message: &str) -> &'static str {
    let m = message.to_lowercase();
    if m.contains("climate") {
        "Based on the climate data analysis, this area shows moderate climate risks with opportunities for heat island mitigation and stormwater management improvements."
    } else if m.contains("population") {
        "The population analysis indicates high density with moderate urbanization, suggesting good potential for mixed-use development and infrastructure scaling."
    } else if m.contains("environment") {
        "Environmental analysis shows mixed urban land use with moderate vegetation health and opportunities for green space enhancement and biodiversity conservation."
    } else if m.contains("planning") {
        "Urban planning recommendations include implementing green infrastructure, enhancing transportation connectivity, and developing climate adaptation strategies."
    } else if m.contains("sustainability") {
        "The sustainability score is 7.2/10, indicating good performance with opportunities for improvement in social equity and environmental conservation."
    } else {
        "I can help you analyze urban planning data including climate, population, environmental, and sustainability metrics. What specific aspect would you like to explore?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_chat_routes_by_keyword() {
        let chat = StubChat;
        let r = chat.reply("What are the CLIMATE risks here?", None).await.unwrap();
        assert!(r.contains("climate risks"));
        let r = chat.reply("tell me about population", None).await.unwrap();
        assert!(r.contains("population analysis"));
        let r = chat.reply("hello", None).await.unwrap();
        assert!(r.contains("What specific aspect"));
    }

    #[tokio::test]
    async fn stub_engine_rejects_malformed_coordinates() {
        let engine = StubAnalysisEngine;
        let req = AnalysisRequest {
            coordinates: vec![1.0, 2.0, 3.0],
            analysis_type: "comprehensive".into(),
            context: None,
        };
        assert!(engine.analyze(&req).await.is_err());
    }

    #[tokio::test]
    async fn stub_engine_produces_full_report() {
        let engine = StubAnalysisEngine;
        let req = AnalysisRequest {
            coordinates: vec![40.7128, -74.0060],
            analysis_type: "comprehensive".into(),
            context: None,
        };
        let report = engine.analyze(&req).await.unwrap();
        assert_eq!(report.analysis_type, "comprehensive");
        assert_eq!(report.location.lat, 40.7128);
        assert!(report.sustainability.overall_score > 0.0);
        assert!(!report.recommendations.short_term_actions.is_empty());
    }

    #[test]
    fn visualization_shapes_differ_by_kind() {
        let engine = StubAnalysisEngine;
        let q = LocationQuery::new(40.7128, -74.0060);
        let map = engine.visualization(VisualizationKind::Map, &q);
        assert_eq!(map["center"][1], 40.7128);
        let dash = engine.visualization(VisualizationKind::Dashboard, &q);
        assert!(dash.get("kpi_cards").is_some());
        let chart = engine.visualization(VisualizationKind::Chart, &q);
        assert!(chart.get("sustainability_metrics").is_some());
    }
}

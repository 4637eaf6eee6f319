// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with
// the aggregator wired to in-process stub sources and the stub engines
// standing in for the AI collaborators.
//
// Covered:
// - GET  /health and /
// - GET  /api/data-sources
// - GET  /api/official/comprehensive (success, partial failure, bad coords)
// - GET  /api/satellite/bands
// - GET  /api/library/search (empty query rejection)
// - POST /api/ai/analyze-urban-data (200 + 400)
// - POST /api/ai/chat
// - GET  /api/ai/visualization-data (200 + unknown type)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt as _; // for `oneshot`

use urban_atlas::ai::{StubAnalysisEngine, StubChat};
use urban_atlas::api::AppState;
use urban_atlas::landsat::LandsatClient;
use urban_atlas::library::NasaLibraryClient;
use urban_atlas::sources::worldpop::WorldPopClient;
use urban_atlas::sources::worldview::WorldviewClient;
use urban_atlas::{api, Aggregator, DataSource, LocationQuery};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

struct FixedSource {
    name: &'static str,
    ok: bool,
}

#[async_trait::async_trait]
impl DataSource for FixedSource {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        if self.ok {
            Ok(json!({
                "source": self.name,
                "coordinates": { "lat": query.lat, "lng": query.lng },
            }))
        } else {
            Err(anyhow!("upstream unavailable"))
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Build the same Router the binary uses, with stubbed sources.
fn test_router(sources: Vec<Arc<dyn DataSource>>) -> Router {
    let http = reqwest::Client::new();
    let state = AppState {
        aggregator: Arc::new(Aggregator::new(sources, Duration::from_secs(2))),
        worldview: Arc::new(WorldviewClient::new(http.clone(), None)),
        worldpop: Arc::new(WorldPopClient::new(http.clone())),
        landsat: Arc::new(LandsatClient::new(http.clone())),
        library: Arc::new(NasaLibraryClient::new(http)),
        analysis: Arc::new(StubAnalysisEngine),
        chat: Arc::new(StubChat),
    };
    api::router(state)
}

fn six_stub_sources(failing: Option<&'static str>) -> Vec<Arc<dyn DataSource>> {
    [
        "nasa_earthdata",
        "nasa_sedac",
        "eu_ghsl",
        "worldpop",
        "eu_copernicus",
        "wri",
    ]
    .iter()
    .map(|&name| {
        Arc::new(FixedSource {
            name,
            ok: Some(name) != failing,
        }) as Arc<dyn DataSource>
    })
    .collect()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request")
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST request")
}

#[tokio::test]
async fn health_and_root_report_healthy() {
    let app = test_router(six_stub_sources(None));

    let resp = app.clone().oneshot(get("/health")).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["status"], "healthy");
    assert!(v.get("timestamp").is_some());

    let resp = app.oneshot(get("/")).await.expect("oneshot /");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["status"], "healthy");
    assert!(v.get("version").is_some());
}

#[tokio::test]
async fn data_sources_lists_registered_names() {
    let app = test_router(six_stub_sources(None));

    let resp = app
        .oneshot(get("/api/data-sources"))
        .await
        .expect("oneshot /api/data-sources");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let names: Vec<&str> = v["aggregated_sources"]
        .as_array()
        .expect("aggregated_sources array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        names,
        vec!["nasa_earthdata", "nasa_sedac", "eu_ghsl", "worldpop", "eu_copernicus", "wri"]
    );
    assert!(v["endpoints"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn comprehensive_aggregates_all_six_sources() {
    let app = test_router(six_stub_sources(None));

    let resp = app
        .oneshot(get("/api/official/comprehensive?lat=40.7128&lng=-74.0060"))
        .await
        .expect("oneshot comprehensive");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["summary"]["total_sources"], 6);
    assert_eq!(v["summary"]["succeeded_count"], 6);
    assert_eq!(v["coordinates"]["lat"], 40.7128);
    assert_eq!(v["coordinates"]["lng"], -74.0060);
    let sources = v["sources"].as_object().expect("sources map");
    assert_eq!(sources.len(), 6);
    for result in sources.values() {
        assert_eq!(result["status"], "success");
    }
}

#[tokio::test]
async fn comprehensive_stays_200_on_partial_failure() {
    let app = test_router(six_stub_sources(Some("nasa_sedac")));

    let resp = app
        .oneshot(get("/api/official/comprehensive?lat=40.7128&lng=-74.0060"))
        .await
        .expect("oneshot comprehensive");
    assert_eq!(resp.status(), StatusCode::OK, "partial failure stays 200");

    let v = json_body(resp).await;
    assert_eq!(v["summary"]["succeeded_count"], 5);
    assert_eq!(v["sources"]["nasa_sedac"]["status"], "failure");
    assert!(v["sources"]["nasa_sedac"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("upstream unavailable")));
    assert_eq!(v["sources"]["wri"]["status"], "success");
}

#[tokio::test]
async fn comprehensive_rejects_out_of_range_coordinates() {
    let app = test_router(six_stub_sources(None));

    let resp = app
        .oneshot(get("/api/official/comprehensive?lat=123.0&lng=-74.0"))
        .await
        .expect("oneshot comprehensive");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = json_body(resp).await;
    assert!(v["detail"].as_str().is_some_and(|d| d.contains("latitude")));
}

#[tokio::test]
async fn satellite_bands_returns_static_catalog() {
    let app = test_router(six_stub_sources(None));

    let resp = app
        .oneshot(get("/api/satellite/bands"))
        .await
        .expect("oneshot bands");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert!(v.get("collection").is_some());
    assert!(v["bands"].get("nir08").is_some());
}

#[tokio::test]
async fn library_search_rejects_empty_query() {
    let app = test_router(six_stub_sources(None));

    let resp = app
        .oneshot(get("/api/library/search?q=%20"))
        .await
        .expect("oneshot library search");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_urban_data_returns_full_report() {
    let app = test_router(six_stub_sources(None));

    let payload = json!({
        "coordinates": [40.7128, -74.0060],
        "analysis_type": "comprehensive",
    });
    let resp = app
        .oneshot(post_json("/api/ai/analyze-urban-data", &payload))
        .await
        .expect("oneshot analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["engine"], "stub");
    let report = &v["report"];
    assert_eq!(report["analysis_type"], "comprehensive");
    assert!(report.get("urban_insights").is_some(), "missing urban_insights");
    assert!(report.get("climate").is_some(), "missing climate");
    assert!(report.get("sustainability").is_some(), "missing sustainability");
    assert!(report["recommendations"]["short_term_actions"]
        .as_array()
        .is_some_and(|a| !a.is_empty()));
}

#[tokio::test]
async fn analyze_urban_data_rejects_bad_coordinates() {
    let app = test_router(six_stub_sources(None));

    let payload = json!({ "coordinates": [200.0, -74.0060] });
    let resp = app
        .oneshot(post_json("/api/ai/analyze-urban-data", &payload))
        .await
        .expect("oneshot analyze");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = json_body(resp).await;
    assert!(v.get("detail").is_some());
}

#[tokio::test]
async fn chat_replies_with_provider_metadata() {
    let app = test_router(six_stub_sources(None));

    let payload = json!({ "message": "What are the climate risks here?" });
    let resp = app
        .oneshot(post_json("/api/ai/chat", &payload))
        .await
        .expect("oneshot chat");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["provider"], "stub");
    assert!(v["response"].as_str().is_some_and(|r| r.contains("climate")));
    assert!(v.get("timestamp").is_some());
}

#[tokio::test]
async fn visualization_data_supports_dashboard_and_rejects_unknown() {
    let app = test_router(six_stub_sources(None));

    let resp = app
        .clone()
        .oneshot(get(
            "/api/ai/visualization-data?lat=40.7128&lng=-74.0060&analysis_type=dashboard",
        ))
        .await
        .expect("oneshot visualization");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["analysis_type"], "dashboard");
    assert!(v["data"].get("kpi_cards").is_some());

    let resp = app
        .oneshot(get(
            "/api/ai/visualization-data?lat=40.7128&lng=-74.0060&analysis_type=hologram",
        ))
        .await
        .expect("oneshot visualization");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

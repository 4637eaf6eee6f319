// src/sources/mod.rs
pub mod copernicus;
pub mod ghsl;
pub mod sedac;
pub mod worldpop;
pub mod worldview;
pub mod wri;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A point query shared by every upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lng: f64,
}

impl LocationQuery {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Range check only; upstream-specific constraints are the client's problem.
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude {} out of range [-90, 90]", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("longitude {} out of range [-180, 180]", self.lng));
        }
        Ok(())
    }
}

/// One upstream earth-observation source. Implementations must normalize
/// every failure mode (transport, non-2xx, malformed body, missing
/// credential) into `Err`; nothing may escape past this boundary.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value>;
    fn name(&self) -> &'static str;
}

/// Common response envelope: raw upstream data wrapped with provenance,
/// so the client application can render each source uniformly.
pub(crate) fn envelope(
    source: &str,
    dataset: &str,
    query: &LocationQuery,
    data: Value,
    description: &str,
) -> Value {
    json!({
        "source": source,
        "dataset": dataset,
        "coordinates": { "lat": query.lat, "lng": query.lng },
        "data": data,
        "description": description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_boundary_coordinates() {
        assert!(LocationQuery::new(90.0, 180.0).validate().is_ok());
        assert!(LocationQuery::new(-90.0, -180.0).validate().is_ok());
        assert!(LocationQuery::new(40.7128, -74.0060).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(LocationQuery::new(90.01, 0.0).validate().is_err());
        assert!(LocationQuery::new(0.0, -180.5).validate().is_err());
    }

    #[test]
    fn envelope_carries_provenance_and_coordinates() {
        let q = LocationQuery::new(1.0, 2.0);
        let v = envelope("WorldPop", "population", &q, json!({"count": 3}), "test");
        assert_eq!(v["source"], "WorldPop");
        assert_eq!(v["coordinates"]["lat"], 1.0);
        assert_eq!(v["data"]["count"], 3);
    }
}

//! NASA Earthdata Worldview (GIBS) client.
//!
//! GIBS serves WMTS tiles, not JSON, so a successful probe returns tile
//! metadata (layer, date, tile URL) rather than a parsed body. The client
//! derives the tile address from the query coordinates.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};

use crate::sources::{envelope, DataSource, LocationQuery};

const DEFAULT_BASE_URL: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg4326/best";
const DEFAULT_LAYER: &str = "MODIS_Terra_Land_Surface_Temperature_Day";

pub struct WorldviewClient {
    http: reqwest::Client,
    base_url: String,
    layer: String,
    token: Option<String>,
}

impl WorldviewClient {
    pub fn new(http: reqwest::Client, token: Option<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            layer: DEFAULT_LAYER.to_string(),
            token,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Probe a single WMTS tile and return its metadata.
    ///
    /// `layer` and `date` default to the MODIS land-surface-temperature layer
    /// and today's date (UTC).
    pub async fn tile_metadata(
        &self,
        query: &LocationQuery,
        layer: Option<&str>,
        date: Option<&str>,
    ) -> Result<Value> {
        let layer = layer.unwrap_or(&self.layer);
        let date = match date {
            Some(d) => d.to_string(),
            None => Utc::now().format("%Y-%m-%d").to_string(),
        };

        let zoom = zoom_for_latitude(query.lat);
        let row = lat_to_tile_row(query.lat, zoom);
        let col = lng_to_tile_col(query.lng, zoom);
        let url = format!("{}/{layer}/default/{date}/{zoom}/{row}/{col}.png", self.base_url);

        let mut req = self.http.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.context("worldview tile request")?;
        resp.error_for_status_ref()
            .with_context(|| format!("worldview tile fetch for layer {layer}"))?;

        Ok(envelope(
            "NASA Earthdata Worldview",
            layer,
            query,
            json!({
                "layer": layer,
                "date": date,
                "zoom": zoom,
                "tile_row": row,
                "tile_col": col,
                "tile_url": url,
            }),
            "Satellite data visualization tile from NASA Earthdata Worldview",
        ))
    }
}

#[async_trait::async_trait]
impl DataSource for WorldviewClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        self.tile_metadata(query, None, None).await
    }

    fn name(&self) -> &'static str {
        "nasa_earthdata"
    }
}

/// Coarser tiles near the poles, finer near the equator.
pub fn zoom_for_latitude(lat: f64) -> u32 {
    match lat.abs() {
        l if l > 60.0 => 3,
        l if l > 30.0 => 4,
        l if l > 15.0 => 5,
        _ => 6,
    }
}

pub fn lat_to_tile_row(lat: f64, zoom: u32) -> u32 {
    let n = f64::from(1u32 << zoom);
    let rad = lat.to_radians();
    let y = (1.0 - rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n;
    // Clamp: lat == ±90 degenerates outside the grid.
    y.floor().clamp(0.0, n - 1.0) as u32
}

pub fn lng_to_tile_col(lng: f64, zoom: u32) -> u32 {
    let n = f64::from(1u32 << zoom);
    let x = (lng + 180.0) / 360.0 * n;
    x.floor().clamp(0.0, n - 1.0) as u32
}

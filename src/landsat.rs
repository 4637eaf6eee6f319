//! Landsat STAC client: scene search over the USGS `landsatlook` STAC server,
//! plus vegetation-band and thermal-band extraction for the satellite
//! endpoints.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::sources::LocationQuery;

const DEFAULT_BASE_URL: &str = "https://landsatlook.usgs.gov/stac-server";
const COLLECTION: &str = "landsat-c2l2-sr";

const VEGETATION_BANDS: [&str; 4] = ["nir08", "red", "green", "blue"];
const THERMAL_BANDS: [&str; 2] = ["lwir11", "lwir12"];

pub struct LandsatClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ItemCollection {
    #[serde(default)]
    features: Vec<StacItem>,
}

#[derive(Debug, Deserialize)]
struct StacItem {
    id: String,
    #[serde(default)]
    properties: StacProperties,
    #[serde(default)]
    bbox: Vec<f64>,
    #[serde(default)]
    assets: BTreeMap<String, StacAsset>,
}

#[derive(Debug, Default, Deserialize)]
struct StacProperties {
    datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover", default)]
    cloud_cover: f64,
    platform: Option<String>,
    #[serde(default)]
    instruments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacAsset {
    pub href: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A trimmed scene record: only the fields the client application renders.
#[derive(Debug, Clone, Serialize)]
pub struct SceneRecord {
    pub id: String,
    pub datetime: Option<String>,
    pub cloud_cover: f64,
    pub platform: Option<String>,
    pub instrument: Option<String>,
    pub bbox: Vec<f64>,
    pub assets: BTreeMap<String, StacAsset>,
}

impl LandsatClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search Collection 2 Level-2 surface-reflectance items in a bbox.
    pub async fn search_scenes(
        &self,
        bbox: [f64; 4],
        cloud_cover: Option<u8>,
        limit: usize,
    ) -> Result<Vec<SceneRecord>> {
        let url = format!("{}/collections/{COLLECTION}/items", self.base_url);
        let bbox_param = bbox
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut params = vec![
            ("bbox", bbox_param),
            ("limit", limit.to_string()),
            ("collections", COLLECTION.to_string()),
        ];
        if let Some(cc) = cloud_cover {
            params.push((
                "query",
                json!({ "eo:cloud_cover": { "lte": cc } }).to_string(),
            ));
        }

        let resp = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("landsat stac request")?;
        let resp = resp.error_for_status().context("landsat stac search")?;
        let items: ItemCollection = resp.json().await.context("landsat stac response body")?;

        Ok(items.features.into_iter().map(scene_record).collect())
    }

    /// Scenes around a point, bbox derived from a radius in kilometers.
    pub async fn imagery(
        &self,
        query: &LocationQuery,
        radius_km: f64,
        cloud_cover: u8,
        limit: usize,
    ) -> Result<Value> {
        let scenes = self
            .search_scenes(bbox_around(query, radius_km), Some(cloud_cover), limit)
            .await?;
        Ok(json!({
            "source": "Landsat STAC",
            "collection": COLLECTION,
            "coordinates": { "lat": query.lat, "lng": query.lng },
            "radius_km": radius_km,
            "total_items": scenes.len(),
            "scenes": scenes,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    /// Vegetation (NDVI-relevant) band availability per scene.
    pub async fn vegetation(&self, query: &LocationQuery, radius_km: f64) -> Result<Value> {
        let scenes = self
            .search_scenes(bbox_around(query, radius_km), Some(20), 5)
            .await?;
        let metrics: Vec<Value> = scenes
            .iter()
            .filter_map(|s| {
                let bands = select_bands(&s.assets, &VEGETATION_BANDS);
                if bands.is_empty() {
                    return None;
                }
                Some(json!({
                    "date": s.datetime,
                    "cloud_cover": s.cloud_cover,
                    "available_bands": bands.keys().collect::<Vec<_>>(),
                    "band_info": bands,
                }))
            })
            .collect();

        Ok(json!({
            "source": "Landsat STAC",
            "coordinates": { "lat": query.lat, "lng": query.lng },
            "radius_km": radius_km,
            "vegetation_metrics": metrics,
            "analysis_timestamp": Utc::now().to_rfc3339(),
        }))
    }

    /// Thermal-band availability for urban-heat-island analysis.
    /// Low cloud cover requested since thermal readings degrade under cloud.
    pub async fn heat_island(&self, query: &LocationQuery, radius_km: f64) -> Result<Value> {
        let scenes = self
            .search_scenes(bbox_around(query, radius_km), Some(10), 3)
            .await?;
        let thermal: Vec<Value> = scenes
            .iter()
            .filter_map(|s| {
                let bands = select_thermal_bands(&s.assets);
                if bands.is_empty() {
                    return None;
                }
                Some(json!({
                    "date": s.datetime,
                    "cloud_cover": s.cloud_cover,
                    "thermal_bands": bands,
                }))
            })
            .collect();

        Ok(json!({
            "source": "Landsat STAC",
            "coordinates": { "lat": query.lat, "lng": query.lng },
            "radius_km": radius_km,
            "thermal_data": thermal,
            "analysis_timestamp": Utc::now().to_rfc3339(),
        }))
    }

    /// Static catalog of Collection 2 Level-2 bands exposed to the client.
    pub fn band_catalog(&self) -> Value {
        band_catalog_data()
    }
}

fn scene_record(item: StacItem) -> SceneRecord {
    SceneRecord {
        id: item.id,
        datetime: item.properties.datetime,
        cloud_cover: item.properties.cloud_cover,
        platform: item.properties.platform,
        instrument: item.properties.instruments.into_iter().next(),
        bbox: item.bbox,
        assets: item.assets,
    }
}

fn select_bands(
    assets: &BTreeMap<String, StacAsset>,
    wanted: &[&str],
) -> BTreeMap<String, StacAsset> {
    assets
        .iter()
        .filter(|(name, _)| wanted.contains(&name.as_str()))
        .map(|(name, asset)| (name.clone(), asset.clone()))
        .collect()
}

fn select_thermal_bands(assets: &BTreeMap<String, StacAsset>) -> BTreeMap<String, StacAsset> {
    assets
        .iter()
        .filter(|(name, _)| {
            THERMAL_BANDS.contains(&name.as_str()) || name.to_lowercase().contains("thermal")
        })
        .map(|(name, asset)| (name.clone(), asset.clone()))
        .collect()
}

/// Bounding box around a point. 1 degree of latitude is ~111 km; longitude
/// degrees shrink with the cosine of latitude (floored away from the poles
/// so the box never degenerates).
pub fn bbox_around(query: &LocationQuery, radius_km: f64) -> [f64; 4] {
    let lat_offset = radius_km / 111.0;
    let cos_lat = query.lat.to_radians().cos().max(0.01);
    let lng_offset = radius_km / (111.0 * cos_lat);
    [
        query.lng - lng_offset,
        query.lat - lat_offset,
        query.lng + lng_offset,
        query.lat + lat_offset,
    ]
}

fn band_catalog_data() -> Value {
    json!({
        "collection": COLLECTION,
        "bands": {
            "coastal": { "name": "Coastal Aerosol", "wavelength": "0.43-0.45 um", "resolution": "30m", "purpose": "Aerosol studies, coastal water mapping" },
            "blue":    { "name": "Blue", "wavelength": "0.45-0.51 um", "resolution": "30m", "purpose": "Water body detection, atmospheric haze penetration" },
            "green":   { "name": "Green", "wavelength": "0.53-0.59 um", "resolution": "30m", "purpose": "Vegetation health, water body detection" },
            "red":     { "name": "Red", "wavelength": "0.64-0.67 um", "resolution": "30m", "purpose": "Vegetation discrimination, soil analysis" },
            "nir08":   { "name": "Near-Infrared", "wavelength": "0.85-0.88 um", "resolution": "30m", "purpose": "Vegetation health, biomass estimation" },
            "swir16":  { "name": "Short-wave Infrared 1", "wavelength": "1.57-1.65 um", "resolution": "30m", "purpose": "Soil moisture, vegetation stress" },
            "swir22":  { "name": "Short-wave Infrared 2", "wavelength": "2.11-2.29 um", "resolution": "30m", "purpose": "Mineral mapping, soil analysis" },
            "lwir11":  { "name": "Thermal Infrared 1", "wavelength": "10.60-11.19 um", "resolution": "100m", "purpose": "Surface temperature, urban heat island" },
            "lwir12":  { "name": "Thermal Infrared 2", "wavelength": "11.50-12.51 um", "resolution": "100m", "purpose": "Surface temperature, atmospheric correction" },
        },
        "applications": [
            "Urban heat island analysis",
            "Vegetation health monitoring",
            "Water body detection",
            "Land use classification",
            "Environmental monitoring",
            "Climate change studies",
        ],
    })
}

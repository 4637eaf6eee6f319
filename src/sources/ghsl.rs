//! EU Copernicus GHSL (Global Human Settlement Layer) client.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::sources::{envelope, DataSource, LocationQuery};

const DEFAULT_BASE_URL: &str = "https://ghsl.jrc.ec.europa.eu";
const DEFAULT_DATASET: &str = "built-up-area";

pub struct GhslClient {
    http: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl GhslClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn urban_settlement(&self, query: &LocationQuery) -> Result<Value> {
        let url = format!("{}/api/urban-settlement", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("lat", query.lat.to_string()),
                ("lng", query.lng.to_string()),
                ("dataset", self.dataset.clone()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .context("ghsl request")?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("ghsl dataset {}", self.dataset))?;
        let data: Value = resp.json().await.context("ghsl response body")?;

        Ok(envelope(
            "EU Copernicus GHSL",
            &self.dataset,
            query,
            data,
            "Urban settlement data from EU Copernicus GHSL",
        ))
    }
}

#[async_trait::async_trait]
impl DataSource for GhslClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        self.urban_settlement(query).await
    }

    fn name(&self) -> &'static str {
        "eu_ghsl"
    }
}

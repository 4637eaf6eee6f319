//! EU Copernicus Data Space client (land-use and climate datasets).

use anyhow::{Context, Result};
use serde_json::Value;

use crate::sources::{envelope, DataSource, LocationQuery};

const DEFAULT_BASE_URL: &str = "https://dataspace.copernicus.eu/analyse/apis/catalogue-apis";
const DEFAULT_DATASET: &str = "land-use";

pub struct CopernicusClient {
    http: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl CopernicusClient {
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

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    pub async fn land_use(&self, query: &LocationQuery) -> Result<Value> {
        let url = format!("{}/land-use", self.base_url);
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
            .context("copernicus request")?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("copernicus dataset {}", self.dataset))?;
        let data: Value = resp.json().await.context("copernicus response body")?;

        Ok(envelope(
            "EU Copernicus",
            &self.dataset,
            query,
            data,
            "Climate and land use data from EU Copernicus",
        ))
    }
}

#[async_trait::async_trait]
impl DataSource for CopernicusClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        self.land_use(query).await
    }

    fn name(&self) -> &'static str {
        "eu_copernicus"
    }
}

//! World Resources Institute urban-landscape client.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::sources::{envelope, DataSource, LocationQuery};

const DEFAULT_BASE_URL: &str = "https://resource-watch.github.io/doc-api";
const DEFAULT_DATASET: &str = "urban-landscape";

pub struct WriClient {
    http: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl WriClient {
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

    pub async fn urban_landscape(&self, query: &LocationQuery) -> Result<Value> {
        let url = format!("{}/urban-landscape", self.base_url);
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
            .context("wri request")?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("wri dataset {}", self.dataset))?;
        let data: Value = resp.json().await.context("wri response body")?;

        Ok(envelope(
            "World Resources Institute",
            &self.dataset,
            query,
            data,
            "Urban landscape data from World Resources Institute",
        ))
    }
}

#[async_trait::async_trait]
impl DataSource for WriClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        self.urban_landscape(query).await
    }

    fn name(&self) -> &'static str {
        "wri"
    }
}

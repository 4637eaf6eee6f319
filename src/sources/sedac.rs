//! NASA SEDAC demographic/equity data client.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::sources::{envelope, DataSource, LocationQuery};

const DEFAULT_BASE_URL: &str = "https://sedac.ciesin.columbia.edu/data/set";
const DEFAULT_DATASET: &str = "gpw-v4-population-density";

pub struct SedacClient {
    http: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl SedacClient {
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

    pub async fn demographic_data(&self, query: &LocationQuery) -> Result<Value> {
        let url = format!("{}/{}/api", self.base_url, self.dataset);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("lat", query.lat.to_string()),
                ("lng", query.lng.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .context("sedac request")?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("sedac dataset {}", self.dataset))?;
        let data: Value = resp.json().await.context("sedac response body")?;

        Ok(envelope(
            "NASA SEDAC",
            &self.dataset,
            query,
            data,
            "Demographic and equity data from NASA SEDAC",
        ))
    }
}

#[async_trait::async_trait]
impl DataSource for SedacClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        self.demographic_data(query).await
    }

    fn name(&self) -> &'static str {
        "nasa_sedac"
    }
}

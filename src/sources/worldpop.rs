//! WorldPop client: point lookups for the aggregator plus country-level
//! population queries and multi-year growth trends.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::sources::{envelope, DataSource, LocationQuery};

const DEFAULT_BASE_URL: &str = "https://hub.worldpop.org/rest/data";
const DEFAULT_YEAR: u16 = 2020;

pub struct WorldPopClient {
    http: reqwest::Client,
    base_url: String,
    year: u16,
}

/// The country-level fields we read back from the WorldPop catalog.
/// Everything else in the payload is passed through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
struct CountryPopulation {
    #[serde(default)]
    total_population: f64,
    #[serde(default)]
    population_density: f64,
    #[serde(default)]
    urban_percentage: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TrendPoint {
    pub year: u16,
    pub total_population: f64,
    pub population_density: f64,
    pub urban_percentage: f64,
}

impl WorldPopClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            year: DEFAULT_YEAR,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Population at a point, used by the fan-out aggregator.
    pub async fn population_at(&self, query: &LocationQuery, year: u16) -> Result<Value> {
        let url = format!("{}/population", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("lat", query.lat.to_string()),
                ("lng", query.lng.to_string()),
                ("year", year.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .context("worldpop request")?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("worldpop population for year {year}"))?;
        let data: Value = resp.json().await.context("worldpop response body")?;

        Ok(envelope(
            "WorldPop",
            "population",
            query,
            json!({ "year": year, "population": data }),
            "Population data from WorldPop",
        ))
    }

    /// Country-level population record for an ISO3 code and year.
    pub async fn country_population(&self, iso3: &str, year: u16) -> Result<Value> {
        let raw = self.country_raw(iso3, year).await?;
        Ok(json!({
            "source": "WorldPop",
            "country": iso3,
            "year": year,
            "data": raw,
            "description": "Country-level population data from WorldPop",
        }))
    }

    /// Growth trends over 5-year steps between `start_year` and `end_year`.
    ///
    /// Years that fail to fetch are skipped rather than failing the whole
    /// trend; growth percentages need at least two points.
    pub async fn growth_trends(&self, iso3: &str, start_year: u16, end_year: u16) -> Result<Value> {
        let mut points: Vec<TrendPoint> = Vec::new();
        let mut year = start_year;
        while year <= end_year {
            match self.country_parsed(iso3, year).await {
                Ok(p) => points.push(TrendPoint {
                    year,
                    total_population: p.total_population,
                    population_density: p.population_density,
                    urban_percentage: p.urban_percentage,
                }),
                Err(e) => {
                    tracing::warn!(country = iso3, year, error = ?e, "skipping trend year");
                }
            }
            year = year.saturating_add(5);
        }

        let growth = if points.len() >= 2 {
            let first = &points[0];
            let last = &points[points.len() - 1];
            json!({
                "population_growth_percent": percent_change(first.total_population, last.total_population),
                "density_growth_percent": percent_change(first.population_density, last.population_density),
                "urban_growth_percent": percent_change(first.urban_percentage, last.urban_percentage),
            })
        } else {
            json!({
                "population_growth_percent": 0.0,
                "density_growth_percent": 0.0,
                "urban_growth_percent": 0.0,
            })
        };

        Ok(json!({
            "source": "WorldPop",
            "country": iso3,
            "period": format!("{start_year}-{end_year}"),
            "trend_data": points,
            "growth_metrics": growth,
            "analysis_timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn country_raw(&self, iso3: &str, year: u16) -> Result<Value> {
        let url = format!("{}/pop/wpgp", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("iso3", iso3.to_string()), ("year", year.to_string())])
            .send()
            .await
            .context("worldpop country request")?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("worldpop country {iso3} year {year}"))?;
        resp.json().await.context("worldpop country response body")
    }

    async fn country_parsed(&self, iso3: &str, year: u16) -> Result<CountryPopulation> {
        let raw = self.country_raw(iso3, year).await?;
        serde_json::from_value(raw).context("worldpop country record shape")
    }
}

#[async_trait::async_trait]
impl DataSource for WorldPopClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<Value> {
        self.population_at(query, self.year).await
    }

    fn name(&self) -> &'static str {
        "worldpop"
    }
}

fn percent_change(from: f64, to: f64) -> f64 {
    if from <= 0.0 {
        return 0.0;
    }
    let pct = (to - from) / from * 100.0;
    (pct * 100.0).round() / 100.0
}

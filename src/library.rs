//! NASA Image and Video Library client (images-api.nasa.gov).

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://images-api.nasa.gov";

pub struct NasaLibraryClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    collection: SearchCollection,
}

#[derive(Debug, Deserialize)]
struct SearchCollection {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    data: Vec<ItemData>,
    #[serde(default)]
    links: Vec<ItemLink>,
}

#[derive(Debug, Deserialize)]
struct ItemData {
    title: Option<String>,
    nasa_id: Option<String>,
    date_created: Option<String>,
    description: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ItemLink {
    href: Option<String>,
    rel: Option<String>,
}

impl NasaLibraryClient {
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

    /// Keyword search, reshaped into compact records for the client app.
    pub async fn search(&self, q: &str, media_type: &str, limit: usize) -> Result<Value> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("q", q), ("media_type", media_type)])
            .send()
            .await
            .context("nasa library request")?;
        let resp = resp.error_for_status().context("nasa library search")?;
        let body: SearchEnvelope = resp.json().await.context("nasa library response body")?;

        let records: Vec<Value> = body
            .collection
            .items
            .into_iter()
            .take(limit)
            .filter_map(compact_record)
            .collect();

        Ok(json!({
            "source": "NASA Image and Video Library",
            "query": q,
            "media_type": media_type,
            "total_items": records.len(),
            "items": records,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

fn compact_record(item: SearchItem) -> Option<Value> {
    let data = item.data.into_iter().next()?;
    let preview = item
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("preview"))
        .or_else(|| item.links.first())
        .and_then(|l| l.href.clone());
    Some(json!({
        "title": data.title,
        "nasa_id": data.nasa_id,
        "date_created": data.date_created,
        "description": data.description,
        "keywords": data.keywords,
        "preview_url": preview,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_record_prefers_preview_link() {
        let item: SearchItem = serde_json::from_value(json!({
            "data": [{ "title": "Night lights", "nasa_id": "iss-1" }],
            "links": [
                { "href": "https://x/orig.jpg", "rel": "captions" },
                { "href": "https://x/thumb.jpg", "rel": "preview" }
            ]
        }))
        .unwrap();
        let rec = compact_record(item).unwrap();
        assert_eq!(rec["preview_url"], "https://x/thumb.jpg");
        assert_eq!(rec["title"], "Night lights");
    }

    #[test]
    fn items_without_data_are_dropped() {
        let item: SearchItem = serde_json::from_value(json!({ "links": [] })).unwrap();
        assert!(compact_record(item).is_none());
    }
}

//! Gemini chat provider (Google Generative Language REST API).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ChatClient;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-pro";

pub struct GeminiChat {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiChat {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn compose_prompt(message: &str, context: Option<&Value>) -> String {
        match context {
            Some(ctx) => format!(
                "You assist urban planners with earth-observation data. \
                 Context JSON: {ctx}. Question: {message}"
            ),
            None => format!(
                "You assist urban planners with earth-observation data. \
                 Question: {message}"
            ),
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for GeminiChat {
    async fn reply(&self, message: &str, context: Option<&Value>) -> Result<String> {
        let prompt = Self::compose_prompt(message, context);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            .context("gemini request")?;
        let resp = resp.error_for_status().context("gemini generateContent")?;
        let body: GenerateResponse = resp.json().await.context("gemini response body")?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(anyhow!("gemini returned an empty candidate"));
        }
        Ok(text.trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_embeds_context_when_present() {
        let ctx = json!({"lat": 1.0});
        let with = GeminiChat::compose_prompt("hi", Some(&ctx));
        assert!(with.contains(r#""lat":1.0"#) || with.contains(r#""lat": 1.0"#));
        let without = GeminiChat::compose_prompt("hi", None);
        assert!(!without.contains("Context JSON"));
    }

    #[test]
    fn response_parsing_takes_first_candidate_text() {
        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "first" }, { "text": "second" } ] } },
                { "content": { "parts": [ { "text": "other" } ] } }
            ]
        }))
        .unwrap();
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap();
        assert_eq!(text, "first");
    }
}

//! Fan-out aggregator: one concurrent fetch per registered source, wait for
//! all of them, and fold the outcomes into a single best-effort response.
//!
//! Contract highlights:
//! - every declared source gets exactly one entry in the result map;
//! - a failing, panicking, or timed-out source never disturbs its siblings;
//! - the aggregate always materializes, even with zero successes;
//! - summary lists follow source declaration order, not completion order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::sources::{DataSource, LocationQuery};

/// Outcome of a single upstream fetch. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceResult {
    Success { payload: Value },
    Failure { message: String },
}

impl SourceResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_sources: usize,
    pub succeeded_count: usize,
    /// Names of the sources that succeeded, in declaration order.
    pub successful_sources: Vec<String>,
    /// Failure messages, in declaration order.
    pub failed_sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub coordinates: LocationQuery,
    pub generated_at: DateTime<Utc>,
    pub sources: BTreeMap<String, SourceResult>,
    pub summary: AggregateSummary,
}

pub struct Aggregator {
    sources: Vec<Arc<dyn DataSource>>,
    per_source_timeout: Duration,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn DataSource>>, per_source_timeout: Duration) -> Self {
        Self {
            sources,
            per_source_timeout,
        }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Issue all fetches concurrently and wait for every one of them.
    /// Never errors: partial results beat an all-or-nothing failure.
    pub async fn aggregate(&self, query: LocationQuery) -> AggregateResponse {
        // Series are described once by `Metrics::init`; here we only record.
        counter!("aggregate_requests_total").increment(1);

        let handles: Vec<(&'static str, JoinHandle<SourceResult>)> = self
            .sources
            .iter()
            .map(|source| {
                let name = source.name();
                let source = Arc::clone(source);
                let budget = self.per_source_timeout;
                (name, tokio::spawn(fetch_one(source, query, budget)))
            })
            .collect();

        // Awaiting in declaration order; the tasks themselves already run
        // concurrently, so total wait tracks the slowest source.
        let mut entries: Vec<(&'static str, SourceResult)> = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                // A panicked task still yields a Failure entry.
                Err(join_err) => {
                    tracing::warn!(source = name, error = %join_err, "source task aborted");
                    counter!("aggregate_source_failures_total").increment(1);
                    SourceResult::Failure {
                        message: format!("{name}: fetch task aborted: {join_err}"),
                    }
                }
            };
            entries.push((name, result));
        }

        let summary = summarize(&entries);
        let sources = entries
            .into_iter()
            .map(|(name, result)| (name.to_string(), result))
            .collect();

        AggregateResponse {
            coordinates: query,
            generated_at: Utc::now(),
            sources,
            summary,
        }
    }
}

async fn fetch_one(
    source: Arc<dyn DataSource>,
    query: LocationQuery,
    budget: Duration,
) -> SourceResult {
    let started = std::time::Instant::now();
    let outcome = match timeout(budget, source.fetch(&query)).await {
        Ok(Ok(payload)) => SourceResult::Success { payload },
        Ok(Err(e)) => {
            tracing::warn!(source = source.name(), error = ?e, "source fetch failed");
            SourceResult::Failure {
                message: format!("{}: {e:#}", source.name()),
            }
        }
        Err(_) => {
            tracing::warn!(source = source.name(), "source fetch timed out");
            SourceResult::Failure {
                message: format!(
                    "{}: timed out after {}s",
                    source.name(),
                    budget.as_secs()
                ),
            }
        }
    };

    histogram!("aggregate_fetch_ms").record(started.elapsed().as_secs_f64() * 1_000.0);
    if !outcome.is_success() {
        counter!("aggregate_source_failures_total").increment(1);
    }
    outcome
}

fn summarize(entries: &[(&'static str, SourceResult)]) -> AggregateSummary {
    let mut successful_sources = Vec::new();
    let mut failed_sources = Vec::new();
    for (name, result) in entries {
        match result {
            SourceResult::Success { .. } => successful_sources.push((*name).to_string()),
            SourceResult::Failure { message } => failed_sources.push(message.clone()),
        }
    }
    AggregateSummary {
        total_sources: entries.len(),
        succeeded_count: successful_sources.len(),
        successful_sources,
        failed_sources,
    }
}

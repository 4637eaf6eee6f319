//! Prometheus metrics: recorder installation, registration of every series
//! the aggregator emits, and the `/metrics` exposition route.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the recorder and describe the aggregate fan-out series.
    /// Called once at startup, before the first request; the aggregator
    /// itself only records.
    pub fn init(source_timeout_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!(
            "aggregate_requests_total",
            "Aggregate fan-out requests served."
        );
        describe_counter!(
            "aggregate_source_failures_total",
            "Individual source fetches that ended in failure."
        );
        describe_histogram!(
            "aggregate_fetch_ms",
            "Per-source fetch duration in milliseconds."
        );
        describe_gauge!(
            "aggregate_source_timeout_secs",
            "Configured per-source budget for the fan-out, in seconds."
        );
        gauge!("aggregate_source_timeout_secs").set(source_timeout_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{counter, histogram};

    // Single test owning the global recorder; installing twice would fail.
    #[test]
    fn init_registers_aggregate_series() {
        let m = Metrics::init(7).expect("install recorder");
        counter!("aggregate_requests_total").increment(1);
        histogram!("aggregate_fetch_ms").record(12.5);

        let text = m.handle.render();
        assert!(text.contains("aggregate_requests_total 1"));
        assert!(text.contains("aggregate_fetch_ms"));
        assert!(text.contains("aggregate_source_timeout_secs 7"));
        assert!(text.contains("Aggregate fan-out requests served."));
    }
}

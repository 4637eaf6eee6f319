// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod ai;
pub mod api;
pub mod config;
pub mod landsat;
pub mod library;
pub mod metrics;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{AggregateResponse, Aggregator, SourceResult};
pub use crate::api::{router, AppState};
pub use crate::sources::{DataSource, LocationQuery};

//! Decision impact attribution engine for ad-account optimization.
//!
//! For every optimization action the optimizer logged (bid change,
//! negative, harvest, pause), this crate decides whether that decision
//! caused a measurable change in outcome, as opposed to market drift,
//! noise, or simply not enough elapsed time, and reduces the results
//! to one canonical set of numbers that every consumer must display
//! identically.
//!
//! The pipeline, leaves first:
//! window resolver → maturity/validation gates → counterfactual
//! classifier → canonical aggregator → ROAS waterfall decomposer.

pub mod action;
pub mod classifier;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod error;
pub mod maturity;
pub mod metrics;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validation;
pub mod waterfall;
pub mod window;

pub use action::{Action, ActionKind, HarvestProvenance};
pub use config::{FilterConfig, ImpactConfig};
pub use engine::{compute_impact_records, AccountReport, ImpactEngine};
pub use error::{ImpactError, ImpactResult};
pub use metrics::ImpactMetrics;
pub use record::{Attribution, ImpactRecord, MarketTag};
pub use snapshot::{PerformanceSnapshot, WindowTotals};
pub use store::ImpactStore;
pub use waterfall::{roas_waterfall, RoasWaterfall};

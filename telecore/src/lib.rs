//! The lock-free instrumentation core behind a pull-based Prometheus/OpenMetrics
//! telemetry pipeline.
//!
//! ## Basics
//!
//! `telecore` owns the registry, the per-instrument label indexing, and the per-series
//! atomic state (counters, gauges, CKMS summaries, fixed-bucket histograms, info and
//! stateset series) that a scrape walks to build an exposition snapshot. It does not
//! render text itself — see `telecore-text` for the OpenMetrics/Prometheus writers — and
//! it owns no network listener or push client.
//!
//! ## High-level features
//!
//! - lock-free, allocation-free hot path for counter/gauge observation
//! - CKMS ε-approximate quantiles over a rotating sliding window for summaries
//! - atomic per-bucket histogram counters with linear/exponential/default bucket helpers
//! - an observation-buffer protocol that keeps a concurrent snapshot read linearizable
//!   without ever blocking an observer
//! - exemplar attachment with a pluggable sampling policy
//!
//! ## Usage
//!
//! ```
//! use telecore::{Registry, instrument::CounterBuilder};
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let requests = Arc::new(
//!     CounterBuilder::new("requests_total")
//!         .label_names(&["path"])
//!         .build()
//!         .expect("valid counter configuration"),
//! );
//! registry.register(requests.clone()).expect("no name collision");
//!
//! let series = requests.with_label_values(&["/hello"]).expect("arity matches");
//! series.inc().expect("non-negative increment");
//!
//! let scraped = registry.scrape(None);
//! assert_eq!(scraped.snapshots.len(), 1);
//! ```
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]

mod buffer;
mod bucket;
mod error;
mod exemplar;
mod label;
mod metadata;
mod quantile;
mod time;

pub mod instrument;
pub mod series;
pub mod snapshot;

mod registry;

pub use error::{Error, Result};
pub use exemplar::{default_policy, Exemplar, ExemplarSampler, DEFAULT_MIN_RETENTION_MILLIS};
pub use label::{LabelNames, LabelSet, LabelValues};
pub use metadata::Metadata;
pub use quantile::{Ckms, Quantile};
pub use registry::Registry;

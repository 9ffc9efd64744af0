//! OpenMetrics and classic Prometheus text exposition writers over [`telecore`] snapshots.
//!
//! This crate owns no registry, no instrument state, and no HTTP surface: it reads the
//! immutable [`telecore::snapshot::MetricSnapshot`] sequence a scrape produces and renders
//! it to whatever sink the caller provides (a `String`, a buffered response body, …).
//!
//! ```
//! use std::sync::Arc;
//! use telecore::{instrument::CounterBuilder, Registry};
//! use telecore_text::openmetrics::write_openmetrics;
//!
//! let registry = Registry::new();
//! let hits = Arc::new(CounterBuilder::new("hits").build().unwrap());
//! registry.register(hits.clone()).unwrap();
//! hits.with_label_values::<&str>(&[]).unwrap().inc().unwrap();
//!
//! let scraped = registry.scrape(None);
//! let mut body = String::new();
//! write_openmetrics(&scraped.snapshots, &mut body).unwrap();
//! assert!(body.ends_with("# EOF\n"));
//! ```
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]

mod engine;
mod formatting;

pub mod content_type;
pub mod openmetrics;
pub mod prometheus;

pub use openmetrics::write_openmetrics;
pub use prometheus::write_prometheus;

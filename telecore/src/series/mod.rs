//! Per-series atomic state: one of these lives behind every distinct label-set a
//! collector has observed.

mod counter;
mod gauge;
mod histogram;
mod info;
mod stateset;
mod summary;
mod unknown;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::{exponential_buckets, linear_buckets, sanitize_bounds, Histogram, DEFAULT_BUCKETS};
pub use info::Info;
pub use stateset::StateSet;
pub use summary::Summary;
pub use unknown::Unknown;

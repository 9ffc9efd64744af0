//! Immutable snapshot values produced by a [`crate::registry::Registry`] scrape.
//!
//! Once built, a snapshot shares no mutable state with the live series it was read
//! from: a writer can take as long as it likes rendering one without racing observers.

use crate::exemplar::Exemplar;
use crate::label::LabelSet;
use crate::metadata::Metadata;

/// The kind of a metric family, matching the exposition format's `# TYPE` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonic counter.
    Counter,
    /// Point-in-time gauge.
    Gauge,
    /// Quantile summary.
    Summary,
    /// Fixed-bucket histogram.
    Histogram,
    /// Non-monotonic "current distribution" histogram.
    GaugeHistogram,
    /// Label-only metadata, value always `1.0`.
    Info,
    /// Mutually-exclusive-by-convention boolean states.
    StateSet,
    /// A bare value of unspecified semantics.
    Unknown,
}

/// One series's estimated value at a given ϕ, with its rendered label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileValue {
    /// The target rank.
    pub phi: f64,
    /// The estimated value, or `None` if the estimator has seen no observations.
    pub value: Option<f64>,
}

/// One bucket of a histogram series: its upper bound, cumulative count, and optional
/// exemplar.
#[derive(Debug, Clone)]
pub struct BucketValue {
    /// The bucket's upper bound (`le` label value); `f64::INFINITY` for the last bucket.
    pub upper_bound: f64,
    /// The cumulative observation count at or below `upper_bound`.
    pub cumulative_count: u64,
    /// The bucket's exemplar, if one has landed.
    pub exemplar: Option<Exemplar>,
}

/// The immutable, per-label-set state of one series within a family.
#[derive(Debug, Clone)]
pub enum SeriesValue {
    /// A counter series.
    Counter {
        /// Current value.
        value: f64,
        /// Creation timestamp in millis, `0` if absent.
        created_millis: u64,
        /// Current exemplar, if any.
        exemplar: Option<Exemplar>,
    },
    /// A gauge series.
    Gauge {
        /// Current value.
        value: f64,
        /// Current exemplar, if any.
        exemplar: Option<Exemplar>,
    },
    /// A summary series.
    Summary {
        /// Total observation count (unwindowed).
        count: u64,
        /// Total observed sum (unwindowed).
        sum: f64,
        /// Quantile estimates, ascending by ϕ.
        quantiles: Vec<QuantileValue>,
        /// Creation timestamp in millis, `0` if absent.
        created_millis: u64,
        /// Exemplars recorded on this series.
        exemplars: Vec<Exemplar>,
    },
    /// A histogram (or gauge-histogram) series.
    Histogram {
        /// Buckets, ascending by upper bound.
        buckets: Vec<BucketValue>,
        /// Total observed sum.
        sum: f64,
        /// Total observation count (equals the last bucket's cumulative count).
        count: u64,
        /// Creation timestamp in millis, `0` if absent.
        created_millis: u64,
    },
    /// An info series; the value is always `1.0`.
    Info,
    /// A stateset series.
    StateSet {
        /// States in ascending name order.
        states: Vec<(Box<str>, bool)>,
    },
    /// An unknown-typed series.
    Unknown {
        /// Current value.
        value: f64,
        /// Current exemplar, if any.
        exemplar: Option<Exemplar>,
    },
}

/// One series: its labels plus its value.
#[derive(Debug, Clone)]
pub struct SeriesSnapshot {
    /// The series's own labels (constant/global labels already merged in, sorted).
    pub labels: LabelSet,
    /// The series's value.
    pub value: SeriesValue,
    /// Millisecond scrape timestamp, if the registry was asked to stamp one.
    pub scrape_timestamp_millis: Option<u64>,
}

/// One metric family: its metadata, kind, and every series observed under it.
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    /// Family metadata (name/help/unit).
    pub metadata: Metadata,
    /// The family's kind.
    pub kind: MetricKind,
    /// Every series currently registered under this family.
    pub series: Vec<SeriesSnapshot>,
}

/// A soft failure recorded while scraping one collector; the collector's output is
/// omitted from the snapshot sequence but the scrape as a whole still succeeds.
#[derive(Debug, Clone)]
pub struct ScrapeDiagnostic {
    /// The family name of the collector that failed.
    pub family_name: String,
    /// A human-readable description of the failure.
    pub message: String,
}

/// The result of a full registry scrape: an ordered snapshot sequence plus any soft
/// failures encountered along the way.
#[derive(Debug, Clone, Default)]
pub struct ScrapeResult {
    /// Snapshots in family-name ascending order.
    pub snapshots: Vec<MetricSnapshot>,
    /// Soft failures; `scrape()` itself never fails outright.
    pub diagnostics: Vec<ScrapeDiagnostic>,
}

//! A family of summary series sharing one name, quantile targets, window, and label
//! schema.

use super::{Collector, SeriesIndex};
use crate::buffer::ObservationBuffer;
use crate::error::Error;
use crate::exemplar::Exemplar;
use crate::label::{LabelNames, LabelSet};
use crate::metadata::Metadata;
use crate::quantile::Quantile;
use crate::series::Summary;
use crate::snapshot::{MetricKind, MetricSnapshot, QuantileValue, SeriesSnapshot, SeriesValue};
use crate::time::now_millis;
use quanta::Clock;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_AGE_BUCKETS: usize = 5;
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);

/// Builds a [`SummaryFamily`].
pub struct SummaryBuilder {
    name: String,
    help: Option<String>,
    unit: Option<String>,
    label_names: Vec<String>,
    const_labels: Vec<(String, String)>,
    targets: Vec<Quantile>,
    age_buckets: usize,
    max_age: Duration,
    clock: Clock,
}

impl SummaryBuilder {
    /// Starts a builder for a summary family named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: None,
            unit: None,
            label_names: Vec::new(),
            const_labels: Vec::new(),
            targets: Vec::new(),
            age_buckets: DEFAULT_AGE_BUCKETS,
            max_age: DEFAULT_MAX_AGE,
            clock: Clock::new(),
        }
    }

    /// Sets the family's help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the family's unit.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the label names every series of this family will be indexed by.
    pub fn label_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.label_names = names.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }

    /// Adds a label shared by every series of this family.
    pub fn const_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.const_labels.push((name.into(), value.into()));
        self
    }

    /// Adds a (ϕ, ε) quantile target. An empty target list degenerates to count+sum only.
    pub fn quantile(mut self, phi: f64, epsilon: f64) -> Result<Self, Error> {
        self.targets.push(Quantile::new(phi, epsilon)?);
        Ok(self)
    }

    /// Sets the sliding window's width, in seconds. Must be positive.
    pub fn max_age_seconds(mut self, seconds: u64) -> Result<Self, Error> {
        if seconds == 0 {
            return Err(Error::InvalidArgument("maxAgeSeconds must be greater than zero"));
        }
        self.max_age = Duration::from_secs(seconds);
        Ok(self)
    }

    /// Sets the number of rotating age buckets. Must be positive.
    pub fn age_buckets(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidArgument("ageBuckets must be greater than zero"));
        }
        self.age_buckets = count;
        Ok(self)
    }

    /// Substitutes a mockable clock (for deterministic rotation tests).
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Validates the configuration and builds the family.
    pub fn build(self) -> Result<SummaryFamily, Error> {
        let metadata = Metadata::new(self.name, self.help, self.unit)?;
        let label_names = LabelNames::new(&self.label_names)?;
        let const_labels = LabelSet::new(self.const_labels)?;
        let index = SeriesIndex::new(label_names);
        let targets = self.targets;
        let age_buckets = self.age_buckets;
        let max_age = self.max_age;
        let clock = self.clock;
        let default = if index.names().arity() == 0 {
            let targets = targets.clone();
            let clock = clock.clone();
            Some(index.get_or_create::<&str>(&[], move || {
                SummarySeries::new(targets, age_buckets, max_age, clock)
            })?)
        } else {
            None
        };
        Ok(SummaryFamily { metadata, const_labels, targets, age_buckets, max_age, clock, index, default })
    }
}

/// One summary series plus the observation buffer that keeps a concurrent quantile
/// snapshot read consistent (§4.7).
pub struct SummarySeries {
    summary: Summary,
    buffer: ObservationBuffer<(f64, Option<Exemplar>)>,
}

impl SummarySeries {
    fn new(targets: Vec<Quantile>, age_buckets: usize, max_age: Duration, clock: Clock) -> Self {
        Self {
            summary: Summary::new(targets, age_buckets, max_age, clock, now_millis()),
            buffer: ObservationBuffer::new(),
        }
    }

    /// Records an observation.
    pub fn observe(&self, value: f64) {
        self.buffer.observe((value, None), |(v, exemplar)| match exemplar {
            Some(e) => self.summary.observe_with_exemplar(v, e),
            None => self.summary.observe(v),
        });
    }

    /// Records an observation with an attached exemplar, bypassing any sampler.
    pub fn observe_with_exemplar(&self, value: f64, exemplar: Exemplar) {
        self.buffer.observe((value, Some(exemplar)), |(v, exemplar)| {
            if let Some(e) = exemplar {
                self.summary.observe_with_exemplar(v, e);
            } else {
                self.summary.observe(v);
            }
        });
    }
}

/// A registered family of summary series.
pub struct SummaryFamily {
    metadata: Metadata,
    const_labels: LabelSet,
    targets: Vec<Quantile>,
    age_buckets: usize,
    max_age: Duration,
    clock: Clock,
    index: SeriesIndex<SummarySeries>,
    default: Option<Arc<SummarySeries>>,
}

impl SummaryFamily {
    /// The series for `values`, creating it if this is the first observation under
    /// that label tuple.
    pub fn with_label_values<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<SummarySeries>, Error> {
        let targets = self.targets.clone();
        let age_buckets = self.age_buckets;
        let max_age = self.max_age;
        let clock = self.clock.clone();
        self.index.get_or_create(values, move || SummarySeries::new(targets, age_buckets, max_age, clock))
    }

    /// The eagerly-created default series, for label-less families.
    pub fn default_series(&self) -> Option<&Arc<SummarySeries>> {
        self.default.as_ref()
    }
}

impl Collector for SummaryFamily {
    fn family_name(&self) -> &str {
        self.metadata.name()
    }

    fn collect(&self, scrape_timestamp_millis: Option<u64>) -> Result<MetricSnapshot, Error> {
        let mut series: Vec<_> = self
            .index
            .iter()
            .into_iter()
            .map(|(labels, handle)| {
                handle.buffer.begin_buffering();
                let count = handle.summary.count();
                let sum = handle.summary.sum();
                let created_millis = handle.summary.created_millis();
                let mut quantiles: Vec<_> = handle
                    .summary
                    .targets()
                    .iter()
                    .map(|q| QuantileValue { phi: q.phi(), value: handle.summary.quantile(q.phi()) })
                    .collect();
                quantiles.sort_by(|a, b| a.phi.partial_cmp(&b.phi).unwrap());
                let exemplars = handle.summary.exemplars();
                handle.buffer.end_buffering(|(v, exemplar)| match exemplar {
                    Some(e) => handle.summary.observe_with_exemplar(v, e),
                    None => handle.summary.observe(v),
                });
                SeriesSnapshot {
                    labels: labels.merge_over(&self.const_labels),
                    value: SeriesValue::Summary { count, sum, quantiles, created_millis, exemplars },
                    scrape_timestamp_millis,
                }
            })
            .collect();
        series.sort_by(|a, b| a.labels.iter().cmp(b.labels.iter()));
        Ok(MetricSnapshot { metadata: self.metadata.clone(), kind: MetricKind::Summary, series })
    }
}

//! A family of histogram (or gauge-histogram) series sharing one name, bounds, and
//! label schema.

use super::{Collector, SeriesIndex};
use crate::buffer::ObservationBuffer;
use crate::error::Error;
use crate::exemplar::{default_policy, Exemplar, ExemplarSampler, DEFAULT_MIN_RETENTION_MILLIS};
use crate::label::{LabelNames, LabelSet};
use crate::metadata::Metadata;
use crate::series::{sanitize_bounds, Histogram};
use crate::snapshot::{BucketValue, MetricKind, MetricSnapshot, SeriesSnapshot, SeriesValue};
use crate::time::now_millis;
use std::sync::Arc;

/// Builds a [`HistogramFamily`].
pub struct HistogramBuilder {
    name: String,
    help: Option<String>,
    unit: Option<String>,
    label_names: Vec<String>,
    const_labels: Vec<(String, String)>,
    bounds: Vec<f64>,
    gauge_histogram: bool,
    sampler: Option<ExemplarSampler>,
}

impl HistogramBuilder {
    /// Starts a builder for a histogram family named `name`, with `bounds` as the
    /// requested (not yet sanitised) upper bounds.
    pub fn new(name: impl Into<String>, bounds: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            help: None,
            unit: None,
            label_names: Vec::new(),
            const_labels: Vec::new(),
            bounds,
            gauge_histogram: false,
            sampler: None,
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

    /// Marks this family as a gauge-histogram: semantically non-monotonic, rendered
    /// with type `gaugehistogram` and `_gcount`/`_gsum` suffixes.
    pub fn gauge_histogram(mut self) -> Self {
        self.gauge_histogram = true;
        self
    }

    /// Installs a custom exemplar sampling policy for this family's buckets.
    pub fn exemplar_sampler(mut self, sampler: ExemplarSampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Validates the configuration and builds the family.
    pub fn build(self) -> Result<HistogramFamily, Error> {
        let metadata = Metadata::new(self.name, self.help, self.unit)?;
        let label_names = LabelNames::new(&self.label_names)?;
        let const_labels = LabelSet::new(self.const_labels)?;
        let bounds = sanitize_bounds(self.bounds)?;
        let sampler = Arc::new(self.sampler.unwrap_or_else(|| default_policy(DEFAULT_MIN_RETENTION_MILLIS)));
        let index = SeriesIndex::new(label_names);
        let default = if index.names().arity() == 0 {
            let sampler = Arc::clone(&sampler);
            Some(index.get_or_create::<&str>(&[], || HistogramSeries::new(bounds.clone(), sampler))?)
        } else {
            None
        };
        Ok(HistogramFamily {
            metadata,
            const_labels,
            bounds,
            gauge_histogram: self.gauge_histogram,
            index,
            default,
            sampler,
        })
    }
}

/// One histogram series plus the observation buffer that keeps a concurrent snapshot
/// read consistent (§4.7).
pub struct HistogramSeries {
    histogram: Histogram,
    buffer: ObservationBuffer<(f64, Option<Exemplar>)>,
    sampler: Arc<ExemplarSampler>,
}

impl HistogramSeries {
    fn new(bounds: Vec<f64>, sampler: Arc<ExemplarSampler>) -> Self {
        Self { histogram: Histogram::new(bounds, now_millis()), buffer: ObservationBuffer::new(), sampler }
    }

    /// Records an observation, consulting the family's exemplar sampler (§4.6) for the
    /// bucket it lands in.
    pub fn observe(&self, value: f64) {
        self.buffer.observe((value, None), |(v, exemplar)| match exemplar {
            Some(e) => self.histogram.observe_with_exemplar(v, Some(e)),
            None => self.histogram.observe_sampled(v, &self.sampler),
        });
    }

    /// Records an observation, attaching `exemplar` to the bucket it lands in,
    /// bypassing any configured sampler.
    pub fn observe_with_exemplar(&self, value: f64, exemplar: Exemplar) {
        self.buffer.observe((value, Some(exemplar)), |(v, exemplar)| {
            self.histogram.observe_with_exemplar(v, exemplar)
        });
    }
}

/// A registered family of histogram series.
pub struct HistogramFamily {
    metadata: Metadata,
    const_labels: LabelSet,
    bounds: Vec<f64>,
    gauge_histogram: bool,
    index: SeriesIndex<HistogramSeries>,
    default: Option<Arc<HistogramSeries>>,
    sampler: Arc<ExemplarSampler>,
}

impl HistogramFamily {
    /// The series for `values`, creating it if this is the first observation under
    /// that label tuple.
    pub fn with_label_values<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<HistogramSeries>, Error> {
        let bounds = self.bounds.clone();
        let sampler = Arc::clone(&self.sampler);
        self.index.get_or_create(values, move || HistogramSeries::new(bounds, sampler))
    }

    /// The eagerly-created default series, for label-less families.
    pub fn default_series(&self) -> Option<&Arc<HistogramSeries>> {
        self.default.as_ref()
    }
}

impl Collector for HistogramFamily {
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
                let bounds = handle.histogram.bounds().to_vec();
                let cumulative = handle.histogram.cumulative_counts();
                let sum = handle.histogram.sum();
                let count = handle.histogram.count();
                let created_millis = handle.histogram.created_millis();
                let buckets = bounds
                    .iter()
                    .zip(cumulative.iter())
                    .enumerate()
                    .map(|(i, (&bound, &cumulative_count))| BucketValue {
                        upper_bound: bound,
                        cumulative_count,
                        exemplar: handle.histogram.exemplar_at(i),
                    })
                    .collect();
                handle.buffer.end_buffering(|(v, exemplar)| match exemplar {
                    Some(e) => handle.histogram.observe_with_exemplar(v, Some(e)),
                    None => handle.histogram.observe_sampled(v, &handle.sampler),
                });
                SeriesSnapshot {
                    labels: labels.merge_over(&self.const_labels),
                    value: SeriesValue::Histogram { buckets, sum, count, created_millis },
                    scrape_timestamp_millis,
                }
            })
            .collect();
        series.sort_by(|a, b| a.labels.iter().cmp(b.labels.iter()));
        let kind = if self.gauge_histogram { MetricKind::GaugeHistogram } else { MetricKind::Histogram };
        Ok(MetricSnapshot { metadata: self.metadata.clone(), kind, series })
    }
}

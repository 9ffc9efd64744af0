//! A family of counter series sharing one name and label schema.

use super::{Collector, SeriesIndex};
use crate::error::Error;
use crate::label::LabelNames;
use crate::label::LabelSet;
use crate::metadata::Metadata;
use crate::series::Counter;
use crate::snapshot::{MetricKind, MetricSnapshot, SeriesSnapshot, SeriesValue};
use crate::time::now_millis;
use std::sync::Arc;

/// Builds a [`CounterFamily`].
#[derive(Debug, Default)]
pub struct CounterBuilder {
    name: String,
    help: Option<String>,
    unit: Option<String>,
    label_names: Vec<String>,
    const_labels: Vec<(String, String)>,
}

impl CounterBuilder {
    /// Starts a builder for a counter family named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
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

    /// Validates the configuration and builds the family, eagerly creating the
    /// default (no-label) series if the family has no label names.
    pub fn build(self) -> Result<CounterFamily, Error> {
        let metadata = Metadata::new(self.name, self.help, self.unit)?;
        let label_names = LabelNames::new(&self.label_names)?;
        let const_labels = LabelSet::new(self.const_labels)?;
        let index = SeriesIndex::new(label_names);
        let default = if index.names().arity() == 0 {
            Some(index.get_or_create::<&str>(&[], || Counter::new(now_millis()))?)
        } else {
            None
        };
        Ok(CounterFamily { metadata, const_labels, index, default })
    }
}

/// A registered family of counter series.
pub struct CounterFamily {
    metadata: Metadata,
    const_labels: LabelSet,
    index: SeriesIndex<Counter>,
    default: Option<Arc<Counter>>,
}

impl CounterFamily {
    /// The series for `values`, creating it if this is the first observation under
    /// that label tuple.
    pub fn with_label_values<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<Counter>, Error> {
        self.index.get_or_create(values, || Counter::new(now_millis()))
    }

    /// The eagerly-created default series, for label-less families.
    pub fn default_series(&self) -> Option<&Arc<Counter>> {
        self.default.as_ref()
    }
}

impl Collector for CounterFamily {
    fn family_name(&self) -> &str {
        self.metadata.name()
    }

    fn collect(&self, scrape_timestamp_millis: Option<u64>) -> Result<MetricSnapshot, Error> {
        let mut series: Vec<_> = self
            .index
            .iter()
            .into_iter()
            .map(|(labels, counter)| SeriesSnapshot {
                labels: labels.merge_over(&self.const_labels),
                value: SeriesValue::Counter {
                    value: counter.value(),
                    created_millis: counter.created_millis(),
                    exemplar: counter.exemplar(),
                },
                scrape_timestamp_millis,
            })
            .collect();
        series.sort_by(|a, b| a.labels.iter().cmp(b.labels.iter()));
        Ok(MetricSnapshot { metadata: self.metadata.clone(), kind: MetricKind::Counter, series })
    }
}

//! A family of info series: label-only metadata exposed at value `1.0`.

use super::Collector;
use crate::error::Error;
use crate::label::{LabelNames, LabelSet, LabelValues};
use crate::metadata::Metadata;
use crate::snapshot::{MetricKind, MetricSnapshot, SeriesSnapshot, SeriesValue};
use dashmap::DashSet;

/// Builds an [`InfoFamily`].
#[derive(Debug, Default)]
pub struct InfoBuilder {
    name: String,
    help: Option<String>,
    label_names: Vec<String>,
}

impl InfoBuilder {
    /// Starts a builder for an info family named `name`.
    ///
    /// `name` must not itself end in `_info` — like a counter's `_total`, the suffix is
    /// reserved for writers to append at render time.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Sets the family's help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the label names every series of this family will be indexed by.
    pub fn label_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.label_names = names.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }

    /// Validates the configuration and builds the family.
    pub fn build(self) -> Result<InfoFamily, Error> {
        let metadata = Metadata::new(self.name, self.help, None::<String>)?;
        let label_names = LabelNames::new(&self.label_names)?;
        Ok(InfoFamily { metadata, label_names, series: DashSet::new() })
    }
}

/// A registered family of info series.
pub struct InfoFamily {
    metadata: Metadata,
    label_names: LabelNames,
    series: DashSet<LabelValues>,
}

impl InfoFamily {
    /// Records (or re-records; idempotent) one info series under `values`.
    pub fn set<S: AsRef<str>>(&self, values: &[S]) -> Result<(), Error> {
        let key = LabelValues::new(&self.label_names, values)?;
        self.series.insert(key);
        Ok(())
    }
}

impl Collector for InfoFamily {
    fn family_name(&self) -> &str {
        self.metadata.name()
    }

    fn collect(&self, scrape_timestamp_millis: Option<u64>) -> Result<MetricSnapshot, Error> {
        let mut series: Vec<_> = self
            .series
            .iter()
            .map(|values| SeriesSnapshot {
                labels: LabelSet::from_names_and_values(&self.label_names, &values),
                value: SeriesValue::Info,
                scrape_timestamp_millis,
            })
            .collect();
        series.sort_by(|a, b| a.labels.iter().cmp(b.labels.iter()));
        Ok(MetricSnapshot { metadata: self.metadata.clone(), kind: MetricKind::Info, series })
    }
}

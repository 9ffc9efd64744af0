//! A family of stateset series: named boolean states, one per label tuple.

use super::{Collector, SeriesIndex};
use crate::error::Error;
use crate::label::LabelNames;
use crate::metadata::Metadata;
use crate::series::StateSet;
use crate::snapshot::{MetricKind, MetricSnapshot, SeriesSnapshot, SeriesValue};
use std::sync::Arc;

/// Builds a [`StateSetFamily`].
pub struct StateSetBuilder {
    name: String,
    help: Option<String>,
    label_names: Vec<String>,
    state_names: Vec<String>,
}

impl StateSetBuilder {
    /// Starts a builder for a stateset family named `name` with the given state names.
    ///
    /// Per the data model, the state-label name equals the metric name itself; the
    /// states are written by the writer as `{<name>="<state>"}`.
    pub fn new(name: impl Into<String>, state_names: Vec<String>) -> Self {
        Self { name: name.into(), help: None, label_names: Vec::new(), state_names }
    }

    /// Sets the family's help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the label names every series of this family will be indexed by, in
    /// addition to the state label.
    pub fn label_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.label_names = names.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }

    /// Validates the configuration and builds the family.
    pub fn build(self) -> Result<StateSetFamily, Error> {
        let metadata = Metadata::new(self.name, self.help, None::<String>)?;
        let label_names = LabelNames::new(&self.label_names)?;
        let index = SeriesIndex::new(label_names);
        let state_names = self.state_names;
        let default = if index.names().arity() == 0 {
            let state_names = state_names.clone();
            Some(index.get_or_create::<&str>(&[], move || StateSet::new(&state_names))?)
        } else {
            None
        };
        Ok(StateSetFamily { metadata, state_names, index, default })
    }
}

/// A registered family of stateset series.
pub struct StateSetFamily {
    metadata: Metadata,
    state_names: Vec<String>,
    index: SeriesIndex<StateSet>,
    default: Option<Arc<StateSet>>,
}

impl StateSetFamily {
    /// The series for `values`, creating it if this is the first observation under
    /// that label tuple.
    pub fn with_label_values<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<StateSet>, Error> {
        let state_names = self.state_names.clone();
        self.index.get_or_create(values, move || StateSet::new(&state_names))
    }

    /// The eagerly-created default series, for label-less families.
    pub fn default_series(&self) -> Option<&Arc<StateSet>> {
        self.default.as_ref()
    }
}

impl Collector for StateSetFamily {
    fn family_name(&self) -> &str {
        self.metadata.name()
    }

    fn collect(&self, scrape_timestamp_millis: Option<u64>) -> Result<MetricSnapshot, Error> {
        let mut series: Vec<_> = self
            .index
            .iter()
            .into_iter()
            .map(|(labels, states)| SeriesSnapshot {
                labels,
                value: SeriesValue::StateSet { states: states.snapshot() },
                scrape_timestamp_millis,
            })
            .collect();
        series.sort_by(|a, b| a.labels.iter().cmp(b.labels.iter()));
        Ok(MetricSnapshot { metadata: self.metadata.clone(), kind: MetricKind::StateSet, series })
    }
}

//! Instruments: the label-indexed, collector-facing wrapper around a family of series.

mod counter;
mod gauge;
mod histogram;
mod info;
mod stateset;
mod summary;
mod unknown;

pub use counter::{CounterBuilder, CounterFamily};
pub use gauge::{GaugeBuilder, GaugeFamily};
pub use histogram::{HistogramBuilder, HistogramFamily};
pub use info::{InfoBuilder, InfoFamily};
pub use stateset::{StateSetBuilder, StateSetFamily};
pub use summary::{SummaryBuilder, SummaryFamily};
pub use unknown::{UnknownBuilder, UnknownFamily};

use crate::error::Error;
use crate::label::{LabelNames, LabelSet, LabelValues};
use crate::snapshot::MetricSnapshot;
use dashmap::DashMap;
use std::sync::Arc;

/// Produces an immutable snapshot of everything a collector currently holds.
///
/// A collector's `collect` is fallible only so that a misbehaving implementation can
/// be skipped with a [`ScrapeDiagnostic`](crate::snapshot::ScrapeDiagnostic) rather than
/// poisoning the whole scrape; the instruments in this crate never actually fail here.
pub trait Collector: Send + Sync {
    /// The family name this collector registers under.
    fn family_name(&self) -> &str;

    /// Builds a snapshot of every series this collector currently holds.
    fn collect(&self, scrape_timestamp_millis: Option<u64>) -> Result<MetricSnapshot, Error>;
}

/// Shared label-indexed map from a value tuple to its lazily-created series.
///
/// Lookup is keyed only by [`LabelValues`]; the label *names* are fixed at construction.
/// A miss creates the series under `dashmap`'s atomic entry API, so a race between two
/// first-time observers with the same label values still yields exactly one series.
pub(crate) struct SeriesIndex<S> {
    names: LabelNames,
    series: DashMap<LabelValues, Arc<S>>,
}

impl<S> SeriesIndex<S> {
    pub(crate) fn new(names: LabelNames) -> Self {
        Self { names, series: DashMap::new() }
    }

    pub(crate) fn names(&self) -> &LabelNames {
        &self.names
    }

    /// Looks up (or atomically creates, via `make`) the series for `values`.
    pub(crate) fn get_or_create<S2: AsRef<str>>(
        &self,
        values: &[S2],
        make: impl FnOnce() -> S,
    ) -> Result<Arc<S>, Error> {
        let key = LabelValues::new(&self.names, values)?;
        if let Some(existing) = self.series.get(&key) {
            return Ok(Arc::clone(&existing));
        }
        let entry = self.series.entry(key).or_insert_with(|| Arc::new(make()));
        Ok(Arc::clone(&entry))
    }

    /// Iterates every currently-materialised `(labels, series)` pair.
    pub(crate) fn iter(&self) -> Vec<(LabelSet, Arc<S>)> {
        self.series
            .iter()
            .map(|entry| (LabelSet::from_names_and_values(&self.names, entry.key()), Arc::clone(entry.value())))
            .collect()
    }
}

//! The process-wide (or test-local) collection of registered metric families.

use crate::error::Error;
use crate::instrument::Collector;
use crate::snapshot::{ScrapeDiagnostic, ScrapeResult};
use dashmap::DashMap;
use std::sync::Arc;

/// A collection of collectors keyed by family name.
///
/// The registry is the single entry point for scraping: [`Registry::scrape`] produces
/// an ordered, family-name-sorted sequence of snapshots to hand to a writer. A
/// collector that fails during `collect()` is recorded as a diagnostic and omitted from
/// the snapshot sequence rather than failing the whole scrape.
#[derive(Default)]
pub struct Registry {
    collectors: DashMap<String, Arc<dyn Collector>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { collectors: DashMap::new() }
    }

    /// Registers `collector`, failing with [`Error::DuplicateName`] if its family name
    /// is already present.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<(), Error> {
        let name = collector.family_name().to_owned();
        match self.collectors.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(family = %name, "duplicate family name rejected");
                Err(Error::DuplicateName(name))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(family = %name, "registered collector");
                slot.insert(collector);
                Ok(())
            }
        }
    }

    /// Removes the collector registered under `family_name`, if any.
    pub fn unregister(&self, family_name: &str) {
        #[cfg(feature = "tracing")]
        tracing::trace!(family = %family_name, "unregistered collector");
        self.collectors.remove(family_name);
    }

    /// Iterates every collector in family-name ascending order, calling `collect()` on
    /// each and folding the results into an ordered snapshot sequence plus any soft
    /// failures. Never returns an `Err`.
    pub fn scrape(&self, scrape_timestamp_millis: Option<u64>) -> ScrapeResult {
        let mut names: Vec<String> = self.collectors.iter().map(|e| e.key().clone()).collect();
        names.sort();

        let mut result = ScrapeResult::default();
        for name in names {
            let Some(collector) = self.collectors.get(&name) else { continue };
            match collector.collect(scrape_timestamp_millis) {
                Ok(snapshot) => result.snapshots.push(snapshot),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(family = %name, error = %err, "collector failed during scrape");
                    result.diagnostics.push(ScrapeDiagnostic { family_name: name, message: err.to_string() });
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::CounterBuilder;

    #[test]
    fn duplicate_family_name_is_rejected() {
        let registry = Registry::new();
        let counter = Arc::new(CounterBuilder::new("requests").build().unwrap());
        registry.register(counter.clone()).unwrap();
        let err = registry.register(counter).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
    }

    #[test]
    fn scrape_returns_families_in_name_order() {
        let registry = Registry::new();
        registry.register(Arc::new(CounterBuilder::new("zzz_counter").build().unwrap())).unwrap();
        registry.register(Arc::new(CounterBuilder::new("aaa_counter").build().unwrap())).unwrap();
        let result = registry.scrape(None);
        let names: Vec<_> = result.snapshots.iter().map(|s| s.metadata.name()).collect();
        assert_eq!(names, vec!["aaa_counter", "zzz_counter"]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn unregister_removes_by_name() {
        let registry = Registry::new();
        registry.register(Arc::new(CounterBuilder::new("requests").build().unwrap())).unwrap();
        registry.unregister("requests");
        assert!(registry.scrape(None).snapshots.is_empty());
    }

    #[test]
    fn empty_registry_scrapes_to_nothing() {
        let registry = Registry::new();
        let result = registry.scrape(None);
        assert!(result.snapshots.is_empty());
        assert!(result.diagnostics.is_empty());
    }
}

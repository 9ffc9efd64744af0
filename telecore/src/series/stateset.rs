//! StateSet series: a fixed set of named boolean states.

use dashmap::DashMap;
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single stateset series: one boolean flag per configured state name.
///
/// "At most one state true" is conventional, per the exposition format, but is not
/// enforced here: [`StateSet::set`] never clears sibling states.
#[derive(Debug)]
pub struct StateSet {
    states: Arc<DashMap<Box<str>, AtomicBool>>,
}

impl StateSet {
    /// Builds a series with every named state initially `false`.
    pub fn new<S: AsRef<str>>(state_names: &[S]) -> Self {
        let states = DashMap::new();
        for name in state_names {
            states.insert(Box::from(name.as_ref()), AtomicBool::new(false));
        }
        Self { states: Arc::new(states) }
    }

    /// Sets `state` to `value`. A no-op if `state` was not part of the configured set.
    pub fn set(&self, state: &str, value: bool) {
        if let Some(flag) = self.states.get(state) {
            flag.store(value, Ordering::Relaxed);
        }
    }

    /// The current flags, sorted ascending by state name.
    pub fn snapshot(&self) -> Vec<(Box<str>, bool)> {
        let mut out: Vec<_> = self
            .states
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_state_is_ignored() {
        let states = StateSet::new(&["a", "bb"]);
        states.set("unknown", true);
        assert_eq!(states.snapshot(), vec![(Box::from("a"), false), (Box::from("bb"), false)]);
    }

    #[test]
    fn multiple_true_states_are_allowed() {
        let states = StateSet::new(&["a", "bb"]);
        states.set("a", true);
        states.set("bb", true);
        assert_eq!(states.snapshot(), vec![(Box::from("a"), true), (Box::from("bb"), true)]);
    }

    #[test]
    fn snapshot_is_sorted_by_state_name() {
        let states = StateSet::new(&["zzz", "aaa"]);
        let snapshot = states.snapshot();
        assert_eq!(snapshot[0].0.as_ref(), "aaa");
        assert_eq!(snapshot[1].0.as_ref(), "zzz");
    }
}

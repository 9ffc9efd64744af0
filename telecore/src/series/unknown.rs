//! Unknown series: a single double value of unspecified semantics, with an optional exemplar.

use crate::exemplar::Exemplar;
use parking_lot::RwLock;
use portable_atomic::{AtomicU64, Ordering};

/// A single "unknown"-typed series.
#[derive(Debug)]
pub struct Unknown {
    bits: AtomicU64,
    exemplar: RwLock<Option<Exemplar>>,
}

impl Unknown {
    /// Creates a new series at value `0.0`.
    pub fn new() -> Self {
        Self { bits: AtomicU64::new(0.0f64.to_bits()), exemplar: RwLock::new(None) }
    }

    /// Sets the value.
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Sets the value and overwrites the series exemplar.
    pub fn set_with_exemplar(&self, value: f64, exemplar: Exemplar) {
        self.set(value);
        *self.exemplar.write() = Some(exemplar);
    }

    /// The current value.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// The series's current exemplar, if any.
    pub fn exemplar(&self) -> Option<Exemplar> {
        self.exemplar.read().clone()
    }
}

impl Default for Unknown {
    fn default() -> Self {
        Self::new()
    }
}

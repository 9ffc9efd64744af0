//! Gauge series: an unconstrained, single atomic double.

use crate::exemplar::Exemplar;
use parking_lot::RwLock;
use portable_atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single gauge series.
#[derive(Debug)]
pub struct Gauge {
    bits: AtomicU64,
    exemplar: RwLock<Option<Exemplar>>,
}

impl Gauge {
    /// Creates a new series at value `0.0`.
    pub fn new() -> Self {
        Self { bits: AtomicU64::new(0.0f64.to_bits()), exemplar: RwLock::new(None) }
    }

    /// Sets the value.
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Adds `delta` (any sign).
    pub fn inc_by(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.bits.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Increments by 1.
    pub fn inc(&self) {
        self.inc_by(1.0);
    }

    /// Subtracts `delta`.
    pub fn dec_by(&self, delta: f64) {
        self.inc_by(-delta);
    }

    /// Decrements by 1.
    pub fn dec(&self) {
        self.inc_by(-1.0);
    }

    /// Sets the value to the current wall-clock time, as seconds since the epoch.
    pub fn set_to_current_time(&self) {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        self.set(now.as_secs_f64());
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

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

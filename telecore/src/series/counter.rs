//! Counter series: a monotonic, non-negative accumulator.

use crate::error::Error;
use crate::exemplar::Exemplar;
use parking_lot::RwLock;
use portable_atomic::{AtomicU64, Ordering};

/// A single counter series.
///
/// Increments are split across two atomics: a plain integer accumulator for the common
/// case of whole-number increments, and a CAS-looped float accumulator for fractional
/// ones. Summing the two only happens at snapshot time, so the hot path for `inc()`
/// never pays for a float compare-and-swap.
#[derive(Debug)]
pub struct Counter {
    whole: AtomicU64,
    fraction_bits: AtomicU64,
    created_millis: u64,
    exemplar: RwLock<Option<Exemplar>>,
}

impl Counter {
    /// Creates a new series, capturing `created_millis` as its creation timestamp.
    pub fn new(created_millis: u64) -> Self {
        Self {
            whole: AtomicU64::new(0),
            fraction_bits: AtomicU64::new(0.0f64.to_bits()),
            created_millis,
            exemplar: RwLock::new(None),
        }
    }

    /// Increments by 1.
    pub fn inc(&self) -> Result<(), Error> {
        self.inc_by(1.0)
    }

    /// Increments by `delta`, failing if `delta` is negative or not finite.
    pub fn inc_by(&self, delta: f64) -> Result<(), Error> {
        if !(delta >= 0.0) {
            return Err(Error::InvalidArgument("counter increment must be non-negative"));
        }
        self.add_unchecked(delta);
        Ok(())
    }

    /// Increments by `delta` and overwrites the series exemplar, bypassing any sampler.
    pub fn inc_with_exemplar(&self, delta: f64, exemplar: Exemplar) -> Result<(), Error> {
        self.inc_by(delta)?;
        *self.exemplar.write() = Some(exemplar);
        Ok(())
    }

    fn add_unchecked(&self, delta: f64) {
        if delta.fract() == 0.0 && delta < u64::MAX as f64 {
            self.whole.fetch_add(delta as u64, Ordering::Relaxed);
            return;
        }
        let mut current = self.fraction_bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.fraction_bits.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// The current accumulated value.
    pub fn value(&self) -> f64 {
        self.whole.load(Ordering::Relaxed) as f64 + f64::from_bits(self.fraction_bits.load(Ordering::Relaxed))
    }

    /// Milliseconds since the epoch this series was created, or `0` if none was supplied.
    pub fn created_millis(&self) -> u64 {
        self.created_millis
    }

    /// The series's current exemplar, if any.
    pub fn exemplar(&self) -> Option<Exemplar> {
        self.exemplar.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_increments_accumulate_exactly() {
        let counter = Counter::new(0);
        for _ in 0..1000 {
            counter.inc().unwrap();
        }
        assert_eq!(counter.value(), 1000.0);
    }

    #[test]
    fn fractional_increments_accumulate() {
        let counter = Counter::new(0);
        counter.inc_by(0.8).unwrap();
        counter.inc_by(0.1).unwrap();
        assert!((counter.value() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn negative_increment_is_rejected() {
        let counter = Counter::new(0);
        assert!(matches!(counter.inc_by(-1.0), Err(Error::InvalidArgument(_))));
        assert_eq!(counter.value(), 0.0);
    }

    #[test]
    fn exemplar_overwritten_on_direct_injection() {
        use crate::label::LabelSet;
        let counter = Counter::new(0);
        let labels = LabelSet::new(vec![("trace_id".into(), "abc".into())]).unwrap();
        let exemplar = Exemplar::new(1.0, labels, 42).unwrap();
        counter.inc_with_exemplar(1.0, exemplar).unwrap();
        assert_eq!(counter.exemplar().unwrap().timestamp_millis(), 42);
    }
}

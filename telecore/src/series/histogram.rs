//! Histogram series: fixed, atomic per-bucket counters with a cumulative upper-bound scan.

use crate::error::Error;
use crate::exemplar::{Exemplar, ExemplarSampler};
use parking_lot::RwLock;
use portable_atomic::{AtomicU64, Ordering};

/// The classic Prometheus default bucket boundaries.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Builds `count` linearly-spaced bucket upper bounds starting at `start` with `width`.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + width * i as f64).collect()
}

/// Builds `count` exponentially-spaced bucket upper bounds starting at `start`, each
/// `factor` times the previous.
pub fn exponential_buckets(start: f64, factor: f64, count: usize) -> Vec<f64> {
    let mut bound = start;
    (0..count)
        .map(|_| {
            let b = bound;
            bound *= factor;
            b
        })
        .collect()
}

/// Sanitises a raw bound list per the core's construction rule: dedupe, sort ascending,
/// append `+Inf` if absent; `NaN` fails; the empty list becomes `[+Inf]`.
pub fn sanitize_bounds(mut bounds: Vec<f64>) -> Result<Vec<f64>, Error> {
    if bounds.iter().any(|b| b.is_nan()) {
        return Err(Error::InvalidArgument("histogram bucket bounds must not be NaN"));
    }
    bounds.sort_by(|a, b| a.partial_cmp(b).unwrap());
    bounds.dedup();
    if bounds.last().map(|b| b.is_infinite() && b.is_sign_positive()) != Some(true) {
        bounds.push(f64::INFINITY);
    }
    Ok(bounds)
}

/// A single histogram (or gauge-histogram) series.
///
/// Per-bucket counters are non-cumulative: an observation increments exactly the bucket
/// whose upper bound is the smallest one `>= v`. [`Histogram::cumulative_counts`] folds
/// that into the ascending running totals the exposition format requires.
#[derive(Debug)]
pub struct Histogram {
    bounds: Vec<f64>,
    counts: Vec<AtomicU64>,
    sum_bits: AtomicU64,
    count: AtomicU64,
    created_millis: u64,
    exemplars: Vec<RwLock<Option<Exemplar>>>,
}

impl Histogram {
    /// Builds a series over `bounds`, which must already be sanitised
    /// ([`sanitize_bounds`]).
    pub fn new(bounds: Vec<f64>, created_millis: u64) -> Self {
        let counts = bounds.iter().map(|_| AtomicU64::new(0)).collect();
        let exemplars = bounds.iter().map(|_| RwLock::new(None)).collect();
        Self {
            bounds,
            counts,
            sum_bits: AtomicU64::new(0.0f64.to_bits()),
            count: AtomicU64::new(0),
            created_millis,
            exemplars,
        }
    }

    /// The sanitised upper bounds, ascending, ending in `+Inf`.
    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    fn bucket_index(&self, value: f64) -> usize {
        self.bounds.partition_point(|&bound| bound < value)
    }

    /// Records an observation.
    pub fn observe(&self, value: f64) {
        let idx = self.bucket_index(value);
        self.counts[idx].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.add_sum(value);
    }

    /// Records an observation and, if `exemplar` is supplied, overwrites the landed
    /// bucket's exemplar slot, bypassing any sampler.
    pub fn observe_with_exemplar(&self, value: f64, exemplar: Option<Exemplar>) {
        let idx = self.bucket_index(value);
        self.counts[idx].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.add_sum(value);
        if let Some(exemplar) = exemplar {
            *self.exemplars[idx].write() = Some(exemplar);
        }
    }

    /// Records an observation, consulting `sampler` to decide whether the bucket it
    /// lands in gets a new exemplar (§4.6): `sampler(value, lower_bound_exclusive,
    /// upper_bound_inclusive, previous)`; a `None` result leaves the slot untouched.
    pub fn observe_sampled(&self, value: f64, sampler: &ExemplarSampler) {
        let idx = self.bucket_index(value);
        self.counts[idx].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.add_sum(value);
        let lower = if idx == 0 { f64::NEG_INFINITY } else { self.bounds[idx - 1] };
        let upper = self.bounds[idx];
        let mut slot = self.exemplars[idx].write();
        if let Some(sampled) = sampler(value, lower, upper, slot.as_ref()) {
            *slot = Some(sampled);
        }
    }

    fn add_sum(&self, delta: f64) {
        let mut current = self.sum_bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.sum_bits.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Per-bucket non-cumulative observation counts, in bound order.
    pub fn raw_counts(&self) -> Vec<u64> {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Per-bucket cumulative counts in ascending upper-bound order; the last entry
    /// (the `+Inf` bucket) always equals [`Histogram::count`].
    pub fn cumulative_counts(&self) -> Vec<u64> {
        let mut running = 0u64;
        self.raw_counts()
            .into_iter()
            .map(|c| {
                running += c;
                running
            })
            .collect()
    }

    /// The per-bucket exemplar, if one has been recorded.
    pub fn exemplar_at(&self, index: usize) -> Option<Exemplar> {
        self.exemplars[index].read().clone()
    }

    /// Total number of observations.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Running sum of every observed value.
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }

    /// Milliseconds since the epoch this series was created, or `0` if none was supplied.
    pub fn created_millis(&self) -> u64 {
        self.created_millis
    }
}

//! Summary series: count + sum plus a rotating CKMS quantile estimator over a sliding
//! time window.

use crate::exemplar::Exemplar;
use crate::quantile::{Ckms, Quantile};
use parking_lot::{Mutex, RwLock};
use portable_atomic::{AtomicU64, Ordering};
use quanta::{Clock, Instant};
use std::time::Duration;

struct Rotation {
    head: usize,
    last_rotation: Instant,
}

/// A single summary series.
///
/// Quantiles are tracked in `age_buckets` CKMS instances arranged as a ring. Every
/// observation is inserted into *all* live buckets; periodically the oldest bucket is
/// cleared and becomes the new head, so that at any moment the head bucket alone holds
/// exactly the observations from the trailing `max_age` window. `count`/`sum` are plain
/// running totals independent of the window (mirroring a counter: they never reset).
pub struct Summary {
    targets: Vec<Quantile>,
    count: AtomicU64,
    sum_bits: AtomicU64,
    buckets: Vec<Mutex<Ckms>>,
    rotation: Mutex<Rotation>,
    clock: Clock,
    bucket_duration: Duration,
    created_millis: u64,
    exemplars: RwLock<Vec<Exemplar>>,
}

impl Summary {
    /// Builds a series with `age_buckets` rotating CKMS instances covering a sliding
    /// window of `max_age`, estimating `targets`.
    ///
    /// `clock` lets callers substitute [`quanta::Clock::mock`] in tests; production code
    /// should pass [`quanta::Clock::new`].
    pub fn new(
        targets: Vec<Quantile>,
        age_buckets: usize,
        max_age: Duration,
        clock: Clock,
        created_millis: u64,
    ) -> Self {
        let age_buckets = age_buckets.max(1);
        let bucket_duration = max_age / age_buckets as u32;
        let buckets = (0..age_buckets).map(|_| Mutex::new(Ckms::new(targets.clone()))).collect();
        let now = clock.now();
        Self {
            targets,
            count: AtomicU64::new(0),
            sum_bits: AtomicU64::new(0.0f64.to_bits()),
            buckets,
            rotation: Mutex::new(Rotation { head: 0, last_rotation: now }),
            clock,
            bucket_duration,
            created_millis,
            exemplars: RwLock::new(Vec::new()),
        }
    }

    fn rotate_if_due(&self) {
        let now = self.clock.now();
        let mut rotation = self.rotation.lock();
        let elapsed = now.saturating_duration_since(rotation.last_rotation);
        if elapsed < self.bucket_duration {
            return;
        }
        let periods = (elapsed.as_nanos() / self.bucket_duration.as_nanos().max(1)) as usize;
        if periods >= self.buckets.len() {
            for bucket in &self.buckets {
                bucket.lock().clear();
            }
        } else {
            for _ in 0..periods {
                rotation.head = (rotation.head + self.buckets.len() - 1) % self.buckets.len();
                self.buckets[rotation.head].lock().clear();
            }
        }
        rotation.last_rotation = now;
    }

    /// Records an observation.
    pub fn observe(&self, value: f64) {
        self.rotate_if_due();
        self.count.fetch_add(1, Ordering::Relaxed);
        self.add_sum(value);
        for bucket in &self.buckets {
            bucket.lock().insert(value);
        }
    }

    /// Records an observation and appends `exemplar` to the series's exemplar list.
    pub fn observe_with_exemplar(&self, value: f64, exemplar: Exemplar) {
        self.observe(value);
        self.exemplars.write().push(exemplar);
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

    /// Total number of observations, independent of the sliding window.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Running sum of every observed value, independent of the sliding window.
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }

    /// Queries the estimated value at rank ϕ over the current sliding window.
    ///
    /// Any live bucket holds the same inserts modulo rotation state, so the head bucket
    /// alone is queried rather than merging the whole ring.
    pub fn quantile(&self, phi: f64) -> Option<f64> {
        self.rotate_if_due();
        let rotation = self.rotation.lock();
        self.buckets[rotation.head].lock().query(phi)
    }

    /// The configured quantile targets.
    pub fn targets(&self) -> &[Quantile] {
        &self.targets
    }

    /// Milliseconds since the epoch this series was created, or `0` if none was supplied.
    pub fn created_millis(&self) -> u64 {
        self.created_millis
    }

    /// Exemplars recorded via [`Summary::observe_with_exemplar`].
    pub fn exemplars(&self) -> Vec<Exemplar> {
        self.exemplars.read().clone()
    }
}

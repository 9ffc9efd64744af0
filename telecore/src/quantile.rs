//! ϕ-quantile targets and the CKMS streaming estimator used by [`crate::series::Summary`].
//!
//! The estimator implements the Cormode/Korn/Muthukrishnan/Srivastava algorithm for
//! ε-approximate biased quantiles over a data stream: a compressed sample list is
//! maintained such that querying any configured ϕ returns a value within ε of the true
//! rank, without ever storing the full stream.

use crate::error::Error;
use std::fmt;

/// A single (ϕ, ε) quantile target, e.g. "the 99th percentile, accurate to within 0.1%".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    phi: f64,
    epsilon: f64,
}

impl Quantile {
    /// Builds a quantile target, rejecting ϕ outside `[0, 1]` or a non-positive ε.
    pub fn new(phi: f64, epsilon: f64) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&phi) || phi.is_nan() {
            return Err(Error::InvalidArgument("quantile phi must lie in [0, 1]"));
        }
        if !(epsilon > 0.0) {
            return Err(Error::InvalidArgument("quantile epsilon must be positive"));
        }
        Ok(Self { phi, epsilon })
    }

    /// The target rank, in `[0, 1]`.
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// The allowed rank error.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl fmt::Display for Quantile {
    /// Renders the way a `quantile=` label value is rendered: `0.99`, `0`, or `1` for the
    /// degenerate min/max targets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phi)
    }
}

/// One retained (value, rank-width, max-rank-width) triple in the CKMS sample list.
#[derive(Debug, Clone, Copy)]
struct Entry {
    value: f64,
    g: u64,
    delta: u64,
}

/// A CKMS ε-approximate quantile estimator for a fixed set of (ϕ, ε) targets.
///
/// Inserts are O(log n) amortised (a binary search plus an occasional linear compress
/// pass); queries are O(n) over the compressed sample list, which stays small relative
/// to the observation count for reasonable ε.
#[derive(Debug, Clone)]
pub struct Ckms {
    targets: Vec<Quantile>,
    samples: Vec<Entry>,
    count: u64,
    insertions_since_compress: u64,
}

/// How often (in insertions) to run a compress pass, amortising its cost.
const COMPRESS_INTERVAL: u64 = 128;

impl Ckms {
    /// Builds an estimator for the given quantile targets. An empty `targets` list is
    /// valid: the estimator then only tracks `count`.
    pub fn new(targets: Vec<Quantile>) -> Self {
        Self { targets, samples: Vec::new(), count: 0, insertions_since_compress: 0 }
    }

    /// Number of observations inserted since the estimator was created or last cleared.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The configured quantile targets.
    pub fn targets(&self) -> &[Quantile] {
        &self.targets
    }

    /// Inserts a new observation.
    pub fn insert(&mut self, value: f64) {
        let rank = match self.samples.binary_search_by(|e| e.value.partial_cmp(&value).unwrap()) {
            Ok(i) | Err(i) => i,
        };

        let delta = if rank == 0 || rank == self.samples.len() {
            0
        } else {
            (self.invariant(rank as u64) - 1.0).floor().max(0.0) as u64
        };

        self.samples.insert(rank, Entry { value, g: 1, delta });
        self.count += 1;
        self.insertions_since_compress += 1;

        if self.insertions_since_compress >= COMPRESS_INTERVAL {
            self.compress();
            self.insertions_since_compress = 0;
        }
    }

    /// The `f(r, n)` invariant function: the maximum allowed rank-width at rank `r` among
    /// `n` observations, minimised over every configured target.
    fn invariant(&self, rank: u64) -> f64 {
        if self.targets.is_empty() {
            return f64::INFINITY;
        }
        let n = self.count as f64;
        let r = rank as f64;
        self.targets
            .iter()
            .map(|q| {
                if r <= q.phi * n {
                    2.0 * q.epsilon * r / q.phi
                } else {
                    2.0 * q.epsilon * (n - r) / (1.0 - q.phi)
                }
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Merges adjacent samples whose combined rank-width still satisfies the invariant,
    /// shrinking the sample list back toward its steady-state size.
    fn compress(&mut self) {
        if self.samples.len() < 2 {
            return;
        }
        let mut i = self.samples.len() - 1;
        while i > 0 {
            let rank = self.rank_at(i);
            let combined_width = (self.samples[i - 1].g + self.samples[i].g + self.samples[i].delta) as f64;
            if combined_width <= self.invariant(rank) {
                let removed = self.samples.remove(i - 1);
                self.samples[i - 1].g += removed.g;
            }
            i -= 1;
        }
    }

    fn rank_at(&self, index: usize) -> u64 {
        self.samples[..=index].iter().map(|e| e.g).sum()
    }

    /// Queries the estimated value at rank ϕ, or `None` if nothing has been inserted.
    pub fn query(&self, phi: f64) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let target_rank = (phi * self.count as f64) as u64;
        let margin = self.invariant(target_rank) / 2.0;
        let mut rank = 0u64;
        for i in 1..self.samples.len() {
            rank += self.samples[i - 1].g;
            let upper = rank + self.samples[i].g + self.samples[i].delta;
            if upper as f64 > target_rank as f64 + margin {
                return Some(self.samples[i - 1].value);
            }
        }
        self.samples.last().map(|e| e.value)
    }

    /// Merges another estimator's sample list into this one (used to combine the live
    /// age-buckets of a rotating summary into a single queryable view).
    pub fn merge(&mut self, other: &Ckms) {
        for entry in &other.samples {
            self.insert(entry.value);
        }
    }

    /// Clears all accumulated state, keeping the configured targets.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.count = 0;
        self.insertions_since_compress = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(phi: f64) -> Quantile {
        Quantile::new(phi, 0.01).unwrap()
    }

    #[test]
    fn rejects_out_of_range_phi() {
        assert!(Quantile::new(1.5, 0.01).is_err());
        assert!(Quantile::new(-0.1, 0.01).is_err());
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        assert!(Quantile::new(0.5, 0.0).is_err());
    }

    #[test]
    fn median_of_uniform_stream_is_approximately_correct() {
        let mut ckms = Ckms::new(vec![q(0.5)]);
        for i in 1..=1001 {
            ckms.insert(i as f64);
        }
        let median = ckms.query(0.5).unwrap();
        assert!((median - 501.0).abs() < 50.0, "median estimate {median} too far from 501");
    }

    #[test]
    fn empty_estimator_has_no_quantiles() {
        let ckms = Ckms::new(vec![q(0.99)]);
        assert_eq!(ckms.query(0.99), None);
        assert_eq!(ckms.count(), 0);
    }

    #[test]
    fn clear_resets_count_and_samples() {
        let mut ckms = Ckms::new(vec![q(0.9)]);
        for i in 0..100 {
            ckms.insert(i as f64);
        }
        ckms.clear();
        assert_eq!(ckms.count(), 0);
        assert_eq!(ckms.query(0.9), None);
    }

    #[test]
    fn max_quantile_returns_largest_observed_value() {
        let mut ckms = Ckms::new(vec![q(1.0)]);
        for v in [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0] {
            ckms.insert(v);
        }
        assert_eq!(ckms.query(1.0), Some(9.0));
    }
}

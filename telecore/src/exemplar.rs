//! Exemplars: a single trace/span-bearing observation attached to a sample.

use crate::error::Error;
use crate::label::LabelSet;
use crate::time::now_millis;

/// The exposition format's hard limit on a rendered exemplar label set, excluding the
/// enclosing `{`, `}`, `=`, and `"` characters.
const MAX_EXEMPLAR_LABEL_BYTES: usize = 128;

/// The default sampler's min-retention interval when a family doesn't configure its own.
pub const DEFAULT_MIN_RETENTION_MILLIS: u64 = 7_000;

/// A single exemplar: an observed value, the labels identifying it (typically
/// `trace_id`/`span_id`), and the millisecond timestamp it was taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct Exemplar {
    value: f64,
    labels: LabelSet,
    timestamp_millis: u64,
}

impl Exemplar {
    /// Builds an exemplar, rejecting a label set whose rendered length would exceed the
    /// format's 128-byte cap.
    pub fn new(value: f64, labels: LabelSet, timestamp_millis: u64) -> Result<Self, Error> {
        let rendered_len: usize =
            labels.iter().map(|(k, v)| k.len() + v.len() + 4).sum::<usize>().saturating_sub(1).max(0);
        if rendered_len > MAX_EXEMPLAR_LABEL_BYTES {
            return Err(Error::InvalidArgument(
                "exemplar label set exceeds the 128-byte exposition limit",
            ));
        }
        Ok(Self { value, labels, timestamp_millis })
    }

    /// The observed value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The exemplar's labels.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Milliseconds since the epoch when this exemplar was taken.
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_millis
    }
}

/// A pluggable policy deciding whether a new observation should replace a bucket's
/// current exemplar.
///
/// Invoked on every observation that lands in a bucket (or, for counters/gauges, on
/// every observation): `sample(value, lower_bound_exclusive, upper_bound_inclusive,
/// previous) -> Option<Exemplar>`. Returning `None` leaves the slot untouched.
/// Expressed as a plain function value rather than a trait object: the policy has no
/// state of its own beyond whatever it closes over (a retention interval, a trace
/// context supplier, ...).
pub type ExemplarSampler = Box<dyn Fn(f64, f64, f64, Option<&Exemplar>) -> Option<Exemplar> + Send + Sync>;

/// The default sampling policy: accept the first observation that lands in a bucket,
/// and thereafter replace the held exemplar only once `min_retention_millis` have
/// elapsed since its timestamp.
///
/// Carries no trace/span context of its own, so the sampled exemplar's label set is
/// empty beyond value and timestamp; a family wanting `trace_id`/`span_id` attached
/// installs its own sampler (via the builder's `exemplar_sampler`) that closes over
/// whatever carries that context.
pub fn default_policy(min_retention_millis: u64) -> ExemplarSampler {
    Box::new(move |value, _low, _high, previous| {
        let due = match previous {
            None => true,
            Some(prev) => now_millis().saturating_sub(prev.timestamp_millis()) >= min_retention_millis,
        };
        if !due {
            return None;
        }
        Exemplar::new(value, LabelSet::default(), now_millis()).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelSet;

    fn labels(pairs: &[(&str, &str)]) -> LabelSet {
        LabelSet::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()).unwrap()
    }

    #[test]
    fn accepts_labels_within_limit() {
        let set = labels(&[("trace_id", "abcde"), ("span_id", "12345")]);
        assert!(Exemplar::new(1.7, set, 1_672_850_685_829).is_ok());
    }

    #[test]
    fn rejects_oversized_label_set() {
        let huge_value = "x".repeat(200);
        let set = labels(&[("trace_id", &huge_value)]);
        assert!(matches!(Exemplar::new(1.0, set, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn default_policy_accepts_the_first_observation() {
        let policy = default_policy(60_000);
        let sampled = policy(1.0, 0.0, 1.0, None);
        assert_eq!(sampled.as_ref().map(Exemplar::value), Some(1.0));
        assert!(sampled.unwrap().labels().is_empty());
    }

    #[test]
    fn default_policy_withholds_until_retention_elapses() {
        let policy = default_policy(60_000);
        let previous = Exemplar::new(1.0, LabelSet::default(), now_millis()).unwrap();
        assert!(policy(2.0, 0.0, 1.0, Some(&previous)).is_none());
    }

    #[test]
    fn zero_retention_always_replaces() {
        let policy = default_policy(0);
        let previous = Exemplar::new(1.0, LabelSet::default(), now_millis()).unwrap();
        assert!(policy(2.0, 0.0, 1.0, Some(&previous)).is_some());
    }
}

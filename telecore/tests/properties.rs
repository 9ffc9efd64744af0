//! Property-based invariant checks over the core instrument types.

use proptest::prelude::*;
use telecore::instrument::{Collector, HistogramBuilder, SummaryBuilder};
use telecore::series::{sanitize_bounds, Counter, Histogram};
use telecore::snapshot::SeriesValue;
use telecore::Quantile;

proptest! {
    /// Counter monotonicity: any later read is >= any earlier read, for any sequence of
    /// non-negative increments.
    #[test]
    fn counter_is_monotonic(deltas in prop::collection::vec(0.0f64..1000.0, 1..200)) {
        let counter = Counter::new(0);
        let mut last = counter.value();
        for delta in deltas {
            counter.inc_by(delta).unwrap();
            let now = counter.value();
            prop_assert!(now >= last);
            last = now;
        }
    }

    /// Histogram bucket counts only grow, and an upper bucket's cumulative count is
    /// always >= a lower bucket's.
    #[test]
    fn histogram_cumulative_counts_are_monotonic_and_consistent(
        bounds in prop::collection::vec(0.0f64..100.0, 1..8),
        values in prop::collection::vec(0.0f64..150.0, 0..200),
    ) {
        let bounds = sanitize_bounds(bounds).unwrap();
        let histogram = Histogram::new(bounds, 0);
        let mut previous_cumulative = vec![0u64; histogram.bounds().len()];

        for value in values {
            histogram.observe(value);
            let cumulative = histogram.cumulative_counts();

            for window in cumulative.windows(2) {
                prop_assert!(window[0] <= window[1]);
            }
            for (prev, now) in previous_cumulative.iter().zip(cumulative.iter()) {
                prop_assert!(now >= prev);
            }
            previous_cumulative = cumulative;
        }

        let cumulative = histogram.cumulative_counts();
        prop_assert_eq!(*cumulative.last().unwrap(), histogram.count());
    }

    /// A summary's count/sum are exact running totals independent of the sliding window.
    #[test]
    fn summary_count_and_sum_are_exact(values in prop::collection::vec(-500.0f64..500.0, 0..300)) {
        let family = SummaryBuilder::new("s")
            .quantile(0.5, 0.01).unwrap()
            .build().unwrap();
        let series = family.with_label_values::<&str>(&[]).unwrap();

        let mut expected_sum = 0.0f64;
        for &value in &values {
            series.observe(value);
            expected_sum += value;
        }

        let snapshot = family.collect(None).unwrap();
        let SeriesValue::Summary { count, sum, .. } = &snapshot.series[0].value else {
            panic!("expected a summary series");
        };
        prop_assert_eq!(*count, values.len() as u64);
        prop_assert!((sum - expected_sum).abs() < 1e-6 * (expected_sum.abs().max(1.0)));
    }

    /// Encoding the same label set twice through the writer's rendering produces
    /// byte-identical output (writer idempotence, restricted to the label-rendering step).
    #[test]
    fn label_set_rendering_is_idempotent(
        names in prop::collection::hash_set("[a-z][a-z0-9_]{0,8}", 0..5),
    ) {
        use telecore::LabelSet;
        let pairs: Vec<(String, String)> =
            names.into_iter().map(|n| (n.clone(), format!("v-{n}"))).collect();
        let set = LabelSet::new(pairs).unwrap();

        let first: Vec<_> = set.iter().collect();
        let second: Vec<_> = set.iter().collect();
        prop_assert_eq!(first, second);
    }

    /// A histogram family's two renderings of the same (unchanged) snapshot agree byte
    /// for byte at the `SeriesValue` level.
    #[test]
    fn histogram_snapshot_is_stable_across_repeated_collects(
        values in prop::collection::vec(0.0f64..10.0, 0..50),
    ) {
        let family = HistogramBuilder::new("h", vec![1.0, 2.0, 5.0]).build().unwrap();
        let series = family.with_label_values::<&str>(&[]).unwrap();
        for value in values {
            series.observe(value);
        }

        let first = family.collect(None).unwrap();
        let second = family.collect(None).unwrap();
        let SeriesValue::Histogram { buckets: b1, sum: s1, count: c1, .. } = &first.series[0].value else {
            panic!("expected histogram");
        };
        let SeriesValue::Histogram { buckets: b2, sum: s2, count: c2, .. } = &second.series[0].value else {
            panic!("expected histogram");
        };
        prop_assert_eq!(c1, c2);
        prop_assert_eq!(b1.iter().map(|b| b.cumulative_count).collect::<Vec<_>>(),
                         b2.iter().map(|b| b.cumulative_count).collect::<Vec<_>>());
        prop_assert!((s1 - s2).abs() < 1e-9);
    }
}

#[test]
fn quantile_rejects_out_of_range_inputs() {
    assert!(Quantile::new(-0.1, 0.01).is_err());
    assert!(Quantile::new(1.1, 0.01).is_err());
    assert!(Quantile::new(0.5, 0.0).is_err());
}

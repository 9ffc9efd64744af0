//! End-to-end exposition fixtures: a [`telecore::snapshot::MetricSnapshot`] sequence built
//! by hand (standing in for what a registry scrape would produce) rendered through each
//! writer and checked against the exact expected bytes.

use telecore::snapshot::{
    BucketValue, MetricKind, MetricSnapshot, QuantileValue, SeriesSnapshot, SeriesValue,
};
use telecore::{Exemplar, LabelSet, Metadata};
use telecore_text::{write_openmetrics, write_prometheus};

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    LabelSet::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()).unwrap()
}

#[test]
fn s1_counter_exposition_matches_fixture() {
    let exemplar =
        Exemplar::new(1.7, labels(&[("env", "prod"), ("span_id", "12345"), ("trace_id", "abcde")]), 1_672_850_685_829)
            .unwrap();

    let my_counter = MetricSnapshot {
        metadata: Metadata::new("my_counter", None::<String>, None::<String>).unwrap(),
        kind: MetricKind::Counter,
        series: vec![SeriesSnapshot {
            labels: labels(&[]),
            value: SeriesValue::Counter { value: 1.1, created_millis: 0, exemplar: None },
            scrape_timestamp_millis: None,
        }],
    };

    let service_time = MetricSnapshot {
        metadata: Metadata::new(
            "service_time_seconds",
            Some("total time spent serving"),
            Some("seconds"),
        )
        .unwrap(),
        kind: MetricKind::Counter,
        series: vec![
            SeriesSnapshot {
                labels: labels(&[("path", "/hello"), ("status", "200")]),
                value: SeriesValue::Counter {
                    value: 0.8,
                    created_millis: 1_672_850_585_820,
                    exemplar: Some(exemplar.clone()),
                },
                scrape_timestamp_millis: Some(1_672_850_685_829),
            },
            SeriesSnapshot {
                labels: labels(&[("path", "/hello"), ("status", "500")]),
                value: SeriesValue::Counter {
                    value: 0.9,
                    created_millis: 1_672_850_585_820,
                    exemplar: Some(exemplar),
                },
                scrape_timestamp_millis: Some(1_672_850_685_829),
            },
        ],
    };

    let mut out = String::new();
    write_openmetrics(&[my_counter, service_time], &mut out).unwrap();

    let expected = "\
# TYPE my_counter counter
my_counter_total 1.1
# TYPE service_time_seconds counter
# UNIT service_time_seconds seconds
# HELP service_time_seconds total time spent serving
service_time_seconds_total{path=\"/hello\",status=\"200\"} 0.8 1672850685.829 # {env=\"prod\",span_id=\"12345\",trace_id=\"abcde\"} 1.7 1672850685.829
service_time_seconds_created{path=\"/hello\",status=\"200\"} 1672850585.820
service_time_seconds_total{path=\"/hello\",status=\"500\"} 0.9 1672850685.829 # {env=\"prod\",span_id=\"12345\",trace_id=\"abcde\"} 1.7 1672850685.829
service_time_seconds_created{path=\"/hello\",status=\"500\"} 1672850585.820
# EOF
";
    assert_eq!(out, expected);
}

#[test]
fn s2_histogram_bucket_count_sum_created_ordering() {
    let exemplar_low = Exemplar::new(2.0, labels(&[("trace_id", "a")]), 1_000).unwrap();
    let exemplar_high = Exemplar::new(4.0, labels(&[("trace_id", "b")]), 2_000).unwrap();

    let histogram = MetricSnapshot {
        metadata: Metadata::new("response_size_bytes", Some("help"), Some("bytes")).unwrap(),
        kind: MetricKind::Histogram,
        series: vec![SeriesSnapshot {
            labels: labels(&[("status", "200")]),
            value: SeriesValue::Histogram {
                buckets: vec![
                    BucketValue { upper_bound: 2.2, cumulative_count: 2, exemplar: Some(exemplar_low) },
                    BucketValue {
                        upper_bound: f64::INFINITY,
                        cumulative_count: 4,
                        exemplar: Some(exemplar_high),
                    },
                ],
                sum: 4.1,
                count: 4,
                created_millis: 500,
            },
            scrape_timestamp_millis: None,
        }],
    };

    let mut out = String::new();
    write_openmetrics(std::slice::from_ref(&histogram), &mut out).unwrap();

    let lines: Vec<&str> = out.lines().collect();
    let bucket_lines: Vec<&str> =
        lines.iter().copied().filter(|l| l.contains("_bucket")).collect();
    assert_eq!(bucket_lines.len(), 2);
    assert!(bucket_lines[0].contains("le=\"2.2\""));
    assert!(bucket_lines[1].contains("le=\"+Inf\""));

    let count_idx = lines.iter().position(|l| l.starts_with("response_size_bytes_count")).unwrap();
    let sum_idx = lines.iter().position(|l| l.starts_with("response_size_bytes_sum")).unwrap();
    let created_idx = lines.iter().position(|l| l.starts_with("response_size_bytes_created")).unwrap();
    let last_bucket_idx = lines.iter().rposition(|l| l.contains("_bucket")).unwrap();
    assert!(last_bucket_idx < count_idx);
    assert!(count_idx < sum_idx);
    assert!(sum_idx < created_idx);
    assert_eq!(lines[count_idx], "response_size_bytes_count 4");
    assert!(lines[sum_idx].starts_with("response_size_bytes_sum 4.1"));
}

#[test]
fn histogram_counts_render_as_plain_integers_in_both_dialects() {
    let histogram = MetricSnapshot {
        metadata: Metadata::new("response_size_bytes", Some("help"), Some("bytes")).unwrap(),
        kind: MetricKind::Histogram,
        series: vec![SeriesSnapshot {
            labels: labels(&[("status", "200")]),
            value: SeriesValue::Histogram {
                buckets: vec![
                    BucketValue { upper_bound: 2.2, cumulative_count: 2, exemplar: None },
                    BucketValue { upper_bound: f64::INFINITY, cumulative_count: 4, exemplar: None },
                ],
                sum: 4.1,
                count: 4,
                created_millis: 500,
            },
            scrape_timestamp_millis: None,
        }],
    };

    let mut openmetrics_out = String::new();
    write_openmetrics(std::slice::from_ref(&histogram), &mut openmetrics_out).unwrap();
    assert!(openmetrics_out.contains("le=\"2.2\"} 2\n"));
    assert!(openmetrics_out.contains("response_size_bytes_count 4\n"));

    let mut prometheus_out = String::new();
    write_prometheus(std::slice::from_ref(&histogram), &mut prometheus_out).unwrap();
    assert!(prometheus_out.contains("le=\"2.2\"} 2\n"));
    assert!(prometheus_out.contains("response_size_bytes_count 4\n"));
    assert!(!prometheus_out.contains("2.0"));
    assert!(!prometheus_out.contains("4.0"));
}

#[test]
fn s3_summary_with_no_targets_emits_only_count_and_sum() {
    let summary = MetricSnapshot {
        metadata: Metadata::new("latency_seconds", None::<String>, None::<String>).unwrap(),
        kind: MetricKind::Summary,
        series: vec![SeriesSnapshot {
            labels: labels(&[]),
            value: SeriesValue::Summary {
                count: 3,
                sum: 1.2,
                quantiles: vec![],
                created_millis: 0,
                exemplars: vec![],
            },
            scrape_timestamp_millis: None,
        }],
    };

    let mut out = String::new();
    write_openmetrics(std::slice::from_ref(&summary), &mut out).unwrap();

    assert!(out.contains("latency_seconds_count 3\n"));
    assert!(out.contains("latency_seconds_sum 1.2\n"));
    assert!(!out.contains("quantile="));
}

#[test]
fn s3b_summary_with_targets_renders_quantile_lines_ascending() {
    let summary = MetricSnapshot {
        metadata: Metadata::new("latency_seconds", None::<String>, None::<String>).unwrap(),
        kind: MetricKind::Summary,
        series: vec![SeriesSnapshot {
            labels: labels(&[]),
            value: SeriesValue::Summary {
                count: 3,
                sum: 1.2,
                quantiles: vec![
                    QuantileValue { phi: 0.5, value: Some(0.3) },
                    QuantileValue { phi: 0.9, value: Some(0.5) },
                ],
                created_millis: 0,
                exemplars: vec![],
            },
            scrape_timestamp_millis: None,
        }],
    };

    let mut out = String::new();
    write_openmetrics(std::slice::from_ref(&summary), &mut out).unwrap();
    let p50 = out.find("quantile=\"0.5\"").unwrap();
    let p90 = out.find("quantile=\"0.9\"").unwrap();
    assert!(p50 < p90);
}

#[test]
fn s4_stateset_emits_states_in_ascending_name_order() {
    let stateset = MetricSnapshot {
        metadata: Metadata::new("my_states", None::<String>, None::<String>).unwrap(),
        kind: MetricKind::StateSet,
        series: vec![SeriesSnapshot {
            labels: labels(&[]),
            value: SeriesValue::StateSet { states: vec![("a".into(), true), ("bb".into(), false)] },
            scrape_timestamp_millis: None,
        }],
    };

    let mut out = String::new();
    write_openmetrics(std::slice::from_ref(&stateset), &mut out).unwrap();

    assert!(out.contains("my_states{my_states=\"a\"} 1\n"));
    assert!(out.contains("my_states{my_states=\"bb\"} 0\n"));
    let a_idx = out.find("my_states=\"a\"").unwrap();
    let bb_idx = out.find("my_states=\"bb\"").unwrap();
    assert!(a_idx < bb_idx);
}

#[test]
fn s5_info_emits_value_one_with_decimal_point() {
    let info = MetricSnapshot {
        metadata: Metadata::new("version", None::<String>, None::<String>).unwrap(),
        kind: MetricKind::Info,
        series: vec![SeriesSnapshot {
            labels: labels(&[("version", "1.2.3")]),
            value: SeriesValue::Info,
            scrape_timestamp_millis: None,
        }],
    };

    let mut out = String::new();
    write_openmetrics(std::slice::from_ref(&info), &mut out).unwrap();

    assert!(out.contains("version_info{version=\"1.2.3\"} 1.0\n"));
}

#[test]
fn prometheus_dialect_never_emits_eof_created_or_exemplars() {
    let exemplar = Exemplar::new(1.0, labels(&[("trace_id", "x")]), 1).unwrap();
    let counter = MetricSnapshot {
        metadata: Metadata::new("requests_processed", None::<String>, None::<String>).unwrap(),
        kind: MetricKind::Counter,
        series: vec![SeriesSnapshot {
            labels: labels(&[]),
            value: SeriesValue::Counter { value: 5.0, created_millis: 999, exemplar: Some(exemplar) },
            scrape_timestamp_millis: None,
        }],
    };

    let mut out = String::new();
    write_prometheus(std::slice::from_ref(&counter), &mut out).unwrap();

    assert!(!out.contains("_created"));
    assert!(!out.contains(" # {"));
    assert!(!out.contains("# EOF"));
    assert!(out.contains("requests_processed_total 5\n"));
}

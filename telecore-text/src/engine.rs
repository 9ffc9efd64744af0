//! The rendering engine shared by the OpenMetrics and Prometheus text writers.
//!
//! The two formats agree on almost everything (§4.9): family ordering, per-series
//! label rendering, float formatting. [`Dialect`] captures the handful of differences.

use crate::formatting::{escape_help_text, format_timestamp_millis, format_value, render_labelset};
use std::fmt::Write;
use telecore::snapshot::{BucketValue, MetricKind, MetricSnapshot, QuantileValue, SeriesValue};
use telecore::{Error, Exemplar};

/// The small set of behaviours that differ between the two text formats.
pub(crate) struct Dialect {
    /// Whether integer-valued doubles render with a trailing `.0`.
    pub(crate) force_decimal_point: bool,
    /// Whether `# UNIT` preamble lines are emitted.
    pub(crate) emit_unit_line: bool,
    /// Whether a `_created` sample is emitted per series.
    pub(crate) emit_created_line: bool,
    /// Whether exemplars are rendered after a sample.
    pub(crate) emit_exemplars: bool,
    /// Whether the stream terminates with a literal `# EOF\n`.
    pub(crate) emit_eof: bool,
}

/// Maps a [`MetricKind`] to the type-line token for `dialect`. Kinds the dialect has no
/// vocabulary for (a gauge-histogram/info/stateset/unknown family under the classic
/// Prometheus format) collapse to `untyped`.
fn type_name(kind: MetricKind, openmetrics: bool) -> &'static str {
    match (kind, openmetrics) {
        (MetricKind::Counter, _) => "counter",
        (MetricKind::Gauge, _) => "gauge",
        (MetricKind::Summary, _) => "summary",
        (MetricKind::Histogram, _) => "histogram",
        (MetricKind::GaugeHistogram, true) => "gaugehistogram",
        (MetricKind::Info, true) => "info",
        (MetricKind::StateSet, true) => "stateset",
        (MetricKind::Unknown, true) => "unknown",
        (MetricKind::GaugeHistogram | MetricKind::Info | MetricKind::StateSet | MetricKind::Unknown, false) => {
            "untyped"
        }
    }
}

fn write_exemplar(buffer: &mut String, exemplar: &Exemplar) -> Result<(), Error> {
    let rendered_labels = render_labelset(exemplar.labels(), None);
    write!(
        buffer,
        " # {} {} {}",
        rendered_labels,
        format_value(exemplar.value(), true),
        format_timestamp_millis(exemplar.timestamp_millis())
    )
    .map_err(Error::from)
}

fn write_sample(
    buffer: &mut String,
    name: &str,
    suffix: Option<&str>,
    labels_rendered: &str,
    value: f64,
    force_decimal_point: bool,
    scrape_timestamp_millis: Option<u64>,
    exemplar: Option<&Exemplar>,
    dialect: &Dialect,
) -> Result<(), Error> {
    buffer.push_str(name);
    if let Some(suffix) = suffix {
        buffer.push('_');
        buffer.push_str(suffix);
    }
    buffer.push_str(labels_rendered);
    buffer.push(' ');
    buffer.push_str(&format_value(value, force_decimal_point));
    if let Some(ts) = scrape_timestamp_millis {
        buffer.push(' ');
        buffer.push_str(&format_timestamp_millis(ts));
    }
    if dialect.emit_exemplars {
        if let Some(exemplar) = exemplar {
            write_exemplar(buffer, exemplar)?;
        }
    }
    buffer.push('\n');
    Ok(())
}

fn write_created_line(
    buffer: &mut String,
    name: &str,
    suffix: &str,
    labels_rendered: &str,
    created_millis: u64,
    dialect: &Dialect,
) -> Result<(), Error> {
    if !dialect.emit_created_line || created_millis == 0 {
        return Ok(());
    }
    writeln!(buffer, "{name}_{suffix}{labels_rendered} {}", format_timestamp_millis(created_millis))
        .map_err(Error::from)
}

/// Renders `snapshots` into `sink`, following `dialect`'s rules. Families are emitted in
/// the order they appear in `snapshots` (the registry has already sorted by name).
pub(crate) fn render(
    snapshots: &[MetricSnapshot],
    dialect: &Dialect,
    sink: &mut dyn Write,
) -> Result<(), Error> {
    let mut buffer = String::new();
    for family in snapshots {
        let name = family.metadata.name();
        let openmetrics = dialect.emit_eof;
        writeln!(buffer, "# TYPE {name} {}", type_name(family.kind, openmetrics)).map_err(Error::from)?;
        if dialect.emit_unit_line {
            if let Some(unit) = family.metadata.unit() {
                writeln!(buffer, "# UNIT {name} {unit}").map_err(Error::from)?;
            }
        }
        if let Some(help) = family.metadata.help() {
            writeln!(buffer, "# HELP {name} {}", escape_help_text(help)).map_err(Error::from)?;
        }

        for series in &family.series {
            let labels_rendered = match family.kind {
                MetricKind::StateSet => String::new(),
                _ => render_labelset(&series.labels, None),
            };

            match &series.value {
                SeriesValue::Counter { value, created_millis, exemplar } => {
                    write_sample(
                        &mut buffer,
                        name,
                        Some("total"),
                        &labels_rendered,
                        *value,
                        dialect.force_decimal_point,
                        series.scrape_timestamp_millis,
                        exemplar.as_ref(),
                        dialect,
                    )?;
                    write_created_line(&mut buffer, name, "created", &labels_rendered, *created_millis, dialect)?;
                }
                SeriesValue::Gauge { value, exemplar } => {
                    write_sample(
                        &mut buffer,
                        name,
                        None,
                        &labels_rendered,
                        *value,
                        dialect.force_decimal_point,
                        series.scrape_timestamp_millis,
                        exemplar.as_ref(),
                        dialect,
                    )?;
                }
                SeriesValue::Unknown { value, exemplar } => {
                    write_sample(
                        &mut buffer,
                        name,
                        None,
                        &labels_rendered,
                        *value,
                        dialect.force_decimal_point,
                        series.scrape_timestamp_millis,
                        exemplar.as_ref(),
                        dialect,
                    )?;
                }
                SeriesValue::Info => {
                    write_sample(
                        &mut buffer,
                        name,
                        Some("info"),
                        &labels_rendered,
                        1.0,
                        true,
                        series.scrape_timestamp_millis,
                        None,
                        dialect,
                    )?;
                }
                SeriesValue::StateSet { states } => {
                    for (state, flag) in states {
                        let reserved = Some((name, state.as_ref()));
                        let rendered = render_labelset(&series.labels, reserved);
                        write_sample(
                            &mut buffer,
                            name,
                            None,
                            &rendered,
                            if *flag { 1.0 } else { 0.0 },
                            dialect.force_decimal_point,
                            series.scrape_timestamp_millis,
                            None,
                            dialect,
                        )?;
                    }
                }
                SeriesValue::Summary { count, sum, quantiles, created_millis, exemplars } => {
                    write_summary(
                        &mut buffer,
                        name,
                        &series.labels,
                        quantiles,
                        exemplars,
                        series.scrape_timestamp_millis,
                        dialect,
                    )?;
                    write_sample(
                        &mut buffer,
                        name,
                        Some("count"),
                        &labels_rendered,
                        *count as f64,
                        false,
                        series.scrape_timestamp_millis,
                        None,
                        dialect,
                    )?;
                    write_sample(
                        &mut buffer,
                        name,
                        Some("sum"),
                        &labels_rendered,
                        *sum,
                        dialect.force_decimal_point,
                        series.scrape_timestamp_millis,
                        None,
                        dialect,
                    )?;
                    write_created_line(&mut buffer, name, "created", &labels_rendered, *created_millis, dialect)?;
                }
                SeriesValue::Histogram { buckets, sum, count, created_millis } => {
                    let (count_suffix, sum_suffix) =
                        if family.kind == MetricKind::GaugeHistogram { ("gcount", "gsum") } else { ("count", "sum") };
                    write_histogram_buckets(
                        &mut buffer,
                        name,
                        &series.labels,
                        buckets,
                        series.scrape_timestamp_millis,
                        dialect,
                    )?;
                    write_sample(
                        &mut buffer,
                        name,
                        Some(count_suffix),
                        &labels_rendered,
                        *count as f64,
                        false,
                        series.scrape_timestamp_millis,
                        None,
                        dialect,
                    )?;
                    write_sample(
                        &mut buffer,
                        name,
                        Some(sum_suffix),
                        &labels_rendered,
                        *sum,
                        dialect.force_decimal_point,
                        series.scrape_timestamp_millis,
                        None,
                        dialect,
                    )?;
                    write_created_line(&mut buffer, name, "created", &labels_rendered, *created_millis, dialect)?;
                }
            }
        }
    }

    if dialect.emit_eof {
        buffer.push_str("# EOF\n");
    }

    sink.write_str(&buffer).map_err(Error::from)
}

fn write_summary(
    buffer: &mut String,
    name: &str,
    labels: &telecore::LabelSet,
    quantiles: &[QuantileValue],
    exemplars: &[Exemplar],
    scrape_timestamp_millis: Option<u64>,
    dialect: &Dialect,
) -> Result<(), Error> {
    for quantile in quantiles {
        let Some(value) = quantile.value else { continue };
        let rendered = render_labelset(labels, Some(("quantile", &format_value(quantile.phi, false))));
        write_sample(
            buffer,
            name,
            None,
            &rendered,
            value,
            dialect.force_decimal_point,
            scrape_timestamp_millis,
            exemplars.last(),
            dialect,
        )?;
    }
    Ok(())
}

fn write_histogram_buckets(
    buffer: &mut String,
    name: &str,
    labels: &telecore::LabelSet,
    buckets: &[BucketValue],
    scrape_timestamp_millis: Option<u64>,
    dialect: &Dialect,
) -> Result<(), Error> {
    for bucket in buckets {
        let rendered = render_labelset(labels, Some(("le", &format_value(bucket.upper_bound, false))));
        write_sample(
            buffer,
            name,
            Some("bucket"),
            &rendered,
            bucket.cumulative_count as f64,
            false,
            scrape_timestamp_millis,
            bucket.exemplar.as_ref(),
            dialect,
        )?;
    }
    Ok(())
}

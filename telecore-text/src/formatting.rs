//! Shared rendering helpers used by both exposition writers.

use telecore::LabelSet;

/// Renders a sample value per §4.9: shortest round-trippable decimal form, `+Inf`/`-Inf`/
/// `NaN` tokens, and an integer-valued double rendered without a trailing `.0` unless
/// `force_decimal_point` is set (OpenMetrics always wants the `.0`; Prometheus doesn't).
pub fn format_value(value: f64, force_decimal_point: bool) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() { "+Inf" } else { "-Inf" }.to_owned();
    }
    if value.fract() == 0.0 && value.abs() < 1e17 {
        if force_decimal_point {
            format!("{value:.1}")
        } else {
            format!("{}", value as i64)
        }
    } else {
        format!("{value}")
    }
}

/// Renders a millisecond timestamp as `seconds.milliseconds`, per the grammar's
/// `integer_seconds "." three_digits_ms`.
pub fn format_timestamp_millis(timestamp_millis: u64) -> String {
    format!("{}.{:03}", timestamp_millis / 1000, timestamp_millis % 1000)
}

/// Escapes a label value's `\`, `"`, and `\n` per §4.9.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a `# HELP` description's `\` and `\n` (but not `"`, which is unescaped there).
pub fn escape_help_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a label set as `{name="value",...}`, or an empty string if `labels` is empty
/// and there's no reserved label to append.
pub fn render_labelset(labels: &LabelSet, reserved: Option<(&str, &str)>) -> String {
    if labels.is_empty() && reserved.is_none() {
        return String::new();
    }
    let mut out = String::from("{");
    let mut first = true;
    for (name, value) in labels.iter() {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_label_value(value));
        out.push('"');
    }
    if let Some((name, value)) = reserved {
        if !first {
            out.push(',');
        }
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_label_value(value));
        out.push('"');
    }
    out.push('}');
    out
}

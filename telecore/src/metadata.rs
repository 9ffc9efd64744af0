//! Metric family metadata: name, help text, and unit, with build-time validation.

use crate::error::Error;

/// Suffixes a writer appends to a family name; reserving them at the family level prevents a
/// counter named `requests_total` or a histogram named `latency_bucket` from producing an
/// ambiguous series name once the writer's own suffix is appended.
const RESERVED_SUFFIXES: &[&str] =
    &["_total", "_created", "_bucket", "_count", "_sum", "_info", "_gcount", "_gsum"];

#[inline]
fn invalid_metric_name_start_character(c: char) -> bool {
    !(c.is_ascii_alphabetic() || c == '_' || c == ':')
}

#[inline]
fn invalid_metric_name_character(c: char) -> bool {
    !(c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Validates a metric family name against `[a-zA-Z_:][a-zA-Z0-9_:]*` and the reserved-suffix
/// rule. `unit`, when present, must match the requirement that the name end in `_<unit>`.
pub fn validate_metric_name(name: &str, unit: Option<&str>) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::InvalidName { name: name.to_owned(), reason: "metric name is empty" });
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if invalid_metric_name_start_character(first) {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "metric name must start with [a-zA-Z_:]",
        });
    }
    if chars.any(invalid_metric_name_character) {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "metric name must match [a-zA-Z_:][a-zA-Z0-9_:]*",
        });
    }
    if let Some(suffix) = RESERVED_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: suffix_reason(suffix),
        });
    }
    if let Some(unit) = unit {
        let expected_suffix = format!("_{unit}");
        if !name.ends_with(&expected_suffix) {
            return Err(Error::InvalidName {
                name: name.to_owned(),
                reason: "a metric name with a unit must end in `_<unit>`",
            });
        }
    }
    Ok(())
}

fn suffix_reason(suffix: &'static str) -> &'static str {
    match suffix {
        "_total" => "`_total` is a reserved suffix added by writers to counters",
        "_created" => "`_created` is a reserved suffix added by writers",
        "_bucket" => "`_bucket` is a reserved suffix added by writers to histograms",
        "_count" => "`_count` is a reserved suffix added by writers to summaries/histograms",
        "_sum" => "`_sum` is a reserved suffix added by writers to summaries/histograms",
        "_info" => "`_info` is a reserved suffix added by writers to info metrics",
        "_gcount" => "`_gcount` is a reserved suffix added by writers to gauge histograms",
        "_gsum" => "`_gsum` is a reserved suffix added by writers to gauge histograms",
        _ => "reserved suffix",
    }
}

/// Validated, immutable metadata for a metric family.
#[derive(Debug, Clone)]
pub struct Metadata {
    name: String,
    help: Option<String>,
    unit: Option<String>,
}

impl Metadata {
    /// Builds metadata, validating `name` against the unit invariant in one pass.
    pub fn new(
        name: impl Into<String>,
        help: Option<impl Into<String>>,
        unit: Option<impl Into<String>>,
    ) -> Result<Self, Error> {
        let name = name.into();
        let unit = unit.map(Into::into);
        validate_metric_name(&name, unit.as_deref())?;
        Ok(Self { name, help: help.map(Into::into), unit })
    }

    /// The family name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The optional help text.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The optional unit token.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reserved_suffixes() {
        assert!(Metadata::new::<_, &str, &str>("requests_total", None, None).is_err());
        assert!(Metadata::new::<_, &str, &str>("latency_bucket", None, None).is_err());
    }

    #[test]
    fn enforces_unit_suffix_invariant() {
        assert!(Metadata::new("service_time_seconds", Some("x"), Some("seconds")).is_ok());
        assert!(Metadata::new("service_time", Some("x"), Some("seconds")).is_err());
    }

    #[test]
    fn rejects_invalid_start_character() {
        assert!(Metadata::new::<_, &str, &str>("1abc", None, None).is_err());
    }
}

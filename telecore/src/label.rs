//! The label model: ordered, validated, immutable label tuples.
//!
//! Per the data model, a label set is an ordered sequence of `(name, value)` pairs sorted
//! ascending by name, with unique names. The label *names* of an instrument are fixed at
//! construction; lookups on the hot path are keyed only by the value tuple.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::Error;

#[inline]
fn invalid_label_name_start_character(c: char) -> bool {
    !(c.is_ascii_alphabetic() || c == '_')
}

#[inline]
fn invalid_label_name_character(c: char) -> bool {
    !(c.is_ascii_alphanumeric() || c == '_')
}

/// Validates a label name against `[a-zA-Z_][a-zA-Z0-9_]*`, rejecting the `__` reserved prefix.
///
/// Unlike the exposition writer's sanitizers (which repair a foreign string for rendering),
/// this is a build-time gate: an invalid name here is a programmer error, not data to coerce.
pub fn validate_label_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::InvalidName { name: name.to_owned(), reason: "label name is empty" });
    }
    if name.starts_with("__") {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "label names starting with `__` are reserved",
        });
    }
    let mut chars = name.chars();
    // SAFETY: emptiness was checked above.
    let first = chars.next().unwrap();
    if invalid_label_name_start_character(first) {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "label name must start with [a-zA-Z_]",
        });
    }
    if chars.any(invalid_label_name_character) {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "label name must match [a-zA-Z_][a-zA-Z0-9_]*",
        });
    }
    Ok(())
}

/// The fixed, ordered list of label names an instrument was built with.
///
/// Names are sorted ascending once at construction; [`LabelValues`] tuples handed to
/// `with_label_values` must line up positionally with this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelNames {
    names: Arc<[Box<str>]>,
}

impl LabelNames {
    /// Validates and sorts `names`, failing on invalid names or duplicates.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, Error> {
        let mut owned: Vec<Box<str>> =
            names.iter().map(|s| s.as_ref().to_owned().into_boxed_str()).collect();
        for name in &owned {
            validate_label_name(name)?;
        }
        owned.sort_unstable();
        for pair in owned.windows(2) {
            if pair[0] == pair[1] {
                return Err(Error::InvalidName {
                    name: pair[0].to_string(),
                    reason: "duplicate label name",
                });
            }
        }
        Ok(Self { names: owned.into() })
    }

    /// The number of label names (the arity every value tuple must match).
    pub fn arity(&self) -> usize {
        self.names.len()
    }

    /// Iterates the sorted label names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|b| b.as_ref())
    }

    /// Finds the position of `name` within the sorted list, if present.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_ref() == name)
    }
}

impl Default for LabelNames {
    fn default() -> Self {
        Self { names: Arc::from(Vec::new().into_boxed_slice()) }
    }
}

/// A concrete, hashed tuple of label values, positionally matching a [`LabelNames`].
///
/// This is the hot-path lookup key for an instrument's per-series map: cheap to hash and
/// compare, and cloned (not recomputed) once a series has been created for it.
#[derive(Debug, Clone)]
pub struct LabelValues {
    values: Arc<[Box<str>]>,
    hash: u64,
}

impl LabelValues {
    /// Builds a value tuple, failing if the arity doesn't match `names`.
    pub fn new<S: AsRef<str>>(names: &LabelNames, values: &[S]) -> Result<Self, Error> {
        if values.len() != names.arity() {
            return Err(Error::InvalidArgument(
                "label value count does not match the instrument's label arity",
            ));
        }
        let values: Arc<[Box<str>]> =
            values.iter().map(|s| s.as_ref().to_owned().into_boxed_str()).collect();
        let hash = Self::compute_hash(&values);
        Ok(Self { values, hash })
    }

    fn compute_hash(values: &[Box<str>]) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for v in values {
            v.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Zips this tuple's values back up with their names into a sorted label set.
    pub fn zip_with<'a>(&'a self, names: &'a LabelNames) -> impl Iterator<Item = (&'a str, &'a str)> {
        names.iter().zip(self.values.iter().map(|v| v.as_ref()))
    }

    /// Raw values in positional (sorted-name) order.
    pub fn values(&self) -> &[Box<str>] {
        &self.values
    }
}

impl PartialEq for LabelValues {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.values == other.values
    }
}
impl Eq for LabelValues {}

impl Hash for LabelValues {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// An immutable, rendering-ready `(name, value)` label set, sorted ascending by name.
///
/// Produced from a [`LabelNames`]/[`LabelValues`] pair (or directly, for constant/global
/// labels) when a snapshot is built; writers append their own reserved labels (`le`,
/// `quantile`, the state-label) after these in fixed position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSet {
    pairs: Arc<[(Box<str>, Box<str>)]>,
}

impl LabelSet {
    /// Builds a label set from already-sorted, unique `(name, value)` pairs.
    pub fn from_sorted_pairs(pairs: Vec<(Box<str>, Box<str>)>) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0), "label pairs must be sorted");
        Self { pairs: pairs.into() }
    }

    /// Builds a label set from a `LabelNames`/`LabelValues` pair.
    pub fn from_names_and_values(names: &LabelNames, values: &LabelValues) -> Self {
        let pairs: Vec<_> =
            values.zip_with(names).map(|(n, v)| (Box::from(n), Box::from(v))).collect();
        Self { pairs: pairs.into() }
    }

    /// Validates and sorts arbitrary pairs, rejecting duplicate names.
    pub fn new(mut pairs: Vec<(String, String)>) -> Result<Self, Error> {
        for (name, _) in &pairs {
            validate_label_name(name)?;
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in pairs.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::InvalidName {
                    name: pair[0].0.clone(),
                    reason: "duplicate label name",
                });
            }
        }
        let boxed = pairs.into_iter().map(|(n, v)| (n.into_boxed_str(), v.into_boxed_str())).collect();
        Ok(Self { pairs: boxed })
    }

    /// Whether this label set has no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates the pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_ref(), v.as_ref()))
    }

    /// Merges `self` with `other`, with `self`'s values winning on name collision.
    ///
    /// Used to overlay a series's own labels on top of a registry's global/constant labels.
    pub fn merge_over(&self, other: &LabelSet) -> LabelSet {
        let mut merged: Vec<(Box<str>, Box<str>)> =
            other.pairs.iter().filter(|(n, _)| self.position_of(n).is_none()).cloned().collect();
        merged.extend(self.pairs.iter().cloned());
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        LabelSet { pairs: merged.into() }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.pairs.iter().position(|(n, _)| n.as_ref() == name)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reserved_prefix() {
        assert!(validate_label_name("__reserved").is_err());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(validate_label_name("has.dot").is_err());
        assert!(validate_label_name("1leading").is_err());
    }

    #[test]
    fn accepts_valid_names() {
        assert!(validate_label_name("path").is_ok());
        assert!(validate_label_name("_internal").is_ok());
        assert!(validate_label_name("status_code2").is_ok());
    }

    #[test]
    fn label_names_sorts_and_dedupes_check() {
        let names = LabelNames::new(&["status", "path"]).unwrap();
        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["path", "status"]);

        let err = LabelNames::new(&["status", "status"]).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn label_values_arity_mismatch_fails() {
        let names = LabelNames::new(&["a", "b"]).unwrap();
        assert!(LabelValues::new(&names, &["only-one"]).is_err());
    }

    #[test]
    fn label_set_round_trips_sorted_order() {
        let set =
            LabelSet::new(vec![("b".into(), "2".into()), ("a".into(), "1".into())]).unwrap();
        let rendered: Vec<_> = set.iter().collect();
        assert_eq!(rendered, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn label_set_merge_over_prefers_self() {
        let globals = LabelSet::new(vec![("env".into(), "prod".into())]).unwrap();
        let own = LabelSet::new(vec![("env".into(), "staging".into()), ("path".into(), "/".into())])
            .unwrap();
        let merged = own.merge_over(&globals);
        assert_eq!(
            merged.iter().collect::<Vec<_>>(),
            vec![("env", "staging"), ("path", "/")]
        );
    }
}

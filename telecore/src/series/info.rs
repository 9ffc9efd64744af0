//! Info series: labels-only metadata, always exposed at value `1.0`.

/// A single info series. Carries no numeric state of its own — the interesting content
/// is its label set, stored by the owning instrument.
#[derive(Debug, Default)]
pub struct Info;

impl Info {
    /// The value an info series always reports.
    pub const VALUE: f64 = 1.0;
}

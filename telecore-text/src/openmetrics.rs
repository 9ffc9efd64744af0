//! The OpenMetrics text format writer.

use crate::engine::{render, Dialect};
use std::fmt::Write;
use telecore::snapshot::MetricSnapshot;
use telecore::Error;

const DIALECT: Dialect = Dialect {
    force_decimal_point: true,
    emit_unit_line: true,
    emit_created_line: true,
    emit_exemplars: true,
    emit_eof: true,
};

/// Renders `snapshots` as OpenMetrics text into `sink`, terminated with `# EOF\n`.
///
/// `snapshots` should come straight from [`telecore::Registry::scrape`]'s
/// `ScrapeResult::snapshots`, already sorted by family name.
pub fn write_openmetrics(snapshots: &[MetricSnapshot], sink: &mut impl Write) -> Result<(), Error> {
    render(snapshots, &DIALECT, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use telecore::instrument::CounterBuilder;
    use telecore::Registry;

    #[test]
    fn counter_renders_total_suffix_and_eof() {
        let registry = Registry::new();
        let counter = Arc::new(CounterBuilder::new("my_counter").build().unwrap());
        registry.register(counter.clone()).unwrap();
        counter.with_label_values::<&str>(&[]).unwrap().inc_by(1.1).unwrap();

        let scraped = registry.scrape(None);
        let mut out = String::new();
        write_openmetrics(&scraped.snapshots, &mut out).unwrap();

        assert!(out.contains("# TYPE my_counter counter\n"));
        assert!(out.contains("my_counter_total 1.1\n"));
        assert!(out.ends_with("# EOF\n"));
    }
}

//! The classic Prometheus text exposition format writer.
//!
//! Differences from OpenMetrics (§4.9): no `# UNIT`, no `_created` lines, no exemplars,
//! no trailing `# EOF`, and a narrower type vocabulary (`counter, gauge, summary,
//! histogram, untyped`) — families this writer has no vocabulary for (gauge-histogram,
//! info, stateset, unknown) render as `untyped`.

use crate::engine::{render, Dialect};
use std::fmt::Write;
use telecore::snapshot::MetricSnapshot;
use telecore::Error;

const DIALECT: Dialect = Dialect {
    force_decimal_point: false,
    emit_unit_line: false,
    emit_created_line: false,
    emit_exemplars: false,
    emit_eof: false,
};

/// Renders `snapshots` as classic Prometheus text into `sink`.
pub fn write_prometheus(snapshots: &[MetricSnapshot], sink: &mut impl Write) -> Result<(), Error> {
    render(snapshots, &DIALECT, sink)
}

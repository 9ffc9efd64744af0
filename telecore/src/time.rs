//! Wall-clock helpers shared by every instrument kind.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the epoch, used to stamp series creation and exemplars.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

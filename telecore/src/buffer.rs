//! The observation-buffer protocol that keeps a snapshot's view of a series linearizable
//! without ever blocking a concurrent observer.
//!
//! While a snapshot walks a series's storage, observers cannot be allowed to mutate it
//! out from under the walk, but they also cannot be made to block: the snapshotter instead
//! atomically switches the series into "buffering" mode, reads the now-stable storage,
//! then drains whatever observers queued during the read by replaying it into storage.

use crate::bucket::AtomicBucket;
use std::sync::atomic::{AtomicBool, Ordering};

/// Queues observations made while a snapshot is in flight, replaying them once the
/// snapshot is done reading.
///
/// `T` is whatever a series needs to replay an observation later: a bare value for a
/// counter/gauge, or a `(value, Option<ExemplarLabels>)` pair for a histogram bucket.
#[derive(Debug)]
pub struct ObservationBuffer<T> {
    buffering: AtomicBool,
    queued: AtomicBucket<T>,
}

impl<T> ObservationBuffer<T> {
    /// Creates a buffer in direct-write mode.
    pub fn new() -> Self {
        Self { buffering: AtomicBool::new(false), queued: AtomicBucket::new() }
    }

    /// Routes an observation: applied immediately via `direct` outside a snapshot window,
    /// or queued for later replay while one is in flight.
    pub fn observe<F: FnOnce(T)>(&self, value: T, direct: F) {
        if self.buffering.load(Ordering::Acquire) {
            self.queued.push(value);
        } else {
            direct(value);
        }
    }

    /// Switches the series into buffering mode. Call before reading storage for a snapshot.
    pub fn begin_buffering(&self) {
        self.buffering.store(true, Ordering::SeqCst);
    }

    /// Replays every observation queued since [`begin_buffering`](Self::begin_buffering)
    /// into storage via `replay`, then switches back to direct-write mode.
    pub fn end_buffering<F: FnMut(T)>(&self, mut replay: F)
    where
        T: Clone,
    {
        self.queued.clear_with(|block| {
            for value in block {
                replay(value.clone());
            }
        });
        self.buffering.store(false, Ordering::SeqCst);
    }

    /// Whether the buffer is currently in buffering mode (exposed for tests).
    pub fn is_buffering(&self) -> bool {
        self.buffering.load(Ordering::Acquire)
    }
}

impl<T> Default for ObservationBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

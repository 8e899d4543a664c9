use std::sync::atomic::{AtomicU64, Ordering};

use crate::ring::PublishOutcome;

#[derive(Default)]
pub(crate) struct RingMetrics {
    published: AtomicU64,
    dropped: AtomicU64,
    closed: AtomicU64,
    claimed: AtomicU64,
}

impl RingMetrics {
    pub(crate) fn record(&self, outcome: PublishOutcome) {
        let counter = match outcome {
            PublishOutcome::Accepted => &self.published,
            PublishOutcome::Dropped => &self.dropped,
            PublishOutcome::Closed => &self.closed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_claim(&self) {
        self.claimed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RingMetricsSnapshot {
        RingMetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            claimed: self.claimed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the ring counters.
///
/// The blank frame seeded at construction is not counted as published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RingMetricsSnapshot {
    /// Frames accepted by [`Publisher::try_publish`](crate::Publisher::try_publish).
    pub published: u64,
    /// Frames dropped because the ring was full.
    pub dropped: u64,
    /// Publish attempts made after the consumer went away.
    pub closed: u64,
    /// Slots handed to the consumer, including the blank frame.
    pub claimed: u64,
}

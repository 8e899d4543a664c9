//! Bounded frame ring shared between the ingest and transmit threads.
//!
//! The ring decouples an unpredictable producer from a fixed-rate consumer:
//! * [`Publisher`] – non-blocking producer view; a full ring drops the frame.
//! * [`Claimer`] – blocking consumer view; an empty ring parks the caller.
//! * [`Claimed`] – read guard over the slot most recently handed to the consumer.
//! * [`RingError`] – capacity validation and closed-peer reporting.
//!
//! Slots are allocated once at construction and addressed by index. Indices
//! circulate through two bounded queues, one for free slots and one for ready
//! slots, so the hot path never allocates.

mod error;
mod metrics;
mod ring;

pub use error::{RingError, RingResult};
pub use metrics::RingMetricsSnapshot;
pub use ring::{frame_ring, Claimed, Claimer, PublishOutcome, Publisher, RingConfig, BLANK_SLOT};

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use parking_lot::{Mutex, MutexGuard};

use crate::error::{RingError, RingResult};
use crate::metrics::{RingMetrics, RingMetricsSnapshot};

/// Slot published at construction so the first claim clears the display.
pub const BLANK_SLOT: usize = 0;

/// Shape of a frame ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingConfig {
    /// Number of frames that may be pending between producer and consumer.
    pub capacity: usize,
}

impl RingConfig {
    /// Slot count used by the reference installation.
    pub const REFERENCE_CAPACITY: usize = 32;
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: Self::REFERENCE_CAPACITY,
        }
    }
}

/// Result of offering a frame to the ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The frame was written into a slot and queued for the consumer.
    Accepted,
    /// The ring was full; the frame was discarded without blocking.
    Dropped,
    /// The consumer is gone; nothing will read the frame.
    Closed,
}

struct Shared<T> {
    slots: Box<[Mutex<T>]>,
    metrics: RingMetrics,
}

/// Creates a ring with `config.capacity` pending slots.
///
/// `make_slot` is called once per slot index to pre-allocate storage. The slot
/// at [`BLANK_SLOT`] is queued immediately, so the first claim returns it
/// untouched; callers pass a factory producing zeroed frames to get a blank
/// first transmission.
pub fn frame_ring<T, F>(
    config: RingConfig,
    mut make_slot: F,
) -> RingResult<(Publisher<T>, Claimer<T>)>
where
    T: Send,
    F: FnMut(usize) -> T,
{
    if config.capacity == 0 {
        return Err(RingError::InvalidCapacity {
            requested: 0,
            minimum: 1,
        });
    }

    // One slot beyond capacity backs the frame the consumer is reading.
    let slot_count = config.capacity + 1;
    let slots: Box<[Mutex<T>]> = (0..slot_count).map(|idx| Mutex::new(make_slot(idx))).collect();
    let shared = Arc::new(Shared {
        slots,
        metrics: RingMetrics::default(),
    });

    let (free_tx, free_rx) = bounded(slot_count);
    let (ready_tx, ready_rx) = bounded(config.capacity);

    seed(&ready_tx, BLANK_SLOT)?;
    for idx in (0..slot_count).filter(|&idx| idx != BLANK_SLOT) {
        seed(&free_tx, idx)?;
    }

    let publisher = Publisher {
        shared: Arc::clone(&shared),
        free_rx,
        free_tx: free_tx.clone(),
        ready_tx,
        capacity: config.capacity,
    };
    let claimer = Claimer {
        shared,
        ready_rx,
        free_tx,
        held: None,
    };
    Ok((publisher, claimer))
}

fn seed(tx: &Sender<usize>, idx: usize) -> RingResult<()> {
    tx.try_send(idx).map_err(|_| RingError::InvalidCapacity {
        requested: idx,
        minimum: 1,
    })
}

/// Producer half of the ring. Never blocks.
pub struct Publisher<T> {
    shared: Arc<Shared<T>>,
    free_rx: Receiver<usize>,
    free_tx: Sender<usize>,
    ready_tx: Sender<usize>,
    capacity: usize,
}

impl<T> Publisher<T> {
    /// Fills a free slot via `fill` and queues it for the consumer.
    ///
    /// When the ring already holds `capacity` pending frames the closure is not
    /// called and the frame is dropped.
    pub fn try_publish(&mut self, fill: impl FnOnce(&mut T)) -> PublishOutcome {
        let outcome = self.publish_inner(fill);
        self.shared.metrics.record(outcome);
        match outcome {
            PublishOutcome::Accepted => {}
            PublishOutcome::Dropped => {
                log::trace!("frame ring full ({} pending), dropping frame", self.pending());
            }
            PublishOutcome::Closed => log::debug!("frame ring consumer gone, frame discarded"),
        }
        outcome
    }

    fn publish_inner(&mut self, fill: impl FnOnce(&mut T)) -> PublishOutcome {
        if self.ready_tx.is_full() {
            return PublishOutcome::Dropped;
        }

        let idx = match self.free_rx.try_recv() {
            Ok(idx) => idx,
            Err(TryRecvError::Empty) => return PublishOutcome::Dropped,
            Err(TryRecvError::Disconnected) => return PublishOutcome::Closed,
        };

        {
            let mut slot = self.shared.slots[idx].lock();
            fill(&mut *slot);
        }

        match self.ready_tx.try_send(idx) {
            Ok(()) => PublishOutcome::Accepted,
            Err(TrySendError::Full(idx)) => {
                // The free queue is sized for every slot, so handing one back cannot fail.
                let _ = self.free_tx.try_send(idx);
                PublishOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => PublishOutcome::Closed,
        }
    }

    /// Number of frames waiting for the consumer.
    pub fn pending(&self) -> usize {
        self.ready_tx.len()
    }

    /// Maximum number of pending frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn metrics(&self) -> RingMetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

/// Consumer half of the ring.
///
/// The slot returned by the latest claim stays reserved for the consumer until
/// the next claim, so the producer can never overwrite a frame being read.
pub struct Claimer<T> {
    shared: Arc<Shared<T>>,
    ready_rx: Receiver<usize>,
    free_tx: Sender<usize>,
    held: Option<usize>,
}

impl<T> Claimer<T> {
    /// Blocks until a frame is pending and returns it.
    ///
    /// Returns [`RingError::Closed`] once the publisher is dropped and every
    /// pending frame has been claimed.
    pub fn claim_next(&mut self) -> RingResult<Claimed<'_, T>> {
        self.release_held();
        let idx = self.ready_rx.recv().map_err(|_| RingError::Closed)?;
        Ok(self.hold(idx))
    }

    /// Returns the next pending frame without blocking.
    pub fn try_claim(&mut self) -> RingResult<Option<Claimed<'_, T>>> {
        self.release_held();
        match self.ready_rx.try_recv() {
            Ok(idx) => Ok(Some(self.hold(idx))),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RingError::Closed),
        }
    }

    /// Like [`Claimer::claim_next`] but gives up after `timeout`.
    pub fn claim_timeout(&mut self, timeout: Duration) -> RingResult<Option<Claimed<'_, T>>> {
        self.release_held();
        match self.ready_rx.recv_timeout(timeout) {
            Ok(idx) => Ok(Some(self.hold(idx))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(RingError::Closed),
        }
    }

    /// Number of frames waiting to be claimed.
    pub fn pending(&self) -> usize {
        self.ready_rx.len()
    }

    pub fn metrics(&self) -> RingMetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn release_held(&mut self) {
        if let Some(idx) = self.held.take() {
            // A disconnected producer no longer needs the slot back.
            let _ = self.free_tx.try_send(idx);
        }
    }

    fn hold(&mut self, idx: usize) -> Claimed<'_, T> {
        self.held = Some(idx);
        self.shared.metrics.record_claim();
        Claimed {
            index: idx,
            guard: self.shared.slots[idx].lock(),
        }
    }
}

/// Read access to a claimed slot.
pub struct Claimed<'a, T> {
    index: usize,
    guard: MutexGuard<'a, T>,
}

impl<T> Claimed<'_, T> {
    /// Slot index the frame was read from.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Deref for Claimed<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

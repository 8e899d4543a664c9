use thiserror::Error;

/// Convenience result alias for fallible ring operations.
pub type RingResult<T, E = RingError> = Result<T, E>;

/// Errors surfaced by the frame ring.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Requested ring capacity is below the minimum.
    #[error("ring capacity {requested} must be at least {minimum}")]
    InvalidCapacity { requested: usize, minimum: usize },

    /// The opposite end of the ring was dropped and no frames remain.
    #[error("frame ring closed")]
    Closed,
}

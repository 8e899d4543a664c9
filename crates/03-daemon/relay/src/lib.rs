//! LED frame relay daemon core.
//!
//! Raw RGB frames arrive over UDP at whatever rate the content source likes.
//! The ingest thread remaps each one into wiring order and offers it to a
//! bounded [`frame_ring`](frame_ring::frame_ring); the transmit thread claims
//! frames at a fixed rate, encodes every segment and sends one datagram per
//! controller.
//!
//! [`RelayContext`] owns the sockets and the validated configuration;
//! [`RelayContext::spawn`] starts both threads and returns a [`RelayHandle`].

mod config;
mod context;
mod error;
mod ingest;
mod stats;
mod transmit;

pub use config::{ConfigError, RelayConfig};
pub use frame_ring::RingConfig;
pub use context::{RelayContext, RelayExit, RelayHandle};
pub use error::{RelayError, RelayResult};
pub use ingest::{IngestReceiver, MAX_DATAGRAM_LEN};
pub use stats::{RelayStats, RelayStatsSnapshot};
pub use transmit::{FrameSender, Pacer, Transmitter};

/// Why one of the relay threads stopped.
#[derive(Debug)]
pub enum ExitReason {
    /// The content source sent an empty datagram.
    EmptyDatagram,
    /// The other end of the frame ring went away.
    RingClosed,
    /// Receiving from the ingest socket failed.
    ReceiveFailed(std::io::Error),
}

impl ExitReason {
    /// True for shutdowns that were asked for rather than caused by a fault.
    pub fn is_clean(&self) -> bool {
        !matches!(self, ExitReason::ReceiveFailed(_))
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::EmptyDatagram => f.write_str("empty datagram received"),
            ExitReason::RingClosed => f.write_str("frame ring closed"),
            ExitReason::ReceiveFailed(err) => write!(f, "receive failed: {err}"),
        }
    }
}

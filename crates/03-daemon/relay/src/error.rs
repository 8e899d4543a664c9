use std::io;
use std::net::SocketAddr;

use frame_ring::RingError;
use thiserror::Error;

use crate::config::ConfigError;

pub type RelayResult<T, E = RelayError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid relay configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {role} socket on {addr}: {source}")]
    Bind {
        role: &'static str,
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to configure {role} socket: {source}")]
    Socket {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Ring(#[from] RingError),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{name} thread panicked")]
    ThreadPanicked { name: &'static str },
}

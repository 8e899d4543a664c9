use thiserror::Error;

pub type CodecResult<T, E = CodecError> = Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("chunk limit {max_chunk_len} is below the {minimum}-byte minimum")]
    ChunkTooSmall { max_chunk_len: usize, minimum: usize },

    #[error("{port_bytes} bytes per port exceeds the {max}-channel port window")]
    PortTooWide { port_bytes: usize, max: usize },

    #[error("ports must be between 1 and {max}, got {ports}")]
    PortCount { ports: usize, max: usize },

    #[error("ports must carry at least one byte")]
    EmptyPort,

    #[error("segment is {actual} bytes, encoder expects {expected}")]
    SegmentLength { expected: usize, actual: usize },

    #[error("chunk at byte {at} has tag {found:02x?}, expected YTKJ")]
    BadTag { at: usize, found: [u8; 4] },

    #[error("datagram ends at byte {available} while reading {what} needing {needed} bytes at {at}")]
    Truncated {
        what: &'static str,
        at: usize,
        needed: usize,
        available: usize,
    },

    #[error("descriptor at channel {offset} with {len} bytes runs past the last port")]
    ChannelOverflow { offset: usize, len: usize },
}

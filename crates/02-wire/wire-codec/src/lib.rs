//! YTKJ LED controller wire format.
//!
//! A datagram is one or more chunks. Each chunk is a 10-byte header followed
//! by descriptors of `(u16 LE channel offset, u16 LE byte count, bytes)`;
//! chunks after the first are preceded by 8 zero bytes. Every controller port
//! owns a 2048-channel window, so offsets jump to the next multiple of 2048
//! whenever a port's data is complete.
//!
//! * [`PacketEncoder`] – segment buffer to datagram, split at a chunk limit.
//! * [`decode_datagram`] – datagram back to borrowed chunks and descriptors.
//! * [`ChannelImage`] – descriptors folded into per-port channel memory.

mod decoder;
mod encoder;
mod error;

pub use decoder::{decode_datagram, reassemble, ChannelImage, Chunk, Descriptor};
pub use encoder::{EncoderConfig, PacketEncoder};
pub use error::{CodecError, CodecResult};

/// Magic bytes opening every chunk header.
pub const TAG: [u8; 4] = *b"YTKJ";
/// Constant header bytes following the reserved zero; meaning unknown.
pub const HEADER_MAGIC: [u8; 2] = [0x57, 0x05];
/// Bytes in a chunk header.
pub const HEADER_LEN: usize = 10;
/// Position of the descriptor counter inside the header.
pub const COUNTER_INDEX: usize = 8;
/// Zero bytes placed between consecutive chunks.
pub const PAD_LEN: usize = 8;
/// Channel offset plus byte count.
pub const DESCRIPTOR_HEADER_LEN: usize = 4;
/// Channel window owned by each controller port.
pub const PORT_CHANNELS: usize = 2048;
/// Ports addressable by one controller.
pub const MAX_PORTS: usize = 8;
/// Largest chunk that fits an Ethernet frame as a UDP payload.
pub const REFERENCE_MTU: usize = 1472;
/// A chunk must fit its header, one descriptor header and one data byte.
pub const MIN_CHUNK_LEN: usize = HEADER_LEN + DESCRIPTOR_HEADER_LEN + 1;

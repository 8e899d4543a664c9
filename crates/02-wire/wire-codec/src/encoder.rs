use bytes::{BufMut, BytesMut};

use crate::error::{CodecError, CodecResult};
use crate::{
    COUNTER_INDEX, DESCRIPTOR_HEADER_LEN, HEADER_LEN, HEADER_MAGIC, MAX_PORTS, MIN_CHUNK_LEN,
    PAD_LEN, PORT_CHANNELS, REFERENCE_MTU, TAG,
};

/// Shape of the segments fed to a [`PacketEncoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Upper bound on one chunk, header included.
    pub max_chunk_len: usize,
    /// LED bytes sent to each port.
    pub port_bytes: usize,
    /// Ports filled from each segment.
    pub ports_in_use: usize,
}

impl EncoderConfig {
    /// 8 ports of 4 × 57 RGB pixels in 1472-byte chunks.
    pub const REFERENCE: EncoderConfig = EncoderConfig {
        max_chunk_len: REFERENCE_MTU,
        port_bytes: 57 * 4 * 3,
        ports_in_use: 8,
    };

    /// LED bytes in one segment.
    pub const fn segment_len(&self) -> usize {
        self.port_bytes * self.ports_in_use
    }

    pub fn validate(&self) -> CodecResult<()> {
        if self.max_chunk_len < MIN_CHUNK_LEN {
            return Err(CodecError::ChunkTooSmall {
                max_chunk_len: self.max_chunk_len,
                minimum: MIN_CHUNK_LEN,
            });
        }
        if self.port_bytes == 0 {
            return Err(CodecError::EmptyPort);
        }
        if self.port_bytes > PORT_CHANNELS {
            return Err(CodecError::PortTooWide {
                port_bytes: self.port_bytes,
                max: PORT_CHANNELS,
            });
        }
        if self.ports_in_use == 0 || self.ports_in_use > MAX_PORTS {
            return Err(CodecError::PortCount {
                ports: self.ports_in_use,
                max: MAX_PORTS,
            });
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Serialises segment buffers into controller datagrams.
///
/// The output buffer is kept between calls; once it has grown to fit one
/// datagram, encoding does not allocate.
#[derive(Debug)]
pub struct PacketEncoder {
    config: EncoderConfig,
    buf: BytesMut,
}

impl PacketEncoder {
    pub fn new(config: EncoderConfig) -> CodecResult<Self> {
        config.validate()?;
        let chunks = config.segment_len().div_ceil(config.max_chunk_len - HEADER_LEN) + 1;
        Ok(Self {
            config,
            buf: BytesMut::with_capacity(chunks * (config.max_chunk_len + PAD_LEN)),
        })
    }

    pub fn config(&self) -> EncoderConfig {
        self.config
    }

    /// Encodes `segment` for controller `controller_id`.
    ///
    /// The returned slice is the whole datagram and stays valid until the next
    /// call.
    pub fn encode(&mut self, segment: &[u8], controller_id: u8) -> CodecResult<&[u8]> {
        let total = self.config.segment_len();
        if segment.len() != total {
            return Err(CodecError::SegmentLength {
                expected: total,
                actual: segment.len(),
            });
        }

        let port_bytes = self.config.port_bytes;
        let buf = &mut self.buf;
        buf.clear();

        let mut channel_offset = 0usize;
        let mut carry = 0usize;
        let mut emitted = 0usize;

        while emitted < total {
            if !buf.is_empty() {
                buf.put_bytes(0, PAD_LEN);
            }
            let header_at = buf.len();
            put_header(buf, controller_id);
            let mut counter = 0u8;
            let mut room = self.config.max_chunk_len - HEADER_LEN;

            while emitted < total && room >= DESCRIPTOR_HEADER_LEN + 1 {
                let want = if carry > 0 { carry } else { port_bytes };
                buf.put_u16_le(channel_offset as u16);
                room -= 2;

                let len = if want + 2 > room {
                    let len = room - 2;
                    carry = want - len;
                    channel_offset += len;
                    len
                } else {
                    carry = 0;
                    channel_offset = (channel_offset & !(PORT_CHANNELS - 1)) + PORT_CHANNELS;
                    want
                };

                buf.put_u16_le(len as u16);
                buf.put_slice(&segment[emitted..emitted + len]);
                room -= 2 + len;
                emitted += len;

                counter = counter.wrapping_add(1);
                buf[header_at + COUNTER_INDEX] = counter;
            }
        }

        Ok(&self.buf[..])
    }
}

fn put_header(buf: &mut BytesMut, controller_id: u8) {
    buf.put_slice(&TAG);
    buf.put_u8(controller_id);
    buf.put_u8(0);
    buf.put_slice(&HEADER_MAGIC);
    // descriptor counter, patched as descriptors are written
    buf.put_u8(0);
    buf.put_u8(0);
}

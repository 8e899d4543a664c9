use smallvec::SmallVec;

use crate::error::{CodecError, CodecResult};
use crate::{
    COUNTER_INDEX, DESCRIPTOR_HEADER_LEN, HEADER_LEN, MAX_PORTS, PAD_LEN, PORT_CHANNELS, TAG,
};

/// One `(channel offset, bytes)` run borrowed from a datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor<'a> {
    pub channel_offset: u16,
    pub data: &'a [u8],
}

impl Descriptor<'_> {
    /// Port whose channel window the run starts in.
    pub fn port(&self) -> usize {
        usize::from(self.channel_offset) / PORT_CHANNELS
    }
}

/// One chunk of a datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub controller_id: u8,
    /// Raw header, for inspecting the bytes the decoder does not interpret.
    pub header: [u8; HEADER_LEN],
    pub descriptors: SmallVec<[Descriptor<'a>; 4]>,
    /// Bytes from the start of the header to the end of the last descriptor.
    pub wire_len: usize,
}

/// Splits a datagram into chunks.
///
/// Chunk boundaries come from the descriptor counter in each header; the
/// eight pad bytes between chunks are skipped without inspection.
pub fn decode_datagram(datagram: &[u8]) -> CodecResult<Vec<Chunk<'_>>> {
    let mut chunks = Vec::new();
    let mut at = 0usize;

    while at < datagram.len() {
        if !chunks.is_empty() {
            take(datagram, at, PAD_LEN, "chunk pad")?;
            at += PAD_LEN;
        }
        let chunk = decode_chunk(datagram, at)?;
        at += chunk.wire_len;
        chunks.push(chunk);
    }
    Ok(chunks)
}

fn decode_chunk(datagram: &[u8], start: usize) -> CodecResult<Chunk<'_>> {
    let raw = take(datagram, start, HEADER_LEN, "chunk header")?;
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(raw);
    if header[..4] != TAG {
        return Err(CodecError::BadTag {
            at: start,
            found: [header[0], header[1], header[2], header[3]],
        });
    }

    let mut at = start + HEADER_LEN;
    let mut descriptors = SmallVec::new();
    for _ in 0..header[COUNTER_INDEX] {
        let fields = take(datagram, at, DESCRIPTOR_HEADER_LEN, "descriptor header")?;
        let channel_offset = u16::from_le_bytes([fields[0], fields[1]]);
        let len = usize::from(u16::from_le_bytes([fields[2], fields[3]]));
        at += DESCRIPTOR_HEADER_LEN;

        let data = take(datagram, at, len, "descriptor data")?;
        at += len;
        descriptors.push(Descriptor {
            channel_offset,
            data,
        });
    }

    Ok(Chunk {
        controller_id: header[4],
        header,
        descriptors,
        wire_len: at - start,
    })
}

fn take<'a>(
    datagram: &'a [u8],
    at: usize,
    needed: usize,
    what: &'static str,
) -> CodecResult<&'a [u8]> {
    datagram
        .get(at..at + needed)
        .ok_or(CodecError::Truncated {
            what,
            at,
            needed,
            available: datagram.len(),
        })
}

/// Concatenates the LED bytes of every descriptor in order.
pub fn reassemble(chunks: &[Chunk<'_>]) -> Vec<u8> {
    chunks
        .iter()
        .flat_map(|chunk| chunk.descriptors.iter())
        .flat_map(|descriptor| descriptor.data.iter().copied())
        .collect()
}

/// Controller channel memory rebuilt from descriptors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelImage {
    channels: Vec<u8>,
    written: [usize; MAX_PORTS],
}

impl Default for ChannelImage {
    fn default() -> Self {
        Self {
            channels: vec![0; PORT_CHANNELS * MAX_PORTS],
            written: [0; MAX_PORTS],
        }
    }
}

impl ChannelImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an image from every descriptor of `chunks`.
    pub fn from_chunks(chunks: &[Chunk<'_>]) -> CodecResult<Self> {
        let mut image = Self::new();
        for descriptor in chunks.iter().flat_map(|chunk| chunk.descriptors.iter()) {
            image.apply(descriptor)?;
        }
        Ok(image)
    }

    /// Writes one descriptor's bytes at its channel offset.
    pub fn apply(&mut self, descriptor: &Descriptor<'_>) -> CodecResult<()> {
        let offset = usize::from(descriptor.channel_offset);
        let len = descriptor.data.len();
        let target = self
            .channels
            .get_mut(offset..offset + len)
            .ok_or(CodecError::ChannelOverflow { offset, len })?;
        target.copy_from_slice(descriptor.data);
        if let Some(written) = self.written.get_mut(descriptor.port()) {
            *written += len;
        }
        Ok(())
    }

    /// The 2048-channel window of `port`.
    pub fn port(&self, port: usize) -> Option<&[u8]> {
        let start = port.checked_mul(PORT_CHANNELS)?;
        self.channels.get(start..start + PORT_CHANNELS)
    }

    /// Bytes written into each port's window so far.
    pub fn bytes_per_port(&self) -> [usize; MAX_PORTS] {
        self.written
    }
}

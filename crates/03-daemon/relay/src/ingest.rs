use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;

use frame_ring::{PublishOutcome, Publisher};
use pixel_frame::pattern::write_coordinate_pattern;
use pixel_frame::RawFrame;
use strip_map::{FrameMapper, MappedFrame};

use crate::stats::RelayStats;
use crate::ExitReason;

/// Largest payload a UDP datagram over IPv4 can carry.
pub const MAX_DATAGRAM_LEN: usize = 65_507;

/// Producer side of the relay: socket in, remapped frames out.
pub struct IngestReceiver {
    socket: UdpSocket,
    raw: RawFrame,
    mapper: FrameMapper,
    publisher: Publisher<MappedFrame>,
    stats: Arc<RelayStats>,
    scratch: Vec<u8>,
}

impl IngestReceiver {
    pub fn new(
        socket: UdpSocket,
        mapper: FrameMapper,
        publisher: Publisher<MappedFrame>,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            socket,
            raw: RawFrame::new(mapper.grid()),
            mapper,
            publisher,
            stats,
            scratch: vec![0; MAX_DATAGRAM_LEN],
        }
    }

    /// Copies one datagram payload into the raw frame and offers the remapped
    /// result to the ring.
    ///
    /// Short payloads leave the rest of the previous frame in place; long ones
    /// are cut at the frame size.
    pub fn handle_datagram(&mut self, payload: &[u8]) -> PublishOutcome {
        let frame_len = self.raw.as_bytes().len();
        self.stats.record_datagram(payload.len(), frame_len);
        if payload.len() < frame_len {
            tracing::debug!("short datagram: {} of {} bytes", payload.len(), frame_len);
        } else if payload.len() > frame_len {
            tracing::trace!(
                "oversized datagram: {} bytes, keeping {}",
                payload.len(),
                frame_len
            );
        }
        self.raw.overwrite(payload);
        self.publish_raw()
    }

    /// Publishes the coordinate test pattern as if a source had sent it.
    pub fn publish_test_pattern(&mut self) -> PublishOutcome {
        write_coordinate_pattern(&mut self.raw);
        self.publish_raw()
    }

    fn publish_raw(&mut self) -> PublishOutcome {
        let Self {
            raw,
            mapper,
            publisher,
            stats,
            ..
        } = self;
        let outcome = publisher.try_publish(|slot| {
            if let Err(err) = mapper.remap_into(raw, slot) {
                tracing::error!("remap failed: {err}");
            }
        });
        match outcome {
            PublishOutcome::Accepted => stats.record_published(),
            PublishOutcome::Dropped => {
                stats.record_dropped();
                tracing::trace!("frame ring full, frame dropped");
            }
            PublishOutcome::Closed => {}
        }
        outcome
    }

    /// Receives until the source sends an empty datagram, the socket fails or
    /// the transmitter goes away.
    pub fn run(mut self) -> ExitReason {
        match self.socket.local_addr() {
            Ok(addr) => tracing::info!("ingest listening on {addr}"),
            Err(err) => tracing::warn!("ingest socket has no local address: {err}"),
        }

        loop {
            let len = match self.socket.recv_from(&mut self.scratch) {
                Ok((0, from)) => {
                    tracing::info!("empty datagram from {from}, stopping ingest");
                    return ExitReason::EmptyDatagram;
                }
                Ok((len, _)) => len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::error!("ingest receive failed: {err}");
                    return ExitReason::ReceiveFailed(err);
                }
            };

            let payload = std::mem::take(&mut self.scratch);
            let outcome = self.handle_datagram(&payload[..len]);
            self.scratch = payload;

            if outcome == PublishOutcome::Closed {
                tracing::info!("transmitter gone, stopping ingest");
                return ExitReason::RingClosed;
            }
        }
    }
}

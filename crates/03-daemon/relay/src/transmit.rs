use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use frame_ring::Claimer;
use strip_map::MappedFrame;
use wire_codec::PacketEncoder;

use crate::stats::RelayStats;
use crate::ExitReason;

/// Spaces sends a fixed period apart without catching up after overruns.
///
/// The period runs from one send to the next, so time spent idle waiting for
/// a frame never shortens the gap before the following one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacer {
    period: Duration,
    last_send: Option<Instant>,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_send: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left in the period that began at `started`, or `None` once it has
    /// run out.
    pub fn remaining(&self, started: Instant, now: Instant) -> Option<Duration> {
        self.period
            .checked_sub(now.saturating_duration_since(started))
            .filter(|left| !left.is_zero())
    }

    /// Time until the next send may go out, or `None` if it may go now.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.last_send.and_then(|last| self.remaining(last, now))
    }

    /// Sleeps until a period has passed since the previous send, then marks
    /// the current instant as the new send time.
    pub fn wait_turn(&mut self) {
        if let Some(left) = self.until_next(Instant::now()) {
            thread::sleep(left);
        }
        self.last_send = Some(Instant::now());
    }
}

/// Encodes frames and sends one datagram per segment.
pub struct FrameSender {
    socket: UdpSocket,
    dest: SocketAddr,
    encoder: PacketEncoder,
    stats: Arc<RelayStats>,
}

impl FrameSender {
    pub fn new(
        socket: UdpSocket,
        dest: SocketAddr,
        encoder: PacketEncoder,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            socket,
            dest,
            encoder,
            stats,
        }
    }

    /// Sends every segment of `frame`. Failures are logged and counted; the
    /// frame is lost for that controller only.
    pub fn send(&mut self, frame: &MappedFrame) {
        for segment in frame.segments() {
            let ok = match self.encoder.encode(&segment.bytes, segment.controller_id) {
                Ok(datagram) => match self.socket.send_to(datagram, self.dest) {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::warn!(
                            "send to {} for controller {} failed: {err}",
                            self.dest,
                            segment.controller_id
                        );
                        false
                    }
                },
                Err(err) => {
                    tracing::warn!(
                        "encode for controller {} failed: {err}",
                        segment.controller_id
                    );
                    false
                }
            };
            self.stats.record_packet(ok);
        }
        self.stats.record_frame_sent();
    }
}

/// Consumer side of the relay: fixed-rate claim, encode, send.
pub struct Transmitter {
    claimer: Claimer<MappedFrame>,
    sender: FrameSender,
    pacer: Pacer,
    stats: Arc<RelayStats>,
    summary_every: u64,
}

impl Transmitter {
    pub fn new(claimer: Claimer<MappedFrame>, sender: FrameSender, pacer: Pacer) -> Self {
        let stats = Arc::clone(&sender.stats);
        // roughly every ten seconds
        let per_second = Duration::from_secs(1).as_nanos() / pacer.period().as_nanos().max(1);
        let summary_every = (per_second as u64).max(1) * 10;
        Self {
            claimer,
            sender,
            pacer,
            stats,
            summary_every,
        }
    }

    /// Runs until the ingest side drops its end of the ring and every pending
    /// frame has been sent.
    pub fn run(mut self) -> ExitReason {
        tracing::info!(
            "transmitting to {} every {:?}",
            self.sender.dest,
            self.pacer.period()
        );
        let mut frames = 0u64;
        loop {
            match self.claimer.claim_next() {
                Ok(frame) => {
                    self.pacer.wait_turn();
                    self.sender.send(&frame);
                }
                Err(err) => {
                    tracing::info!("stopping transmitter: {err}");
                    return ExitReason::RingClosed;
                }
            }

            frames += 1;
            if frames % self.summary_every == 0 {
                tracing::debug!("relay stats: {}", self.stats.snapshot());
            }
        }
    }
}

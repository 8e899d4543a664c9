use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the ingest and transmit threads.
#[derive(Debug, Default)]
pub struct RelayStats {
    datagrams_received: AtomicU64,
    short_datagrams: AtomicU64,
    oversized_datagrams: AtomicU64,
    frames_published: AtomicU64,
    frames_dropped: AtomicU64,
    frames_sent: AtomicU64,
    packets_sent: AtomicU64,
    send_errors: AtomicU64,
}

impl RelayStats {
    pub(crate) fn record_datagram(&self, len: usize, frame_len: usize) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        if len < frame_len {
            self.short_datagrams.fetch_add(1, Ordering::Relaxed);
        } else if len > frame_len {
            self.oversized_datagrams.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_published(&self) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_packet(&self, ok: bool) {
        let counter = if ok { &self.packets_sent } else { &self.send_errors };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            short_datagrams: self.short_datagrams.load(Ordering::Relaxed),
            oversized_datagrams: self.oversized_datagrams.load(Ordering::Relaxed),
            frames_published: self.frames_published.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RelayStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStatsSnapshot {
    /// Non-empty datagrams read from the ingest socket.
    pub datagrams_received: u64,
    /// Datagrams smaller than a full frame; the tail kept stale bytes.
    pub short_datagrams: u64,
    /// Datagrams larger than a full frame; the excess was discarded.
    pub oversized_datagrams: u64,
    /// Frames remapped into the ring, including the test pattern.
    pub frames_published: u64,
    /// Frames discarded because the ring was full.
    pub frames_dropped: u64,
    /// Frames claimed and sent, including the initial blank frame.
    pub frames_sent: u64,
    /// Datagrams handed to the output socket.
    pub packets_sent: u64,
    /// Encode or send failures.
    pub send_errors: u64,
}

impl std::fmt::Display for RelayStatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rx={} short={} oversized={} published={} dropped={} sent={} packets={} errors={}",
            self.datagrams_received,
            self.short_datagrams,
            self.oversized_datagrams,
            self.frames_published,
            self.frames_dropped,
            self.frames_sent,
            self.packets_sent,
            self.send_errors
        )
    }
}

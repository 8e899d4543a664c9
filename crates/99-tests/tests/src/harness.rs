//! Loopback relay fixture shared by the end-to-end tests.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};

use pixel_frame::{GridSize, RawFrame};
use relay::{RelayConfig, RelayContext, RelayExit, RelayHandle};
use strip_map::FrameMapper;
use wire_codec::{decode_datagram, reassemble};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn loopback(port: u16) -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))
}

/// One decoded output datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Received {
    pub controller_id: u8,
    pub chunks: usize,
    pub bytes: Vec<u8>,
    pub at: Instant,
}

/// A running relay wired to a local capture socket instead of the multicast group.
pub struct LoopbackRelay {
    pub handle: RelayHandle,
    pub config: RelayConfig,
    source: UdpSocket,
    capture: UdpSocket,
    buf: Vec<u8>,
}

impl LoopbackRelay {
    /// Reference installation, reconfigured for loopback. `tweak` adjusts the
    /// config before the relay binds.
    pub fn start(tweak: impl FnOnce(&mut RelayConfig)) -> Self {
        let capture = UdpSocket::bind(loopback(0)).expect("bind capture socket");
        capture
            .set_read_timeout(Some(RECV_TIMEOUT))
            .expect("capture timeout");

        let mut config = RelayConfig {
            listen: loopback(0),
            output: capture.local_addr().expect("capture addr"),
            fps: 50,
            ..RelayConfig::reference()
        };
        tweak(&mut config);

        let handle = RelayContext::bind(config.clone())
            .expect("bind relay")
            .spawn()
            .expect("spawn relay");
        let source = UdpSocket::bind(loopback(0)).expect("bind source socket");

        Self {
            handle,
            config,
            source,
            capture,
            buf: vec![0; 64 * 1024],
        }
    }

    pub fn mapper(&self) -> FrameMapper {
        self.config.mapper().expect("valid mapper")
    }

    pub fn blank_frame(&self) -> RawFrame {
        RawFrame::new(self.config.grid)
    }

    pub fn send_raw(&self, payload: &[u8]) {
        self.source
            .send_to(payload, self.handle.ingest_addr())
            .expect("send to ingest");
    }

    pub fn send_frame(&self, frame: &RawFrame) {
        self.send_raw(frame.as_bytes());
    }

    /// Waits for the next output datagram and decodes it.
    pub fn recv(&mut self) -> Received {
        let len = self.capture.recv(&mut self.buf).expect("output datagram");
        let at = Instant::now();
        let chunks = decode_datagram(&self.buf[..len]).expect("decodable datagram");
        Received {
            controller_id: chunks[0].controller_id,
            chunks: chunks.len(),
            bytes: reassemble(&chunks),
            at,
        }
    }

    /// True when no output arrives within `wait`.
    pub fn is_quiet_for(&mut self, wait: Duration) -> bool {
        self.capture
            .set_read_timeout(Some(wait))
            .expect("capture timeout");
        let quiet = self.capture.recv(&mut self.buf).is_err();
        self.capture
            .set_read_timeout(Some(RECV_TIMEOUT))
            .expect("capture timeout");
        quiet
    }

    /// Sends the empty stop datagram and waits for both threads.
    pub fn stop(self) -> RelayExit {
        self.send_raw(&[]);
        self.handle.join().expect("relay threads")
    }
}

/// Frame whose every byte differs from its neighbours, so misplaced bytes show.
pub fn numbered_frame(grid: GridSize) -> RawFrame {
    let mut frame = RawFrame::new(grid);
    for (i, byte) in frame.as_bytes_mut().iter_mut().enumerate() {
        *byte = (i % 251) as u8 + 1;
    }
    frame
}

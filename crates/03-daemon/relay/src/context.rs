use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use frame_ring::{frame_ring, PublishOutcome};
use strip_map::FrameMapper;
use wire_codec::PacketEncoder;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::ingest::IngestReceiver;
use crate::stats::{RelayStats, RelayStatsSnapshot};
use crate::transmit::{FrameSender, Pacer, Transmitter};
use crate::ExitReason;

const INGEST_THREAD: &str = "relay-ingest";
const TRANSMIT_THREAD: &str = "relay-transmit";

/// Everything a relay needs before its threads start: validated config,
/// bound sockets and shared counters.
pub struct RelayContext {
    config: RelayConfig,
    mapper: FrameMapper,
    encoder: PacketEncoder,
    ingest_socket: UdpSocket,
    output_socket: UdpSocket,
    stats: Arc<RelayStats>,
}

impl RelayContext {
    /// Validates `config` and binds both sockets.
    pub fn bind(config: RelayConfig) -> RelayResult<Self> {
        config.validate()?;
        let mapper = config.mapper()?;
        let encoder = PacketEncoder::new(config.encoder_config())
            .map_err(|err| RelayError::Config(err.into()))?;

        let ingest_socket = UdpSocket::bind(config.listen).map_err(|source| RelayError::Bind {
            role: "ingest",
            addr: config.listen,
            source,
        })?;

        let output_bind = match config.output.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let output_socket = UdpSocket::bind(output_bind).map_err(|source| RelayError::Bind {
            role: "output",
            addr: output_bind,
            source,
        })?;
        configure_multicast(&output_socket, &config)?;

        tracing::info!(
            "relay bound: ingest {}, output {} ({} segment(s), ring capacity {})",
            config.listen,
            config.output,
            config.segments.len(),
            config.ring.capacity
        );

        Ok(Self {
            config,
            mapper,
            encoder,
            ingest_socket,
            output_socket,
            stats: Arc::new(RelayStats::default()),
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Address the ingest socket actually bound, with any ephemeral port resolved.
    pub fn ingest_addr(&self) -> RelayResult<SocketAddr> {
        self.ingest_socket
            .local_addr()
            .map_err(|source| RelayError::Socket {
                role: "ingest",
                source,
            })
    }

    pub fn stats(&self) -> Arc<RelayStats> {
        Arc::clone(&self.stats)
    }

    /// Starts the ingest and transmit threads.
    pub fn spawn(self) -> RelayResult<RelayHandle> {
        let ingest_addr = self.ingest_addr()?;
        let Self {
            config,
            mapper,
            encoder,
            ingest_socket,
            output_socket,
            stats,
        } = self;

        let blank = mapper.blank_frame();
        let (publisher, claimer) = frame_ring(config.ring, |_| blank.clone())?;

        let mut ingest = IngestReceiver::new(ingest_socket, mapper, publisher, Arc::clone(&stats));
        if config.test_pattern && ingest.publish_test_pattern() != PublishOutcome::Accepted {
            tracing::warn!("test pattern frame did not fit in the ring");
        }

        let sender = FrameSender::new(output_socket, config.output, encoder, Arc::clone(&stats));
        let transmitter = Transmitter::new(claimer, sender, Pacer::new(config.period()));

        let transmit = spawn_named(TRANSMIT_THREAD, move || transmitter.run())?;
        let ingest = spawn_named(INGEST_THREAD, move || ingest.run())?;

        Ok(RelayHandle {
            ingest_addr,
            ingest,
            transmit,
            stats,
        })
    }
}

fn configure_multicast(socket: &UdpSocket, config: &RelayConfig) -> RelayResult<()> {
    let socket_err = |source: std::io::Error| RelayError::Socket {
        role: "output",
        source,
    };
    match config.output.ip() {
        IpAddr::V4(group) if group.is_multicast() => {
            socket
                .set_multicast_ttl_v4(config.multicast_ttl)
                .map_err(socket_err)?;
            socket
                .set_multicast_loop_v4(config.multicast_loop)
                .map_err(socket_err)?;
        }
        IpAddr::V6(group) if group.is_multicast() => {
            socket
                .set_multicast_loop_v6(config.multicast_loop)
                .map_err(socket_err)?;
        }
        _ => {}
    }
    Ok(())
}

fn spawn_named<F>(name: &'static str, body: F) -> RelayResult<JoinHandle<ExitReason>>
where
    F: FnOnce() -> ExitReason + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(body)
        .map_err(|source| RelayError::Spawn { name, source })
}

/// How both relay threads ended.
#[derive(Debug)]
pub struct RelayExit {
    pub ingest: ExitReason,
    pub transmit: ExitReason,
    pub stats: RelayStatsSnapshot,
}

/// Running relay.
pub struct RelayHandle {
    ingest_addr: SocketAddr,
    ingest: JoinHandle<ExitReason>,
    transmit: JoinHandle<ExitReason>,
    stats: Arc<RelayStats>,
}

impl RelayHandle {
    pub fn ingest_addr(&self) -> SocketAddr {
        self.ingest_addr
    }

    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    /// True once both threads have returned.
    pub fn is_finished(&self) -> bool {
        self.ingest.is_finished() && self.transmit.is_finished()
    }

    /// Waits for both threads. The ingest thread ends first; the transmitter
    /// follows once it has sent every frame still in the ring.
    pub fn join(self) -> RelayResult<RelayExit> {
        let ingest = self
            .ingest
            .join()
            .map_err(|_| RelayError::ThreadPanicked { name: INGEST_THREAD })?;
        let transmit = self
            .transmit
            .join()
            .map_err(|_| RelayError::ThreadPanicked {
                name: TRANSMIT_THREAD,
            })?;
        Ok(RelayExit {
            ingest,
            transmit,
            stats: self.stats.snapshot(),
        })
    }
}

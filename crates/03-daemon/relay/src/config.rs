use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use frame_ring::{RingConfig, RingError};
use pixel_frame::GridSize;
use smallvec::{smallvec, SmallVec};
use strip_map::{FrameMapper, LayoutError, SegmentMap, StripLayout};
use thiserror::Error;
use wire_codec::{CodecError, EncoderConfig, REFERENCE_MTU};

/// Problems found by [`RelayConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("frame rate must be between 1 and {max} fps, got {fps}")]
    FrameRate { fps: u32, max: u32 },

    #[error(transparent)]
    Ring(#[from] RingError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Start-time parameters for one relay instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the ingest socket binds to.
    pub listen: SocketAddr,
    /// Destination of encoded datagrams; normally a multicast group.
    pub output: SocketAddr,
    pub fps: u32,
    pub ring: RingConfig,
    /// Largest chunk the encoder emits, header included.
    pub max_chunk_len: usize,
    pub grid: GridSize,
    pub layout: StripLayout,
    /// One table per controller; each becomes one datagram per frame.
    pub segments: SmallVec<[SegmentMap; 4]>,
    /// Applied only when `output` is a multicast address.
    pub multicast_ttl: u32,
    pub multicast_loop: bool,
    /// Publish a coordinate test frame right after the blank one.
    pub test_pattern: bool,
}

impl RelayConfig {
    pub const MAX_FPS: u32 = 1000;
    pub const REFERENCE_LISTEN_PORT: u16 = 1234;
    pub const REFERENCE_GROUP: Ipv4Addr = Ipv4Addr::new(224, 1, 1, 1);
    pub const REFERENCE_OUTPUT_PORT: u16 = 1097;
    pub const REFERENCE_CONTROLLER: u8 = 2;

    /// The installation this relay was written for: a 32 × 57 grid driving
    /// controller 2 on 224.1.1.1:1097 at 10 fps.
    pub fn reference() -> Self {
        let layout = StripLayout::REFERENCE;
        Self {
            listen: SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::UNSPECIFIED,
                Self::REFERENCE_LISTEN_PORT,
            )),
            output: SocketAddr::V4(SocketAddrV4::new(
                Self::REFERENCE_GROUP,
                Self::REFERENCE_OUTPUT_PORT,
            )),
            fps: 10,
            ring: RingConfig::default(),
            max_chunk_len: REFERENCE_MTU,
            grid: GridSize::REFERENCE,
            layout,
            segments: smallvec![SegmentMap::identity(
                Self::REFERENCE_CONTROLLER,
                layout.strip_count()
            )],
            multicast_ttl: 1,
            multicast_loop: true,
            test_pattern: false,
        }
    }

    /// Time budget for one output frame.
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            max_chunk_len: self.max_chunk_len,
            port_bytes: self.layout.port_bytes(),
            ports_in_use: self.layout.ports_in_use,
        }
    }

    /// Builds the remapper for this layout, validating the segment tables.
    pub fn mapper(&self) -> Result<FrameMapper, ConfigError> {
        Ok(FrameMapper::new(
            self.layout,
            self.grid,
            self.segments.iter().cloned(),
        )?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 || self.fps > Self::MAX_FPS {
            return Err(ConfigError::FrameRate {
                fps: self.fps,
                max: Self::MAX_FPS,
            });
        }
        if self.ring.capacity == 0 {
            return Err(RingError::InvalidCapacity {
                requested: 0,
                minimum: 1,
            }
            .into());
        }
        self.mapper()?;
        self.encoder_config().validate()?;
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_valid() {
        let config = RelayConfig::reference();
        assert!(config.validate().is_ok());
        assert_eq!(config.period(), Duration::from_millis(100));
        assert_eq!(config.encoder_config(), EncoderConfig::REFERENCE);
        assert_eq!(config.output.to_string(), "224.1.1.1:1097");
    }

    #[test]
    fn zero_fps_rejected() {
        let config = RelayConfig {
            fps: 0,
            ..RelayConfig::reference()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FrameRate { fps: 0, max: 1000 })
        );
    }

    #[test]
    fn too_many_ports_rejected_by_codec() {
        let config = RelayConfig {
            layout: StripLayout {
                ports_in_use: 9,
                ..StripLayout::REFERENCE
            },
            grid: GridSize::new(36, 57),
            segments: smallvec![SegmentMap::identity(2, 36)],
            ..RelayConfig::reference()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Codec(CodecError::PortCount { ports: 9, .. }))
        ));
    }

    #[test]
    fn bad_segment_table_rejected() {
        let config = RelayConfig {
            segments: smallvec![SegmentMap::identity(2, 31)],
            ..RelayConfig::reference()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Layout(LayoutError::TableLength { .. }))
        ));
    }

    #[test]
    fn zero_ring_capacity_rejected() {
        let config = RelayConfig {
            ring: RingConfig { capacity: 0 },
            ..RelayConfig::reference()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Ring(RingError::InvalidCapacity { .. }))
        ));
    }
}

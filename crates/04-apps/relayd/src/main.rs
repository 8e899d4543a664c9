//! LED frame relay daemon.
//!
//! Listens for raw RGB frames on UDP and forwards them, remapped and encoded,
//! to the LED controllers at a fixed frame rate. Send an empty datagram to the
//! listen port to shut it down.

mod segment;

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pixel_frame::GridSize;
use relay::{RelayConfig, RelayContext, RingConfig};
use smallvec::smallvec;
use strip_map::{SegmentMap, StripLayout};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::segment::SegmentArg;

#[derive(Parser, Debug)]
#[command(author, version, about = "Relay raw RGB frames to YTKJ LED controllers")]
struct Args {
    /// Address to receive raw frames on
    #[arg(long, default_value = "0.0.0.0:1234")]
    listen: SocketAddr,

    /// Destination for encoded packets (multicast group or unicast host)
    #[arg(long, default_value = "224.1.1.1:1097")]
    output: SocketAddr,

    /// Output frame rate
    #[arg(long, default_value_t = 10)]
    fps: u32,

    /// Frames that may wait between ingest and output
    #[arg(long, default_value_t = 32)]
    ring_capacity: usize,

    /// Largest packet chunk, header included
    #[arg(long, default_value_t = 1472)]
    mtu: usize,

    /// Grid columns in the ingest format
    #[arg(long, default_value_t = 32)]
    width: usize,

    /// Grid rows in the ingest format
    #[arg(long, default_value_t = 57)]
    height: usize,

    #[arg(long, default_value_t = 57)]
    pixels_per_strip: usize,

    #[arg(long, default_value_t = 4)]
    strips_per_port: usize,

    /// Controller ports in use (at most 8)
    #[arg(long, default_value_t = 8)]
    ports: usize,

    /// Controller and the grid column feeding each of its strips, e.g. `2:0-31`.
    /// Repeat for more controllers. Defaults to controller 2 on columns 0 upwards.
    #[arg(long = "segment", value_name = "ID:COLUMNS")]
    segments: Vec<SegmentArg>,

    #[arg(long, default_value_t = 1)]
    multicast_ttl: u32,

    /// Deliver multicast output to listeners on this host as well
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    multicast_loop: bool,

    /// Show a coordinate test pattern until the first frame arrives
    #[arg(long)]
    test_pattern: bool,
}

impl Args {
    fn into_config(self) -> RelayConfig {
        let layout = StripLayout {
            pixels_per_strip: self.pixels_per_strip,
            strips_per_port: self.strips_per_port,
            ports_in_use: self.ports,
        };
        let segments = if self.segments.is_empty() {
            smallvec![SegmentMap::identity(
                RelayConfig::REFERENCE_CONTROLLER,
                layout.strip_count()
            )]
        } else {
            self.segments.into_iter().map(SegmentArg::into_map).collect()
        };
        RelayConfig {
            listen: self.listen,
            output: self.output,
            fps: self.fps,
            ring: RingConfig {
                capacity: self.ring_capacity,
            },
            max_chunk_len: self.mtu,
            grid: GridSize::new(self.width, self.height),
            layout,
            segments,
            multicast_ttl: self.multicast_ttl,
            multicast_loop: self.multicast_loop,
            test_pattern: self.test_pattern,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = Args::parse().into_config();
    let context = RelayContext::bind(config).context("failed to start relay")?;
    let handle = context.spawn().context("failed to start relay threads")?;
    info!("relay running; send an empty datagram to {} to stop", handle.ingest_addr());

    let exit = handle.join().context("relay thread failed")?;
    info!("relay stopped: ingest {}, transmit {}", exit.ingest, exit.transmit);
    info!("final stats: {}", exit.stats);

    if !exit.ingest.is_clean() {
        warn!("ingest ended on an error");
        bail!("relay stopped: {}", exit.ingest);
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt().with_env_filter(env_filter).try_init();
}

//! Sends generated RGB frames to a relay's ingest port.

use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pixel_frame::pattern::{write_coordinate_pattern, write_sine, write_solid};
use pixel_frame::{GridSize, RawFrame};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Pattern {
    /// red = row, green = column
    Coordinate,
    /// one lit pixel per row tracing a moving sine wave
    Sine,
    /// every pixel set to `--color`
    Solid,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate test frames for the LED relay")]
struct Args {
    /// Relay ingest address
    #[arg(long, default_value = "127.0.0.1:1234")]
    target: SocketAddr,

    #[arg(long, value_enum, default_value_t = Pattern::Sine)]
    pattern: Pattern,

    /// Frames per second to send
    #[arg(long, default_value_t = 20)]
    fps: u32,

    /// Stop after this many frames (runs forever when omitted)
    #[arg(long)]
    frames: Option<u64>,

    #[arg(long, default_value_t = 32)]
    width: usize,

    #[arg(long, default_value_t = 57)]
    height: usize,

    /// RGB colour for the solid pattern, as `RRGGBB` hex
    #[arg(long, default_value = "7f7f7f", value_parser = parse_color)]
    color: [u8; 3],

    /// Send an empty datagram when done, which stops the relay
    #[arg(long)]
    stop_relay: bool,
}

fn parse_color(text: &str) -> Result<[u8; 3]> {
    let text = text.trim_start_matches('#');
    anyhow::ensure!(text.len() == 6, "expected six hex digits, got {text:?}");
    let value = u32::from_str_radix(text, 16).with_context(|| format!("{text:?} is not hex"))?;
    let [_, r, g, b] = value.to_be_bytes();
    Ok([r, g, b])
}

fn render(frame: &mut RawFrame, pattern: Pattern, color: [u8; 3], index: u64) {
    match pattern {
        Pattern::Coordinate => write_coordinate_pattern(frame),
        Pattern::Sine => write_sine(frame, index as u32),
        Pattern::Solid => write_solid(frame, color),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    anyhow::ensure!(args.fps > 0, "--fps must be at least 1");

    let socket = UdpSocket::bind("0.0.0.0:0").context("failed to bind sending socket")?;
    let mut frame = RawFrame::new(GridSize::new(args.width, args.height));
    let period = Duration::from_secs(1) / args.fps;
    info!(
        "sending {:?} frames ({} bytes) to {} at {} fps",
        args.pattern,
        frame.as_bytes().len(),
        args.target,
        args.fps
    );

    let mut index = 0u64;
    while args.frames.map_or(true, |limit| index < limit) {
        let started = Instant::now();
        render(&mut frame, args.pattern, args.color, index);
        socket
            .send_to(frame.as_bytes(), args.target)
            .with_context(|| format!("failed to send frame {index} to {}", args.target))?;
        debug!("sent frame {index}");
        index += 1;

        if let Some(left) = period.checked_sub(started.elapsed()) {
            thread::sleep(left);
        }
    }

    if args.stop_relay {
        socket
            .send_to(&[], args.target)
            .context("failed to send stop datagram")?;
        info!("sent stop datagram after {index} frames");
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt().with_env_filter(env_filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn colors_parse_as_hex() {
        assert_eq!(parse_color("ff8000").expect("valid"), [0xff, 0x80, 0x00]);
        assert_eq!(parse_color("#010203").expect("valid"), [1, 2, 3]);
        assert!(parse_color("fff").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }

    #[test]
    fn solid_pattern_uses_color() {
        let mut frame = RawFrame::new(GridSize::new(2, 2));
        render(&mut frame, Pattern::Solid, [1, 2, 3], 0);
        assert_eq!(frame.pixel(1, 1), Some([1, 2, 3]));
    }
}

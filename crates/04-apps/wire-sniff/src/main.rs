//! Listens on the controller output and prints what each datagram carries.

use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use wire_codec::{decode_datagram, ChannelImage, Chunk, CodecResult, PORT_CHANNELS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode YTKJ LED controller packets")]
struct Args {
    /// Address the relay sends to; multicast groups are joined automatically
    #[arg(long, default_value = "224.1.1.1:1097")]
    listen: SocketAddr,

    /// Local interface used to join the multicast group
    #[arg(long, default_value = "0.0.0.0")]
    interface: Ipv4Addr,

    /// Exit after this many datagrams
    #[arg(long)]
    count: Option<u64>,
}

/// One-line summary of a decoded datagram plus per-descriptor detail lines.
fn describe(datagram: &[u8]) -> CodecResult<(String, Vec<String>)> {
    let chunks = decode_datagram(datagram)?;
    let image = ChannelImage::from_chunks(&chunks)?;

    let mut summary = String::new();
    let controllers: Vec<u8> = chunks.iter().map(|chunk| chunk.controller_id).collect();
    let descriptors: usize = chunks.iter().map(|chunk| chunk.descriptors.len()).sum();
    // Writing to a String cannot fail.
    let _ = write!(
        summary,
        "{} bytes, {} chunk(s), {} descriptor(s), controller(s) {:?}, bytes/port",
        datagram.len(),
        chunks.len(),
        descriptors,
        dedup(controllers)
    );
    let per_port = image.bytes_per_port();
    let used = per_port.iter().rposition(|&n| n > 0).map_or(0, |last| last + 1);
    for port in per_port.iter().take(used.max(1)) {
        let _ = write!(summary, " {port}");
    }

    let details = chunks.iter().enumerate().flat_map(chunk_lines).collect();
    Ok((summary, details))
}

fn chunk_lines((index, chunk): (usize, &Chunk<'_>)) -> Vec<String> {
    let mut lines = vec![format!(
        "chunk {index}: {} bytes, header {:02x?}",
        chunk.wire_len, chunk.header
    )];
    lines.extend(chunk.descriptors.iter().map(|d| {
        format!(
            "  port {} channel {:5} (+{:4}) {} bytes",
            d.port(),
            d.channel_offset,
            usize::from(d.channel_offset) % PORT_CHANNELS,
            d.data.len()
        )
    }));
    lines
}

fn dedup(mut ids: Vec<u8>) -> Vec<u8> {
    ids.dedup();
    ids
}

fn bind(args: &Args) -> Result<UdpSocket> {
    let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), args.listen.port());
    let socket = UdpSocket::bind(bind_addr).with_context(|| format!("failed to bind {bind_addr}"))?;
    if let IpAddr::V4(group) = args.listen.ip() {
        if group.is_multicast() {
            socket
                .join_multicast_v4(&group, &args.interface)
                .with_context(|| format!("failed to join {group} on {}", args.interface))?;
            info!("joined {group} on {}", args.interface);
        }
    }
    Ok(socket)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let socket = bind(&args)?;
    info!("listening for controller packets on port {}", args.listen.port());

    // Large enough for every chunk of eight full ports.
    let mut buf = vec![0u8; 64 * 1024];
    let mut seen = 0u64;
    while args.count.map_or(true, |limit| seen < limit) {
        let (len, from) = socket.recv_from(&mut buf).context("receive failed")?;
        seen += 1;
        match describe(&buf[..len]) {
            Ok((summary, details)) => {
                info!("#{seen} from {from}: {summary}");
                for line in details {
                    debug!("{line}");
                }
            }
            Err(err) => warn!("#{seen} from {from}: undecodable {len}-byte datagram: {err}"),
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt().with_env_filter(env_filter).try_init();
}

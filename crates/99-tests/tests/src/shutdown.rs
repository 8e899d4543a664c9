//! Startup failures and the stop-by-empty-datagram path.

use std::net::UdpSocket;
use std::time::Duration;

use pixel_frame::pattern::write_solid;
use relay::{ConfigError, ExitReason, RelayConfig, RelayContext, RelayError};

use crate::harness::LoopbackRelay;

#[test]
fn pending_frames_are_sent_before_the_transmitter_exits() {
    let mut relay = LoopbackRelay::start(|config| config.fps = 100);
    let mut frame = relay.blank_frame();
    for shade in 1..=3u8 {
        write_solid(&mut frame, [shade; 3]);
        relay.send_frame(&frame);
    }
    relay.send_raw(&[]);

    let shades: Vec<u8> = (0..4).map(|_| relay.recv().bytes[0]).collect();
    assert_eq!(shades, vec![0, 1, 2, 3]);
    assert!(relay.is_quiet_for(Duration::from_millis(100)));

    let exit = relay.handle.join().expect("relay threads");
    assert!(exit.ingest.is_clean());
    assert!(matches!(exit.transmit, ExitReason::RingClosed));
    assert_eq!(exit.stats.frames_sent, 4);
    assert_eq!(exit.stats.frames_dropped, 0);
}

#[test]
fn occupied_listen_port_fails_at_startup() {
    let squatter = UdpSocket::bind("127.0.0.1:0").expect("bind squatter");
    let config = RelayConfig {
        listen: squatter.local_addr().expect("addr"),
        output: "127.0.0.1:9".parse().expect("addr"),
        ..RelayConfig::reference()
    };

    match RelayContext::bind(config) {
        Err(RelayError::Bind { role, .. }) => assert_eq!(role, "ingest"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("second bind on the same port succeeded"),
    }
}

#[test]
fn invalid_config_is_rejected_before_binding() {
    let config = RelayConfig {
        listen: "127.0.0.1:0".parse().expect("addr"),
        max_chunk_len: 8,
        ..RelayConfig::reference()
    };
    assert!(matches!(
        RelayContext::bind(config),
        Err(RelayError::Config(ConfigError::Codec(_)))
    ));
}

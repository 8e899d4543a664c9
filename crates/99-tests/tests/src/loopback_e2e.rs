//! Frames in over UDP, controller packets out over UDP.

use std::time::Duration;

use pixel_frame::pattern::{write_coordinate_pattern, write_solid};
use pixel_frame::GridSize;
use relay::{ExitReason, RelayConfig};
use strip_map::SegmentMap;

use crate::harness::{numbered_frame, LoopbackRelay};

/// Splits the reference grid across controllers 3 and 4, the second mirrored.
fn two_controllers(config: &mut RelayConfig) {
    config.segments.clear();
    config.segments.push(SegmentMap::new(3, 0..32));
    config.segments.push(SegmentMap::new(4, (0..32).rev()));
}

#[test]
fn first_packet_clears_the_display() {
    let mut relay = LoopbackRelay::start(|_| {});
    let first = relay.recv();
    assert_eq!(first.controller_id, 2);
    assert_eq!(first.chunks, 4);
    assert_eq!(first.bytes.len(), 5472);
    assert!(first.bytes.iter().all(|&b| b == 0), "blank frame first");

    // Nothing else is pending, so the transmitter waits instead of repeating.
    assert!(relay.is_quiet_for(Duration::from_millis(200)));

    let exit = relay.stop();
    assert!(matches!(exit.ingest, ExitReason::EmptyDatagram));
    assert!(matches!(exit.transmit, ExitReason::RingClosed));
    assert_eq!(exit.stats.frames_sent, 1);
    assert_eq!(exit.stats.packets_sent, 1);
}

#[test]
fn ingested_frame_arrives_in_wiring_order() {
    let mut relay = LoopbackRelay::start(|_| {});
    let frame = numbered_frame(GridSize::REFERENCE);
    relay.send_frame(&frame);

    let expected = relay.mapper().remap(&frame).expect("remap");
    assert!(relay.recv().bytes.iter().all(|&b| b == 0));
    let received = relay.recv();
    assert_eq!(received.bytes, expected.segments()[0].bytes);

    let exit = relay.stop();
    assert_eq!(exit.stats.datagrams_received, 1);
    assert_eq!(exit.stats.frames_published, 1);
}

#[test]
fn undersized_datagram_leaves_rest_of_frame_untouched() {
    let mut relay = LoopbackRelay::start(|_| {});
    relay.send_raw(&[1, 2, 3, 4, 5, 6, 7]);

    relay.recv();
    let received = relay.recv();
    assert_eq!(&received.bytes[..3], &[1, 2, 3]);
    // pixel (1, 0) opens the second strip
    assert_eq!(&received.bytes[171..174], &[4, 5, 6]);
    assert_eq!(received.bytes.iter().filter(|&&b| b != 0).count(), 7);

    let exit = relay.stop();
    assert_eq!(exit.stats.short_datagrams, 1);
}

#[test]
fn oversized_datagram_is_truncated() {
    let mut relay = LoopbackRelay::start(|_| {});
    let mut payload = vec![0x11; GridSize::REFERENCE.byte_len()];
    payload.extend_from_slice(&[0xee; 100]);
    relay.send_raw(&payload);

    relay.recv();
    assert!(relay.recv().bytes.iter().all(|&b| b == 0x11));
    assert_eq!(relay.stop().stats.oversized_datagrams, 1);
}

#[test]
fn test_pattern_follows_blank_frame() {
    let mut relay = LoopbackRelay::start(|config| config.test_pattern = true);
    let mut pattern = relay.blank_frame();
    write_coordinate_pattern(&mut pattern);
    let expected = relay.mapper().remap(&pattern).expect("remap");

    assert!(relay.recv().bytes.iter().all(|&b| b == 0));
    assert_eq!(relay.recv().bytes, expected.segments()[0].bytes);
    relay.stop();
}

#[test]
fn each_controller_gets_its_own_datagram() {
    let mut relay = LoopbackRelay::start(two_controllers);
    let mut frame = relay.blank_frame();
    write_coordinate_pattern(&mut frame);
    relay.send_frame(&frame);

    let blank: Vec<u8> = (0..2).map(|_| relay.recv().controller_id).collect();
    assert_eq!(blank, vec![3, 4]);

    let straight = relay.recv();
    let mirrored = relay.recv();
    assert_eq!((straight.controller_id, mirrored.controller_id), (3, 4));
    // green carries the column: strip 0 reads column 0 on one controller, 31 on the other
    assert_eq!(straight.bytes[1], 0);
    assert_eq!(mirrored.bytes[1], 31);

    let exit = relay.stop();
    assert_eq!(exit.stats.packets_sent, 4);
    assert_eq!(exit.stats.frames_sent, 2);
}

#[test]
fn output_holds_the_configured_frame_rate() {
    let mut relay = LoopbackRelay::start(|config| config.fps = 20);
    let mut frame = relay.blank_frame();
    for shade in 1..=5u8 {
        write_solid(&mut frame, [shade; 3]);
        relay.send_frame(&frame);
    }

    let received: Vec<_> = (0..6).map(|_| relay.recv()).collect();
    let shades: Vec<u8> = received.iter().map(|r| r.bytes[0]).collect();
    assert_eq!(shades, vec![0, 1, 2, 3, 4, 5]);

    let span = received[5].at - received[0].at;
    assert!(
        span >= Duration::from_millis(200),
        "six frames at 20 fps span at least four periods, got {span:?}"
    );
    relay.stop();
}

#[test]
fn idle_wait_does_not_let_the_next_two_frames_burst() {
    let mut relay = LoopbackRelay::start(|config| config.fps = 10);
    let period = relay.config.period();
    relay.recv();
    // longer than several periods with nothing pending
    std::thread::sleep(period * 3 + period / 2);

    let mut frame = relay.blank_frame();
    for shade in [1u8, 2] {
        write_solid(&mut frame, [shade; 3]);
        relay.send_frame(&frame);
    }
    let first = relay.recv();
    let second = relay.recv();
    assert_eq!((first.bytes[0], second.bytes[0]), (1, 2));

    let gap = second.at - first.at;
    assert!(
        gap >= period * 8 / 10,
        "frames after an idle wait still go out one period apart, got {gap:?}"
    );
    relay.stop();
}

//! Chunk splitting and channel-offset bookkeeping, checked through the decoder.

use wire_codec::{
    decode_datagram, reassemble, ChannelImage, EncoderConfig, PacketEncoder, HEADER_MAGIC, PAD_LEN,
    PORT_CHANNELS, TAG,
};

/// `(channel offset, byte count)` per descriptor, grouped by chunk.
fn layout_of(datagram: &[u8]) -> Vec<Vec<(u16, usize)>> {
    decode_datagram(datagram)
        .expect("decode")
        .iter()
        .map(|chunk| {
            chunk
                .descriptors
                .iter()
                .map(|d| (d.channel_offset, d.data.len()))
                .collect()
        })
        .collect()
}

/// 5472-byte segment in 1472-byte chunks: four chunks with the remainder of
/// each truncated port carried into the next chunk at the advanced offset.
#[test]
fn reference_segment_splits_with_carry_forward() {
    let segment: Vec<u8> = (0..5472u32).map(|i| (i % 251) as u8).collect();
    let mut encoder = PacketEncoder::new(EncoderConfig::REFERENCE).expect("reference config");
    let datagram = encoder.encode(&segment, 2).expect("encode").to_vec();

    assert_eq!(
        layout_of(&datagram),
        vec![
            vec![(0, 684), (2048, 684), (4096, 82)],
            vec![(4178, 602), (6144, 684), (8192, 164)],
            vec![(8356, 520), (10240, 684), (12288, 246)],
            vec![(12534, 438), (14336, 684)],
        ]
    );

    let chunks = decode_datagram(&datagram).expect("decode");
    let lens: Vec<usize> = chunks.iter().map(|chunk| chunk.wire_len).collect();
    assert_eq!(lens, vec![1472, 1472, 1472, 1140]);
    assert_eq!(datagram.len(), 3 * 1472 + 1140 + 3 * PAD_LEN);

    for chunk in &chunks {
        assert_eq!(chunk.header[..4], TAG);
        assert_eq!(chunk.controller_id, 2);
        assert_eq!(chunk.header[5], 0);
        assert_eq!(chunk.header[6..8], HEADER_MAGIC);
        assert_eq!(usize::from(chunk.header[8]), chunk.descriptors.len());
        assert_eq!(chunk.header[9], 0);
    }
    for pad in [1472usize, 2 * 1472 + PAD_LEN, 3 * 1472 + 2 * PAD_LEN] {
        assert!(datagram[pad..pad + PAD_LEN].iter().all(|&b| b == 0));
    }

    assert_eq!(reassemble(&chunks), segment);
}

/// The encoder reuses its buffer; a second frame does not inherit bytes from the first.
#[test]
fn consecutive_encodes_are_independent() {
    let mut encoder = PacketEncoder::new(EncoderConfig::REFERENCE).expect("reference config");
    let first = encoder.encode(&[0xff; 5472], 2).expect("encode").to_vec();
    let second = encoder.encode(&[0x01; 5472], 3).expect("encode").to_vec();
    assert_eq!(first.len(), second.len());

    let chunks = decode_datagram(&second).expect("decode");
    assert!(chunks.iter().all(|chunk| chunk.controller_id == 3));
    assert!(reassemble(&chunks).iter().all(|&b| b == 0x01));
}

mod prop {
    use super::*;
    use proptest::collection;
    use proptest::prelude::*;

    fn config_and_segment() -> impl Strategy<Value = (EncoderConfig, Vec<u8>)> {
        (15usize..1600, 1usize..=PORT_CHANNELS, 1usize..=8).prop_flat_map(
            |(max_chunk_len, port_bytes, ports_in_use)| {
                let config = EncoderConfig {
                    max_chunk_len,
                    port_bytes,
                    ports_in_use,
                };
                (
                    Just(config),
                    collection::vec(any::<u8>(), config.segment_len()),
                )
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn decoded_descriptors_rebuild_the_segment((config, segment) in config_and_segment()) {
            let mut encoder = PacketEncoder::new(config).expect("valid config");
            let datagram = encoder.encode(&segment, 1).expect("encode").to_vec();
            let chunks = decode_datagram(&datagram).expect("decode");

            let counted: usize = chunks
                .iter()
                .flat_map(|chunk| chunk.descriptors.iter())
                .map(|d| d.data.len())
                .sum();
            prop_assert_eq!(counted, config.segment_len());
            prop_assert_eq!(reassemble(&chunks), segment.clone());

            for chunk in &chunks {
                prop_assert!(chunk.wire_len <= config.max_chunk_len);
            }

            let image = ChannelImage::from_chunks(&chunks).expect("fits");
            for port in 0..config.ports_in_use {
                let window = image.port(port).expect("port exists");
                let expected = &segment[port * config.port_bytes..(port + 1) * config.port_bytes];
                prop_assert_eq!(&window[..config.port_bytes], expected);
            }
        }

        #[test]
        fn channel_offsets_never_decrease((config, segment) in config_and_segment()) {
            let mut encoder = PacketEncoder::new(config).expect("valid config");
            let datagram = encoder.encode(&segment, 1).expect("encode").to_vec();
            let offsets: Vec<u16> = decode_datagram(&datagram)
                .expect("decode")
                .iter()
                .flat_map(|chunk| {
                    chunk.descriptors.iter().map(|d| d.channel_offset).collect::<Vec<_>>()
                })
                .collect();
            prop_assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));
            prop_assert_eq!(offsets[0], 0);
        }
    }
}

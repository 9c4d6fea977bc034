//! End-to-end framing and decoding over a mixed-protocol byte stream.

use gnssdump_core::protocols::{rtcm, ubx};
use gnssdump_core::{
    Framed, Framer, Protocol, RawPacket, ReaderSource, Value, crc24q, ubx_checksum,
};

fn ubx_frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xb5, 0x62, class, id];
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(payload);
    let (ck_a, ck_b) = ubx_checksum(&frame[2..]);
    frame.push(ck_a);
    frame.push(ck_b);
    frame
}

fn rtcm_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![
        0xd3,
        (payload.len() >> 8) as u8,
        payload.len() as u8,
    ];
    frame.extend_from_slice(payload);
    let crc = crc24q(&frame);
    frame.extend_from_slice(&[(crc >> 16) as u8, (crc >> 8) as u8, crc as u8]);
    frame
}

fn nmea_sentence(body: &str) -> Vec<u8> {
    let checksum = body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("${body}*{checksum:02X}\r\n").into_bytes()
}

fn frame_all(stream: &[u8]) -> Vec<Framed> {
    let mut framer = Framer::new(ReaderSource::new(stream));
    let mut out = Vec::new();
    while let Some(framed) = framer.next_packet().expect("framing") {
        out.push(framed);
    }
    out
}

fn set_word_bits(words: &mut [u32; 10], b0: u16, b1: u16, value: u32) {
    let wi = usize::from((b0 - 1) / 30);
    let rel1 = b1 - wi as u16 * 30;
    let width = b1 - b0 + 1;
    let shift = 30 - rel1;
    let mask = ((1u32 << width) - 1) << shift;
    words[wi] = (words[wi] & !mask) | ((value << shift) & mask);
}

#[test]
fn mixed_stream_frames_and_decodes() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&nmea_sentence("GNGGA,120000.00,4916.45,N,12311.12,W,1,08"));
    stream.push(0x00); // stray byte between packets
    stream.extend_from_slice(&ubx_frame(0x01, 0x61, &5_000u32.to_le_bytes()));
    let mut msg1005 = vec![0u8; 19];
    msg1005[0] = (1005u16 >> 4) as u8; // message number in the top 12 bits
    msg1005[1] = ((1005u16 & 0xf) << 4) as u8;
    stream.extend_from_slice(&rtcm_frame(&msg1005));
    let mut corrupt = ubx_frame(0x05, 0x01, &[0x06, 0x01]);
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0xff;
    stream.extend_from_slice(&corrupt);
    stream.extend_from_slice(&ubx_frame(0x05, 0x00, &[0x06, 0x01]));

    let outcomes = frame_all(&stream);
    assert_eq!(outcomes.len(), 6);

    let Framed::Packet(nmea) = &outcomes[0] else {
        panic!("expected NMEA packet, got {:?}", outcomes[0]);
    };
    assert_eq!(nmea.protocol, Protocol::Nmea);
    assert!(nmea.sentence().starts_with("$GNGGA"));

    assert_eq!(outcomes[1], Framed::Unrecognized { consumed: 1 });

    let Framed::Packet(eoe) = &outcomes[2] else {
        panic!("expected UBX packet, got {:?}", outcomes[2]);
    };
    let record = ubx::decode_packet(eoe).expect("decode NAV-EOE");
    assert_eq!(record.message, "UBX-NAV-EOE");
    assert_eq!(record.get("iTOW"), Some(&Value::Int(5_000)));

    let Framed::Packet(reference) = &outcomes[3] else {
        panic!("expected RTCM packet, got {:?}", outcomes[3]);
    };
    assert_eq!(reference.protocol, Protocol::Rtcm3);
    let record = rtcm::decode_packet(reference)
        .expect("decode 1005")
        .expect("catalogued message");
    assert_eq!(record.message, "RTCM-1005");
    assert_eq!(record.get("msgNum"), Some(&Value::Int(1005)));

    assert!(matches!(
        outcomes[4],
        Framed::ChecksumFailed {
            protocol: Protocol::Ubx,
            ..
        }
    ));

    // Framing resynchronized after the corrupt packet.
    let Framed::Packet(nak) = &outcomes[5] else {
        panic!("expected UBX packet, got {:?}", outcomes[5]);
    };
    let record = ubx::decode_packet(nak).expect("decode ACK-NAK");
    assert_eq!(record.message, "UBX-ACK-NAK");
}

#[test]
fn sfrbx_relay_decodes_nested_subframe() {
    // Subframe 1 with URA index 1 (nominal accuracy 2.8 m).
    let mut words = [0u32; 10];
    set_word_bits(&mut words, 1, 8, 0x8b); // preamble
    set_word_bits(&mut words, 31, 47, 99_000); // tow_count
    set_word_bits(&mut words, 50, 52, 1); // subframe id
    set_word_bits(&mut words, 61, 70, 321); // week number
    set_word_bits(&mut words, 73, 76, 1); // ura index

    let mut payload = vec![0u8, 5, 0, 0, 10, 0, 2, 0];
    for word in words {
        payload.extend_from_slice(&word.to_le_bytes());
    }
    let frame = ubx_frame(0x02, 0x13, &payload);

    let outcomes = frame_all(&frame);
    let Framed::Packet(packet) = &outcomes[0] else {
        panic!("expected packet, got {:?}", outcomes[0]);
    };
    let record = ubx::decode_packet(packet).expect("decode SFRBX");

    assert_eq!(record.message, "UBX-RXM-SFRBX");
    assert_eq!(record.get("gnssId"), Some(&Value::Symbol("GPS")));
    assert_eq!(record.get("svId"), Some(&Value::Int(5)));
    assert_eq!(record.get("subframe"), Some(&Value::Int(1)));
    assert_eq!(record.get("preamble"), Some(&Value::Int(0x8b)));
    assert_eq!(record.get("tow_count"), Some(&Value::Int(99_000)));
    assert_eq!(record.get("wn"), Some(&Value::Int(321)));
    assert_eq!(record.get("ura"), Some(&Value::Float(2.8)));

    // Decoding the same packet again yields the same record.
    let again = ubx::decode_packet(packet).expect("decode SFRBX again");
    assert_eq!(record, again);
}

#[test]
fn records_serialize_to_json() {
    let frame = ubx_frame(0x01, 0x61, &5_000u32.to_le_bytes());
    let packet = RawPacket {
        protocol: Protocol::Ubx,
        bytes: frame,
        class: Some(0x01),
        id: Some(0x61),
    };
    let record = ubx::decode_packet(&packet).expect("decode");
    let json = serde_json::to_value(&record).expect("serialize");
    assert_eq!(json["message"], "UBX-NAV-EOE");
    assert_eq!(json["header"][0]["name"], "iTOW");
    assert_eq!(json["header"][0]["value"], 5_000);
}

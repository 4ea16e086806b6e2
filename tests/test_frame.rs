/// Framing conformance and stream reassembly tests

use wire_buffer::{BufferError, FrameConfig, FrameReader, FrameWriter, FRAME_HEADER_SIZE};

fn create_frame(payload_size: usize, fill: u8) -> Vec<u8> {
    FrameWriter::encode(&vec![fill; payload_size], &FrameConfig::default()).unwrap()
}

fn reader() -> FrameReader {
    FrameReader::new(&FrameConfig::default(), 64)
}

#[test]
fn test_header_counts_itself() {
    let frame = create_frame(10, 0xAA);
    assert_eq!(frame.len(), 12);
    assert_eq!(&frame[..FRAME_HEADER_SIZE], &[0x00, 0x0C]);
}

#[test]
fn test_decode_multiple_frames_in_one_feed() {
    let mut stream = create_frame(3, 1);
    stream.extend_from_slice(&create_frame(0, 0));
    stream.extend_from_slice(&create_frame(5, 2));

    let mut reader = reader();
    reader.feed(&stream);

    assert_eq!(reader.next_frame().unwrap(), Some(vec![1, 1, 1]));
    assert_eq!(reader.next_frame().unwrap(), Some(vec![]));
    assert_eq!(reader.next_frame().unwrap(), Some(vec![2; 5]));
    assert_eq!(reader.next_frame().unwrap(), None);
    assert_eq!(reader.buffered(), 0);
}

#[test]
fn test_frame_split_across_feeds() {
    let frame = create_frame(20, 7);
    let mut reader = reader();

    // header split in the middle
    reader.feed(&frame[..1]);
    assert_eq!(reader.next_frame().unwrap(), None);
    reader.feed(&frame[1..10]);
    assert_eq!(reader.next_frame().unwrap(), None);
    reader.feed(&frame[10..]);
    assert_eq!(reader.next_frame().unwrap(), Some(vec![7; 20]));
}

#[test]
fn test_byte_at_a_time() {
    let mut stream = create_frame(4, 3);
    stream.extend_from_slice(&create_frame(2, 4));

    let mut reader = reader();
    let mut frames = Vec::new();
    for byte in &stream {
        reader.feed(std::slice::from_ref(byte));
        while let Some(frame) = reader.next_frame().unwrap() {
            frames.push(frame);
        }
    }

    assert_eq!(frames, vec![vec![3; 4], vec![4; 2]]);
}

#[test]
fn test_reader_grows_for_large_frame() {
    let frame = create_frame(1000, 9);
    let mut reader = FrameReader::new(&FrameConfig::default(), 8);
    assert_eq!(reader.feed(&frame), frame.len());
    let payload = reader.next_frame().unwrap().unwrap();
    assert_eq!(payload.len(), 1000);
}

#[test]
fn test_declared_length_too_large() {
    let config = FrameConfig { max_frame_size: 16 };
    let mut reader = FrameReader::new(&config, 32);
    reader.feed(&[0x00, 0x20]);
    let result = reader.next_frame();
    assert_eq!(
        result,
        Err(BufferError::InvalidFrameLength { declared: 32, max: 16 })
    );
}

#[test]
fn test_declared_length_below_header() {
    let mut reader = reader();
    reader.feed(&[0x00, 0x00, 0x01]);
    assert!(matches!(
        reader.next_frame(),
        Err(BufferError::InvalidFrameLength { declared: 0, .. })
    ));
}

#[test]
fn test_encode_rejects_oversized_payload() {
    let config = FrameConfig { max_frame_size: 10 };
    let result = FrameWriter::encode(&[0u8; 9], &config);
    assert!(matches!(result, Err(BufferError::FrameTooLarge { size: 11, max: 10 })));
}

#[test]
fn test_decode_stream() {
    let mut stream = create_frame(1, 1);
    stream.extend_from_slice(&create_frame(2, 2));

    let mut reader = reader();
    reader.feed(&stream);

    let mut total = 0;
    let result = reader.decode_stream(|payload| {
        total += payload.len();
        true
    });

    assert_eq!(result, Ok(2));
    assert_eq!(total, 3);
}

#[test]
fn test_decode_stream_stops_on_callback_false() {
    let mut stream = create_frame(1, 1);
    stream.extend_from_slice(&create_frame(1, 2));
    stream.extend_from_slice(&create_frame(1, 3));

    let mut reader = reader();
    reader.feed(&stream);

    let mut seen = Vec::new();
    let result = reader.decode_stream(|payload| {
        seen.push(payload[0]);
        seen.len() < 2
    });

    assert_eq!(result, Ok(2));
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(reader.next_frame().unwrap(), Some(vec![3]));
}

#[test]
fn test_decode_stream_partial_tail_kept() {
    let mut stream = create_frame(2, 5);
    let second = create_frame(6, 6);
    stream.extend_from_slice(&second[..4]);

    let mut reader = reader();
    reader.feed(&stream);
    assert_eq!(reader.decode_stream(|_| true), Ok(1));
    assert_eq!(reader.buffered(), 4);

    reader.feed(&second[4..]);
    assert_eq!(reader.next_frame().unwrap(), Some(vec![6; 6]));
}

#[test]
fn test_writer_structured_payload() {
    let mut writer = FrameWriter::new(&FrameConfig::default()).unwrap();
    writer
        .write(1u8)
        .and_then(|w| w.write(0x0102_0304u32))
        .and_then(|w| w.put(b"ok"))
        .unwrap();
    let frame = writer.finish().unwrap();

    let mut reader = reader();
    reader.feed(&frame);
    let payload = reader.next_frame().unwrap().unwrap();
    assert_eq!(payload, vec![1, 1, 2, 3, 4, b'o', b'k']);
    assert_eq!(reader.stats().total_bytes(), frame.len() as u64);
}

#[test]
fn test_writer_rejects_config_outside_header_range() {
    let too_large = FrameConfig { max_frame_size: 70_000 };
    assert!(matches!(FrameWriter::new(&too_large), Err(BufferError::Config(_))));
    assert!(matches!(
        FrameWriter::encode(&[7u8; 65_536], &too_large),
        Err(BufferError::Config(_))
    ));

    let too_small = FrameConfig { max_frame_size: 1 };
    assert!(matches!(FrameWriter::new(&too_small), Err(BufferError::Config(_))));
}

#[test]
fn test_largest_encodable_frame() {
    let frame = create_frame(65_533, 7);
    assert_eq!(frame.len(), 65_535);
    assert_eq!(&frame[..FRAME_HEADER_SIZE], &[0xFF, 0xFF]);

    let result = FrameWriter::encode(&vec![7u8; 65_534], &FrameConfig::default());
    assert_eq!(result, Err(BufferError::FrameTooLarge { size: 65_536, max: 65_535 }));

    // An out-of-range reader limit is clamped to what the header can express
    let mut reader = FrameReader::new(&FrameConfig { max_frame_size: 100_000 }, 16);
    assert_eq!(reader.feed(&frame), frame.len());
    assert_eq!(reader.capacity(), 65_535);
    assert_eq!(reader.next_frame().unwrap(), Some(vec![7; 65_533]));
}

#[test]
fn test_feed_growth_bounded_by_max_frame_size() {
    let config = FrameConfig { max_frame_size: 64 };
    let mut stream = Vec::new();
    for i in 0..10u8 {
        stream.extend_from_slice(&FrameWriter::encode(&[i; 28], &config).unwrap());
    }
    assert_eq!(stream.len(), 300);

    let mut reader = FrameReader::new(&config, 16);
    assert_eq!(reader.feed(&stream), 64);
    assert_eq!(reader.capacity(), 64);

    let mut offset = 64;
    let mut frames = Vec::new();
    loop {
        while let Some(frame) = reader.next_frame().unwrap() {
            frames.push(frame);
        }
        if offset == stream.len() {
            break;
        }
        offset += reader.feed(&stream[offset..]);
        assert!(reader.capacity() <= 64);
    }

    assert_eq!(frames.len(), 10);
    assert_eq!(frames[9], vec![9; 28]);
    assert_eq!(reader.buffered(), 0);
}

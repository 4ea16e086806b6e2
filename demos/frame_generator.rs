/// Synthetic framed stream generator
///
/// Encodes random records as length-prefixed frames and writes the stream to a
/// file or stdout, then reads it back through a `FrameReader` in transport-sized
/// chunks. Useful for testing and benchmarking.
///
/// Usage: frame_generator [output_path|stdout] [frame_count]

use std::env;
use std::fs::{self, File};
use std::io::Write;

use rand::Rng;
use wire_buffer::{BufferConfig, FrameReader, FrameWriter, ReadCursor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let output_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "/tmp/frame_generator.bin".to_string()
    };

    let frame_count: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(10000)
    } else {
        10000
    };

    let config = BufferConfig::from_env()?;
    config.validate_strict()?;

    let mut output: Box<dyn Write> = if output_path == "stdout" {
        Box::new(std::io::stdout())
    } else {
        Box::new(File::create(&output_path)?)
    };

    let mut rng = rand::thread_rng();
    let mut writer = FrameWriter::new(&config.frame)?;
    let mut total_bytes = 0usize;

    eprintln!("Generating {} frames to {}", frame_count, output_path);

    for seq in 0..frame_count {
        // Record: u32 sequence, u8 kind, i64 price, u32 quantity, symbol bytes
        let symbol_len = rng.gen_range(3usize..12);
        let symbol: Vec<u8> = (0..symbol_len).map(|_| rng.gen_range(b'A'..=b'Z')).collect();

        writer
            .write(seq as u32)
            .and_then(|w| w.write(rng.gen_range(1u8..=4)))
            .and_then(|w| w.write(rng.gen_range(-500_000000i64..500_000000i64)))
            .and_then(|w| w.write(rng.gen_range(1u32..1000)))
            .and_then(|w| w.put(&symbol))?;

        let frame = writer.finish()?;
        total_bytes += frame.len();
        output.write_all(&frame)?;

        if seq % 1000 == 0 && seq > 0 {
            eprintln!("Generated {} frames", seq);
        }
    }
    output.flush()?;

    eprintln!("Generation complete: {} frames, {} bytes", frame_count, total_bytes);

    if output_path == "stdout" {
        return Ok(());
    }

    // Read the file back in fragment-sized chunks
    let stream = fs::read(&output_path)?;
    let mut reader = FrameReader::new(&config.frame, config.initial_capacity);
    let mut decoded = 0usize;
    let mut last_seq = None;

    for chunk in stream.chunks(config.pool.fragment_size) {
        let mut pending = chunk;
        while !pending.is_empty() {
            let accepted = reader.feed(pending);
            pending = &pending[accepted..];
            reader.decode_stream(|payload| {
                let mut record = ReadCursor::new(payload.to_vec());
                if let Ok(seq) = record.read::<u32>() {
                    last_seq = Some(seq);
                }
                decoded += 1;
                true
            })?;
        }
    }

    eprintln!("Verified {} frames, last sequence {:?}", decoded, last_seq);
    reader.stats().log_summary();

    Ok(())
}

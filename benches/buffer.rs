/// Scalar read/write throughput and buffer maintenance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wire_buffer::ByteBuffer;

// Fixed-layout record: u8 type, u16 length, u32 sequence, i64 price, u32 quantity
const RECORD_SIZE: usize = 19;

fn fill_records(buf: &mut ByteBuffer, count: usize) {
    for seq in 0..count {
        buf.write_u8(1)
            .write_u16(RECORD_SIZE as u16)
            .write_u32(seq as u32)
            .write_i64(100_00000000 + seq as i64)
            .write_u32(100);
    }
}

fn bench_write_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_records");

    for count in [100, 1000, 10000].iter() {
        let mut buf = ByteBuffer::new(count * RECORD_SIZE);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                buf.rewind();
                fill_records(&mut buf, count);
                black_box(buf.write_position())
            });
        });
    }
    group.finish();
}

fn bench_read_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_records");

    for count in [100, 1000, 10000].iter() {
        let mut buf = ByteBuffer::new(count * RECORD_SIZE);
        fill_records(&mut buf, *count);
        buf.flip();

        group.bench_with_input(BenchmarkId::new("checked", count), count, |b, _| {
            b.iter(|| {
                buf.rewind();
                let mut sum = 0i64;
                while buf.remaining() >= RECORD_SIZE {
                    let _kind = buf.read_u8().unwrap();
                    let _len = buf.read_u16().unwrap();
                    let _seq = buf.read_u32().unwrap();
                    sum = sum.wrapping_add(buf.read_i64().unwrap());
                    let _qty = buf.read_u32().unwrap();
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("unchecked", count), count, |b, _| {
            b.iter(|| {
                buf.rewind();
                let mut sum = 0i64;
                while buf.remaining() >= RECORD_SIZE {
                    let _kind: u8 = buf.read_unchecked();
                    let _len: u16 = buf.read_unchecked();
                    let _seq: u32 = buf.read_unchecked();
                    sum = sum.wrapping_add(buf.read_unchecked::<i64>());
                    let _qty: u32 = buf.read_unchecked();
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

fn bench_single_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_scalar");
    let mut buf = ByteBuffer::new(8);

    group.bench_function("write_u64", |b| {
        b.iter(|| {
            buf.clear_limit();
            buf.rewind();
            buf.write_u64(black_box(0x0102_0304_0506_0708));
        })
    });

    buf.flip();
    group.bench_function("read_u64_at", |b| b.iter(|| buf.read_u64_at(black_box(0))));

    group.finish();
}

fn bench_maintenance(c: &mut Criterion) {
    let mut group = c.benchmark_group("maintenance");

    group.bench_function("compact_half_read", |b| {
        let mut buf = ByteBuffer::new(4096);
        b.iter(|| {
            buf.clear();
            buf.put(&[0xAB; 4096]);
            buf.flip();
            buf.set_read_position(2048).unwrap();
            buf.compact();
            black_box(buf.write_position())
        });
    });

    group.bench_function("reserve_growth", |b| {
        b.iter(|| {
            let mut buf = ByteBuffer::new(64);
            for _ in 0..64 {
                buf.reserve(64);
                buf.put(&[0u8; 64]);
            }
            black_box(buf.capacity())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_write_records,
    bench_read_records,
    bench_single_scalar,
    bench_maintenance
);
criterion_main!(benches);

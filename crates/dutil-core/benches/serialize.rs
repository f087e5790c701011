use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dutil_core::{checksum, SerializeBuffer};

fn sample(records: usize) -> SerializeBuffer {
    let mut buf = SerializeBuffer::new();
    for i in 0..records {
        buf.write_u32(i as u32).unwrap();
        buf.write_i64(-(i as i64)).unwrap();
        buf.write_string(format!("record-{}", i)).unwrap();
    }
    buf
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_write");
    for &n in &[256usize, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(sample(n).len()));
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_read");
    for &n in &[256usize, 4096] {
        let mut buf = sample(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                buf.rewind();
                for _ in 0..n {
                    black_box(buf.read_u32().unwrap());
                    black_box(buf.read_i64().unwrap());
                    black_box(buf.read_string().unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_base64_and_seal(c: &mut Criterion) {
    let buf = sample(4096);
    c.bench_function("serialize_to_base64_4096", |b| b.iter(|| black_box(buf.to_base64())));
    let text = buf.to_base64();
    c.bench_function("serialize_from_base64_4096", |b| {
        b.iter(|| black_box(SerializeBuffer::from_base64(&text).unwrap()))
    });
    c.bench_function("serialize_seal_4096", |b| b.iter(|| black_box(buf.seal().unwrap())));
    c.bench_function("checksum_64k", |b| {
        let data = vec![0xA5u8; 64 * 1024];
        b.iter(|| black_box(checksum(&data)))
    });
}

criterion_group!(benches, bench_write, bench_read, bench_base64_and_seal);
criterion_main!(benches);

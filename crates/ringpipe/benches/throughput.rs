use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use ringpipe::{pipe, Config, RingBuffer};
use std::io;
use std::thread;

const STREAM_LEN: usize = 1 << 20; // 1 MiB per iteration

fn random_stream(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

fn bench_pipeline(c: &mut Criterion) {
    let data = random_stream(STREAM_LEN);
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(STREAM_LEN as u64));
    group.sample_size(20);

    for (capacity, chunk_size) in [(64, 5), (4096, 5), (4096, 512), (65536, 4096)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("cap{}_chunk{}", capacity, chunk_size)),
            &(capacity, chunk_size),
            |b, &(capacity, chunk_size)| {
                b.iter(|| {
                    let config = Config::new(capacity).with_chunk_size(chunk_size);
                    let report = pipe(&data[..], io::sink(), config).unwrap();
                    black_box(report);
                });
            },
        );
    }

    group.finish();
}

fn bench_ring_handoff(c: &mut Criterion) {
    const BYTES: usize = 1 << 16;
    let mut group = c.benchmark_group("ring");
    group.throughput(Throughput::Bytes(BYTES as u64));

    for capacity in [1usize, 16, 1024] {
        group.bench_with_input(
            BenchmarkId::new("put_get", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let ring = RingBuffer::new(capacity).unwrap();
                    thread::scope(|s| {
                        s.spawn(|| {
                            for i in 0..BYTES {
                                ring.put(i as u8).unwrap();
                            }
                            ring.close();
                        });

                        let mut sum = 0u64;
                        while let Some(byte) = ring.get() {
                            sum += u64::from(byte);
                        }
                        black_box(sum);
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_ring_handoff);
criterion_main!(benches);

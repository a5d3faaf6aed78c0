use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use esp_core::{EspEngine, SaMode};

const SPI: u32 = 0x1001;

fn setup_engine() -> EspEngine {
    let engine = EspEngine::new();
    engine
        .provision_sa(SPI, SaMode::Transport, [0x11; 16], [0x22; 32])
        .unwrap();
    engine
}

fn bench_encapsulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("encapsulate");

    for size in [64usize, 1500] {
        let engine = setup_engine();
        let payload = vec![0xABu8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| engine.encapsulate(SPI, payload).unwrap());
        });
    }

    group.finish();
}

fn bench_decapsulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("decapsulate");

    for size in [64usize, 1500] {
        let sender = setup_engine();
        let payload = vec![0xABu8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            // Fresh receiver per iteration batch so replay protection
            // never trips on repeated sequence numbers.
            b.iter_batched(
                || {
                    let receiver = setup_engine();
                    let packet = sender.encapsulate(SPI, payload).unwrap();
                    (receiver, packet)
                },
                |(receiver, packet)| receiver.decapsulate(SPI, &packet).unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encapsulate, bench_decapsulate);
criterion_main!(benches);

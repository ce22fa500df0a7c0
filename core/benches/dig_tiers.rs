use std::hint::black_box;

use chrono::DateTime;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tilesweep_core::*;

fn generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for difficulty in Difficulty::ALL {
        let config = difficulty.config();
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &config,
            |b, &config| {
                let mut generator = RandomMineGenerator::new(0x5eed);
                b.iter(|| generator.generate(black_box(config), Some((0, 0))));
            },
        );
    }
    group.finish();
}

fn first_dig(c: &mut Criterion) {
    let now = DateTime::from_timestamp_millis(0).expect("epoch is representable");
    let mut group = c.benchmark_group("first_dig");
    for difficulty in Difficulty::ALL {
        let (rows, cols) = difficulty.config().size;
        let center = (rows / 2, cols / 2);
        group.bench_function(BenchmarkId::from_parameter(difficulty), |b| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let mut engine = GridEngine::new_game(difficulty, seed);
                black_box(engine.dig_cell(center, now))
            });
        });
    }
    group.finish();
}

fn codec(c: &mut Criterion) {
    let now = DateTime::from_timestamp_millis(0).expect("epoch is representable");
    let mut engine = GridEngine::new_game(Difficulty::Huge, 7);
    engine
        .dig_cell((24, 14), now)
        .expect("first dig is always accepted");
    let encoded = encode(&engine, now);

    c.bench_function("encode_huge", |b| b.iter(|| encode(black_box(&engine), now)));
    c.bench_function("decode_huge", |b| {
        b.iter(|| decode(black_box(&encoded), 0))
    });
}

criterion_group!(benches, generation, first_dig, codec);
criterion_main!(benches);

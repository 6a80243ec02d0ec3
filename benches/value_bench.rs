use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sql_stress_gen::rows::{OrderMode, RowComposer};
use sql_stress_gen::schema::{Column, ColumnType, FlagRate};
use sql_stress_gen::value::{encode_base62, ValueGen};
use std::hint::black_box;

fn columns() -> Vec<Column> {
    vec![
        Column {
            name: "id".to_string(),
            ty: ColumnType::Int,
        },
        Column {
            name: "height".to_string(),
            ty: ColumnType::Real,
        },
        Column {
            name: "nickname".to_string(),
            ty: ColumnType::Text(16),
        },
    ]
}

fn bench_base62(c: &mut Criterion) {
    let mut group = c.benchmark_group("base62");
    for size in [1_000u64, 100_000, 10_000_000] {
        group.bench_with_input(BenchmarkId::new("encode", size), &size, |b, &size| {
            b.iter(|| {
                for i in (0..size).step_by(97) {
                    black_box(encode_base62(black_box(i)));
                }
            });
        });
    }
    group.finish();
}

fn bench_value_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("values");
    let gens = [ValueGen::Int, ValueGen::Real, ValueGen::Text { max_len: 16 }];
    for (name, gen) in ["int", "real", "text"].iter().zip(gens) {
        group.bench_function(*name, |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            b.iter(|| {
                for i in 0..10_000u64 {
                    black_box(gen.value(black_box(i), &mut rng).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_row_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("rows");
    let cols = columns();
    for rows in [10_000u64, 100_000] {
        group.throughput(Throughput::Elements(rows));
        for mode in [OrderMode::Sequential, OrderMode::Random] {
            group.bench_with_input(
                BenchmarkId::new(mode.suffix(), rows),
                &rows,
                |b, &rows| {
                    b.iter(|| {
                        let mut rng = ChaCha8Rng::seed_from_u64(42);
                        let composer =
                            RowComposer::new(&cols, rows, mode, &FlagRate::ALL, &mut rng);
                        for row in composer {
                            black_box(row.unwrap());
                        }
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_base62,
    bench_value_generation,
    bench_row_composition
);
criterion_main!(benches);

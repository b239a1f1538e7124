use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use reebpair::{
    ComparisonConfig, VertexTable, compare_diagrams, count_loops, extract,
    bench_utils::{TableShape, generate_tables},
    serialize::to_csv,
};

const RANDOM_SEED: u64 = 0x5EED;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);
const COMPONENTS: usize = 16;

struct ReadyTables {
    label: String,
    tables: Vec<VertexTable>,
}

fn bench_scales() -> &'static [usize] {
    &[1_000, 10_000, 50_000]
}

fn random_cases() -> Vec<ReadyTables> {
    bench_scales()
        .iter()
        .map(|&vertices| ReadyTables {
            label: format!("random_{vertices}"),
            tables: generate_tables(
                TableShape::Random { essential_every: 50 },
                COMPONENTS,
                vertices / COMPONENTS,
                RANDOM_SEED + vertices as u64,
            ),
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let cases = random_cases();
    let mut group = c.benchmark_group("extract");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in &cases {
        group.bench_function(BenchmarkId::from_parameter(&case.label), |b| {
            b.iter(|| extract(&case.tables));
        });
    }
    group.finish();
}

fn bench_csv(c: &mut Criterion) {
    let cases = random_cases();
    let mut group = c.benchmark_group("csv");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in &cases {
        let diagram = extract(&case.tables);
        group.bench_function(BenchmarkId::from_parameter(&case.label), |b| {
            b.iter(|| to_csv(&diagram));
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let cases = random_cases();
    let mut group = c.benchmark_group("compare");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in &cases {
        let base = extract(&case.tables);
        let other = extract(&case.tables);
        group.bench_function(BenchmarkId::from_parameter(&case.label), |b| {
            b.iter(|| compare_diagrams(&base, &other, &ComparisonConfig::strict()));
        });
    }
    group.finish();
}

fn bench_loops(c: &mut Criterion) {
    let case = generate_tables(TableShape::Chain, COMPONENTS, 3_001, RANDOM_SEED);
    let mut group = c.benchmark_group("loops");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    group.bench_function("chain", |b| {
        b.iter(|| count_loops(&case));
    });
    group.finish();
}

criterion_group!(
    name = extract_benches;
    config = Criterion::default();
    targets = bench_extract, bench_csv, bench_compare, bench_loops
);
criterion_main!(extract_benches);

//! Recommendation Benchmarks
//!
//! Benchmarks for candidate enumeration and full pipeline runs.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use vizspec::pipeline::{DatasetCache, MemorySink, Pipeline, RecommendationRequest, SchemaRegistry};
use vizspec::{
    enumerate, Column, DataTable, EnumerationConfig, FieldId, FieldSchema, FieldSet,
    RecommendationType,
};

const TYPES: [RecommendationType; 4] = [
    RecommendationType::Baseline,
    RecommendationType::Subset,
    RecommendationType::Exact,
    RecommendationType::Expanded,
];

/// Alternating categorical and quantitative fields
fn create_schemas(n_fields: u64) -> Vec<FieldSchema> {
    (0..n_fields)
        .map(|i| {
            if i % 2 == 0 {
                FieldSchema::categorical(i, format!("cat_{}", i))
            } else {
                FieldSchema::quantitative(i, format!("num_{}", i))
            }
        })
        .collect()
}

/// Create a test table matching `create_schemas`
fn create_test_table(n_rows: usize, n_fields: u64) -> DataTable {
    let mut rng_state: u64 = 42;
    let mut rand_f64 = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (rng_state >> 33) as f64 / (u32::MAX as f64)
    };

    let columns = (0..n_fields)
        .map(|i| {
            if i % 2 == 0 {
                let labels: Vec<String> = (0..n_rows)
                    .map(|_| format!("g{}", (rand_f64() * 8.0) as u32))
                    .collect();
                Column::text(format!("cat_{}", i), labels)
            } else {
                let values: Vec<f64> = (0..n_rows).map(|_| rand_f64() * 1000.0).collect();
                Column::numeric(format!("num_{}", i), values)
            }
        })
        .collect();

    DataTable::new(columns).unwrap()
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("Enumeration");
    let config = EnumerationConfig::default();

    for n_fields in [4u64, 8, 16].iter() {
        let fields = FieldSet::new(create_schemas(*n_fields)).unwrap();
        let selected = [FieldId(0), FieldId(1), FieldId(2)];

        group.bench_with_input(BenchmarkId::new("all_types", n_fields), &fields, |b, fields| {
            b.iter(|| {
                let candidates = enumerate(
                    std::hint::black_box(fields),
                    &selected,
                    &TYPES,
                    &config,
                )
                .unwrap();
                std::hint::black_box(candidates.len())
            });
        });
    }

    group.finish();
}

fn bench_pipeline_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pipeline Run");
    group.sample_size(20);

    for n_rows in [100usize, 1_000, 10_000].iter() {
        let cache = DatasetCache::new();
        cache.insert("bench", create_test_table(*n_rows, 6)).unwrap();
        let schemas = SchemaRegistry::new();
        schemas.register("bench", create_schemas(6)).unwrap();
        let sink = MemorySink::new();
        let pipeline = Pipeline::new(&schemas, &cache, &sink);
        let request = RecommendationRequest::new("bench", TYPES.to_vec()).select([0, 1]);

        group.bench_with_input(BenchmarkId::new("rows", n_rows), &request, |b, request| {
            b.iter(|| {
                let specs = pipeline.run(std::hint::black_box(request)).unwrap();
                std::hint::black_box(specs.len())
            });
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Batch Run");

    let cache = DatasetCache::new();
    cache.insert("bench", create_test_table(1_000, 6)).unwrap();
    let schemas = SchemaRegistry::new();
    schemas.register("bench", create_schemas(6)).unwrap();
    let sink = MemorySink::new();
    let pipeline = Pipeline::new(&schemas, &cache, &sink);

    let requests: Vec<RecommendationRequest> = (0..6u64)
        .map(|i| RecommendationRequest::new("bench", TYPES.to_vec()).select([i]))
        .collect();

    group.bench_function("six_requests", |b| {
        b.iter(|| {
            let results = pipeline.run_batch(std::hint::black_box(&requests));
            std::hint::black_box(results.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_enumeration, bench_pipeline_run, bench_batch);

criterion_main!(benches);

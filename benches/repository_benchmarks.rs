//! Repository benchmarks
//!
//! Benchmarks for the experiment logging hot paths:
//! - Record encode / decode
//! - Child logging (parameters, metrics)
//! - Experiment listing and tag queries
//! - Dataframe (Parquet) payload encoding
//!
//! Toyota Way: Measure before optimizing (Genchi Genbutsu)

use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rubicon_db::backend::MemoryBackend;
use rubicon_db::codec::{self, parquet};
use rubicon_db::experiment::{ExperimentRecord, MetricRecord, ParameterRecord, ProjectRecord};
use rubicon_db::identity::Identity;
use rubicon_db::repository::{MatchMode, Repository};
use tokio::runtime::Runtime;

/// Create a test RecordBatch with specified number of rows
#[allow(clippy::cast_precision_loss)]
fn create_test_batch(num_rows: i32) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("epoch", DataType::Int32, false),
        Field::new("loss", DataType::Float64, false),
    ]);

    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int32Array::from_iter_values(0..num_rows)),
            Arc::new(Float64Array::from_iter_values(
                (0..num_rows).map(|i| 1.0 / (f64::from(i) + 1.0)),
            )),
        ],
    )
    .unwrap()
}

/// Repository with one project holding `experiments` tagged experiments
fn populated_repository(rt: &Runtime, experiments: usize) -> (Repository<MemoryBackend>, Identity) {
    rt.block_on(async {
        let repo = Repository::new(MemoryBackend::isolated("bench"));
        repo.create_project(ProjectRecord::new("bench")).await.unwrap();
        let mut last = None;
        for i in 0..experiments {
            let tag = if i % 2 == 0 { "even" } else { "odd" };
            let record = repo
                .create_experiment("bench", ExperimentRecord::builder().tag(tag))
                .await
                .unwrap();
            last = Some(record.identity().unwrap());
        }
        let last = last.unwrap_or_else(|| Identity::project("bench").unwrap());
        (repo, last)
    })
}

/// Benchmark the record envelope
fn bench_record_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_codec");

    let record = ExperimentRecord::builder()
        .name("baseline")
        .model_name("RandomForestClassifier")
        .tags(["success", "rf", "baseline"]);
    let rt = Runtime::new().unwrap();
    let (repo, _) = populated_repository(&rt, 0);
    let experiment = rt
        .block_on(repo.create_experiment("bench", record))
        .unwrap();
    let bytes = codec::encode(&experiment).unwrap();

    group.bench_function("encode_experiment", |b| {
        b.iter(|| black_box(codec::encode(&experiment).unwrap()));
    });
    group.bench_function("decode_experiment", |b| {
        b.iter(|| black_box(codec::decode::<ExperimentRecord>(&bytes).unwrap()));
    });

    group.finish();
}

/// Benchmark child logging on the memory backend
fn bench_child_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("child_logging");
    let rt = Runtime::new().unwrap();
    let (repo, experiment) = populated_repository(&rt, 1);

    group.bench_function("log_parameter", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                repo.log_parameter(&experiment, ParameterRecord::new("learning_rate", 0.01))
                    .await
                    .unwrap(),
            )
        });
    });

    group.bench_function("log_metric", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                repo.log_metric(&experiment, MetricRecord::new("accuracy", 0.94))
                    .await
                    .unwrap(),
            )
        });
    });

    group.finish();
}

/// Benchmark experiment listing and tag queries
fn bench_experiment_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("experiment_listing");
    let rt = Runtime::new().unwrap();

    for size in [10, 100, 500].iter() {
        let (repo, _) = populated_repository(&rt, *size);

        group.bench_with_input(BenchmarkId::new("list", size), size, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(repo.list_experiments("bench").await.unwrap()) });
        });

        group.bench_with_input(BenchmarkId::new("query_any", size), size, |b, _| {
            b.to_async(&rt).iter(|| async {
                black_box(
                    repo.query_experiments("bench", &["even"], MatchMode::Any)
                        .await
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

/// Benchmark dataframe payload encoding
fn bench_dataframe_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataframe_payload");

    for size in [1_000, 10_000, 100_000].iter() {
        let batch = create_test_batch(*size);
        let bytes = parquet::encode_batch(&batch).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), size, |b, _| {
            b.iter(|| black_box(parquet::encode_batch(&batch).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", size), size, |b, _| {
            b.iter(|| black_box(parquet::decode_batch(bytes.clone()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_codec,
    bench_child_logging,
    bench_experiment_listing,
    bench_dataframe_payload
);
criterion_main!(benches);

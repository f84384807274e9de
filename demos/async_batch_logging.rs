//! Async Batch Logging Example
//!
//! Demonstrates the asynchronous client against an object store:
//! - Fanning out many writes as one batch with `try_gather`
//! - Collecting per-call outcomes with `gather_settled`
//! - Running independent experiments as concurrent tasks
//!
//! The store defaults to the in-process `memory:///` provider. Point
//! RUBICON_URL at `s3://bucket/prefix` (with the `aws` feature) to log to
//! a real bucket.
//!
//! Run with: cargo run --example async_batch_logging

use anyhow::Result;
use rubicon_db::client::{gather_settled, try_gather, AsyncRubicon};
use rubicon_db::experiment::{ExperimentRecord, MetricRecord, ParameterRecord};
use rubicon_db::repository::{ChildFilter, MatchMode, RepositoryConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rubicon_db=info")),
        )
        .init();

    println!("=== Rubicon-DB Async Batch Logging ===\n");

    let url = std::env::var("RUBICON_URL").unwrap_or_else(|_| "memory:///rubicon".to_string());
    let rubicon = AsyncRubicon::from_config(&RepositoryConfig::object_store(url.clone()))?;
    info!(%url, "opened repository");

    let project = rubicon.get_or_create_project("Grid Search").await?;

    // -------------------------------------------------------------------------
    // 1. One task per grid point
    // -------------------------------------------------------------------------
    println!("1. Launching grid search...");

    let mut tasks = Vec::new();
    for (i, learning_rate) in [0.001, 0.01, 0.1].into_iter().enumerate() {
        for depth in [4_i32, 8] {
            let project = project.clone();
            tasks.push(tokio::spawn(async move {
                let experiment = project
                    .log_experiment(ExperimentRecord::builder().name(format!("lr{i}-d{depth}")).tag("grid"))
                    .await?;

                // Parameters go out as one batch
                try_gather([
                    experiment.log_parameter(ParameterRecord::new("learning_rate", learning_rate)),
                    experiment.log_parameter(ParameterRecord::new("max_depth", depth)),
                ])
                .await?;

                let loss = learning_rate * 10.0 / f64::from(depth);
                experiment.log_metric(MetricRecord::new("loss", loss)).await?;
                Ok::<_, rubicon_db::Error>(experiment.id().to_string())
            }));
        }
    }

    for task in tasks {
        let id = task.await??;
        println!("   Logged experiment {id}");
    }

    // -------------------------------------------------------------------------
    // 2. Partial failures in a batch
    // -------------------------------------------------------------------------
    println!("\n2. Logging a batch with an invalid metric name...");

    let experiment = project.log_experiment(ExperimentRecord::builder()).await?;
    let outcomes = gather_settled(
        ["precision", "recall", "f1/macro"]
            .into_iter()
            .map(|name| experiment.log_metric(MetricRecord::new(name, 0.9))),
    )
    .await;
    for outcome in &outcomes {
        match outcome {
            Ok(metric) => println!("   ok:     {}", rubicon_db::experiment::ChildRecord::name(metric)),
            Err(e) => println!("   failed: {e}"),
        }
    }

    // -------------------------------------------------------------------------
    // 3. Read everything back concurrently
    // -------------------------------------------------------------------------
    println!("\n3. Reading results...");

    let experiments = project.experiments(&["grid"], MatchMode::Any).await?;
    let filter = ChildFilter::new();
    let metrics = try_gather(experiments.iter().map(|e| e.metrics(&filter))).await?;
    for (experiment, metrics) in experiments.iter().zip(metrics) {
        for metric in metrics {
            println!(
                "   {:<10} loss = {}",
                experiment.record().name().unwrap_or("-"),
                metric.value()
            );
        }
    }

    println!("\n=== Done ===");
    Ok(())
}

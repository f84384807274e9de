//! Experiment Logging Example
//!
//! Demonstrates the blocking client:
//! - Creating a project on the local filesystem
//! - Logging experiments with parameters, features and metrics
//! - Storing an artifact and a dataframe
//! - Querying experiments by tag and reading everything back
//!
//! Run with: cargo run --example experiment_logging
//! (set RUST_LOG=rubicon_db=debug to see storage activity)

use std::sync::Arc;

use anyhow::Result;
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rubicon_db::client::Rubicon;
use rubicon_db::experiment::{
    ArtifactRecord, DataframeRecord, Directionality, ExperimentRecord, FeatureRecord, MetricRecord,
    ParameterRecord, ProjectRecord,
};
use rubicon_db::repository::{ChildFilter, MatchMode, RepositoryConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rubicon_db=info")),
        )
        .init();

    println!("=== Rubicon-DB Experiment Logging ===\n");

    let temp_dir = tempfile::tempdir()?;
    let config = RepositoryConfig::filesystem(temp_dir.path().display().to_string());
    let rubicon = Rubicon::from_config(&config)?;

    // -------------------------------------------------------------------------
    // 1. Create a project
    // -------------------------------------------------------------------------
    println!("1. Creating project...");

    let project = rubicon.create_project(
        ProjectRecord::builder("Iris Model")
            .description("classifying species of iris")
            .build(),
    )?;
    println!("   Project: {}", project.name());
    println!("   Created: {}", project.record().created_at());

    // -------------------------------------------------------------------------
    // 2. Log one experiment per hyperparameter setting
    // -------------------------------------------------------------------------
    println!("\n2. Logging experiments...");

    let features = ["sepal_length", "sepal_width", "petal_length", "petal_width"];
    let importances = [0.09, 0.02, 0.45, 0.44];

    for (n_estimators, accuracy) in [(10, 0.91), (50, 0.94), (100, 0.96)] {
        let mut experiment = project.log_experiment(
            ExperimentRecord::builder()
                .model_name("RandomForestClassifier")
                .tag("random-forest"),
        )?;

        experiment.log_parameter(ParameterRecord::new("n_estimators", n_estimators))?;
        experiment.log_parameter(ParameterRecord::new("criterion", "gini"))?;
        for (name, importance) in features.iter().zip(importances) {
            experiment.log_feature(FeatureRecord::new(*name).with_importance(importance))?;
        }
        experiment.log_metric(
            MetricRecord::builder("accuracy", accuracy)
                .directionality(Directionality::HigherIsBetter)
                .build(),
        )?;

        if accuracy > 0.95 {
            experiment.add_tags(&["success"])?;
        }
        println!(
            "   Experiment {} (n_estimators={n_estimators}, accuracy={accuracy})",
            experiment.id()
        );
    }

    // -------------------------------------------------------------------------
    // 3. Attach payloads to the project
    // -------------------------------------------------------------------------
    println!("\n3. Logging project artifacts...");

    let artifact = project.log_artifact(
        ArtifactRecord::new("iris.csv").with_content_type("text/csv"),
        b"sepal_length,sepal_width,petal_length,petal_width,species\n".to_vec(),
    )?;
    println!("   Artifact {} ({} bytes)", artifact.id(), artifact.size_bytes());

    let schema = Arc::new(Schema::new(vec![
        Field::new("feature", DataType::Utf8, false),
        Field::new("importance", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(features.to_vec())),
            Arc::new(Float64Array::from(importances.to_vec())),
        ],
    )?;
    let dataframe = project.log_dataframe(DataframeRecord::new("feature_importances"), &batch)?;
    println!(
        "   Dataframe {} ({} rows x {} columns)",
        dataframe.id(),
        dataframe.num_rows(),
        dataframe.num_columns()
    );

    // -------------------------------------------------------------------------
    // 4. Query and read back
    // -------------------------------------------------------------------------
    println!("\n4. Querying experiments tagged 'success'...");

    let reopened = Rubicon::from_config(&config)?;
    let project = reopened.get_project("Iris Model")?;
    for experiment in project.experiments(&["success"], MatchMode::Any)? {
        let accuracy = experiment.metric("accuracy")?;
        let n_estimators = experiment.parameter("n_estimators")?;
        let features = experiment.features(&ChildFilter::new())?;
        println!(
            "   {} -> accuracy {}, n_estimators {}, {} features",
            experiment.id(),
            accuracy.value(),
            n_estimators.value(),
            features.len()
        );
    }

    let total = project.experiments::<&str>(&[], MatchMode::Any)?.len();
    println!("   {total} experiments logged in total");

    let restored = project.dataframe_data(dataframe.id())?;
    println!("   Feature importances read back: {} rows", restored.num_rows());

    println!("\n=== Done ===");
    Ok(())
}

//! Entity client layer tests (blocking and async handles)

use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rubicon_db::client::{gather_settled, AsyncRubicon, Rubicon};
use rubicon_db::experiment::{
    ArtifactRecord, DataframeRecord, ExperimentRecord, FeatureRecord, MetricRecord, ParameterRecord,
    ProjectRecord,
};
use rubicon_db::repository::{ChildFilter, MatchMode, RepositoryConfig};
use rubicon_db::Error;

fn importances() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("feature", DataType::Utf8, false),
        Field::new("importance", DataType::Float64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["petal_length", "petal_width"])),
            Arc::new(Float64Array::from(vec![Some(0.45), None])),
        ],
    )
    .unwrap()
}

fn filesystem_config(dir: &tempfile::TempDir) -> RepositoryConfig {
    RepositoryConfig::filesystem(dir.path().display().to_string())
}

#[test]
fn test_blocking_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let rubicon = Rubicon::from_config(&filesystem_config(&dir)).unwrap();

    let project = rubicon
        .create_project(ProjectRecord::builder("Iris Model").description("irises").build())
        .unwrap();
    let mut experiment = project
        .log_experiment(ExperimentRecord::builder().model_name("RandomForestClassifier"))
        .unwrap();

    experiment.log_parameter(ParameterRecord::new("n_estimators", 100)).unwrap();
    experiment
        .log_feature(FeatureRecord::new("petal_length").with_importance(0.45))
        .unwrap();
    experiment.log_metric(MetricRecord::new("accuracy", 0.94)).unwrap();
    let artifact = experiment
        .log_artifact(ArtifactRecord::new("model.pkl"), b"weights".to_vec())
        .unwrap();
    let dataframe = experiment
        .log_dataframe(DataframeRecord::new("importances"), &importances())
        .unwrap();
    experiment.add_tags(&["success", "rf"]).unwrap();

    let all = ChildFilter::new();
    assert_eq!(experiment.parameter("n_estimators").unwrap().value().as_i64(), Some(100));
    assert_eq!(experiment.features(&all).unwrap().len(), 1);
    assert_eq!(experiment.metrics(&all).unwrap().len(), 1);
    assert_eq!(experiment.artifact_data(artifact.id()).unwrap(), b"weights".to_vec());
    assert_eq!(experiment.dataframe_data(dataframe.id()).unwrap().num_rows(), 2);

    let reopened = Rubicon::from_config(&filesystem_config(&dir)).unwrap();
    let found = reopened
        .get_project("Iris Model")
        .unwrap()
        .experiments(&["rf"], MatchMode::Any)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), experiment.id());
    assert!(found[0].record().tags().contains("success"));
}

#[test]
fn test_blocking_project_level_children() {
    let rubicon = Rubicon::from_config(&RepositoryConfig::object_store("memory:///clients")).unwrap();
    let project = rubicon.get_or_create_project("p").unwrap();

    let artifact = project
        .log_artifact(ArtifactRecord::new("dataset.csv").with_tags(["raw"]), b"a,b\n1,2\n".to_vec())
        .unwrap();
    project
        .log_dataframe(DataframeRecord::new("summary"), &importances())
        .unwrap();

    assert_eq!(project.artifacts(&ChildFilter::new().tags(["raw"])).unwrap().len(), 1);
    assert_eq!(project.artifact_data(artifact.id()).unwrap(), b"a,b\n1,2\n".to_vec());
    assert_eq!(project.dataframes(&ChildFilter::new()).unwrap().len(), 1);

    project.delete().unwrap();
    assert!(rubicon.get_project("p").unwrap_err().is_not_found());
    assert!(rubicon.projects().unwrap().is_empty());
}

#[test]
fn test_blocking_and_async_share_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = filesystem_config(&dir);

    let rubicon = Rubicon::from_config(&config).unwrap();
    let project = rubicon.create_project(ProjectRecord::new("shared")).unwrap();
    let experiment = project.log_experiment(ExperimentRecord::builder()).unwrap();
    experiment.log_metric(MetricRecord::new("f1", 0.5)).unwrap();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let metric = runtime.block_on(async {
        let client = AsyncRubicon::from_config(&config)?;
        let project = client.get_project("shared").await?;
        let experiment = project.experiment(experiment.id()).await?;
        experiment.metric("f1").await
    });
    assert_eq!(metric.unwrap().value().as_f64(), Some(0.5));
}

#[tokio::test]
async fn test_async_batch_with_failures() {
    let client = AsyncRubicon::from_config(&RepositoryConfig::object_store("memory:///batch")).unwrap();
    let project = client.create_project(ProjectRecord::new("p")).await.unwrap();
    let experiment = project.log_experiment(ExperimentRecord::builder()).await.unwrap();

    let names = ["precision", "bad/name", "recall", ".hidden"];
    let outcomes = gather_settled(
        names
            .iter()
            .map(|name| experiment.log_metric(MetricRecord::new(*name, 1.0))),
    )
    .await;

    let failures = outcomes
        .iter()
        .filter(|r| matches!(r, Err(Error::Identity { .. })))
        .count();
    assert_eq!(failures, 2);

    let stored: Vec<String> = experiment
        .metrics(&ChildFilter::new())
        .await
        .unwrap()
        .into_iter()
        .map(|m| rubicon_db::experiment::ChildRecord::name(&m).to_string())
        .collect();
    assert_eq!(stored.len(), 2);
    assert!(stored.contains(&"precision".to_string()));
    assert!(stored.contains(&"recall".to_string()));
}

#[tokio::test]
async fn test_async_experiment_delete() {
    let client = AsyncRubicon::from_config(&RepositoryConfig::object_store("memory:///delete")).unwrap();
    let project = client.get_or_create_project("p").await.unwrap();
    let experiment = project.log_experiment(ExperimentRecord::builder()).await.unwrap();
    experiment
        .log_parameter(ParameterRecord::new("lr", 0.01))
        .await
        .unwrap();
    let id = experiment.id().to_string();

    experiment.delete().await.unwrap();

    assert!(project.experiment(&id).await.unwrap_err().is_not_found());
    assert!(project
        .experiments::<&str>(&[], MatchMode::Any)
        .await
        .unwrap()
        .is_empty());
}

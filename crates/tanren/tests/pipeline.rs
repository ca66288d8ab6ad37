use std::fs;

use tanren::{
    ArtifactKind, BackendConfig, Corpus, Pipeline, PipelineEvent, PipelineState, Provenance,
    Stage, TrainerConfig,
};

#[test]
fn full_run_reaches_converted() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path().join("models"));
    assert_eq!(pipeline.state(), PipelineState::Untrained);

    let run = pipeline.run(&Corpus::phishing_demo()).unwrap();
    assert_eq!(pipeline.state(), PipelineState::Converted);

    run.export.manifest.verify_references().unwrap();
    run.conversion.manifest.verify_references().unwrap();
    assert_eq!(
        run.export.descriptor.input_features(),
        Some(run.training.vocabulary.len())
    );

    let finished: Vec<_> = pipeline
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PipelineEvent::StageFinished { stage, success } => Some((stage, success)),
            _ => None,
        })
        .collect();
    assert_eq!(
        finished,
        [
            (Stage::Train, true),
            (Stage::Export, true),
            (Stage::Convert, true)
        ]
    );
}

#[test]
fn stages_require_predecessors() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());

    assert!(pipeline.export().unwrap_err().is_missing_artifact());
    assert!(pipeline.convert().unwrap_err().is_missing_artifact());
    assert_eq!(pipeline.state(), PipelineState::Untrained);

    pipeline.train(&Corpus::phishing_demo()).unwrap();
    assert_eq!(pipeline.state(), PipelineState::Trained);
    assert!(pipeline.convert().unwrap_err().is_missing_artifact());

    pipeline.export().unwrap();
    assert_eq!(pipeline.state(), PipelineState::Exported);
    pipeline.convert().unwrap();
    assert_eq!(pipeline.state(), PipelineState::Converted);
}

#[test]
fn failed_stage_leaves_earlier_outputs_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path())
        .with_trainer_config(TrainerConfig::new().with_max_vocab_size(10));
    pipeline.run(&Corpus::phishing_demo()).unwrap();

    let vocab_before = fs::read(pipeline.layout().vocab_path()).unwrap();
    let model_before = fs::read(pipeline.layout().model_json_path()).unwrap();
    fs::remove_file(pipeline.layout().interchange_path()).unwrap();

    assert!(pipeline.convert().unwrap_err().is_missing_artifact());
    assert_eq!(fs::read(pipeline.layout().vocab_path()).unwrap(), vocab_before);
    assert_eq!(
        fs::read(pipeline.layout().model_json_path()).unwrap(),
        model_before
    );
}

#[test]
fn empty_corpus_trains_but_cannot_export() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());

    let training = pipeline.train(&Corpus::new(["benign", "phishing"])).unwrap();
    assert!(training.vocabulary.is_empty());
    assert_eq!(training.metadata.vocab_size, 0);

    let err = pipeline.export().unwrap_err();
    assert!(!err.is_missing_artifact());
    assert!(!pipeline.layout().interchange_path().exists());
}

#[test]
fn backend_config_flows_through_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path()).with_backend_config(
        BackendConfig::new()
            .with_model_name("phish-guard")
            .with_hidden_units(32),
    );
    let run = pipeline.run(&Corpus::phishing_demo()).unwrap();

    assert_eq!(run.export.manifest.model_id, "phish-guard");
    assert_eq!(run.export.descriptor.source, "phish-guard");
    let hidden = run
        .conversion
        .model
        .weights()
        .find(|w| w.name == "dense/bias")
        .unwrap();
    assert_eq!(hidden.shape.dims(), [32]);

    let written: Vec<ArtifactKind> = pipeline
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PipelineEvent::ArtifactWritten { artifact, .. } => Some(artifact),
            _ => None,
        })
        .collect();
    assert_eq!(written.len(), 3 + 2 + 3);
}

#[test]
fn clear_events_resets_recorded_history() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());
    let corpus = Corpus::phishing_demo();

    pipeline.run(&corpus).unwrap();
    let per_run = pipeline.events().len();
    assert!(per_run > 0);

    pipeline.run(&corpus).unwrap();
    assert_eq!(pipeline.events().len(), 2 * per_run);

    pipeline.clear_events();
    assert!(pipeline.events().is_empty());

    pipeline.convert().unwrap();
    assert!(matches!(
        pipeline.events().first(),
        Some(PipelineEvent::StageStarted {
            stage: Stage::Convert
        })
    ));
}

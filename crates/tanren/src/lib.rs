//! # Tanren
//!
//! Chains the three pipeline stages over one artifact root:
//! `root/` (vocabulary, IDF, metadata), `root/onnx/` (interchange descriptor)
//! and `root/tfjs/` (deployable model).
//!
//! ```no_run
//! use tanren::{Corpus, Pipeline};
//!
//! let pipeline = Pipeline::new("models");
//! pipeline.run(&Corpus::phishing_demo())?;
//! # Ok::<(), tanren::TanrenError>(())
//! ```
//!
//! The pipeline assumes a single writer per artifact root; running two
//! pipelines against the same root concurrently is not supported.

pub use tanren_core::*;
pub use tanren_export::{
    ConversionArtifacts, DeploymentConverter, ExportArtifacts, InterchangeExporter,
};
pub use tanren_trainer::{TrainerConfig, TrainingArtifactWriter, TrainingArtifacts};

use std::path::PathBuf;

/// Outputs of a full train → export → convert run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub training: TrainingArtifacts,
    pub export: ExportArtifacts,
    pub conversion: ConversionArtifacts,
}

/// Runs stages against an [`ArtifactLayout`] so each stage finds its inputs
/// by convention.
pub struct Pipeline {
    layout: ArtifactLayout,
    trainer: TrainerConfig,
    backend: BackendConfig,
    observer: RecordingObserver,
}

impl Pipeline {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_layout(ArtifactLayout::new(root))
    }

    pub fn with_layout(layout: ArtifactLayout) -> Self {
        Self {
            layout,
            trainer: TrainerConfig::default(),
            backend: BackendConfig::default(),
            observer: RecordingObserver::new(),
        }
    }

    pub fn with_trainer_config(mut self, config: TrainerConfig) -> Self {
        self.trainer = config;
        self
    }

    pub fn with_backend_config(mut self, config: BackendConfig) -> Self {
        self.backend = config;
        self
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Current state of the artifact root.
    pub fn state(&self) -> PipelineState {
        PipelineState::detect(&self.layout)
    }

    /// Every event emitted by stages run through this pipeline since it was
    /// created or last cleared.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.observer.events()
    }

    /// Drops the recorded events. Long-lived pipelines that re-run stages
    /// should call this between runs.
    pub fn clear_events(&self) {
        self.observer.clear();
    }

    fn backend(&self) -> PlaceholderBackend {
        PlaceholderBackend::new(self.backend.clone())
    }

    fn observer(&self) -> Fanout {
        Fanout(self.observer.clone())
    }

    /// `Untrained → Trained`.
    pub fn train(&self, corpus: &Corpus) -> Result<TrainingArtifacts> {
        TrainingArtifactWriter::new(self.backend(), self.trainer.clone())
            .with_observer(self.observer())
            .train(corpus, self.layout.training_dir())
    }

    /// `Trained → Exported`.
    pub fn export(&self) -> Result<ExportArtifacts> {
        InterchangeExporter::new(self.backend())
            .with_observer(self.observer())
            .export(self.layout.training_dir(), &self.layout.export_dir())
    }

    /// `Exported → Converted`.
    pub fn convert(&self) -> Result<ConversionArtifacts> {
        DeploymentConverter::new(self.backend())
            .with_observer(self.observer())
            .convert(&self.layout.interchange_path(), &self.layout.deploy_dir())
    }

    /// All three stages in order, stopping at the first failure.
    pub fn run(&self, corpus: &Corpus) -> Result<PipelineRun> {
        let training = self.train(corpus)?;
        let export = self.export()?;
        let conversion = self.convert()?;
        tracing::info!(root = %self.layout.root().display(), "pipeline complete");
        Ok(PipelineRun {
            training,
            export,
            conversion,
        })
    }
}

/// Records events for [`Pipeline::events`] and forwards them to `tracing`.
struct Fanout(RecordingObserver);

impl PipelineObserver for Fanout {
    fn emit(&self, event: &PipelineEvent) {
        TracingObserver.emit(event);
        self.0.emit(event);
    }
}

//! Training artifact writer.

use std::path::{Path, PathBuf};

use tanren_core::artifact::{self, ArtifactKind, ArtifactLayout};
use tanren_core::{
    Corpus, IdfWeights, ModelBackend, PipelineEvent, PipelineObserver, PlaceholderBackend,
    Result, RunMetadata, Stage, TanrenError, TracingObserver, Vocabulary, VocabularyBuilder,
};

use crate::config::TrainerConfig;

/// Everything stage one produced, plus where it was written.
#[derive(Debug, Clone)]
pub struct TrainingArtifacts {
    pub vocabulary: Vocabulary,
    pub idf_weights: IdfWeights,
    pub metadata: RunMetadata,
    pub vocab_path: PathBuf,
    pub idf_path: PathBuf,
    pub metadata_path: PathBuf,
}

/// Builds vocabulary and IDF weights, then persists them with run metadata.
pub struct TrainingArtifactWriter<B = PlaceholderBackend> {
    backend: B,
    config: TrainerConfig,
    observer: Box<dyn PipelineObserver>,
}

impl<B: ModelBackend> TrainingArtifactWriter<B> {
    pub fn new(backend: B, config: TrainerConfig) -> Self {
        Self {
            backend,
            config,
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Runs stage one into `out_dir`, overwriting any previous outputs there.
    pub fn train(&self, corpus: &Corpus, out_dir: &Path) -> Result<TrainingArtifacts> {
        self.observer.emit(&PipelineEvent::StageStarted { stage: Stage::Train });
        let result = self.write_artifacts(corpus, out_dir);
        if let Err(err) = &result {
            tracing::error!(error = %err, "training stage failed");
        }
        self.observer.emit(&PipelineEvent::StageFinished {
            stage: Stage::Train,
            success: result.is_ok(),
        });
        result
    }

    fn write_artifacts(&self, corpus: &Corpus, out_dir: &Path) -> Result<TrainingArtifacts> {
        if corpus.is_empty() {
            tracing::warn!("training on an empty corpus, vocabulary will be empty");
        }

        let vocabulary = VocabularyBuilder::new(self.config.max_vocab_size).build(corpus.texts());
        let idf_weights = IdfWeights::compute(corpus.texts(), &vocabulary);
        idf_weights.check_domain(&vocabulary)?;
        tracing::info!(terms = vocabulary.len(), "built vocabulary and idf weights");

        let metadata = self.backend.fit(corpus, &vocabulary)?;
        metadata.validate()?;
        if metadata.vocab_size != vocabulary.len() {
            return Err(TanrenError::invalid(
                ArtifactKind::Metadata,
                format!(
                    "vocab_size {} does not match vocabulary of {} terms",
                    metadata.vocab_size,
                    vocabulary.len()
                ),
            ));
        }

        artifact::ensure_dir(out_dir)?;
        let layout = ArtifactLayout::new(out_dir);
        let vocab_path = layout.vocab_path();
        let idf_path = layout.idf_path();
        let metadata_path = layout.metadata_path();

        vocabulary.save(&vocab_path)?;
        self.written(ArtifactKind::Vocabulary, &vocab_path);
        idf_weights.save(&idf_path)?;
        self.written(ArtifactKind::IdfWeights, &idf_path);
        // Export keys off metadata.json, so it goes last.
        metadata.save(&metadata_path)?;
        self.written(ArtifactKind::Metadata, &metadata_path);

        Ok(TrainingArtifacts {
            vocabulary,
            idf_weights,
            metadata,
            vocab_path,
            idf_path,
            metadata_path,
        })
    }

    fn written(&self, artifact: ArtifactKind, path: &Path) {
        self.observer.emit(&PipelineEvent::ArtifactWritten {
            stage: Stage::Train,
            artifact,
            path: path.to_path_buf(),
        });
    }
}

impl Default for TrainingArtifactWriter {
    fn default() -> Self {
        Self::new(PlaceholderBackend::default(), TrainerConfig::default())
    }
}

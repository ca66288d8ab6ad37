//! Interchange export stage.

use std::path::{Path, PathBuf};

use tanren_core::artifact::{self, ArtifactKind, ArtifactLayout, INTERCHANGE_FILE, MANIFEST_FILE};
use tanren_core::{
    ExportManifest, InterchangeDescriptor, ModelBackend, PipelineEvent, PipelineObserver,
    PlaceholderBackend, Result, RunMetadata, Stage, TracingObserver,
};

/// Outputs of a successful export.
#[derive(Debug, Clone)]
pub struct ExportArtifacts {
    pub descriptor: InterchangeDescriptor,
    pub manifest: ExportManifest,
    pub descriptor_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Reads `metadata.json` from a training directory and emits the
/// interchange descriptor and export manifest.
pub struct InterchangeExporter<B = PlaceholderBackend> {
    backend: B,
    observer: Box<dyn PipelineObserver>,
}

impl<B: ModelBackend> InterchangeExporter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Exports from `model_dir` into `out_dir`.
    ///
    /// `out_dir` is created even when the export then fails. A missing
    /// `metadata.json`, `vocab.json` or `idf_weights.json` aborts with
    /// `MissingArtifact` before anything is written.
    pub fn export(&self, model_dir: &Path, out_dir: &Path) -> Result<ExportArtifacts> {
        self.observer.emit(&PipelineEvent::StageStarted { stage: Stage::Export });
        let result = self.write_artifacts(model_dir, out_dir);
        if let Err(err) = &result {
            tracing::error!(error = %err, "export stage failed");
        }
        self.observer.emit(&PipelineEvent::StageFinished {
            stage: Stage::Export,
            success: result.is_ok(),
        });
        result
    }

    fn write_artifacts(&self, model_dir: &Path, out_dir: &Path) -> Result<ExportArtifacts> {
        artifact::ensure_dir(out_dir)?;

        let source = ArtifactLayout::new(model_dir);
        let metadata = RunMetadata::load(&source.metadata_path())?;
        tracing::info!(model = %metadata.model_name, "loaded training metadata");
        metadata.validate()?;

        let vocab_file = source.vocab_path();
        let idf_file = source.idf_path();
        artifact::require(ArtifactKind::Vocabulary, &vocab_file)?;
        artifact::require(ArtifactKind::IdfWeights, &idf_file)?;

        let descriptor = self.backend.export(&metadata)?;
        let descriptor_path = out_dir.join(INTERCHANGE_FILE);
        descriptor.save(&descriptor_path)?;
        self.written(ArtifactKind::Interchange, &descriptor_path);

        let manifest = ExportManifest {
            model_id: metadata.model_name.clone(),
            onnx_file: descriptor_path.clone(),
            vocab_file,
            idf_file,
            metadata,
        };
        let manifest_path = out_dir.join(MANIFEST_FILE);
        artifact::write_manifest(&manifest_path, &manifest)?;
        self.written(ArtifactKind::ExportManifest, &manifest_path);

        Ok(ExportArtifacts {
            descriptor,
            manifest,
            descriptor_path,
            manifest_path,
        })
    }

    fn written(&self, artifact: ArtifactKind, path: &Path) {
        self.observer.emit(&PipelineEvent::ArtifactWritten {
            stage: Stage::Export,
            artifact,
            path: path.to_path_buf(),
        });
    }
}

impl Default for InterchangeExporter {
    fn default() -> Self {
        Self::new(PlaceholderBackend::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanren_core::RecordingObserver;
    use tanren_core::artifact::{IDF_FILE, METADATA_FILE, VOCAB_FILE};

    #[test]
    fn test_missing_metadata_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("models");
        let out_dir = model_dir.join("onnx");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join(VOCAB_FILE), "{}").unwrap();
        std::fs::write(model_dir.join(IDF_FILE), "{}").unwrap();

        let recorder = RecordingObserver::new();
        let err = InterchangeExporter::<PlaceholderBackend>::default()
            .with_observer(recorder.clone())
            .export(&model_dir, &out_dir)
            .unwrap_err();

        assert!(err.is_missing_artifact());
        assert!(err.to_string().contains(METADATA_FILE));
        assert!(out_dir.is_dir());
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
        assert!(recorder.written().is_empty());
    }
}

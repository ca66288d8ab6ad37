//! Deployment conversion stage.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tanren_core::artifact::{self, ArtifactKind, MANIFEST_FILE, MODEL_JSON_FILE, WEIGHTS_FILE};
use tanren_core::types::layers::LAYERS_MODEL_FORMAT;
use tanren_core::{
    ConversionManifest, InterchangeDescriptor, LayeredModelDescriptor, ModelBackend,
    PipelineEvent, PipelineObserver, PlaceholderBackend, Result, Stage, TanrenError,
    TracingObserver,
};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Deployed size in MiB of a bundle whose weights blob is `weights_len` bytes.
pub fn estimated_size_mb(weights_len: usize) -> f64 {
    weights_len as f64 / BYTES_PER_MB
}

/// Outputs of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionArtifacts {
    pub model: LayeredModelDescriptor,
    pub manifest: ConversionManifest,
    pub model_path: PathBuf,
    pub weights_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Converts an interchange descriptor into a browser-loadable bundle.
pub struct DeploymentConverter<B = PlaceholderBackend> {
    backend: B,
    observer: Box<dyn PipelineObserver>,
}

impl<B: ModelBackend> DeploymentConverter<B> {
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

    /// Converts the descriptor at `interchange_path` into `out_dir`.
    pub fn convert(&self, interchange_path: &Path, out_dir: &Path) -> Result<ConversionArtifacts> {
        self.observer.emit(&PipelineEvent::StageStarted {
            stage: Stage::Convert,
        });
        let result = self.write_artifacts(interchange_path, out_dir);
        if let Err(err) = &result {
            tracing::error!(error = %err, "conversion stage failed");
        }
        self.observer.emit(&PipelineEvent::StageFinished {
            stage: Stage::Convert,
            success: result.is_ok(),
        });
        result
    }

    fn write_artifacts(&self, interchange_path: &Path, out_dir: &Path) -> Result<ConversionArtifacts> {
        artifact::ensure_dir(out_dir)?;

        let descriptor = InterchangeDescriptor::load(interchange_path)?;
        descriptor.validate()?;
        tracing::info!(
            source = %descriptor.source,
            input = %descriptor.input_shape,
            output = %descriptor.output_shape,
            "loaded interchange descriptor"
        );

        let model = self.backend.convert(&descriptor)?;
        model.validate()?;
        let declared = model.weights_byte_len()?;
        let weights = self.backend.weights(&model)?;
        if weights.len() != declared {
            return Err(TanrenError::invalid(
                ArtifactKind::WeightsBlob,
                format!(
                    "backend produced {} bytes, manifest declares {declared}",
                    weights.len()
                ),
            ));
        }

        // The blob goes first so model.json never points at a missing file.
        let weights_path = out_dir.join(WEIGHTS_FILE);
        artifact::write_bytes(&weights_path, &weights)?;
        self.written(ArtifactKind::WeightsBlob, &weights_path);

        let model_path = out_dir.join(MODEL_JSON_FILE);
        model.save(&model_path)?;
        self.written(ArtifactKind::ModelTopology, &model_path);

        let manifest = ConversionManifest {
            source_onnx: interchange_path.to_path_buf(),
            tfjs_format: LAYERS_MODEL_FORMAT.into(),
            model_json: model_path.clone(),
            weights_bin: weights_path.clone(),
            converted_at: Utc::now(),
            // TODO: check operator coverage against the target runtime instead of assuming it.
            browser_compatible: true,
            estimated_size_mb: estimated_size_mb(weights.len()),
        };
        let manifest_path = out_dir.join(MANIFEST_FILE);
        artifact::write_manifest(&manifest_path, &manifest)?;
        self.written(ArtifactKind::ConversionManifest, &manifest_path);

        Ok(ConversionArtifacts {
            model,
            manifest,
            model_path,
            weights_path,
            manifest_path,
        })
    }

    fn written(&self, artifact: ArtifactKind, path: &Path) {
        self.observer.emit(&PipelineEvent::ArtifactWritten {
            stage: Stage::Convert,
            artifact,
            path: path.to_path_buf(),
        });
    }
}

impl Default for DeploymentConverter {
    fn default() -> Self {
        Self::new(PlaceholderBackend::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_size() {
        assert_eq!(estimated_size_mb(0), 0.0);
        assert_eq!(estimated_size_mb(1024 * 1024), 1.0);
        assert_eq!(estimated_size_mb(512 * 1024), 0.5);
    }

    #[test]
    fn test_missing_descriptor_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tfjs");
        let err = DeploymentConverter::<PlaceholderBackend>::default()
            .convert(&dir.path().join("classifier.onnx"), &out)
            .unwrap_err();

        assert!(err.is_missing_artifact());
        assert!(!out.join(MODEL_JSON_FILE).exists());
        assert!(!out.join(WEIGHTS_FILE).exists());
        assert!(!out.join(MANIFEST_FILE).exists());
    }
}

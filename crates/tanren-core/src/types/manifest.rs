use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::RunMetadata;
use crate::artifact::{self, ArtifactKind, Provenance};
use crate::error::Result;

/// Provenance record of the interchange export stage (`onnx/manifest.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub model_id: String,
    pub onnx_file: PathBuf,
    pub vocab_file: PathBuf,
    pub idf_file: PathBuf,
    pub metadata: RunMetadata,
}

impl ExportManifest {
    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(ArtifactKind::ExportManifest, path)
    }
}

impl Provenance for ExportManifest {
    const KIND: ArtifactKind = ArtifactKind::ExportManifest;

    fn referenced_paths(&self) -> Vec<(ArtifactKind, &Path)> {
        vec![
            (ArtifactKind::Interchange, self.onnx_file.as_path()),
            (ArtifactKind::Vocabulary, self.vocab_file.as_path()),
            (ArtifactKind::IdfWeights, self.idf_file.as_path()),
        ]
    }
}

/// Provenance record of the deployment conversion stage (`tfjs/manifest.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionManifest {
    pub source_onnx: PathBuf,
    pub tfjs_format: String,
    pub model_json: PathBuf,
    pub weights_bin: PathBuf,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub converted_at: DateTime<Utc>,
    pub browser_compatible: bool,
    pub estimated_size_mb: f64,
}

impl ConversionManifest {
    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(ArtifactKind::ConversionManifest, path)
    }
}

impl Provenance for ConversionManifest {
    const KIND: ArtifactKind = ArtifactKind::ConversionManifest;

    fn referenced_paths(&self) -> Vec<(ArtifactKind, &Path)> {
        vec![
            (ArtifactKind::Interchange, self.source_onnx.as_path()),
            (ArtifactKind::ModelTopology, self.model_json.as_path()),
            (ArtifactKind::WeightsBlob, self.weights_bin.as_path()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_manifest_references() {
        let manifest = ConversionManifest {
            source_onnx: "models/onnx/classifier.onnx".into(),
            tfjs_format: "layers-model".into(),
            model_json: "models/tfjs/model.json".into(),
            weights_bin: "models/tfjs/weights.bin".into(),
            converted_at: Utc::now(),
            browser_compatible: true,
            estimated_size_mb: 0.05,
        };
        let kinds: Vec<_> = manifest.referenced_paths().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            [
                ArtifactKind::Interchange,
                ArtifactKind::ModelTopology,
                ArtifactKind::WeightsBlob
            ]
        );
        assert!(manifest.verify_references().unwrap_err().is_missing_artifact());

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["source_onnx"], "models/onnx/classifier.onnx");
        assert_eq!(json["browser_compatible"], true);
    }
}

//! # Artifact Layout and I/O
//!
//! Fixed file names, the directory convention that lets each stage find its
//! predecessor's outputs, and the JSON/byte helpers every stage writes through.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, TanrenError};

pub const VOCAB_FILE: &str = "vocab.json";
pub const IDF_FILE: &str = "idf_weights.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const INTERCHANGE_FILE: &str = "classifier.onnx";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const MODEL_JSON_FILE: &str = "model.json";
pub const WEIGHTS_FILE: &str = "weights.bin";

/// Subdirectory of the artifact root that receives the interchange export.
pub const EXPORT_SUBDIR: &str = "onnx";
/// Subdirectory of the artifact root that receives the deployment bundle.
pub const DEPLOY_SUBDIR: &str = "tfjs";

/// Every kind of file the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Corpus,
    Vocabulary,
    IdfWeights,
    Metadata,
    Interchange,
    ExportManifest,
    ModelTopology,
    WeightsBlob,
    ConversionManifest,
    Config,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Corpus => "corpus",
            Self::Vocabulary => "vocabulary",
            Self::IdfWeights => "idf-weights",
            Self::Metadata => "metadata",
            Self::Interchange => "interchange",
            Self::ExportManifest => "export-manifest",
            Self::ModelTopology => "model-json",
            Self::WeightsBlob => "weights-blob",
            Self::ConversionManifest => "conversion-manifest",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// Directory convention for one pipeline run.
///
/// Stage 1 writes into `root`, stage 2 into `root/onnx`, stage 3 into
/// `root/tfjs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn training_dir(&self) -> &Path {
        &self.root
    }

    pub fn export_dir(&self) -> PathBuf {
        self.root.join(EXPORT_SUBDIR)
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.root.join(DEPLOY_SUBDIR)
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.root.join(VOCAB_FILE)
    }

    pub fn idf_path(&self) -> PathBuf {
        self.root.join(IDF_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn interchange_path(&self) -> PathBuf {
        self.export_dir().join(INTERCHANGE_FILE)
    }

    pub fn export_manifest_path(&self) -> PathBuf {
        self.export_dir().join(MANIFEST_FILE)
    }

    pub fn model_json_path(&self) -> PathBuf {
        self.deploy_dir().join(MODEL_JSON_FILE)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.deploy_dir().join(WEIGHTS_FILE)
    }

    pub fn conversion_manifest_path(&self) -> PathBuf {
        self.deploy_dir().join(MANIFEST_FILE)
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new("models")
    }
}

/// Fails with [`TanrenError::MissingArtifact`] unless `path` is an existing file.
pub fn require(artifact: ArtifactKind, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TanrenError::MissingArtifact {
            artifact,
            path: path.to_path_buf(),
        })
    }
}

/// Idempotent `mkdir -p`.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Reads and deserializes a JSON artifact, reporting absence as `MissingArtifact`.
pub fn read_json<T: DeserializeOwned>(artifact: ArtifactKind, path: &Path) -> Result<T> {
    require(artifact, path)?;
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes `value` as pretty-printed JSON (two-space indent).
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Writes an opaque binary payload.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;
    Ok(())
}

/// A manifest that records which artifacts a stage consumed and produced.
pub trait Provenance: Serialize {
    /// Which manifest this is, for error reporting.
    const KIND: ArtifactKind;

    /// Every file path the manifest points at.
    fn referenced_paths(&self) -> Vec<(ArtifactKind, &Path)>;

    /// Checks that every referenced path exists on disk.
    fn verify_references(&self) -> Result<()> {
        for (artifact, path) in self.referenced_paths() {
            require(artifact, path)?;
        }
        Ok(())
    }
}

/// Writes a manifest after confirming everything it references is present.
///
/// The references are checked again after the write so a manifest is never
/// reported as written while pointing at an absent file.
pub fn write_manifest<M: Provenance>(path: &Path, manifest: &M) -> Result<()> {
    manifest.verify_references()?;
    write_json(path, manifest)?;
    manifest.verify_references()?;
    tracing::debug!(manifest = %M::KIND, path = %path.display(), "manifest written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Pointer {
        target: PathBuf,
    }

    impl Provenance for Pointer {
        const KIND: ArtifactKind = ArtifactKind::ExportManifest;

        fn referenced_paths(&self) -> Vec<(ArtifactKind, &Path)> {
            vec![(ArtifactKind::Vocabulary, self.target.as_path())]
        }
    }

    #[test]
    fn test_layout_paths() {
        let layout = ArtifactLayout::new("/tmp/run");
        assert_eq!(layout.vocab_path(), PathBuf::from("/tmp/run/vocab.json"));
        assert_eq!(
            layout.interchange_path(),
            PathBuf::from("/tmp/run/onnx/classifier.onnx")
        );
        assert_eq!(
            layout.conversion_manifest_path(),
            PathBuf::from("/tmp/run/tfjs/manifest.json")
        );
        assert_eq!(ArtifactLayout::default().root(), Path::new("models"));
    }

    #[test]
    fn test_require_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = require(ArtifactKind::Metadata, &dir.path().join(METADATA_FILE)).unwrap_err();
        assert!(err.is_missing_artifact());

        // A directory is not an artifact.
        assert!(require(ArtifactKind::Metadata, dir.path()).is_err());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_write_manifest_refuses_dangling_reference() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join(MANIFEST_FILE);
        let pointer = Pointer {
            target: dir.path().join(VOCAB_FILE),
        };

        let err = write_manifest(&manifest_path, &pointer).unwrap_err();
        assert!(err.is_missing_artifact());
        assert!(!manifest_path.exists());

        write_json(&pointer.target, &serde_json::json!({})).unwrap();
        write_manifest(&manifest_path, &pointer).unwrap();
        assert!(manifest_path.is_file());
    }

    #[test]
    fn test_read_json_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE);

        let err = read_json::<serde_json::Value>(ArtifactKind::Metadata, &path).unwrap_err();
        assert!(err.is_missing_artifact());

        fs::write(&path, "{ not json").unwrap();
        let err = read_json::<serde_json::Value>(ArtifactKind::Metadata, &path).unwrap_err();
        assert!(matches!(err, TanrenError::Json(_)));
    }
}

//! # Tanren Trainer
//!
//! Stage one of the pipeline: derives the vocabulary and IDF weights from a
//! labelled corpus, asks the backend for run metadata, and writes
//! `vocab.json`, `idf_weights.json` and `metadata.json` into one directory.

pub mod config;
pub mod data;
pub mod writer;

pub use config::TrainerConfig;
pub use data::load_corpus;
pub use writer::{TrainingArtifactWriter, TrainingArtifacts};

use std::path::Path;

use anyhow::Context;
use tanren_core::{BackendConfig, Corpus, PlaceholderBackend};

/// Trains on `corpus` (or the built-in demo corpus) and writes the artifacts into `out_dir`.
pub fn run_training(
    out_dir: &Path,
    corpus: Option<&Path>,
    config: TrainerConfig,
    backend: BackendConfig,
) -> anyhow::Result<TrainingArtifacts> {
    let corpus = match corpus {
        Some(path) => load_corpus(path)
            .with_context(|| format!("failed to load corpus from {}", path.display()))?,
        None => Corpus::phishing_demo(),
    };

    let writer = TrainingArtifactWriter::new(PlaceholderBackend::new(backend), config);
    let artifacts = writer
        .train(&corpus, out_dir)
        .with_context(|| format!("training into {} failed", out_dir.display()))?;

    tracing::info!(
        vocab = artifacts.vocabulary.len(),
        idf = artifacts.idf_weights.len(),
        metrics = ?artifacts.metadata.metrics,
        "training complete"
    );
    Ok(artifacts)
}

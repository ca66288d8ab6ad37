//! # Numeric Backend
//!
//! The stages only move artifacts around; everything that would involve real
//! tensor computation goes through [`ModelBackend`]. [`PlaceholderBackend`]
//! stands in for a trained network: it reports configured metrics, derives
//! tensor shapes from the metadata, and emits deterministic initial weights.

use chrono::Utc;
use oorandom::Rand32;
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, WEIGHTS_FILE};
use crate::error::{Result, TanrenError};
use crate::types::layers::LAYERS_MODEL_FORMAT;
use crate::types::{
    Corpus, DenseConfig, DropoutConfig, EvaluationMetrics, InterchangeDescriptor, LayerSpec,
    LayeredModelDescriptor, ModelTopology, RunMetadata, TensorShape, WeightEntry, WeightsGroup,
};
use crate::vocab::Vocabulary;

/// Capability interface a real training/export/conversion backend implements.
pub trait ModelBackend {
    /// Trains on `corpus` over `vocabulary` and summarizes the run.
    fn fit(&self, corpus: &Corpus, vocabulary: &Vocabulary) -> Result<RunMetadata>;

    /// Describes the trained model's input/output contract.
    fn export(&self, metadata: &RunMetadata) -> Result<InterchangeDescriptor>;

    /// Builds the deployable layer topology for an interchange descriptor.
    fn convert(&self, descriptor: &InterchangeDescriptor) -> Result<LayeredModelDescriptor>;

    /// Serializes the weight tensors listed in `model`'s manifest, in order.
    fn weights(&self, model: &LayeredModelDescriptor) -> Result<Vec<u8>>;
}

/// Configuration for the placeholder backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub model_name: String,
    pub task: String,
    /// Width of the hidden dense layer.
    pub hidden_units: usize,
    pub hidden_activation: String,
    /// Dropout rate in `[0, 1)`.
    pub dropout_rate: f64,
    pub opset_version: u32,
    pub input_name: String,
    pub output_name: String,
    /// Seed for placeholder weight initialisation.
    pub seed: u64,
    /// Metrics reported by `fit`.
    pub metrics: EvaluationMetrics,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model_name: "classifier-v1".into(),
            task: "binary_classification".into(),
            hidden_units: 128,
            hidden_activation: "relu".into(),
            dropout_rate: 0.5,
            opset_version: 13,
            input_name: "input".into(),
            output_name: "logits".into(),
            seed: 42,
            metrics: EvaluationMetrics::default(),
        }
    }
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_hidden_units(mut self, units: usize) -> Self {
        self.hidden_units = units;
        self
    }

    /// Set the dropout rate, clamped to `[0, 1)`.
    pub fn with_dropout_rate(mut self, rate: f64) -> Self {
        self.dropout_rate = rate.clamp(0.0, 0.99);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_metrics(mut self, metrics: EvaluationMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(TanrenError::invalid(
                ArtifactKind::Config,
                "hidden_units must be greater than 0",
            ));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err(TanrenError::invalid(
                ArtifactKind::Config,
                format!("dropout_rate {} is outside [0, 1)", self.dropout_rate),
            ));
        }
        self.metrics.validate()
    }
}

/// Mock backend: no optimisation happens, shapes and bookkeeping are real.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderBackend {
    config: BackendConfig,
}

impl PlaceholderBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

impl ModelBackend for PlaceholderBackend {
    fn fit(&self, corpus: &Corpus, vocabulary: &Vocabulary) -> Result<RunMetadata> {
        self.config.validate()?;
        Ok(RunMetadata {
            model_name: self.config.model_name.clone(),
            task: self.config.task.clone(),
            classes: corpus.classes().to_vec(),
            vocab_size: vocabulary.len(),
            metrics: self.config.metrics,
            trained_at: Utc::now(),
        })
    }

    fn export(&self, metadata: &RunMetadata) -> Result<InterchangeDescriptor> {
        let descriptor = InterchangeDescriptor {
            source: metadata.model_name.clone(),
            input_shape: TensorShape::new([1, metadata.vocab_size]),
            output_shape: TensorShape::new([1, metadata.num_classes()]),
            input_name: self.config.input_name.clone(),
            output_name: self.config.output_name.clone(),
            opset_version: self.config.opset_version,
            exported_at: Utc::now(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn convert(&self, descriptor: &InterchangeDescriptor) -> Result<LayeredModelDescriptor> {
        descriptor.validate()?;
        self.config.validate()?;

        // validate() guarantees both shapes have a last dimension.
        let features = descriptor.input_features().unwrap_or(1);
        let classes = descriptor.num_classes().unwrap_or(1);
        let hidden = self.config.hidden_units;

        let topology = ModelTopology::sequential(vec![
            LayerSpec::Dense(DenseConfig {
                units: hidden,
                activation: self.config.hidden_activation.clone(),
                input_shape: Some(vec![features]),
            }),
            LayerSpec::Dropout(DropoutConfig {
                rate: self.config.dropout_rate,
            }),
            LayerSpec::Dense(DenseConfig {
                units: classes,
                activation: "softmax".into(),
                input_shape: None,
            }),
        ]);

        let weights = topology
            .expected_parameters()?
            .into_iter()
            .map(|(name, shape)| WeightEntry::float32(name, shape))
            .collect();

        Ok(LayeredModelDescriptor {
            format: LAYERS_MODEL_FORMAT.into(),
            generated_by: concat!("tanren ", env!("CARGO_PKG_VERSION")).into(),
            converted_at: Utc::now(),
            model_topology: topology,
            weights_manifest: vec![WeightsGroup {
                paths: vec![WEIGHTS_FILE.into()],
                weights,
            }],
        })
    }

    fn weights(&self, model: &LayeredModelDescriptor) -> Result<Vec<u8>> {
        // Bounds the payload before anything is allocated.
        model.validate()?;
        let mut rng = Rand32::new(self.config.seed);
        let mut bytes = Vec::with_capacity(model.weights_byte_len()?);

        for entry in model.weights() {
            let len = entry.byte_len()?;
            match entry.shape.dims() {
                // Glorot-uniform kernels.
                [fan_in, fan_out] if entry.name.ends_with("/kernel") => {
                    let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                    for _ in 0..len / entry.dtype.size_bytes() {
                        let value = (rng.rand_float() * 2.0 - 1.0) * limit;
                        bytes.extend_from_slice(&value.to_le_bytes());
                    }
                }
                _ => bytes.resize(bytes.len() + len, 0),
            }
        }
        Ok(bytes)
    }
}

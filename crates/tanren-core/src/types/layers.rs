//! # Layered Model Descriptor
//!
//! Browser-runtime description of a model (`model.json`): a sequential layer
//! topology plus a manifest of the weight tensors stored in `weights.bin`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interchange::TensorShape;
use crate::artifact::{self, ArtifactKind};
use crate::error::{Result, TanrenError};

/// Format tag written into `model.json`.
pub const LAYERS_MODEL_FORMAT: &str = "layers-model";

/// Largest weights payload a model may declare (1 GiB).
pub const MAX_WEIGHTS_BYTES: usize = 1 << 30;

/// Configuration of a fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseConfig {
    pub units: usize,
    pub activation: String,
    /// Only present on the first layer of a model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_shape: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropoutConfig {
    pub rate: f64,
}

/// One layer of a sequential model, serialized as `{class_name, config}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class_name", content = "config")]
pub enum LayerSpec {
    Dense(DenseConfig),
    Dropout(DropoutConfig),
}

impl LayerSpec {
    /// Lowercase base name used for auto-generated layer names.
    pub fn base_name(&self) -> &'static str {
        match self {
            Self::Dense(_) => "dense",
            Self::Dropout(_) => "dropout",
        }
    }

    /// Width of this layer's output given the width of its input.
    pub fn output_width(&self, input_width: usize) -> usize {
        match self {
            Self::Dense(cfg) => cfg.units,
            Self::Dropout(_) => input_width,
        }
    }

    /// Parameter tensors this layer owns when named `layer_name`.
    pub fn expected_parameters(
        &self,
        layer_name: &str,
        input_width: usize,
    ) -> Vec<(String, TensorShape)> {
        match self {
            Self::Dense(cfg) => vec![
                (
                    format!("{layer_name}/kernel"),
                    TensorShape::new([input_width, cfg.units]),
                ),
                (format!("{layer_name}/bias"), TensorShape::new([cfg.units])),
            ],
            Self::Dropout(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialConfig {
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTopology {
    pub class_name: String,
    pub config: SequentialConfig,
}

impl ModelTopology {
    pub fn sequential(layers: Vec<LayerSpec>) -> Self {
        Self {
            class_name: "Sequential".into(),
            config: SequentialConfig { layers },
        }
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.config.layers
    }

    /// Auto-generated layer names: `dense`, `dropout`, `dense_1`, ...
    pub fn layer_names(&self) -> Vec<String> {
        let mut seen: HashMap<&'static str, usize> = HashMap::new();
        self.layers()
            .iter()
            .map(|layer| {
                let base = layer.base_name();
                let count = seen.entry(base).or_insert(0);
                let name = if *count == 0 {
                    base.to_string()
                } else {
                    format!("{base}_{count}")
                };
                *count += 1;
                name
            })
            .collect()
    }

    /// Input width declared on the first layer.
    pub fn input_width(&self) -> Option<usize> {
        match self.layers().first()? {
            LayerSpec::Dense(cfg) => cfg.input_shape.as_ref()?.last().copied(),
            LayerSpec::Dropout(_) => None,
        }
    }

    /// Every parameter tensor the topology expects, in layer order.
    pub fn expected_parameters(&self) -> Result<Vec<(String, TensorShape)>> {
        let mut width = self.input_width().ok_or_else(|| {
            TanrenError::invalid(
                ArtifactKind::ModelTopology,
                "first layer must be dense with a declared input_shape",
            )
        })?;

        let mut params = Vec::new();
        for (layer, name) in self.layers().iter().zip(self.layer_names()) {
            params.extend(layer.expected_parameters(&name, width));
            width = layer.output_width(width);
        }
        Ok(params)
    }
}

/// Element type of a stored weight tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightDtype {
    Float32,
    Int32,
}

impl WeightDtype {
    pub fn size_bytes(self) -> usize {
        match self {
            Self::Float32 | Self::Int32 => 4,
        }
    }
}

/// One tensor inside a weights file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub name: String,
    pub shape: TensorShape,
    pub dtype: WeightDtype,
}

impl WeightEntry {
    pub fn float32(name: impl Into<String>, shape: TensorShape) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype: WeightDtype::Float32,
        }
    }

    /// Stored size in bytes. Fails if the size does not fit in `usize`.
    pub fn byte_len(&self) -> Result<usize> {
        self.shape
            .num_elements()
            .and_then(|n| n.checked_mul(self.dtype.size_bytes()))
            .ok_or_else(|| {
                TanrenError::invalid(
                    ArtifactKind::ModelTopology,
                    format!("weight {} with shape {} is too large", self.name, self.shape),
                )
            })
    }
}

/// A group of tensors stored contiguously in the listed files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsGroup {
    pub paths: Vec<String>,
    pub weights: Vec<WeightEntry>,
}

/// Browser-deployable model description (`model.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredModelDescriptor {
    pub format: String,
    pub generated_by: String,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub converted_at: DateTime<Utc>,
    pub model_topology: ModelTopology,
    pub weights_manifest: Vec<WeightsGroup>,
}

impl LayeredModelDescriptor {
    /// All weight entries across groups, in storage order.
    pub fn weights(&self) -> impl Iterator<Item = &WeightEntry> {
        self.weights_manifest.iter().flat_map(|g| g.weights.iter())
    }

    /// Total size of the weights payload in bytes.
    pub fn weights_byte_len(&self) -> Result<usize> {
        self.weights().try_fold(0usize, |total, entry| {
            total.checked_add(entry.byte_len()?).ok_or_else(|| {
                TanrenError::invalid(ArtifactKind::ModelTopology, "weights payload is too large")
            })
        })
    }

    /// Checks that every weight tensor belongs to exactly one layer with a
    /// matching shape, that no layer parameter is left without storage, and
    /// that the payload stays within [`MAX_WEIGHTS_BYTES`].
    pub fn validate(&self) -> Result<()> {
        let expected: HashMap<String, TensorShape> =
            self.model_topology.expected_parameters()?.into_iter().collect();

        let mut stored = HashSet::new();
        for entry in self.weights() {
            let shape = expected.get(&entry.name).ok_or_else(|| {
                TanrenError::invalid(
                    ArtifactKind::ModelTopology,
                    format!("weight {} is not a parameter of any layer", entry.name),
                )
            })?;
            if *shape != entry.shape {
                return Err(TanrenError::invalid(
                    ArtifactKind::ModelTopology,
                    format!(
                        "weight {} has shape {} but its layer expects {shape}",
                        entry.name, entry.shape
                    ),
                ));
            }
            if !stored.insert(entry.name.as_str()) {
                return Err(TanrenError::invalid(
                    ArtifactKind::ModelTopology,
                    format!("weight {} is listed more than once", entry.name),
                ));
            }
        }

        if let Some(missing) = expected.keys().find(|name| !stored.contains(name.as_str())) {
            return Err(TanrenError::invalid(
                ArtifactKind::ModelTopology,
                format!("layer parameter {missing} has no stored weights"),
            ));
        }

        let total = self.weights_byte_len()?;
        if total > MAX_WEIGHTS_BYTES {
            return Err(TanrenError::invalid(
                ArtifactKind::ModelTopology,
                format!("weights payload of {total} bytes exceeds {MAX_WEIGHTS_BYTES}"),
            ));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(ArtifactKind::ModelTopology, path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }
}

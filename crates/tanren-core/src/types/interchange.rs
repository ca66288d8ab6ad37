use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::{self, ArtifactKind};
use crate::error::{Result, TanrenError};

/// Largest element count accepted for a single tensor (1 GiB of `float32`).
pub const MAX_TENSOR_ELEMENTS: usize = 1 << 28;

/// Tensor dimensions, outermost first. A valid shape has at least one
/// dimension, no zero-sized dimension, and at most [`MAX_TENSOR_ELEMENTS`]
/// elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensorShape(Vec<usize>);

impl TensorShape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self(dims.into())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Innermost dimension, i.e. the feature or class count for `[batch, n]` shapes.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Number of scalar elements, or `None` if the product overflows `usize`.
    pub fn num_elements(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.iter().all(|&d| d > 0)
            && self.num_elements().is_some_and(|n| n <= MAX_TENSOR_ELEMENTS)
    }
}

impl From<Vec<usize>> for TensorShape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Framework-neutral description of the model's input/output contract
/// (`classifier.onnx`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeDescriptor {
    /// Model name this descriptor was exported from.
    pub source: String,
    pub input_shape: TensorShape,
    pub output_shape: TensorShape,
    pub input_name: String,
    pub output_name: String,
    pub opset_version: u32,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub exported_at: DateTime<Utc>,
}

impl InterchangeDescriptor {
    pub fn validate(&self) -> Result<()> {
        for (name, shape) in [("input", &self.input_shape), ("output", &self.output_shape)] {
            if !shape.is_valid() {
                return Err(TanrenError::invalid(
                    ArtifactKind::Interchange,
                    format!(
                        "{name} shape {shape} must be non-empty with positive dimensions \
                         and at most {MAX_TENSOR_ELEMENTS} elements"
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Width of the feature vector the model consumes.
    pub fn input_features(&self) -> Option<usize> {
        self.input_shape.last()
    }

    /// Number of output classes.
    pub fn num_classes(&self) -> Option<usize> {
        self.output_shape.last()
    }

    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(ArtifactKind::Interchange, path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }
}

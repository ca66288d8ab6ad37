pub mod corpus;
pub mod interchange;
pub mod layers;
pub mod manifest;
pub mod metadata;
pub mod timestamp;

pub use corpus::{Corpus, LabeledText};
pub use interchange::{InterchangeDescriptor, TensorShape};
pub use layers::{
    DenseConfig, DropoutConfig, LayerSpec, LayeredModelDescriptor, ModelTopology, WeightEntry,
    WeightsGroup,
};
pub use manifest::{ConversionManifest, ExportManifest};
pub use metadata::{EvaluationMetrics, RunMetadata};

//! # Tanren Core
//!
//! Data contracts for the three-stage tanren model pipeline: a labelled text
//! corpus is turned into a bag-of-words vocabulary and IDF weights, packaged
//! into an interchange descriptor, and finally converted into a layered model
//! descriptor plus a weights blob for browser deployment.
//!
//! ## Quick Start
//!
//! ```rust
//! use tanren_core::types::Corpus;
//! use tanren_core::vocab::{IdfWeights, VocabularyBuilder};
//!
//! let corpus = Corpus::phishing_demo();
//! let vocab = VocabularyBuilder::new(5000).build(corpus.texts());
//! let idf = IdfWeights::compute(corpus.texts(), &vocab);
//!
//! assert_eq!(vocab.len(), idf.len());
//! assert!(idf.iter().all(|(_, w)| w > 1.0));
//! ```
pub mod artifact;
pub mod backend;
pub mod error;
pub mod event;
pub mod state;
pub mod tokenizer;
pub mod types;
pub mod vocab;

// Re-export primary API
pub use artifact::{ArtifactKind, ArtifactLayout, Provenance};
pub use backend::{BackendConfig, ModelBackend, PlaceholderBackend};
pub use error::{Result, TanrenError};
pub use event::{
    NoopObserver, PipelineEvent, PipelineObserver, RecordingObserver, Stage, TracingObserver,
};
pub use state::PipelineState;
pub use tokenizer::Tokenizer;
pub use types::{
    ConversionManifest, Corpus, EvaluationMetrics, ExportManifest, InterchangeDescriptor,
    LabeledText, LayerSpec, LayeredModelDescriptor, RunMetadata, TensorShape, WeightEntry,
};
pub use vocab::{IdfWeights, Vocabulary, VocabularyBuilder};

//! # Vocabulary and IDF
//!
//! Frequency-ranked, size-bounded vocabulary construction and smoothed
//! inverse-document-frequency weighting over the same corpus.

pub mod builder;
pub mod idf;

pub use builder::{DEFAULT_MAX_VOCAB_SIZE, Vocabulary, VocabularyBuilder};
pub use idf::{IdfWeights, smoothed_idf};

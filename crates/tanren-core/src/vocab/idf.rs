use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::builder::Vocabulary;
use crate::artifact::{self, ArtifactKind};
use crate::error::{Result, TanrenError};
use crate::tokenizer::Tokenizer;

/// Smoothed IDF: `1 + N / (df + 1)`.
///
/// Strictly greater than 1 whenever `num_docs > 0`, and non-increasing in `df`.
#[inline]
pub fn smoothed_idf(num_docs: usize, doc_freq: usize) -> f64 {
    1.0 + num_docs as f64 / (doc_freq as f64 + 1.0)
}

/// Per-term IDF weights (`idf_weights.json`), keyed by exactly the terms of
/// the vocabulary they were computed for and stored in vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdfWeights {
    weights: IndexMap<String, f64>,
}

impl IdfWeights {
    /// Computes a weight for every vocabulary term.
    ///
    /// Document frequency counts presence per text, not occurrences.
    pub fn compute<I, S>(texts: I, vocab: &Vocabulary) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokenizer = Tokenizer::new();
        let mut doc_freq = vec![0usize; vocab.len()];
        let mut num_docs = 0usize;

        for text in texts {
            num_docs += 1;
            let present: HashSet<String> = tokenizer.tokenize(text.as_ref()).collect();
            for term in &present {
                if let Some(idx) = vocab.index_of(term) {
                    doc_freq[idx] += 1;
                }
            }
        }

        let weights = vocab
            .iter()
            .map(|(term, idx)| (term.to_string(), smoothed_idf(num_docs, doc_freq[idx])))
            .collect();

        tracing::debug!(terms = vocab.len(), documents = num_docs, "computed idf weights");
        Self { weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }

    /// Fails unless the weights cover exactly the vocabulary's terms.
    pub fn check_domain(&self, vocab: &Vocabulary) -> Result<()> {
        if self.len() != vocab.len() {
            return Err(TanrenError::invalid(
                ArtifactKind::IdfWeights,
                format!("{} weights for {} vocabulary terms", self.len(), vocab.len()),
            ));
        }
        if let Some(term) = vocab.terms().find(|t| !self.weights.contains_key(*t)) {
            return Err(TanrenError::invalid(
                ArtifactKind::IdfWeights,
                format!("vocabulary term {term:?} has no weight"),
            ));
        }
        Ok(())
    }

    /// Fails if any weight is not a finite value above 1.
    pub fn validate(&self) -> Result<()> {
        match self.iter().find(|&(_, w)| !(w.is_finite() && w > 1.0)) {
            Some((term, w)) => Err(TanrenError::invalid(
                ArtifactKind::IdfWeights,
                format!("weight {w} for term {term:?} is not a finite value above 1"),
            )),
            None => Ok(()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let weights: Self = artifact::read_json(ArtifactKind::IdfWeights, path)?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }
}

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::artifact::{self, ArtifactKind};
use crate::error::{Result, TanrenError};
use crate::tokenizer::Tokenizer;

pub const DEFAULT_MAX_VOCAB_SIZE: usize = 5000;

/// Term to dense index mapping (`vocab.json`).
///
/// Indices always form the contiguous range `0..len`, and iteration yields
/// terms in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Vocabulary {
    terms: IndexMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from terms already in rank order.
    pub fn from_ranked<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = IndexMap::new();
        for term in terms {
            let next = map.len();
            map.entry(term.into()).or_insert(next);
        }
        Self { terms: map }
    }

    /// Accepts an arbitrary term→index map, rejecting gaps and duplicate indices.
    pub fn from_indices(map: IndexMap<String, usize>) -> Result<Self> {
        let len = map.len();
        let mut slots: Vec<Option<String>> = vec![None; len];
        for (term, idx) in map {
            let Some(slot) = slots.get_mut(idx) else {
                return Err(TanrenError::invalid(
                    ArtifactKind::Vocabulary,
                    format!("index {idx} of {term:?} is outside 0..{len}"),
                ));
            };
            if let Some(other) = slot {
                return Err(TanrenError::invalid(
                    ArtifactKind::Vocabulary,
                    format!("terms {other:?} and {term:?} share index {idx}"),
                ));
            }
            *slot = Some(term);
        }
        Ok(Self::from_ranked(slots.into_iter().flatten()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn term_at(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(|(t, _)| t.as_str())
    }

    /// `(term, index)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.terms.iter().map(|(t, &i)| (t.as_str(), i))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let map: IndexMap<String, usize> = artifact::read_json(ArtifactKind::Vocabulary, path)?;
        Self::from_indices(map)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }
}

/// Derives a [`Vocabulary`] from raw texts.
///
/// Terms are ranked by descending corpus-wide frequency; ties keep the order in
/// which terms were first seen. Only the top `max_size` terms are kept.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    max_size: usize,
    tokenizer: Tokenizer,
}

impl VocabularyBuilder {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            tokenizer: Tokenizer::new(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Corpus-wide term counts in first-encounter order.
    pub fn term_frequencies<I, S>(&self, texts: I) -> IndexMap<String, usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut freq: IndexMap<String, usize> = IndexMap::new();
        for text in texts {
            for term in self.tokenizer.tokenize(text.as_ref()) {
                *freq.entry(term).or_insert(0) += 1;
            }
        }
        freq
    }

    /// Builds the vocabulary. An empty corpus yields an empty vocabulary.
    pub fn build<I, S>(&self, texts: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranked: Vec<(String, usize)> = self.term_frequencies(texts).into_iter().collect();
        // Stable sort keeps first-encounter order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_size);

        let vocab = Vocabulary::from_ranked(ranked.into_iter().map(|(term, _)| term));
        tracing::debug!(size = vocab.len(), max = self.max_size, "built vocabulary");
        vocab
    }
}

impl Default for VocabularyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VOCAB_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::Corpus;

    #[test]
    fn test_rank_by_frequency_then_first_seen() {
        let vocab = VocabularyBuilder::new(10).build(["b a c", "a c d", "a"]);
        // a=3, c=2, then b and d tie at 1 with b seen first.
        let terms: Vec<_> = vocab.terms().collect();
        assert_eq!(terms, ["a", "c", "b", "d"]);
        assert_eq!(vocab.index_of("a"), Some(0));
        assert_eq!(vocab.index_of("d"), Some(3));
        assert_eq!(vocab.term_at(1), Some("c"));
    }

    #[test]
    fn test_size_bound() {
        let vocab = VocabularyBuilder::new(2).build(["x y z", "z y", "z"]);
        assert_eq!(vocab.terms().collect::<Vec<_>>(), ["z", "y"]);

        let unbounded = VocabularyBuilder::new(100).build(["x y z", "z y", "z"]);
        assert_eq!(unbounded.len(), 3);

        assert!(VocabularyBuilder::new(0).build(["x"]).is_empty());
    }

    #[test]
    fn test_case_folding_merges_terms() {
        let vocab = VocabularyBuilder::default().build(["Account ACCOUNT account"]);
        assert_eq!(vocab.len(), 1);
        assert!(vocab.contains("account"));
    }

    #[test]
    fn test_empty_corpus() {
        let texts: [&str; 0] = [];
        assert!(VocabularyBuilder::default().build(texts).is_empty());
        assert!(VocabularyBuilder::default().build(["", "   "]).is_empty());
    }

    #[test]
    fn test_indices_are_contiguous() {
        let corpus = Corpus::phishing_demo();
        let vocab = VocabularyBuilder::default().build(corpus.texts());
        let mut indices: Vec<_> = vocab.iter().map(|(_, i)| i).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..vocab.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_demo_corpus_size_is_distinct_token_count() {
        let corpus = Corpus::phishing_demo();
        let distinct: HashSet<String> = corpus
            .texts()
            .flat_map(|t| t.split_whitespace().map(str::to_lowercase))
            .collect();
        let vocab = VocabularyBuilder::default().build(corpus.texts());
        assert_eq!(vocab.len(), distinct.len());
        assert!(vocab.len() <= DEFAULT_MAX_VOCAB_SIZE);
        // "your" is the most frequent token in the demo corpus.
        assert_eq!(vocab.term_at(0), Some("your"));
    }

    #[test]
    fn test_deterministic() {
        let corpus = Corpus::phishing_demo();
        let builder = VocabularyBuilder::default();
        let first = builder.build(corpus.texts());
        for _ in 0..5 {
            assert_eq!(builder.build(corpus.texts()), first);
        }
    }

    #[test]
    fn test_from_indices_validation() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), 1);
        map.insert("a".to_string(), 0);
        let vocab = Vocabulary::from_indices(map).unwrap();
        assert_eq!(vocab.terms().collect::<Vec<_>>(), ["a", "b"]);

        let mut gap = IndexMap::new();
        gap.insert("a".to_string(), 0);
        gap.insert("b".to_string(), 2);
        assert!(Vocabulary::from_indices(gap).is_err());

        let mut dup = IndexMap::new();
        dup.insert("a".to_string(), 0);
        dup.insert("b".to_string(), 0);
        assert!(Vocabulary::from_indices(dup).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::artifact::VOCAB_FILE);
        let vocab = VocabularyBuilder::default().build(Corpus::phishing_demo().texts());
        vocab.save(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["your"], 0);
        assert_eq!(Vocabulary::load(&path).unwrap(), vocab);
    }
}

//! Corpus loading from tab-separated files.
//!
//! One document per line as `label<TAB>text`. Blank lines and lines starting
//! with `#` are ignored. Classes are the distinct labels in sorted order.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tanren_core::artifact::{self, ArtifactKind};
use tanren_core::{Corpus, Result};

/// Load a labelled corpus from a TSV file.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let path = path.as_ref();
    artifact::require(ArtifactKind::Corpus, path)?;
    let reader = BufReader::new(File::open(path)?);

    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('\t') {
            Some((label, text)) if !label.trim().is_empty() => {
                rows.push((label.trim().to_string(), text.to_string()));
            }
            _ => tracing::warn!(line = line_no + 1, "skipping corpus line without a label"),
        }
    }

    let classes: BTreeSet<&str> = rows.iter().map(|(label, _)| label.as_str()).collect();
    let mut corpus = Corpus::new(classes);
    for (label, text) in &rows {
        corpus.push_named(text.as_str(), label)?;
    }

    tracing::debug!(documents = corpus.len(), classes = corpus.classes().len(), "loaded corpus");
    Ok(corpus)
}

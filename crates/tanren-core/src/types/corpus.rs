use crate::artifact::ArtifactKind;
use crate::error::{Result, TanrenError};

/// One training text with the index of its class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledText {
    pub text: String,
    pub label: usize,
}

/// Ordered, labelled training texts. Never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    classes: Vec<String>,
    documents: Vec<LabeledText>,
}

impl Corpus {
    /// Creates an empty corpus over the given class names.
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            documents: Vec::new(),
        }
    }

    /// Appends a document, rejecting labels outside the class list.
    pub fn push(&mut self, text: impl Into<String>, label: usize) -> Result<()> {
        if label >= self.classes.len() {
            return Err(TanrenError::invalid(
                ArtifactKind::Corpus,
                format!(
                    "label {label} out of range for {} classes",
                    self.classes.len()
                ),
            ));
        }
        self.documents.push(LabeledText {
            text: text.into(),
            label,
        });
        Ok(())
    }

    /// Appends a document labelled by class name.
    pub fn push_named(&mut self, text: impl Into<String>, class: &str) -> Result<()> {
        let label = self.class_index(class).ok_or_else(|| {
            TanrenError::invalid(ArtifactKind::Corpus, format!("unknown class {class:?}"))
        })?;
        self.push(text, label)
    }

    pub fn class_index(&self, class: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn documents(&self) -> &[LabeledText] {
        &self.documents
    }

    /// Raw texts in corpus order.
    pub fn texts(&self) -> impl Iterator<Item = &str> + Clone {
        self.documents.iter().map(|d| d.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents per class, indexed like [`Corpus::classes`].
    pub fn label_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.classes.len()];
        for doc in &self.documents {
            counts[doc.label] += 1;
        }
        counts
    }

    /// The built-in phishing/benign demonstration corpus.
    pub fn phishing_demo() -> Self {
        const PHISHING: &[&str] = &[
            "Click here to verify your account immediately",
            "Urgent: Confirm your banking credentials now",
            "Your payment method needs verification",
            "Suspicious activity detected - update password",
            "Account will be closed unless you verify",
        ];
        const BENIGN: &[&str] = &[
            "How can I help you today?",
            "Portfolio showcases cybersecurity expertise",
            "What are your research interests?",
            "Tell me more about your experience",
            "I can assist with security questions",
        ];

        let documents = PHISHING
            .iter()
            .map(|t| (t, 1))
            .chain(BENIGN.iter().map(|t| (t, 0)))
            .map(|(text, label)| LabeledText {
                text: (*text).to_string(),
                label,
            })
            .collect();

        Self {
            classes: vec!["benign".into(), "phishing".into()],
            documents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phishing_demo_shape() {
        let corpus = Corpus::phishing_demo();
        assert_eq!(corpus.len(), 10);
        assert_eq!(corpus.classes(), ["benign", "phishing"]);
        assert_eq!(corpus.label_counts(), vec![5, 5]);
        assert_eq!(corpus.documents()[0].label, 1);
        assert_eq!(corpus.documents()[9].label, 0);
    }

    #[test]
    fn test_push_rejects_unknown_labels() {
        let mut corpus = Corpus::new(["ham", "spam"]);
        corpus.push("hello", 0).unwrap();
        assert!(corpus.push("bad", 2).is_err());
        assert!(corpus.push_named("bad", "eggs").is_err());
        corpus.push_named("win money", "spam").unwrap();
        assert_eq!(corpus.label_counts(), vec![1, 1]);
    }

    #[test]
    fn test_texts_preserve_order() {
        let mut corpus = Corpus::new(["a"]);
        corpus.push("first", 0).unwrap();
        corpus.push("second", 0).unwrap();
        assert_eq!(corpus.texts().collect::<Vec<_>>(), ["first", "second"]);
    }
}

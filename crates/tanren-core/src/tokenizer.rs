//! # Bag-of-words Tokenizer
//!
//! Case-folds text and splits it on whitespace. No stemming and no
//! punctuation stripping: `"password"` and `"password."` are distinct terms.

/// Whitespace tokenizer shared by vocabulary and IDF construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer instance.
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a text into lowercase terms.
    ///
    /// # Examples
    /// ```
    /// use tanren_core::tokenizer::Tokenizer;
    ///
    /// let tokens: Vec<String> = Tokenizer::new().tokenize("Verify your ACCOUNT").collect();
    /// assert_eq!(tokens, ["verify", "your", "account"]);
    /// ```
    pub fn tokenize<'a>(&self, text: &'a str) -> impl Iterator<Item = String> + use<'a> {
        text.split_whitespace().map(str::to_lowercase)
    }
}

use serde::{Deserialize, Serialize};
use tanren_core::vocab::DEFAULT_MAX_VOCAB_SIZE;

/// Configuration for the training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Upper bound on vocabulary size.
    pub max_vocab_size: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: DEFAULT_MAX_VOCAB_SIZE,
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_vocab_size(mut self, size: usize) -> Self {
        self.max_vocab_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(TrainerConfig::default().max_vocab_size, 5000);
        assert_eq!(TrainerConfig::new().with_max_vocab_size(10).max_vocab_size, 10);

        let cfg: TrainerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, TrainerConfig::default());
    }
}

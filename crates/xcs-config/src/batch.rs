//! Batch processing limits.

use serde::{Deserialize, Serialize};

const fn default_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Maximum number of legacy files processed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(BatchConfig::default().concurrency, 4);
    }
}

use serde::{Deserialize, Serialize};

/// Thresholds for the verdict rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerdictConfig {
    /// Minimum sentiment confidence for a positive verdict
    pub min_positive_sentiment: f64,

    /// Minimum helpfulness confidence for a positive verdict
    pub min_helpfulness: f64,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            min_positive_sentiment: 0.6,
            min_helpfulness: 0.6,
        }
    }
}

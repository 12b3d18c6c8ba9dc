//! Classifier response models.
//!
//! The classification service scores feedback text on two independent axes.
//! Either axis may be missing from a response; both are optional here and the
//! verdict engine decides what a partial response means.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierResult {
    #[serde(default)]
    pub sentiment: Option<SentimentScore>,
    #[serde(default)]
    pub helpfulness: Option<HelpfulnessScore>,
}

impl ClassifierResult {
    pub fn is_empty(&self) -> bool {
        self.sentiment.is_none() && self.helpfulness.is_none()
    }
}

/// `score` is the model's confidence in `label`, not the probability of
/// "positive".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SentimentScore {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

impl SentimentScore {
    /// Direction used for the two-class distribution. A label naming both
    /// directions counts as positive here.
    pub fn polarity(&self) -> Polarity {
        Polarity::from_label(&self.label)
    }

    pub fn indicates_positive(&self) -> bool {
        label_mentions(&self.label, "positive")
    }

    /// Checked independently of [`Self::indicates_positive`]; a label may
    /// mention both.
    pub fn indicates_negative(&self) -> bool {
        label_mentions(&self.label, "negative")
    }

    pub fn clamped_score(&self) -> f64 {
        clamp_unit(self.score)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HelpfulnessScore {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

impl HelpfulnessScore {
    pub fn category(&self) -> Option<HelpfulnessCategory> {
        HelpfulnessCategory::from_label(&self.label)
    }

    pub fn clamped_score(&self) -> f64 {
        clamp_unit(self.score)
    }
}

/// Direction a sentiment label points in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    Positive,
    Negative,
    Unknown,
}

impl Polarity {
    /// Case-insensitive substring match; "positive" is checked first.
    pub fn from_label(label: &str) -> Self {
        if label_mentions(label, "positive") {
            Polarity::Positive
        } else if label_mentions(label, "negative") {
            Polarity::Negative
        } else {
            Polarity::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum HelpfulnessCategory {
    Helpful,
    Creative,
    Unhelpful,
}

impl HelpfulnessCategory {
    pub const ALL: [HelpfulnessCategory; 3] = [
        HelpfulnessCategory::Helpful,
        HelpfulnessCategory::Creative,
        HelpfulnessCategory::Unhelpful,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HelpfulnessCategory::Helpful => "helpful",
            HelpfulnessCategory::Creative => "creative",
            HelpfulnessCategory::Unhelpful => "unhelpful",
        }
    }

    /// Exact match on the lowercase label the classifier emits.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == label)
    }
}

fn label_mentions(label: &str, word: &str) -> bool {
    label.to_lowercase().contains(word)
}

// Scores outside [0, 1] would break the percentage arithmetic downstream.
fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
impl SentimentScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[cfg(test)]
impl HelpfulnessScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

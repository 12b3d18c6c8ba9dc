use serde::{Deserialize, Serialize};

use crate::models::{HelpfulnessCategory, HelpfulnessScore, Polarity, SentimentScore};

/// Two-class view of a single-label sentiment score. The pair always sums to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentDistribution {
    pub positive_pct: u8,
    pub negative_pct: u8,
}

impl SentimentDistribution {
    /// Splits a single-label score into positive and negative mass.
    /// Labels that are neither positive nor negative treat the score as
    /// positive mass.
    pub fn from_score(polarity: Polarity, score: f64) -> Self {
        let positive = match polarity {
            Polarity::Positive | Polarity::Unknown => score,
            Polarity::Negative => 1.0 - score,
        };
        let positive_pct = to_pct(positive);
        Self {
            positive_pct,
            negative_pct: 100 - positive_pct,
        }
    }
}

/// Field names are prefixed so the breakdown can be flattened into a verdict
/// next to the helpfulness section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentBreakdown {
    #[serde(rename = "sentimentLabel")]
    pub label: String,
    #[serde(rename = "sentimentPolarity")]
    pub polarity: Polarity,
    #[serde(rename = "sentimentDistribution")]
    pub distribution: SentimentDistribution,
}

pub fn sentiment_breakdown(sentiment: &SentimentScore) -> SentimentBreakdown {
    let polarity = sentiment.polarity();
    SentimentBreakdown {
        label: sentiment.label.clone(),
        polarity,
        distribution: SentimentDistribution::from_score(polarity, sentiment.clamped_score()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulnessBreakdown {
    #[serde(rename = "helpfulnessLabel")]
    pub label: String,
    #[serde(rename = "helpfulnessCategory")]
    pub category: Option<HelpfulnessCategory>,
    pub helpfulness_pct: u8,
}

/// One display row per category. Only the returned category carries a
/// percentage; the others are unknown, never estimated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulnessRow {
    pub category: HelpfulnessCategory,
    pub pct: Option<u8>,
}

impl HelpfulnessBreakdown {
    pub fn rows(&self) -> [HelpfulnessRow; 3] {
        HelpfulnessCategory::ALL.map(|category| HelpfulnessRow {
            category,
            pct: (self.category == Some(category)).then_some(self.helpfulness_pct),
        })
    }
}

pub fn helpfulness_breakdown(helpfulness: &HelpfulnessScore) -> HelpfulnessBreakdown {
    HelpfulnessBreakdown {
        label: helpfulness.label.clone(),
        category: helpfulness.category(),
        helpfulness_pct: to_pct(helpfulness.clamped_score()),
    }
}

/// Rounds a unit-interval value to a whole percentage.
pub fn to_pct(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 100.0).round() as u8
}

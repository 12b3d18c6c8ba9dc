//! Turns a classifier response into a single user-facing verdict.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, VerdictError};
use crate::feedback::config::VerdictConfig;
use crate::feedback::distribution::{
    helpfulness_breakdown, sentiment_breakdown, HelpfulnessBreakdown, SentimentBreakdown,
};
use crate::models::{ClassifierResult, HelpfulnessCategory, HelpfulnessScore, SentimentScore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VerdictKind {
    Positive,
    Negative,
    Neutral,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Positive => "positive",
            VerdictKind::Negative => "negative",
            VerdictKind::Neutral => "neutral",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            VerdictKind::Positive => {
                "Thank you for your feedback — we're glad the answer was helpful!"
            }
            VerdictKind::Negative => {
                "Thanks for your feedback — we'll pay closer attention and work to improve future answers."
            }
            VerdictKind::Neutral => {
                "Thank you for your feedback. We'll use it to improve the system."
            }
        }
    }
}

/// Feedback text that has passed the non-empty check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackText(String);

impl FeedbackText {
    /// Rejects text that is empty after trimming. The original text is kept
    /// verbatim for the classifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyFeedback);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derived view of one feedback submission. Sections whose classifier output
/// was missing are `None` and left out of the serialized form, which reads
/// `{type, message, sentimentDistribution, helpfulnessPct, ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    #[serde(rename = "type")]
    pub kind: VerdictKind,
    pub message: String,
    #[serde(flatten)]
    pub sentiment: Option<SentimentBreakdown>,
    #[serde(flatten)]
    pub helpfulness: Option<HelpfulnessBreakdown>,
}

struct Signals<'a> {
    sentiment: Option<&'a SentimentScore>,
    helpfulness: Option<&'a HelpfulnessScore>,
}

impl Signals<'_> {
    fn category(&self) -> Option<HelpfulnessCategory> {
        self.helpfulness.and_then(HelpfulnessScore::category)
    }
}

type Rule = fn(&Signals<'_>, &VerdictConfig) -> bool;

/// Evaluated top-down, first match wins. The predicates overlap (a positive
/// sentiment with an unhelpful label fails the first and matches the second,
/// and a label may mention both directions), so the order is part of the
/// contract.
const VERDICT_RULES: [(Rule, VerdictKind); 2] = [
    (is_clearly_positive, VerdictKind::Positive),
    (is_clearly_negative, VerdictKind::Negative),
];

fn is_clearly_positive(signals: &Signals<'_>, config: &VerdictConfig) -> bool {
    let (Some(sentiment), Some(helpfulness)) = (signals.sentiment, signals.helpfulness) else {
        return false;
    };

    sentiment.indicates_positive()
        && sentiment.clamped_score() >= config.min_positive_sentiment
        && matches!(
            signals.category(),
            Some(HelpfulnessCategory::Helpful | HelpfulnessCategory::Creative)
        )
        && helpfulness.clamped_score() >= config.min_helpfulness
}

fn is_clearly_negative(signals: &Signals<'_>, _config: &VerdictConfig) -> bool {
    signals
        .sentiment
        .is_some_and(SentimentScore::indicates_negative)
        || signals.category() == Some(HelpfulnessCategory::Unhelpful)
}

fn classify(signals: &Signals<'_>, config: &VerdictConfig) -> VerdictKind {
    VERDICT_RULES
        .iter()
        .find(|(rule, _)| rule(signals, config))
        .map(|(_, kind)| *kind)
        .unwrap_or(VerdictKind::Neutral)
}

/// Computes the verdict for one feedback submission.
///
/// Taking a [`FeedbackText`] keeps empty feedback from ever reaching this
/// point. A response with neither sentiment nor helpfulness yields
/// [`VerdictError::EmptyClassification`] instead of a fabricated verdict.
pub fn compute_verdict(
    _feedback: &FeedbackText,
    result: &ClassifierResult,
    config: &VerdictConfig,
) -> Result<Verdict, VerdictError> {
    if result.is_empty() {
        return Err(VerdictError::EmptyClassification);
    }

    let signals = Signals {
        sentiment: result.sentiment.as_ref(),
        helpfulness: result.helpfulness.as_ref(),
    };
    let kind = classify(&signals, config);

    Ok(Verdict {
        kind,
        message: kind.message().to_string(),
        sentiment: result.sentiment.as_ref().map(sentiment_breakdown),
        helpfulness: result.helpfulness.as_ref().map(helpfulness_breakdown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback() -> FeedbackText {
        FeedbackText::new("The answer was spot on.").unwrap()
    }

    fn result(sentiment: (&str, f64), helpfulness: (&str, f64)) -> ClassifierResult {
        ClassifierResult {
            sentiment: Some(SentimentScore::new(sentiment.0, sentiment.1)),
            helpfulness: Some(HelpfulnessScore::new(helpfulness.0, helpfulness.1)),
        }
    }

    fn kind_of(result: &ClassifierResult) -> VerdictKind {
        compute_verdict(&feedback(), result, &VerdictConfig::default())
            .unwrap()
            .kind
    }

    #[test]
    fn blank_feedback_is_rejected() {
        assert_eq!(FeedbackText::new(""), Err(ValidationError::EmptyFeedback));
        assert_eq!(
            FeedbackText::new("  \n\t "),
            Err(ValidationError::EmptyFeedback)
        );
        assert_eq!(FeedbackText::new(" ok ").unwrap().as_str(), " ok ");
    }

    #[test]
    fn confident_positive_and_helpful_is_positive() {
        let verdict = compute_verdict(
            &feedback(),
            &result(("Positive", 0.8), ("helpful", 0.9)),
            &VerdictConfig::default(),
        )
        .unwrap();
        assert_eq!(verdict.kind, VerdictKind::Positive);
        assert_eq!(verdict.message, VerdictKind::Positive.message());
        let sentiment = verdict.sentiment.unwrap();
        assert_eq!(sentiment.distribution.positive_pct, 80);
        assert_eq!(verdict.helpfulness.unwrap().helpfulness_pct, 90);
    }

    #[test]
    fn negative_sentiment_wins_over_helpful_label() {
        assert_eq!(
            kind_of(&result(("Negative", 0.9), ("helpful", 0.9))),
            VerdictKind::Negative
        );
    }

    #[test]
    fn ambiguous_label_with_weak_creative_is_neutral() {
        assert_eq!(
            kind_of(&result(("neutral", 0.5), ("creative", 0.4))),
            VerdictKind::Neutral
        );
    }

    #[test]
    fn unhelpful_label_is_negative_even_with_positive_sentiment() {
        assert_eq!(
            kind_of(&result(("Positive", 0.95), ("unhelpful", 0.7))),
            VerdictKind::Negative
        );
    }

    #[test]
    fn label_mentioning_both_directions_falls_to_negative_when_weak() {
        assert_eq!(
            kind_of(&result(("positive_negative", 0.3), ("helpful", 0.9))),
            VerdictKind::Negative
        );
        // A confident mixed label still satisfies the first rule.
        assert_eq!(
            kind_of(&result(("positive_negative", 0.9), ("helpful", 0.9))),
            VerdictKind::Positive
        );
    }

    #[test]
    fn capitalised_helpfulness_label_is_not_recognised() {
        assert_eq!(
            kind_of(&result(("Positive", 0.9), ("Helpful", 0.9))),
            VerdictKind::Neutral
        );
    }

    #[test]
    fn serialized_verdict_uses_display_field_names() {
        let verdict = compute_verdict(
            &feedback(),
            &result(("Negative", 0.9), ("unhelpful", 0.75)),
            &VerdictConfig::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["type"], "negative");
        assert_eq!(json["message"], VerdictKind::Negative.message());
        assert_eq!(json["sentimentDistribution"]["positivePct"], 10);
        assert_eq!(json["sentimentDistribution"]["negativePct"], 90);
        assert_eq!(json["helpfulnessPct"], 75);
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn serialized_verdict_omits_missing_sections() {
        let partial = ClassifierResult {
            sentiment: None,
            helpfulness: Some(HelpfulnessScore::new("creative", 0.5)),
        };
        let verdict =
            compute_verdict(&feedback(), &partial, &VerdictConfig::default()).unwrap();

        let json = serde_json::to_value(&verdict).unwrap();
        assert!(json.get("sentimentDistribution").is_none());
        assert_eq!(json["helpfulnessPct"], 50);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(
            kind_of(&result(("positive", 0.6), ("creative", 0.6))),
            VerdictKind::Positive
        );
        assert_eq!(
            kind_of(&result(("positive", 0.59), ("helpful", 0.9))),
            VerdictKind::Neutral
        );
        assert_eq!(
            kind_of(&result(("positive", 0.9), ("helpful", 0.59))),
            VerdictKind::Neutral
        );
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let strict = VerdictConfig {
            min_positive_sentiment: 0.9,
            min_helpfulness: 0.9,
        };
        let verdict = compute_verdict(
            &feedback(),
            &result(("Positive", 0.8), ("helpful", 0.95)),
            &strict,
        )
        .unwrap();
        assert_eq!(verdict.kind, VerdictKind::Neutral);
    }

    #[test]
    fn missing_helpfulness_omits_section_and_blocks_positive() {
        let partial = ClassifierResult {
            sentiment: Some(SentimentScore::new("Positive", 0.99)),
            helpfulness: None,
        };
        let verdict =
            compute_verdict(&feedback(), &partial, &VerdictConfig::default()).unwrap();
        assert_eq!(verdict.kind, VerdictKind::Neutral);
        assert!(verdict.sentiment.is_some());
        assert!(verdict.helpfulness.is_none());
    }

    #[test]
    fn missing_sentiment_still_uses_helpfulness() {
        let partial = ClassifierResult {
            sentiment: None,
            helpfulness: Some(HelpfulnessScore::new("unhelpful", 0.8)),
        };
        let verdict =
            compute_verdict(&feedback(), &partial, &VerdictConfig::default()).unwrap();
        assert_eq!(verdict.kind, VerdictKind::Negative);
        assert!(verdict.sentiment.is_none());
        assert_eq!(verdict.helpfulness.unwrap().helpfulness_pct, 80);
    }

    #[test]
    fn empty_response_produces_no_verdict() {
        let err = compute_verdict(
            &feedback(),
            &ClassifierResult::default(),
            &VerdictConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, VerdictError::EmptyClassification);
    }
}

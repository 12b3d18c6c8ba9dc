pub mod classifier;
pub mod document;
pub mod exchange;

pub use classifier::{
    ClassifierResult, HelpfulnessCategory, HelpfulnessScore, Polarity, SentimentScore,
};
pub use document::{Document, DocumentInfo};
pub use exchange::{Exchange, ExchangeKind};

pub mod config;
pub mod distribution;
pub mod verdict;

pub use config::VerdictConfig;
pub use distribution::{HelpfulnessBreakdown, SentimentBreakdown};
pub use verdict::{compute_verdict, FeedbackText, Verdict};

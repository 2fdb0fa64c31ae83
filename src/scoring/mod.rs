//! Attempt scoring: transcript similarity and feedback tiers

pub mod feedback;
pub mod similarity;

pub use feedback::{classify, Feedback, Tier};
pub use similarity::{levenshtein, normalize, similarity};

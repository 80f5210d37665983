//! Scored prediction candidates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Where a prediction came from. Earlier variants fill slots first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CandidateSource {
    UserCompletion,
    Trigram,
    Bigram,
    Completion,
    Frequent,
    Default,
}

/// A single word candidate with an associated score.
///
/// Scores are on a relative scale within one source; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub score: f64,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, score: f64, source: CandidateSource) -> Self {
        Candidate {
            text: text.into(),
            score,
            source,
        }
    }
}

/// Sort by score descending; equal scores order alphabetically so results
/// are stable across runs.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.text.cmp(&b.text))
    });
}

//! Ranked output of a matching run.

use serde::{Deserialize, Serialize};

use crate::filter::{FilterOutcome, Rejection};
use crate::scoring::ScoreBreakdown;

/// Scores and filter trail for one eligible driver and booking pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Sum of the breakdown.
    pub total_score: u32,
    /// Individual soft scores.
    pub score_breakdown: ScoreBreakdown,
    /// Driver base to pickup, when both are known.
    #[serde(rename = "distance")]
    pub distance_miles: Option<f64>,
    /// Every filter that ran, in order.
    pub filter_outcomes: Vec<FilterOutcome>,
}

/// One eligible candidate and how it scored against the anchor.
///
/// Results are recreated on every uncached run and never persisted beyond
/// the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult<C> {
    /// The booking or driver that was ranked.
    pub candidate: C,
    /// Sum of the breakdown.
    pub total_score: u32,
    /// Individual soft scores.
    pub score_breakdown: ScoreBreakdown,
    /// Driver base to pickup, when both are known.
    #[serde(rename = "distance")]
    pub distance_miles: Option<f64>,
    /// Every filter that ran, in order.
    pub filter_outcomes: Vec<FilterOutcome>,
}

impl<C> MatchResult<C> {
    /// Attach a candidate to its assessment.
    #[must_use]
    pub fn new(candidate: C, assessment: Assessment) -> Self {
        let Assessment {
            total_score,
            score_breakdown,
            distance_miles,
            filter_outcomes,
        } = assessment;
        Self {
            candidate,
            total_score,
            score_breakdown,
            distance_miles,
            filter_outcomes,
        }
    }
}

/// Verdict on a single candidate, as produced by the explain calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation<C> {
    /// The candidate passed every filter.
    Eligible(MatchResult<C>),
    /// The candidate failed a filter.
    Rejected {
        /// The booking or driver that was dropped.
        candidate: C,
        /// First failing filter and the trail to it.
        rejection: Rejection,
    },
}

impl<C> Evaluation<C> {
    /// The candidate this verdict is about.
    #[must_use]
    pub const fn candidate(&self) -> &C {
        match self {
            Self::Eligible(result) => &result.candidate,
            Self::Rejected { candidate, .. } => candidate,
        }
    }

    /// Report whether the candidate passed every filter.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }
}

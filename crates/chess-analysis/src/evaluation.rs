//! Chess position evaluation types.

use std::fmt;

use chess_core::Side;
use serde::{Deserialize, Serialize};
use uci::Score;

/// A position evaluation from one side's point of view.
///
/// Evaluations are either pawn-unit scores (for normal positions) or mate
/// distances (when a forced mate is found). The two are never combined
/// arithmetically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationSample {
    /// Pawn units (positive = advantage for the viewing side).
    Pawns(f64),
    /// Mate in N moves (positive = the viewing side mates).
    Mate(i32),
}

impl EvaluationSample {
    /// The neutral score substituted when an evaluation is unavailable.
    pub const NEUTRAL: Self = EvaluationSample::Pawns(0.0);

    /// Converts an engine score, which is relative to the side to move, to
    /// the `perspective` side's point of view.
    pub fn from_score(score: Score, side_to_move: Side, perspective: Side) -> Self {
        let score = if side_to_move == perspective {
            score
        } else {
            score.negate()
        };
        match score {
            Score::Cp(cp) => EvaluationSample::Pawns(f64::from(cp) / 100.0),
            Score::Mate(m) => EvaluationSample::Mate(m),
        }
    }

    /// The same evaluation from the other side's point of view.
    pub fn flip(self) -> Self {
        match self {
            EvaluationSample::Pawns(p) => EvaluationSample::Pawns(0.0 - p),
            EvaluationSample::Mate(m) => EvaluationSample::Mate(-m),
        }
    }

    pub fn is_mate(&self) -> bool {
        matches!(self, EvaluationSample::Mate(_))
    }

    /// Pawn units, or `None` for a mate marker.
    pub fn pawns(&self) -> Option<f64> {
        match *self {
            EvaluationSample::Pawns(p) => Some(p),
            EvaluationSample::Mate(_) => None,
        }
    }

    /// `self - previous`, defined only when both are pawn scores.
    pub fn delta(&self, previous: &EvaluationSample) -> Option<f64> {
        Some(self.pawns()? - previous.pawns()?)
    }
}

impl Default for EvaluationSample {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for EvaluationSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationSample::Pawns(p) => write!(f, "{:+.2}", p),
            EvaluationSample::Mate(m) => write!(f, "#{}", m),
        }
    }
}

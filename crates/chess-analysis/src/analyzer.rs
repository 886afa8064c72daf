//! Mistake classification and accuracy scoring.
//!
//! This module provides the [`GameAnalyzer`], which walks a resolved game
//! once, in order, asking an [`Evaluator`] about each position and
//! collecting the tracked side's worst moves.

use chess_core::{MoveOracle, Side};
use notation::Ply;
use tracing::{debug, info, warn};

use crate::engine::{Evaluator, SearchLimit};
use crate::evaluation::EvaluationSample;
use crate::phase::{is_endgame, GamePhase};
use crate::quality::{AccuracyScore, MistakeBuckets, MistakeRecord};

/// A move must lose more than this many pawns to count as a mistake.
pub const MISTAKE_THRESHOLD: f64 = -0.2;

/// A single mistake adds at most this much to the penalty.
pub const MAX_PENALTY_PER_MOVE: f64 = 1.0;

/// Search limits for each kind of engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Search for the engine's own choice before each move.
    pub best_move: SearchLimit,
    /// Evaluation of the position after each move.
    pub evaluate: SearchLimit,
    /// The suggested replacement for a mistake.
    pub alternative: SearchLimit,
    /// Multi-line search for the best lines display.
    pub lines: SearchLimit,
    /// How many best lines to request.
    pub line_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            best_move: SearchLimit::millis(500),
            evaluate: SearchLimit::millis(100),
            alternative: SearchLimit::millis(200),
            lines: SearchLimit::millis(500),
            line_count: 3,
        }
    }
}

impl AnalysisConfig {
    /// Every search to a fixed depth instead of a time budget.
    pub fn fixed_depth(depth: u32) -> Self {
        let limit = SearchLimit::Depth(depth);
        Self {
            best_move: limit,
            evaluate: limit,
            alternative: limit,
            lines: limit,
            ..Self::default()
        }
    }
}

/// The classifier's result for one game and one tracked side.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub buckets: MistakeBuckets,
    pub accuracy: AccuracyScore,
}

/// Classifies one side's moves in resolved games.
pub struct GameAnalyzer<E> {
    evaluator: E,
    config: AnalysisConfig,
}

impl<E: Evaluator> GameAnalyzer<E> {
    pub fn new(evaluator: E, config: AnalysisConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn into_evaluator(self) -> E {
        self.evaluator
    }

    /// Classifies the tracked side's moves.
    ///
    /// For each ply:
    /// 1. If the played move is the engine's choice, it is never a mistake;
    ///    only the running evaluation is refreshed.
    /// 2. Otherwise the position after the move is evaluated from the
    ///    tracked side's point of view. For the tracked side's moves, a drop
    ///    of more than [`MISTAKE_THRESHOLD`] is recorded and penalised.
    ///
    /// Evaluator failures never abort the pass: a failed best-move request
    /// counts as "not the engine's choice" and a failed evaluation leaves the
    /// running evaluation where it was.
    pub fn classify<O>(
        &mut self,
        oracle: &O,
        plies: &[Ply<O::Position, O::Move>],
        tracked: Side,
    ) -> Classification
    where
        O: MoveOracle,
    {
        let mut previous = EvaluationSample::NEUTRAL;
        let mut total_penalty = 0.0;
        let mut last_move_number = 0;
        let mut records = Vec::new();

        for ply in plies {
            last_move_number = ply.move_number;
            let fen_before = oracle.fen(&ply.before);
            let fen_after = oracle.fen(&ply.after);

            let best = match self.evaluator.best_move(&fen_before, self.config.best_move) {
                Ok(best) => best,
                Err(e) => {
                    warn!(move_number = ply.move_number, san = %ply.san, error = %e, "best-move request failed");
                    None
                }
            };

            if best.as_deref() == Some(oracle.uci(&ply.mv).as_str()) {
                debug!(move_number = ply.move_number, san = %ply.san, "engine's choice");
                if let Some(sample) = self.evaluate(&fen_after, tracked, ply) {
                    previous = sample;
                }
                continue;
            }

            let endgame = is_endgame(oracle, &ply.before);
            let Some(current) = self.evaluate(&fen_after, tracked, ply) else {
                continue;
            };

            if ply.side == tracked {
                match current.delta(&previous) {
                    Some(delta) if delta < MISTAKE_THRESHOLD => {
                        let phase = GamePhase::classify(ply.move_number, endgame);
                        total_penalty += (-delta).min(MAX_PENALTY_PER_MOVE);
                        debug!(move_number = ply.move_number, san = %ply.san, delta, ?phase, "mistake");
                        records.push(MistakeRecord {
                            move_number: ply.move_number,
                            side: ply.side,
                            san: ply.san.clone(),
                            evaluation: current,
                            delta,
                            phase,
                        });
                    }
                    Some(_) => {}
                    None => {
                        debug!(move_number = ply.move_number, san = %ply.san, "mate score, not compared");
                    }
                }
            }

            previous = current;
        }

        let buckets = MistakeBuckets::from_records(records);
        let accuracy = AccuracyScore::from_penalty(total_penalty, last_move_number);
        info!(
            side = %tracked,
            mistakes = buckets.all.len(),
            accuracy = accuracy.value(),
            "classification finished"
        );
        Classification { buckets, accuracy }
    }

    fn evaluate<P, M>(&mut self, fen: &str, tracked: Side, ply: &Ply<P, M>) -> Option<EvaluationSample> {
        match self.evaluator.evaluate(fen, tracked, self.config.evaluate) {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!(move_number = ply.move_number, san = %ply.san, error = %e, "evaluation failed");
                None
            }
        }
    }
}

/// Classifies `tracked`'s moves with a borrowed evaluator.
pub fn classify<O, E>(
    oracle: &O,
    plies: &[Ply<O::Position, O::Move>],
    tracked: Side,
    evaluator: &mut E,
    config: &AnalysisConfig,
) -> Classification
where
    O: MoveOracle,
    E: Evaluator + ?Sized,
{
    GameAnalyzer::new(evaluator, config.clone()).classify(oracle, plies, tracked)
}

//! An in-memory [`Evaluator`] driven by a script of FEN lookups.
//!
//! Used by the test suites of this crate and its dependents to exercise the
//! classifier without an engine process.

use std::collections::{HashMap, HashSet};

use chess_core::{MoveOracle, Side};
use notation::Ply;

use crate::engine::{EngineError, Evaluator, PvLine, SearchLimit};
use crate::evaluation::EvaluationSample;

/// Answers evaluator calls from scripted tables keyed by FEN.
///
/// Evaluations are stored from White's point of view and flipped on the way
/// out. An unscripted evaluation or line request fails; an unscripted
/// best-move request answers "no preference" unless it was marked failing
/// with [`ScriptedEvaluator::fail_best_move`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvaluator {
    evaluations: HashMap<String, EvaluationSample>,
    best_moves: HashMap<String, String>,
    lines: HashMap<String, Vec<PvLine>>,
    failing_best_moves: HashSet<String>,
    calls: usize,
    failures: usize,
}

impl ScriptedEvaluator {
    /// An evaluator whose best move before every ply is the move played.
    pub fn following<O: MoveOracle>(oracle: &O, plies: &[Ply<O::Position, O::Move>]) -> Self {
        let mut evaluator = Self::default();
        for ply in plies {
            evaluator.set_best_move(&oracle.fen(&ply.before), &oracle.uci(&ply.mv));
        }
        evaluator
    }

    /// Scripts a pawn score for `fen` as seen by `perspective`.
    pub fn set_eval(&mut self, fen: &str, perspective: Side, pawns: f64) {
        self.set_sample(fen, perspective, EvaluationSample::Pawns(pawns));
    }

    pub fn set_sample(&mut self, fen: &str, perspective: Side, sample: EvaluationSample) {
        let white_view = match perspective {
            Side::White => sample,
            Side::Black => sample.flip(),
        };
        self.evaluations.insert(fen.to_string(), white_view);
    }

    pub fn set_best_move(&mut self, fen: &str, uci: &str) {
        self.best_moves.insert(fen.to_string(), uci.to_string());
    }

    /// Makes every best-move request for `fen` fail.
    pub fn fail_best_move(&mut self, fen: &str) {
        self.failing_best_moves.insert(fen.to_string());
    }

    /// Scripts the ranked lines for `fen`. Scores are from White's view.
    pub fn set_lines(&mut self, fen: &str, lines: Vec<PvLine>) {
        self.lines.insert(fen.to_string(), lines);
    }

    /// Total number of evaluator calls answered or refused.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Number of calls that failed, scripted or for lack of an answer.
    pub fn failures(&self) -> usize {
        self.failures
    }

    fn missing(&mut self, what: &str, fen: &str) -> EngineError {
        self.failures += 1;
        EngineError::InvalidResponse(format!("no scripted {} for {}", what, fen))
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(
        &mut self,
        fen: &str,
        perspective: Side,
        _limit: SearchLimit,
    ) -> Result<EvaluationSample, EngineError> {
        self.calls += 1;
        match self.evaluations.get(fen).copied() {
            Some(sample) if perspective == Side::White => Ok(sample),
            Some(sample) => Ok(sample.flip()),
            None => Err(self.missing("evaluation", fen)),
        }
    }

    fn best_move(&mut self, fen: &str, _limit: SearchLimit) -> Result<Option<String>, EngineError> {
        self.calls += 1;
        if self.failing_best_moves.contains(fen) {
            return Err(self.missing("best move", fen));
        }
        Ok(self.best_moves.get(fen).cloned())
    }

    fn top_lines(
        &mut self,
        fen: &str,
        _limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<PvLine>, EngineError> {
        self.calls += 1;
        match self.lines.get(fen) {
            Some(lines) => Ok(lines.iter().take(k).cloned().collect()),
            None => Err(self.missing("lines", fen)),
        }
    }
}

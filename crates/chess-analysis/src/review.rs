//! Display data for a finished classification.
//!
//! None of these draw anything. They turn mistakes and engine lines into
//! FENs, square names and SAN text that any front end can render.

use std::fmt;

use chess_core::{MoveOracle, Side};
use notation::Ply;
use serde::Serialize;
use tracing::debug;

use crate::engine::{EngineError, Evaluator, SearchLimit};
use crate::evaluation::EvaluationSample;
use crate::quality::MistakeRecord;

/// Best lines are cut to this many moves.
pub const MAX_LINE_MOVES: usize = 6;

/// Everything needed to show a mistake on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MistakeView {
    pub move_number: u32,
    pub san: String,
    /// Position before the mistake.
    pub fen_before: String,
    /// Position after the mistake.
    pub fen_after: String,
    pub from: String,
    pub to: String,
    /// The side the board should be oriented for.
    pub orientation: Side,
}

/// Locates the ply a bucket entry refers to.
///
/// Returns `None` if no ply matches the record's move number, side and SAN.
pub fn mistake_view<O: MoveOracle>(
    oracle: &O,
    plies: &[Ply<O::Position, O::Move>],
    record: &MistakeRecord,
) -> Option<MistakeView> {
    let ply = find_ply(plies, record)?;
    let (from, to) = oracle.squares(&ply.mv);
    Some(MistakeView {
        move_number: ply.move_number,
        san: ply.san.clone(),
        fen_before: oracle.fen(&ply.before),
        fen_after: oracle.fen(&ply.after),
        from,
        to,
        orientation: ply.side,
    })
}

/// The ply a mistake record was taken from.
pub fn find_ply<'a, P, M>(plies: &'a [Ply<P, M>], record: &MistakeRecord) -> Option<&'a Ply<P, M>> {
    plies.iter().find(|ply| {
        ply.move_number == record.move_number && ply.side == record.side && ply.san == record.san
    })
}

/// The engine's suggestion in place of a mistake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub san: String,
    pub from: String,
    pub to: String,
    /// Position after the suggested move.
    pub fen_after: String,
}

/// Asks the engine what it would have played instead of `ply`.
///
/// `Ok(None)` when the engine has no move or answers with one that is not
/// legal in the pre-mistake position.
pub fn best_alternative<O, E>(
    evaluator: &mut E,
    oracle: &O,
    ply: &Ply<O::Position, O::Move>,
    limit: SearchLimit,
) -> Result<Option<Alternative>, EngineError>
where
    O: MoveOracle,
    E: Evaluator + ?Sized,
{
    let Some(uci) = evaluator.best_move(&oracle.fen(&ply.before), limit)? else {
        return Ok(None);
    };
    let Some(mv) = oracle.parse_uci(&ply.before, &uci) else {
        debug!(%uci, "engine suggested a move that is not legal here");
        return Ok(None);
    };

    let san = oracle
        .san(&ply.before, &mv)
        .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
    let after = oracle
        .play(&ply.before, &mv)
        .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
    let (from, to) = oracle.squares(&mv);
    Ok(Some(Alternative {
        san,
        from,
        to,
        fen_after: oracle.fen(&after),
    }))
}

/// The evaluation after `ply`, from `tracked`'s point of view.
pub fn current_evaluation<O, E>(
    evaluator: &mut E,
    oracle: &O,
    ply: &Ply<O::Position, O::Move>,
    tracked: Side,
    limit: SearchLimit,
) -> Result<EvaluationSample, EngineError>
where
    O: MoveOracle,
    E: Evaluator + ?Sized,
{
    evaluator.evaluate(&oracle.fen(&ply.after), tracked, limit)
}

/// One engine line in SAN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestLine {
    /// 1-based rank.
    pub rank: usize,
    /// At most [`MAX_LINE_MOVES`] moves.
    pub moves: Vec<String>,
    /// Score from White's point of view.
    pub score: EvaluationSample,
}

impl fmt::Display for BestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (Eval: {})", self.rank, self.moves.join(" "), self.score)
    }
}

/// The engine's top `k` lines from `position`, rendered in SAN.
///
/// A line is cut at the first move the oracle does not accept.
pub fn best_lines<O, E>(
    evaluator: &mut E,
    oracle: &O,
    position: &O::Position,
    limit: SearchLimit,
    k: usize,
) -> Result<Vec<BestLine>, EngineError>
where
    O: MoveOracle,
    E: Evaluator + ?Sized,
{
    let lines = evaluator.top_lines(&oracle.fen(position), limit, k)?;
    Ok(lines
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, line)| BestLine {
            rank: i + 1,
            moves: pv_to_san(oracle, position, &line.moves),
            score: line.score,
        })
        .collect())
}

fn pv_to_san<O: MoveOracle>(oracle: &O, position: &O::Position, pv: &[String]) -> Vec<String> {
    let mut position = position.clone();
    let mut moves = Vec::new();
    for uci in pv.iter().take(MAX_LINE_MOVES) {
        let Some(mv) = oracle.parse_uci(&position, uci) else {
            debug!(%uci, "line cut at unplayable move");
            break;
        };
        let (Ok(san), Ok(next)) = (oracle.san(&position, &mv), oracle.play(&position, &mv)) else {
            break;
        };
        moves.push(san);
        position = next;
    }
    moves
}

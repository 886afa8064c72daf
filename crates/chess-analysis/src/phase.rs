//! Game phase detection.

use chess_core::{MoveOracle, Side};
use serde::{Deserialize, Serialize};

/// Move numbers up to and including this one count as the opening.
pub const OPENING_LAST_MOVE: u32 = 10;

/// A side with at most this many queens, rooks, bishops and knights is
/// down to endgame material.
pub const ENDGAME_MAX_PIECES: u32 = 2;

/// The phase bucket a mistake belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    /// Opening by move number first, then endgame by material, otherwise
    /// middlegame.
    pub fn classify(move_number: u32, endgame_material: bool) -> Self {
        if move_number <= OPENING_LAST_MOVE {
            GamePhase::Opening
        } else if endgame_material {
            GamePhase::Endgame
        } else {
            GamePhase::Middlegame
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Opening => "opening",
            GamePhase::Middlegame => "middlegame",
            GamePhase::Endgame => "endgame",
        }
    }
}

/// True when both sides independently have endgame material.
pub fn is_endgame<O: MoveOracle>(oracle: &O, position: &O::Position) -> bool {
    [Side::White, Side::Black]
        .into_iter()
        .all(|side| oracle.piece_count(position, side) <= ENDGAME_MAX_PIECES)
}

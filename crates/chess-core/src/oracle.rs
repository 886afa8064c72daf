//! Move legality oracle abstraction.
//!
//! The review pipeline never generates chess moves itself. It asks a
//! [`MoveOracle`] for the legal moves of a position, for the SAN text of a
//! move, and for the position that results from playing it. Positions are
//! values: [`MoveOracle::play`] returns a fresh position and leaves its input
//! untouched, so every ply can own an independent snapshot.

use crate::Side;
use thiserror::Error;

/// Errors reported by an oracle for a single operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// SAN could not be rendered for the move in this position.
    #[error("cannot render SAN for {0}")]
    San(String),
    /// The move is not legal in this position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Trait for move legality oracles.
///
/// # Example
///
/// ```
/// use chess_core::{MoveOracle, StandardRules};
///
/// let rules = StandardRules;
/// let position = rules.initial_position();
/// let moves = rules.legal_moves(&position);
/// assert_eq!(moves.len(), 20);
/// ```
pub trait MoveOracle {
    /// A position snapshot.
    type Position: Clone;
    /// A move, as enumerated by [`legal_moves`](MoveOracle::legal_moves).
    type Move: Clone + PartialEq;

    /// Returns the standard initial position.
    fn initial_position(&self) -> Self::Position;

    /// Enumerates all legal moves, in the oracle's own order.
    fn legal_moves(&self, position: &Self::Position) -> Vec<Self::Move>;

    /// Renders the move in SAN, including any check or mate suffix.
    ///
    /// Rendering must be deterministic for a given (position, move) pair.
    fn san(&self, position: &Self::Position, m: &Self::Move) -> Result<String, OracleError>;

    /// Plays a move, returning the resulting position.
    fn play(&self, position: &Self::Position, m: &Self::Move)
        -> Result<Self::Position, OracleError>;

    /// Returns the side to move.
    fn side_to_move(&self, position: &Self::Position) -> Side;

    /// Returns the full-move number (starts at 1, incremented after Black moves).
    fn fullmove_number(&self, position: &Self::Position) -> u32;

    /// Counts the queens, rooks, bishops and knights owned by `side`.
    fn piece_count(&self, position: &Self::Position, side: Side) -> u32;

    /// Serializes the position as FEN.
    fn fen(&self, position: &Self::Position) -> String;

    /// Maps an engine reply in UCI notation to a legal move, if it is one.
    fn parse_uci(&self, position: &Self::Position, uci: &str) -> Option<Self::Move>;

    /// Renders a move in UCI notation.
    fn uci(&self, m: &Self::Move) -> String;

    /// Returns the from and to square names of a move.
    ///
    /// Castling reports the king's origin and destination squares.
    fn squares(&self, m: &Self::Move) -> (String, String) {
        let uci = self.uci(m);
        if uci.len() >= 4 && uci.is_char_boundary(2) && uci.is_char_boundary(4) {
            (uci[..2].to_string(), uci[2..4].to_string())
        } else {
            (uci.clone(), uci)
        }
    }
}

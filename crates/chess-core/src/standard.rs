//! Standard chess rules, delegated to `shakmaty`.

use crate::{MoveOracle, OracleError, Side};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position, Role};

/// Roles counted when judging the game phase. Pawns and kings are excluded.
const MINOR_AND_MAJOR: [Role; 4] = [Role::Queen, Role::Rook, Role::Bishop, Role::Knight];

/// Standard chess rules (FIDE), backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl MoveOracle for StandardRules {
    type Position = Chess;
    type Move = Move;

    fn initial_position(&self) -> Chess {
        Chess::default()
    }

    fn legal_moves(&self, position: &Chess) -> Vec<Move> {
        position.legal_moves().into_iter().collect()
    }

    fn san(&self, position: &Chess, m: &Move) -> Result<String, OracleError> {
        if !position.legal_moves().contains(m) {
            return Err(OracleError::San(self.uci(m)));
        }
        Ok(SanPlus::from_move(position.clone(), m.clone()).to_string())
    }

    fn play(&self, position: &Chess, m: &Move) -> Result<Chess, OracleError> {
        position
            .clone()
            .play(m.clone())
            .map_err(|_| OracleError::IllegalMove(self.uci(m)))
    }

    fn side_to_move(&self, position: &Chess) -> Side {
        position.turn().into()
    }

    fn fullmove_number(&self, position: &Chess) -> u32 {
        position.fullmoves().get()
    }

    fn piece_count(&self, position: &Chess, side: Side) -> u32 {
        let board = position.board();
        let color = shakmaty::Color::from(side);
        MINOR_AND_MAJOR
            .iter()
            .map(|&role| (board.by_role(role) & board.by_color(color)).count() as u32)
            .sum()
    }

    fn fen(&self, position: &Chess) -> String {
        Fen::from_position(position, EnPassantMode::Legal).to_string()
    }

    fn parse_uci(&self, position: &Chess, uci: &str) -> Option<Move> {
        let parsed: UciMove = uci.trim().parse().ok()?;
        parsed.to_move(position).ok()
    }

    fn uci(&self, m: &Move) -> String {
        m.clone().to_uci(CastlingMode::Standard).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(rules: &StandardRules, ucis: &[&str]) -> Chess {
        let mut position = rules.initial_position();
        for uci in ucis {
            let m = rules.parse_uci(&position, uci).unwrap();
            position = rules.play(&position, &m).unwrap();
        }
        position
    }

    #[test]
    fn initial_position_has_twenty_moves() {
        let rules = StandardRules;
        let position = rules.initial_position();
        assert_eq!(rules.legal_moves(&position).len(), 20);
        assert_eq!(rules.side_to_move(&position), Side::White);
        assert_eq!(rules.fullmove_number(&position), 1);
    }

    #[test]
    fn san_pawn_push() {
        let rules = StandardRules;
        let position = rules.initial_position();
        let m = rules.parse_uci(&position, "e2e4").unwrap();
        assert_eq!(rules.san(&position, &m).unwrap(), "e4");
    }

    #[test]
    fn san_includes_mate_suffix() {
        let rules = StandardRules;
        let position = play_all(&rules, &["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6"]);
        let m = rules.parse_uci(&position, "h5f7").unwrap();
        assert_eq!(rules.san(&position, &m).unwrap(), "Qxf7#");
    }

    #[test]
    fn san_rejects_move_from_another_position() {
        let rules = StandardRules;
        let start = rules.initial_position();
        let after_e4 = play_all(&rules, &["e2e4"]);
        let e4 = rules.parse_uci(&start, "e2e4").unwrap();
        assert!(rules.san(&after_e4, &e4).is_err());
    }

    #[test]
    fn play_leaves_input_untouched() {
        let rules = StandardRules;
        let start = rules.initial_position();
        let m = rules.parse_uci(&start, "g1f3").unwrap();
        let next = rules.play(&start, &m).unwrap();
        assert_eq!(rules.side_to_move(&start), Side::White);
        assert_eq!(rules.side_to_move(&next), Side::Black);
        assert_eq!(rules.legal_moves(&start).len(), 20);
    }

    #[test]
    fn fullmove_number_increments_after_black() {
        let rules = StandardRules;
        assert_eq!(rules.fullmove_number(&play_all(&rules, &["e2e4"])), 1);
        assert_eq!(rules.fullmove_number(&play_all(&rules, &["e2e4", "e7e5"])), 2);
    }

    #[test]
    fn piece_count_excludes_pawns_and_kings() {
        let rules = StandardRules;
        let position = rules.initial_position();
        assert_eq!(rules.piece_count(&position, Side::White), 7);
        assert_eq!(rules.piece_count(&position, Side::Black), 7);
    }

    #[test]
    fn fen_of_initial_position() {
        let rules = StandardRules;
        assert_eq!(
            rules.fen(&rules.initial_position()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn parse_uci_rejects_illegal_moves() {
        let rules = StandardRules;
        let position = rules.initial_position();
        assert!(rules.parse_uci(&position, "e2e5").is_none());
        assert!(rules.parse_uci(&position, "garbage").is_none());
    }

    #[test]
    fn castling_squares_are_king_squares() {
        let rules = StandardRules;
        let position = play_all(&rules, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        let castle = rules.parse_uci(&position, "e1g1").unwrap();
        assert_eq!(rules.san(&position, &castle).unwrap(), "O-O");
        assert_eq!(
            rules.squares(&castle),
            ("e1".to_string(), "g1".to_string())
        );
    }
}

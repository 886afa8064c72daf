//! SAN resolution: replaying move tokens against a move oracle.

use chess_core::{MoveOracle, Side};
use thiserror::Error;
use tracing::debug;

/// One resolved half-move.
///
/// `before` and `after` are independent snapshots owned by this ply.
#[derive(Debug, Clone, PartialEq)]
pub struct Ply<P, M> {
    /// Full-move number shared by both sides' moves.
    pub move_number: u32,
    /// The side that made this move.
    pub side: Side,
    /// The token exactly as it appeared in the move text.
    pub san: String,
    /// The legal move the token resolved to.
    pub mv: M,
    pub before: P,
    pub after: P,
}

/// A fully resolved game: one ply per move token, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGame<P, M> {
    initial: P,
    plies: Vec<Ply<P, M>>,
}

impl<P, M> ResolvedGame<P, M> {
    /// The position before the first ply.
    pub fn initial(&self) -> &P {
        &self.initial
    }

    pub fn plies(&self) -> &[Ply<P, M>] {
        &self.plies
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    /// The position after the last ply, or the initial position.
    pub fn final_position(&self) -> &P {
        self.plies
            .last()
            .map(|ply| &ply.after)
            .unwrap_or(&self.initial)
    }
}

/// A move token has no matching legal move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Illegal move {move_number}{} {token} ({side})", label_dots(.side))]
pub struct ResolutionError {
    pub move_number: u32,
    pub side: Side,
    pub token: String,
}

fn label_dots(side: &Side) -> &'static str {
    if side.is_first_mover() {
        "."
    } else {
        "..."
    }
}

/// Resolves SAN tokens starting from the standard initial position.
///
/// # Errors
///
/// Stops at the first token that matches no legal move.
pub fn resolve<O, T>(
    oracle: &O,
    tokens: &[T],
) -> Result<ResolvedGame<O::Position, O::Move>, ResolutionError>
where
    O: MoveOracle,
    T: AsRef<str>,
{
    resolve_from(oracle, tokens, oracle.initial_position())
}

/// Resolves SAN tokens starting from `initial`.
///
/// Each token selects the first legal move, in the oracle's enumeration
/// order, whose rendered SAN equals the token exactly. A candidate whose SAN
/// cannot be rendered is skipped.
pub fn resolve_from<O, T>(
    oracle: &O,
    tokens: &[T],
    initial: O::Position,
) -> Result<ResolvedGame<O::Position, O::Move>, ResolutionError>
where
    O: MoveOracle,
    T: AsRef<str>,
{
    let mut plies = Vec::with_capacity(tokens.len());
    let mut position = initial.clone();

    for token in tokens {
        let token = token.as_ref();
        let move_number = oracle.fullmove_number(&position);
        let side = oracle.side_to_move(&position);

        let failure = || ResolutionError {
            move_number,
            side,
            token: token.to_string(),
        };

        let mv = find_move(oracle, &position, token).ok_or_else(failure)?;
        let after = match oracle.play(&position, &mv) {
            Ok(after) => after,
            Err(e) => {
                debug!(token, error = %e, "oracle refused its own move");
                return Err(failure());
            }
        };

        plies.push(Ply {
            move_number,
            side,
            san: token.to_string(),
            mv,
            before: position,
            after: after.clone(),
        });
        position = after;
    }

    Ok(ResolvedGame { initial, plies })
}

fn find_move<O: MoveOracle>(oracle: &O, position: &O::Position, token: &str) -> Option<O::Move> {
    oracle
        .legal_moves(position)
        .into_iter()
        .find(|candidate| match oracle.san(position, candidate) {
            Ok(san) => san == token,
            Err(e) => {
                debug!(token, error = %e, "skipping candidate");
                false
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{OracleError, StandardRules};
    use proptest::prelude::*;

    #[test]
    fn resolves_opening_moves() {
        let game = resolve(&StandardRules, &["e4", "e5", "Nf3"]).unwrap();
        assert_eq!(game.len(), 3);

        let plies = game.plies();
        assert_eq!((plies[0].move_number, plies[0].side), (1, Side::White));
        assert_eq!((plies[1].move_number, plies[1].side), (1, Side::Black));
        assert_eq!((plies[2].move_number, plies[2].side), (2, Side::White));
        assert_eq!(plies[2].san, "Nf3");
        let rules = StandardRules;
        assert_eq!(rules.fen(&plies[1].after), rules.fen(&plies[2].before));
        assert_eq!(
            rules.fen(game.final_position()),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn illegal_white_move_is_reported() {
        let err = resolve(&StandardRules, &["e4", "e5", "Ke3"]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError {
                move_number: 2,
                side: Side::White,
                token: "Ke3".to_string()
            }
        );
        assert_eq!(err.to_string(), "Illegal move 2. Ke3 (White)");
    }

    #[test]
    fn illegal_black_move_is_reported() {
        let err = resolve(&StandardRules, &["e4", "e4"]).unwrap_err();
        assert_eq!(err.to_string(), "Illegal move 1... e4 (Black)");
    }

    #[test]
    fn check_suffix_must_match_exactly() {
        let tokens = ["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6"];
        assert!(resolve(&StandardRules, &tokens).is_ok());

        let mut mate = tokens.to_vec();
        mate.push("Qxf7");
        let err = resolve(&StandardRules, &mate).unwrap_err();
        assert_eq!(err.token, "Qxf7");

        mate.pop();
        mate.push("Qxf7#");
        assert_eq!(resolve(&StandardRules, &mate).unwrap().len(), 7);
    }

    #[test]
    fn empty_token_list_is_an_empty_game() {
        let tokens: [&str; 0] = [];
        let game = resolve(&StandardRules, &tokens).unwrap();
        assert!(game.is_empty());
        assert_eq!(
            StandardRules.fen(game.final_position()),
            StandardRules.fen(game.initial())
        );
    }

    /// Counts along a line; SAN rendering fails for odd moves.
    struct FlakyOracle;

    impl MoveOracle for FlakyOracle {
        type Position = u32;
        type Move = u32;

        fn initial_position(&self) -> u32 {
            0
        }

        fn legal_moves(&self, _position: &u32) -> Vec<u32> {
            vec![1, 2, 3]
        }

        fn san(&self, _position: &u32, m: &u32) -> Result<String, OracleError> {
            if m % 2 == 1 {
                Err(OracleError::San(m.to_string()))
            } else {
                Ok(format!("m{}", m))
            }
        }

        fn play(&self, position: &u32, m: &u32) -> Result<u32, OracleError> {
            Ok(position + m)
        }

        fn side_to_move(&self, position: &u32) -> Side {
            if position % 2 == 0 {
                Side::White
            } else {
                Side::Black
            }
        }

        fn fullmove_number(&self, position: &u32) -> u32 {
            position / 2 + 1
        }

        fn piece_count(&self, _position: &u32, _side: Side) -> u32 {
            0
        }

        fn fen(&self, position: &u32) -> String {
            position.to_string()
        }

        fn parse_uci(&self, _position: &u32, uci: &str) -> Option<u32> {
            uci.parse().ok()
        }

        fn uci(&self, m: &u32) -> String {
            m.to_string()
        }
    }

    #[test]
    fn san_failure_skips_only_that_candidate() {
        let game = resolve(&FlakyOracle, &["m2", "m2"]).unwrap();
        assert_eq!(game.len(), 2);
        assert_eq!(*game.final_position(), 4);

        let err = resolve(&FlakyOracle, &["m1"]).unwrap_err();
        assert_eq!(err.token, "m1");
    }

    proptest! {
        #[test]
        fn resolved_san_round_trips(choices in proptest::collection::vec(any::<usize>(), 0..40)) {
            let rules = StandardRules;
            let mut position = rules.initial_position();
            let mut tokens = Vec::new();
            for choice in choices {
                let moves = rules.legal_moves(&position);
                if moves.is_empty() {
                    break;
                }
                let m = &moves[choice % moves.len()];
                tokens.push(rules.san(&position, m).unwrap());
                position = rules.play(&position, m).unwrap();
            }

            let game = resolve(&rules, &tokens).unwrap();
            prop_assert_eq!(game.len(), tokens.len());
            for (ply, token) in game.plies().iter().zip(&tokens) {
                prop_assert_eq!(&rules.san(&ply.before, &ply.mv).unwrap(), token);
            }
        }
    }
}

//! Game notation handling for the review pipeline.
//!
//! A raw notation document flows through these stages, none of which talks
//! to an engine:
//!
//! - [`validate`] checks header and move-text plausibility and yields a
//!   [`ParsedDocument`]
//! - [`tokenize`] types every move-text token as a [`MoveToken`]
//! - [`resolve`] replays the SAN candidates against a
//!   [`MoveOracle`](chess_core::MoveOracle), producing one [`Ply`] per token
//! - [`resolve_color`] maps a player identifier to the side it played
//!
//! # Example
//!
//! ```
//! use chess_core::StandardRules;
//! use notation::{resolve, validate};
//!
//! let pgn = "[Event \"Casual\"]\n[Site \"?\"]\n[Date \"2024.01.01\"]\n\
//!            [White \"alice\"]\n[Black \"bob\"]\n\n1. e4 e5 1-0";
//! let parsed = validate(pgn)?;
//! let game = resolve(&StandardRules, &parsed.san_tokens())?;
//! assert_eq!(game.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod color;
mod document;
mod replay;
pub mod rules;
mod tokenizer;
mod validate;

pub use color::{require_color, resolve_color, ColorNotFound};
pub use document::{GameDocument, REQUIRED_TAGS};
pub use replay::{resolve, resolve_from, Ply, ResolutionError, ResolvedGame};
pub use tokenizer::{san_candidates, tokenize, MoveToken};
pub use validate::{validate, ParsedDocument, StructureError, StructureRule};

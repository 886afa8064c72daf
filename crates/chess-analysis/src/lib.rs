//! Engine-backed review of resolved games.
//!
//! This crate classifies one player's moves by comparing engine evaluations
//! before and after each move.
//!
//! # Overview
//!
//! - [`EvaluationSample`] - Position evaluation (pawn units or mate marker)
//! - [`Evaluator`] - Anything that can evaluate a FEN position
//! - [`AnalysisEngine`] - The [`Evaluator`] backed by a UCI engine process
//! - [`GameAnalyzer`] - Mistake buckets and accuracy for one tracked side
//! - [`review`] - Boards, alternatives and best lines for display
//!
//! # Example
//!
//! ```ignore
//! use chess_analysis::{classify, AnalysisConfig, AnalysisEngine};
//! use chess_core::{Side, StandardRules};
//!
//! let game = notation::resolve(&StandardRules, &["e4", "e5", "Qh5"])?;
//! let mut engine = AnalysisEngine::new("stockfish")?;
//! let result = classify(&StandardRules, game.plies(), Side::White, &mut engine, &AnalysisConfig::default());
//! println!("Accuracy: {:.1}%", result.accuracy.percent());
//! ```

pub mod analyzer;
pub mod engine;
pub mod evaluation;
pub mod phase;
pub mod quality;
pub mod review;
#[doc(hidden)]
pub mod testing;

pub use analyzer::{classify, AnalysisConfig, Classification, GameAnalyzer};
pub use engine::{AnalysisEngine, EngineError, EngineOptions, Evaluator, PvLine, SearchLimit};
pub use evaluation::EvaluationSample;
pub use phase::{is_endgame, GamePhase};
pub use quality::{AccuracyScore, MistakeBuckets, MistakeRecord};
pub use review::{
    best_alternative, best_lines, current_evaluation, find_ply, mistake_view, Alternative, BestLine,
    MistakeView,
};

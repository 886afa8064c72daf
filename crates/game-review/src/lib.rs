//! Review one player's moves in a recorded chess game.
//!
//! The pipeline runs in a fixed order and stops at the first failure:
//!
//! 1. [`notation::validate`] checks the document's structure
//! 2. [`notation::resolve`] replays the moves against [`StandardRules`]
//! 3. [`notation::require_color`] finds the side the player had
//! 4. one engine session classifies that side's moves
//!
//! [`review_game`] runs all of it with a Stockfish-style UCI engine.
//! [`review_game_with_insights`] adds engine insights for one bucket of
//! mistakes. [`review_with`] takes any [`Evaluator`] instead.

pub mod config;
pub mod report;

use chess_analysis::{
    best_alternative, best_lines, classify, current_evaluation, find_ply, mistake_view,
    AccuracyScore, Alternative, AnalysisConfig, AnalysisEngine, BestLine, EngineError,
    EvaluationSample, Evaluator, MistakeBuckets, MistakeView,
};
use chess_core::{MoveOracle, Side, StandardRules};
use notation::{ColorNotFound, GameDocument, ResolutionError, ResolvedGame, StructureError};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub use config::{BudgetConfig, ConfigError, ReviewConfig};

/// A game resolved with the standard rules.
pub type StandardGame = ResolvedGame<
    <StandardRules as MoveOracle>::Position,
    <StandardRules as MoveOracle>::Move,
>;

/// Errors that end a review.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Color(#[from] ColorNotFound),
    /// The engine session could not be opened.
    #[error("Engine unavailable: {0}")]
    Engine(#[from] EngineError),
    #[error("unknown mistake bucket: {0}")]
    UnknownBucket(String),
}

/// A validated, resolved game with the tracked player's side.
#[derive(Debug, Clone)]
pub struct PreparedGame {
    pub document: GameDocument,
    pub game: StandardGame,
    pub player: String,
    pub side: Side,
}

/// Runs every stage that does not need an engine.
///
/// # Errors
///
/// The first failing stage's error: structure, then resolution, then color.
pub fn prepare(pgn: &str, player: &str) -> Result<PreparedGame, ReviewError> {
    let parsed = notation::validate(pgn)?;
    let game = notation::resolve(&StandardRules, &parsed.san_tokens())?;
    let side = notation::require_color(&parsed.document, player)?;
    info!(plies = game.len(), %side, "game prepared");
    Ok(PreparedGame {
        document: parsed.document,
        game,
        player: player.trim().to_string(),
        side,
    })
}

impl PreparedGame {
    /// Classifies the tracked side's moves.
    pub fn classify<E>(self, evaluator: &mut E, config: &AnalysisConfig) -> GameReview
    where
        E: Evaluator + ?Sized,
    {
        let result = classify(&StandardRules, self.game.plies(), self.side, evaluator, config);
        GameReview {
            white: self.document.white().to_string(),
            black: self.document.black().to_string(),
            player: self.player,
            tracked_side: self.side,
            plies: self.game.len(),
            buckets: result.buckets,
            accuracy: result.accuracy,
            game: self.game,
        }
    }
}

/// The outcome of reviewing one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameReview {
    pub white: String,
    pub black: String,
    pub player: String,
    pub tracked_side: Side,
    /// Number of half-moves in the game.
    pub plies: usize,
    pub buckets: MistakeBuckets,
    pub accuracy: AccuracyScore,
    #[serde(skip)]
    pub game: StandardGame,
}

/// Reviews `player`'s moves using the engine named in `config`.
///
/// The engine is only started once the game has been validated, resolved
/// and the player found in it. It is shut down before returning.
pub fn review_game(pgn: &str, player: &str, config: &ReviewConfig) -> Result<GameReview, ReviewError> {
    let prepared = prepare(pgn, player)?;
    let mut engine = AnalysisEngine::with_options(&config.engine_path, &config.engine_options())?;
    Ok(prepared.classify(&mut engine, &config.analysis_config()))
}

/// Like [`review_game`], then asks the same engine session for insights
/// into the mistakes of `bucket`.
///
/// # Errors
///
/// [`ReviewError::UnknownBucket`] before anything else runs if `bucket` is
/// not one of [`BUCKET_NAMES`].
pub fn review_game_with_insights(
    pgn: &str,
    player: &str,
    config: &ReviewConfig,
    bucket: &str,
) -> Result<(GameReview, Insights), ReviewError> {
    if !BUCKET_NAMES.iter().any(|name| name.eq_ignore_ascii_case(bucket.trim())) {
        return Err(ReviewError::UnknownBucket(bucket.to_string()));
    }
    let prepared = prepare(pgn, player)?;
    let mut engine = AnalysisEngine::with_options(&config.engine_path, &config.engine_options())?;
    let analysis = config.analysis_config();
    let review = prepared.classify(&mut engine, &analysis);
    let insights = review.insights(&mut engine, &analysis, bucket)?;
    Ok((review, insights))
}

/// Reviews `player`'s moves with any evaluator.
pub fn review_with<E>(
    pgn: &str,
    player: &str,
    evaluator: &mut E,
    config: &AnalysisConfig,
) -> Result<GameReview, ReviewError>
where
    E: Evaluator + ?Sized,
{
    Ok(prepare(pgn, player)?.classify(evaluator, config))
}

/// Bucket names accepted by [`GameReview::insights`].
pub const BUCKET_NAMES: [&str; 4] = ["all", "opening", "middlegame", "endgame"];

/// Display data for one mistake.
#[derive(Debug, Clone, Serialize)]
pub struct MistakeInsight {
    pub view: MistakeView,
    /// Evaluation after the mistake, from the tracked side's view.
    pub current: Option<EvaluationSample>,
    pub alternative: Option<Alternative>,
    /// Best lines from the position after the mistake.
    pub lines: Vec<BestLine>,
}

/// Engine suggestions shown alongside a review.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Insights {
    pub bucket: String,
    /// One entry per mistake in the bucket, worst first.
    pub mistakes: Vec<MistakeInsight>,
    /// Best lines from the final position, searched only when the bucket
    /// is empty.
    pub lines: Vec<BestLine>,
}

impl GameReview {
    /// Asks the engine for the current evaluation, the alternative and the
    /// best lines of every mistake in `bucket`. Engine failures leave the
    /// affected part empty.
    ///
    /// # Errors
    ///
    /// [`ReviewError::UnknownBucket`] if `bucket` is not one of
    /// [`BUCKET_NAMES`].
    pub fn insights<E>(
        &self,
        evaluator: &mut E,
        config: &AnalysisConfig,
        bucket: &str,
    ) -> Result<Insights, ReviewError>
    where
        E: Evaluator + ?Sized,
    {
        let records = self
            .buckets
            .by_name(bucket)
            .ok_or_else(|| ReviewError::UnknownBucket(bucket.to_string()))?;
        let rules = StandardRules;
        let plies = self.game.plies();

        let mut insights = Insights {
            bucket: bucket.trim().to_ascii_lowercase(),
            ..Insights::default()
        };
        for record in records {
            let (Some(ply), Some(view)) = (find_ply(plies, record), mistake_view(&rules, plies, record))
            else {
                warn!(san = %record.san, "mistake not found in game");
                continue;
            };
            let current =
                match current_evaluation(evaluator, &rules, ply, self.tracked_side, config.evaluate) {
                    Ok(sample) => Some(sample),
                    Err(e) => {
                        warn!(error = %e, "current evaluation failed");
                        None
                    }
                };
            let alternative = match best_alternative(evaluator, &rules, ply, config.alternative) {
                Ok(alternative) => alternative,
                Err(e) => {
                    warn!(error = %e, "best alternative failed");
                    None
                }
            };
            let lines = lines_from(evaluator, &ply.after, config);
            insights.mistakes.push(MistakeInsight {
                view,
                current,
                alternative,
                lines,
            });
        }

        if insights.mistakes.is_empty() {
            insights.lines = lines_from(evaluator, self.game.final_position(), config);
        }
        Ok(insights)
    }
}

fn lines_from<E>(
    evaluator: &mut E,
    position: &<StandardRules as MoveOracle>::Position,
    config: &AnalysisConfig,
) -> Vec<BestLine>
where
    E: Evaluator + ?Sized,
{
    best_lines(evaluator, &StandardRules, position, config.lines, config.line_count).unwrap_or_else(|e| {
        warn!(error = %e, "best lines failed");
        Vec::new()
    })
}

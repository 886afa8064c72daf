//! UCI engine session used as the position evaluator.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use chess_core::Side;
use thiserror::Error;
use tracing::{debug, info};
use uci::{GoOptions, GuiCommand, SearchOutcome, UciError, UciSession};

use crate::evaluation::EvaluationSample;

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[source] std::io::Error),
    /// Engine executable was not found at the specified path.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed: {0}")]
    InitFailed(#[source] UciError),
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
    /// The conversation broke down mid-search.
    #[error("Engine protocol error: {0}")]
    Protocol(#[from] UciError),
    /// The position handed to the engine is not a FEN it can use.
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

/// How long a single search may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Wall-clock budget (`go movetime`).
    MoveTime(Duration),
    /// Fixed depth (`go depth`), reproducible across runs.
    Depth(u32),
}

impl SearchLimit {
    pub fn millis(ms: u64) -> Self {
        SearchLimit::MoveTime(Duration::from_millis(ms))
    }
}

impl From<SearchLimit> for GoOptions {
    fn from(limit: SearchLimit) -> Self {
        match limit {
            SearchLimit::MoveTime(budget) => GoOptions::movetime(budget),
            SearchLimit::Depth(depth) => GoOptions::depth(depth),
        }
    }
}

/// One ranked engine line.
#[derive(Debug, Clone, PartialEq)]
pub struct PvLine {
    /// The line's moves in UCI notation, starting from the searched position.
    pub moves: Vec<String>,
    /// Score from White's point of view.
    pub score: EvaluationSample,
}

/// A position evaluator.
///
/// Positions are passed as FEN and moves come back in UCI notation, so any
/// engine that speaks those can sit behind this trait.
pub trait Evaluator {
    /// Evaluates a position from `perspective`'s point of view.
    fn evaluate(
        &mut self,
        fen: &str,
        perspective: Side,
        limit: SearchLimit,
    ) -> Result<EvaluationSample, EngineError>;

    /// The engine's preferred move, or `None` if it has none.
    fn best_move(&mut self, fen: &str, limit: SearchLimit) -> Result<Option<String>, EngineError>;

    /// Up to `k` best lines, best first.
    fn top_lines(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<PvLine>, EngineError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    fn evaluate(
        &mut self,
        fen: &str,
        perspective: Side,
        limit: SearchLimit,
    ) -> Result<EvaluationSample, EngineError> {
        (**self).evaluate(fen, perspective, limit)
    }

    fn best_move(
        &mut self,
        fen: &str,
        limit: SearchLimit,
    ) -> Result<Option<String>, EngineError> {
        (**self).best_move(fen, limit)
    }

    fn top_lines(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<PvLine>, EngineError> {
        (**self).top_lines(fen, limit, k)
    }
}

/// Engine options applied once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// `Threads` option.
    pub threads: u32,
    /// `Hash` option, in megabytes.
    pub hash_mb: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 64,
        }
    }
}

type Reader = Box<dyn BufRead + Send>;
type Writer = Box<dyn Write + Send>;

/// Wrapper for UCI-compatible analysis engines like Stockfish.
///
/// One instance is one engine session. Dropping it sends `quit` and waits
/// for the process, so the session is released on every exit path.
pub struct AnalysisEngine {
    /// The engine process handle, absent for in-memory sessions.
    process: Option<Child>,
    session: UciSession<Reader, Writer>,
    /// The engine's name (reported via UCI id).
    name: String,
}

impl AnalysisEngine {
    /// Spawns an engine with default options.
    pub fn new(engine_path: &str) -> Result<Self, EngineError> {
        Self::with_options(engine_path, &EngineOptions::default())
    }

    /// Spawns the engine process, performs the UCI handshake and applies
    /// `options`.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the engine path doesn't exist
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` if UCI initialization fails
    pub fn with_options(engine_path: &str, options: &EngineOptions) -> Result<Self, EngineError> {
        // Bare names are looked up on PATH by the OS.
        let is_path = engine_path.contains(std::path::MAIN_SEPARATOR) || engine_path.contains('/');
        if is_path && !Path::new(engine_path).exists() {
            return Err(EngineError::NotFound(engine_path.to_string()));
        }

        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::NotFound(engine_path.to_string()),
                _ => EngineError::SpawnError(e),
            })?;

        let stdin = process.stdin.take();
        let stdout = process.stdout.take();
        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            let _ = process.kill();
            return Err(EngineError::InvalidResponse(
                "engine pipes unavailable".to_string(),
            ));
        };

        let engine = Self::open(
            Box::new(BufReader::new(stdout)),
            Box::new(stdin),
            Some(process),
            options,
        )?;
        info!(engine = %engine.name, path = engine_path, "engine session opened");
        Ok(engine)
    }

    /// Opens a session over arbitrary streams, e.g. a scripted transcript.
    pub fn from_streams(
        reader: impl BufRead + Send + 'static,
        writer: impl Write + Send + 'static,
        options: &EngineOptions,
    ) -> Result<Self, EngineError> {
        Self::open(Box::new(reader), Box::new(writer), None, options)
    }

    fn open(
        reader: Reader,
        writer: Writer,
        process: Option<Child>,
        options: &EngineOptions,
    ) -> Result<Self, EngineError> {
        let mut engine = Self {
            process,
            session: UciSession::new(reader, writer),
            name: String::new(),
        };

        let name = engine.session.handshake().map_err(EngineError::InitFailed)?;
        engine.name = name.unwrap_or_else(|| "Unknown Engine".to_string());

        engine
            .session
            .send(&GuiCommand::set_option("Threads", options.threads))
            .map_err(EngineError::InitFailed)?;
        engine
            .session
            .send(&GuiCommand::set_option("Hash", options.hash_mb))
            .map_err(EngineError::InitFailed)?;
        engine
            .session
            .send(&GuiCommand::UciNewGame)
            .map_err(EngineError::InitFailed)?;
        engine.session.sync().map_err(EngineError::InitFailed)?;

        Ok(engine)
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn search(&mut self, fen: &str, limit: SearchLimit) -> Result<SearchOutcome, EngineError> {
        self.session.send(&GuiCommand::position_fen(fen))?;
        Ok(self.session.search(limit.into())?)
    }
}

impl Evaluator for AnalysisEngine {
    fn evaluate(
        &mut self,
        fen: &str,
        perspective: Side,
        limit: SearchLimit,
    ) -> Result<EvaluationSample, EngineError> {
        let side_to_move = side_to_move(fen)?;
        let outcome = self.search(fen, limit)?;
        let score = outcome
            .score()
            .ok_or_else(|| EngineError::InvalidResponse("search produced no score".to_string()))?;
        let sample = EvaluationSample::from_score(score, side_to_move, perspective);
        debug!(fen, %sample, "evaluated");
        Ok(sample)
    }

    fn best_move(&mut self, fen: &str, limit: SearchLimit) -> Result<Option<String>, EngineError> {
        Ok(self.search(fen, limit)?.best_move)
    }

    fn top_lines(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<PvLine>, EngineError> {
        let side_to_move = side_to_move(fen)?;
        let k = k.max(1);

        self.session.send(&GuiCommand::set_option("MultiPV", k))?;
        let outcome = self.search(fen, limit);
        // Reset MultiPV to 1
        self.session.send(&GuiCommand::set_option("MultiPV", 1))?;
        let outcome = outcome?;

        Ok(outcome
            .lines(k)
            .into_iter()
            .filter_map(|line| {
                Some(PvLine {
                    moves: line.pv.clone(),
                    score: EvaluationSample::from_score(line.score?, side_to_move, Side::White),
                })
            })
            .collect())
    }
}

impl Drop for AnalysisEngine {
    fn drop(&mut self) {
        // Try to send quit command to gracefully terminate the engine
        let _ = self.session.send(&GuiCommand::Quit);
        if let Some(process) = self.process.as_mut() {
            let _ = process.wait();
        }
    }
}

/// Reads the side to move from the second FEN field.
fn side_to_move(fen: &str) -> Result<Side, EngineError> {
    match fen.split_whitespace().nth(1) {
        Some("w") => Ok(Side::White),
        Some("b") => Ok(Side::Black),
        _ => Err(EngineError::InvalidPosition(fen.to_string())),
    }
}

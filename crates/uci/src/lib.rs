//! UCI (Universal Chess Interface) protocol library, GUI side.
//!
//! This crate renders the commands a GUI sends to an engine and parses what
//! the engine sends back. [`UciSession`] drives a conversation over any
//! reader/writer pair, so it works the same on a child process's pipes and
//! on in-memory buffers.
//!
//! # Commands used
//!
//! - `uci` / `uciok` - Initialize engine, get id and options
//! - `isready` / `readyok` - Synchronization
//! - `setoption name <name> value <value>` - Configure the engine
//! - `position fen <fen>` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `stop` - End an overrunning search
//! - `quit` - Exit engine

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score};

use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 1000;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Engine closed its output")]
    Closed,
    #[error("No {0} within {} lines", MAX_UCI_LINES)]
    TooManyLines(&'static str),
    /// A search could not be drained, so replies no longer match requests.
    #[error("Engine output out of step with requests")]
    Desynchronized,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id { name: Option<String>, author: Option<String> },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found. `None` when the engine has no legal move.
    BestMove { mv: Option<String>, ponder: Option<String> },
    /// Anything else (`option ...`, banners, blank lines).
    Other(String),
}

impl EngineMessage {
    /// Parse a line of engine output.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("uciok") => EngineMessage::UciOk,
            Some("readyok") => EngineMessage::ReadyOk,
            Some("id") => {
                let rest = |prefix: &str| line.strip_prefix(prefix).map(|s| s.trim().to_string());
                EngineMessage::Id {
                    name: rest("id name "),
                    author: rest("id author "),
                }
            }
            Some("info") => match EngineInfo::parse(line) {
                Some(info) => EngineMessage::Info(info),
                None => EngineMessage::Other(line.to_string()),
            },
            Some("bestmove") => {
                let mv = parts
                    .next()
                    .filter(|m| *m != "(none)" && *m != "0000")
                    .map(str::to_string);
                let ponder = match (parts.next(), parts.next()) {
                    (Some("ponder"), Some(p)) => Some(p.to_string()),
                    _ => None,
                };
                EngineMessage::BestMove { mv, ponder }
            }
            _ => EngineMessage::Other(line.to_string()),
        }
    }
}

/// Everything an engine reported for one `go` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// The `bestmove` reply, if the engine had a move to play.
    pub best_move: Option<String>,
    /// Every info line seen before `bestmove`, in arrival order.
    pub infos: Vec<EngineInfo>,
}

impl SearchOutcome {
    /// Score of the last exact top-ranked line.
    pub fn score(&self) -> Option<Score> {
        self.infos
            .iter()
            .rev()
            .filter(|info| info.rank() == 1 && !info.bound)
            .find_map(|info| info.score)
    }

    /// The latest exact line for each rank `1..=k`, in rank order.
    ///
    /// Ranks the engine never reported are skipped.
    pub fn lines(&self, k: usize) -> Vec<&EngineInfo> {
        (1..=k as u32)
            .filter_map(|rank| {
                self.infos
                    .iter()
                    .rev()
                    .find(|info| info.rank() == rank && info.is_scored_line())
            })
            .collect()
    }
}

/// A GUI-side UCI conversation over a reader/writer pair.
///
/// A search that overruns [`MAX_UCI_LINES`] is stopped and drained up to its
/// `bestmove`. If even that fails the session is marked desynchronized and
/// every later search fails immediately.
pub struct UciSession<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    desynchronized: bool,
}

impl<R: BufRead, W: Write> UciSession<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            desynchronized: false,
        }
    }

    /// Send a command to the engine.
    pub fn send(&mut self, cmd: &GuiCommand) -> Result<(), UciError> {
        let line = cmd.to_uci();
        debug!(cmd = %line, "engine <");
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Read and parse the next line from the engine.
    pub fn read_message(&mut self) -> Result<EngineMessage, UciError> {
        let mut line = String::new();
        let bytes = self.reader.read_line(&mut line)?;
        if bytes == 0 {
            return Err(UciError::Closed);
        }
        debug!(line = line.trim(), "engine >");
        Ok(EngineMessage::parse(&line))
    }

    /// `uci` until `uciok`. Returns the engine's reported name.
    pub fn handshake(&mut self) -> Result<Option<String>, UciError> {
        self.send(&GuiCommand::Uci)?;

        let mut name = None;
        for _ in 0..MAX_UCI_LINES {
            match self.read_message()? {
                EngineMessage::Id { name: Some(n), .. } => name = Some(n),
                EngineMessage::UciOk => return Ok(name),
                _ => {}
            }
        }
        Err(UciError::TooManyLines("uciok"))
    }

    /// `isready` until `readyok`.
    pub fn sync(&mut self) -> Result<(), UciError> {
        self.send(&GuiCommand::IsReady)?;

        for _ in 0..MAX_UCI_LINES {
            if self.read_message()? == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
        Err(UciError::TooManyLines("readyok"))
    }

    /// `go` until `bestmove`, collecting every info line.
    ///
    /// # Errors
    ///
    /// [`UciError::TooManyLines`] if no `bestmove` arrives in time; the
    /// search is stopped and its remaining output discarded.
    pub fn search(&mut self, options: GoOptions) -> Result<SearchOutcome, UciError> {
        if self.desynchronized {
            return Err(UciError::Desynchronized);
        }
        self.send(&GuiCommand::Go(options))?;

        let mut outcome = SearchOutcome::default();
        for _ in 0..MAX_UCI_LINES {
            match self.read_message()? {
                EngineMessage::Info(info) => outcome.infos.push(info),
                EngineMessage::BestMove { mv, .. } => {
                    outcome.best_move = mv;
                    return Ok(outcome);
                }
                _ => {}
            }
        }

        warn!("search overran, stopping engine");
        if let Err(e) = self.stop_and_drain() {
            warn!(error = %e, "engine output could not be drained");
            self.desynchronized = true;
        }
        Err(UciError::TooManyLines("bestmove"))
    }

    /// `stop`, then discard output up to the pending `bestmove`.
    fn stop_and_drain(&mut self) -> Result<(), UciError> {
        self.send(&GuiCommand::Stop)?;
        for _ in 0..MAX_UCI_LINES {
            if let EngineMessage::BestMove { .. } = self.read_message()? {
                return Ok(());
            }
        }
        Err(UciError::TooManyLines("bestmove after stop"))
    }

    /// The underlying writer, e.g. to inspect what was sent.
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

//! Commands sent from the GUI side to an engine.

use std::fmt;
use std::time::Duration;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// Set an engine option.
    SetOption { name: String, value: String },
    /// The next search belongs to a different game.
    UciNewGame,
    /// Set up a position from FEN.
    Position { fen: String },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
}

impl GoOptions {
    /// Search for a fixed wall-clock time.
    pub fn movetime(budget: Duration) -> Self {
        Self {
            movetime: Some(budget.as_millis().max(1) as u64),
            ..Self::default()
        }
    }

    /// Search to a fixed depth.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }
}

impl GuiCommand {
    /// `setoption name <name> value <value>`
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        GuiCommand::SetOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// `position fen <fen>`
    pub fn position_fen(fen: &str) -> Self {
        GuiCommand::Position {
            fen: fen.to_string(),
        }
    }

    /// Format the command as a UCI line, without the newline.
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::SetOption { name, value } => {
                format!("setoption name {} value {}", name, value)
            }
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::Position { fen } => format!("position fen {}", fen),
            GuiCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(ms) = opts.movetime {
                    parts.push(format!("movetime {}", ms));
                }
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                parts.join(" ")
            }
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
        }
    }
}

impl fmt::Display for GuiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use game_review::{report, review_game, review_game_with_insights, ReviewConfig, BUCKET_NAMES};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "game-review")]
#[command(about = "Find one player's mistakes in a recorded chess game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the player's moves and print their accuracy
    Analyze {
        /// PGN file, or `-` for standard input
        pgn: String,
        /// Player name as it appears in the White or Black tag
        #[arg(short, long)]
        player: String,
        /// Engine executable, overriding the config file
        #[arg(short, long)]
        engine: Option<String>,
        /// Configuration file (defaults to review.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Search every position to this depth instead of using time budgets
        #[arg(short, long)]
        depth: Option<u32>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Also show the engine's alternative and best lines for each mistake
        #[arg(long)]
        lines: bool,
        /// Mistake bucket to show insights for
        #[arg(short, long, default_value = "all", value_parser = BUCKET_NAMES)]
        bucket: String,
    },
    /// Validate the game and replay its moves
    Check {
        /// PGN file, or `-` for standard input
        pgn: String,
    },
    /// Print which side a player had
    Color {
        /// PGN file, or `-` for standard input
        pgn: String,
        #[arg(short, long)]
        player: String,
    },
}

fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        Ok(text)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ReviewConfig> {
    match path {
        Some(path) => ReviewConfig::load_from(&path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => ReviewConfig::load().context("Failed to load review.toml"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            pgn,
            player,
            engine,
            config,
            depth,
            json,
            lines,
            bucket,
        } => {
            let mut config = load_config(config)?;
            if let Some(engine) = engine {
                config.engine_path = engine;
            }
            if depth.is_some() {
                config.budgets.depth = depth;
            }

            let text = read_input(&pgn)?;
            let (review, insights) = if lines {
                let (review, insights) = review_game_with_insights(&text, &player, &config, &bucket)?;
                (review, Some(insights))
            } else {
                (review_game(&text, &player, &config)?, None)
            };

            if json {
                println!("{}", report::render_json(&review, insights.as_ref())?);
            } else {
                print!("{}", report::render_text(&review, insights.as_ref()));
            }
        }
        Commands::Check { pgn } => {
            let text = read_input(&pgn)?;
            let parsed = notation::validate(&text)?;
            let game = notation::resolve(&chess_core::StandardRules, &parsed.san_tokens())?;
            println!("OK: {} plies", game.len());
        }
        Commands::Color { pgn, player } => {
            let text = read_input(&pgn)?;
            let parsed = notation::validate(&text)?;
            let side = notation::require_color(&parsed.document, &player)?;
            println!("{}", side.as_str());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze_command() {
        let cli = Cli::try_parse_from([
            "game-review",
            "analyze",
            "game.pgn",
            "--player",
            "alice",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                pgn,
                player,
                engine,
                config,
                depth,
                json,
                lines,
                bucket,
            } => {
                assert_eq!(pgn, "game.pgn");
                assert_eq!(player, "alice");
                assert!(engine.is_none());
                assert!(config.is_none());
                assert!(depth.is_none());
                assert!(json);
                assert!(!lines);
                assert_eq!(bucket, "all");
            }
            _ => panic!("Expected analyze command"),
        }
    }

    #[test]
    fn test_cli_parses_analyze_overrides() {
        let cli = Cli::try_parse_from([
            "game-review",
            "analyze",
            "-",
            "-p",
            "bob",
            "-e",
            "/opt/sf",
            "-d",
            "12",
            "--lines",
            "--bucket",
            "endgame",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                pgn,
                engine,
                depth,
                lines,
                bucket,
                ..
            } => {
                assert_eq!(pgn, "-");
                assert_eq!(engine.as_deref(), Some("/opt/sf"));
                assert_eq!(depth, Some(12));
                assert!(lines);
                assert_eq!(bucket, "endgame");
            }
            _ => panic!("Expected analyze command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_bucket() {
        let parse = |bucket: &str| {
            Cli::try_parse_from(["game-review", "analyze", "game.pgn", "-p", "alice", "--bucket", bucket])
        };
        assert!(parse("blunders").is_err());
        assert!(parse("middlegame").is_ok());
    }

    #[test]
    fn test_cli_requires_player_for_color() {
        assert!(Cli::try_parse_from(["game-review", "color", "game.pgn"]).is_err());
        assert!(Cli::try_parse_from(["game-review", "color", "game.pgn", "-p", "alice"]).is_ok());
    }

    #[test]
    fn test_cli_parses_check_command() {
        let cli = Cli::try_parse_from(["game-review", "check", "game.pgn"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { pgn } if pgn == "game.pgn"));
    }
}

//! Which side did a named player have?

use chess_core::Side;
use thiserror::Error;

use crate::document::GameDocument;

/// The player identifier matches neither the White nor the Black tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("player not found in this game: {0}")]
pub struct ColorNotFound(pub String);

/// Resolves the side a player had, comparing against the `White` then
/// `Black` tags after trimming and case-folding both sides.
///
/// Exact match only, so an empty identifier matches an empty tag.
pub fn resolve_color(document: &GameDocument, player: &str) -> Option<Side> {
    let wanted = normalize(player);
    if normalize(document.white()) == wanted {
        Some(Side::White)
    } else if normalize(document.black()) == wanted {
        Some(Side::Black)
    } else {
        None
    }
}

/// Like [`resolve_color`], but an unknown player is an error.
pub fn require_color(document: &GameDocument, player: &str) -> Result<Side, ColorNotFound> {
    resolve_color(document, player).ok_or_else(|| ColorNotFound(player.trim().to_string()))
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

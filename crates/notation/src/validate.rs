//! Structural validation of a raw notation document.
//!
//! Checks header shape, required tags and move-text plausibility. No move
//! legality is checked here, and nothing here needs an oracle.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::document::GameDocument;
use crate::rules::{
    header_line_is_closed, header_quotes_balanced, is_plausible_movetext, is_san_shaped,
    parse_tag_pair,
};
use crate::tokenizer::{tokenize, MoveToken};

/// The validation rule a document failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureRule {
    /// A tag line does not end with `]`.
    UnclosedHeader { line: usize },
    /// A tag line has an odd number of quotes.
    UnbalancedQuotes { line: usize },
    /// One or more required tags are absent.
    MissingTags(Vec<&'static str>),
    /// No token in the move text looks like SAN.
    NoSanMoves,
    /// Too few tokens look like SAN for this to be move text.
    ImplausibleMovetext { san_shaped: usize, candidates: usize },
}

/// A document failed structural validation.
///
/// The message is deliberately coarse; [`StructureError::rule`] says which
/// check tripped, for logs and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("PGN Structure Error")]
pub struct StructureError {
    rule: StructureRule,
}

impl StructureError {
    fn new(rule: StructureRule) -> Self {
        debug!(?rule, "structure check failed");
        Self { rule }
    }

    /// The rule that failed.
    pub fn rule(&self) -> &StructureRule {
        &self.rule
    }
}

/// A structurally valid document with its typed move-text tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub document: GameDocument,
    pub tokens: Vec<MoveToken>,
}

impl ParsedDocument {
    /// SAN candidates in game order. Never empty for a validated document.
    pub fn san_tokens(&self) -> Vec<&str> {
        self.tokens.iter().filter_map(MoveToken::as_san).collect()
    }
}

/// Validates a raw notation document.
///
/// # Errors
///
/// Returns a [`StructureError`] when a tag line is malformed, a required tag
/// is missing, or the move text does not look like chess moves.
pub fn validate(text: &str) -> Result<ParsedDocument, StructureError> {
    let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();

    let mut tags = HashMap::new();
    for (index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('[') {
            break;
        }
        if !header_line_is_closed(line) {
            return Err(StructureError::new(StructureRule::UnclosedHeader {
                line: index + 1,
            }));
        }
        if !header_quotes_balanced(line) {
            return Err(StructureError::new(StructureRule::UnbalancedQuotes {
                line: index + 1,
            }));
        }
        if let Some((key, value)) = parse_tag_pair(line) {
            tags.insert(key, value);
        }
    }

    let movetext = lines
        .iter()
        .filter(|line| !line.is_empty() && !line.starts_with('['))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let document = GameDocument::new(tags, movetext);

    let missing = document.missing_required_tags();
    if !missing.is_empty() {
        return Err(StructureError::new(StructureRule::MissingTags(missing)));
    }

    let tokens = tokenize(document.movetext());
    let candidates: Vec<&str> = tokens.iter().filter_map(MoveToken::as_san).collect();
    let san_shaped = candidates.iter().filter(|t| is_san_shaped(t)).count();

    if san_shaped == 0 {
        return Err(StructureError::new(StructureRule::NoSanMoves));
    }
    if !is_plausible_movetext(san_shaped, candidates.len()) {
        return Err(StructureError::new(StructureRule::ImplausibleMovetext {
            san_shaped,
            candidates: candidates.len(),
        }));
    }

    Ok(ParsedDocument { document, tokens })
}

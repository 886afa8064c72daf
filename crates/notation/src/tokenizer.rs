//! Move-text tokenizer.
//!
//! Splits move text into typed tokens. Comments (`{...}`), NAGs (`$n`) and
//! result markers (`1-0`, `0-1`, `1/2-1/2`) are recognised wherever they
//! occur and also act as token boundaries. Remaining whitespace-separated
//! words are move-number labels, the `*` marker, or SAN candidates.

use crate::rules::{is_move_number, is_result_marker};

/// A single typed move-text token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveToken {
    /// Move-number label such as `1.` or `12...`.
    MoveNumber(String),
    /// Brace comment, without the braces.
    Comment(String),
    /// Numeric annotation glyph such as `$1`.
    Nag(String),
    /// Game termination marker.
    Result(String),
    /// Anything else: a candidate move in SAN.
    San(String),
}

impl MoveToken {
    /// Returns the SAN candidate text, if this token is one.
    pub fn as_san(&self) -> Option<&str> {
        match self {
            MoveToken::San(san) => Some(san),
            _ => None,
        }
    }
}

/// Tokenizes move text.
///
/// Deterministic and infallible: unrecognised text simply becomes
/// [`MoveToken::San`] candidates for the later stages to judge.
pub fn tokenize(movetext: &str) -> Vec<MoveToken> {
    let chars: Vec<char> = movetext.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            flush_word(&mut word, &mut tokens);
            i += 1;
        } else if let Some(len) = result_marker_at(&chars, i) {
            flush_word(&mut word, &mut tokens);
            tokens.push(MoveToken::Result(chars[i..i + len].iter().collect()));
            i += len;
        } else if let Some(close) = comment_end(&chars, i) {
            flush_word(&mut word, &mut tokens);
            let text: String = chars[i + 1..close].iter().collect();
            tokens.push(MoveToken::Comment(text.trim().to_string()));
            i = close + 1;
        } else if let Some(len) = nag_at(&chars, i) {
            flush_word(&mut word, &mut tokens);
            tokens.push(MoveToken::Nag(chars[i..i + len].iter().collect()));
            i += len;
        } else {
            word.push(c);
            i += 1;
        }
    }
    flush_word(&mut word, &mut tokens);

    tokens
}

/// Tokenizes move text and keeps only the SAN candidates, in order.
pub fn san_candidates(movetext: &str) -> Vec<String> {
    tokenize(movetext)
        .into_iter()
        .filter_map(|token| match token {
            MoveToken::San(san) => Some(san),
            _ => None,
        })
        .collect()
}

fn flush_word(word: &mut String, tokens: &mut Vec<MoveToken>) {
    if word.is_empty() {
        return;
    }
    let text = std::mem::take(word);
    let token = if is_move_number(&text) {
        MoveToken::MoveNumber(text)
    } else if is_result_marker(&text) {
        MoveToken::Result(text)
    } else {
        MoveToken::San(text)
    };
    tokens.push(token);
}

/// Length of a `d-d` or `d/d-d/d` marker starting at `i`.
fn result_marker_at(chars: &[char], i: usize) -> Option<usize> {
    let digit = |k: usize| chars.get(k).is_some_and(|c| c.is_ascii_digit());
    let is = |k: usize, want: char| chars.get(k) == Some(&want);

    if digit(i) && is(i + 1, '-') && digit(i + 2) {
        Some(3)
    } else if digit(i)
        && is(i + 1, '/')
        && digit(i + 2)
        && is(i + 3, '-')
        && digit(i + 4)
        && is(i + 5, '/')
        && digit(i + 6)
    {
        Some(7)
    } else {
        None
    }
}

/// Index of the closing brace for a comment opening at `i`.
///
/// An unterminated brace is not a comment.
fn comment_end(chars: &[char], i: usize) -> Option<usize> {
    if chars[i] != '{' {
        return None;
    }
    chars[i + 1..]
        .iter()
        .position(|&c| c == '}')
        .map(|offset| i + 1 + offset)
}

/// Length of a `$` followed by one or more digits at `i`.
fn nag_at(chars: &[char], i: usize) -> Option<usize> {
    if chars[i] != '$' {
        return None;
    }
    let digits = chars[i + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    (digits > 0).then_some(digits + 1)
}

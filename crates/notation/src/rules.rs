//! Shape predicates used by the structural validator and the tokenizer.
//!
//! Each rule is a plain function over a line or a token so it can be tested
//! on its own. None of them knows anything about move legality.

/// A tag line must end with the closing bracket.
pub fn header_line_is_closed(line: &str) -> bool {
    line.ends_with(']')
}

/// A tag line must contain an even number of quote characters.
pub fn header_quotes_balanced(line: &str) -> bool {
    line.matches('"').count() % 2 == 0
}

/// Parses a `[Key "Value"]` tag line.
///
/// The key is one or more word characters, followed by at least one
/// whitespace character and a quoted value running to the final `"]`.
pub fn parse_tag_pair(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;

    let key_len = inner
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(inner.len());
    if key_len == 0 {
        return None;
    }
    let (key, rest) = inner.split_at(key_len);

    let value_part = rest.trim_start();
    if value_part.len() == rest.len() {
        // No whitespace between key and value.
        return None;
    }

    let value = value_part.strip_prefix('"')?.strip_suffix('"')?;
    Some((key.to_string(), value.to_string()))
}

/// One or more digits followed by zero or more periods (`1.`, `12...`, `3`).
pub fn is_move_number(token: &str) -> bool {
    let digits = token.trim_end_matches('.');
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Game termination markers.
pub fn is_result_marker(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Permissive SAN shape check.
///
/// Accepts castling, or an optional piece letter, optional origin file,
/// optional origin rank, optional capture mark, a destination square and an
/// optional promotion, followed by at most one of `+`, `#` or `=`.
pub fn is_san_shaped(token: &str) -> bool {
    if san_body(token) {
        return true;
    }
    match token.strip_suffix(['+', '#', '=']) {
        Some(body) => san_body(body),
        None => false,
    }
}

/// Rejects prose: at least half of the candidate tokens (and at least one)
/// must look like SAN.
pub fn is_plausible_movetext(san_shaped: usize, candidates: usize) -> bool {
    san_shaped >= (candidates / 2).max(1)
}

fn san_body(body: &str) -> bool {
    if body == "O-O" || body == "O-O-O" {
        return true;
    }

    let chars: Vec<char> = body.chars().collect();
    let mut end = chars.len();

    // Promotion suffix
    if end >= 2 && chars[end - 2] == '=' && matches!(chars[end - 1], 'Q' | 'R' | 'B' | 'N') {
        end -= 2;
    }

    // Destination square
    if end < 2 || !is_file(chars[end - 2]) || !is_rank(chars[end - 1]) {
        return false;
    }
    let prefix = &chars[..end - 2];

    // [KQRBN]? [a-h]? [1-8]? x?; the classes are disjoint, so greedy matching is exact.
    let mut i = 0;
    if i < prefix.len() && matches!(prefix[i], 'K' | 'Q' | 'R' | 'B' | 'N') {
        i += 1;
    }
    if i < prefix.len() && is_file(prefix[i]) {
        i += 1;
    }
    if i < prefix.len() && is_rank(prefix[i]) {
        i += 1;
    }
    if i < prefix.len() && prefix[i] == 'x' {
        i += 1;
    }
    i == prefix.len()
}

fn is_file(c: char) -> bool {
    ('a'..='h').contains(&c)
}

fn is_rank(c: char) -> bool {
    ('1'..='8').contains(&c)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

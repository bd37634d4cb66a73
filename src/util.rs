//! Shared utility helpers.
//!
//! The scanners here understand just enough SQL lexing to stay out of string
//! literals and quoted identifiers: `'...'` with `''` escapes and `"..."`.

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Byte offset just past the quoted run starting at `start` (which holds the
/// opening quote). Doubled quotes are treated as escapes. Unterminated runs end
/// at the end of the input.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Given text starting with `(`, return the content between the outer
/// parentheses and the byte offset just past the matching `)`.
pub fn extract_balanced_parens(sql: &str) -> Option<(&str, usize)> {
    let bytes = sql.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_quoted(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&sql[1..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Split on commas at parenthesis depth 0, outside quotes. Parts are trimmed
/// and empty parts dropped.
pub fn split_top_level_commas(s: &str) -> Vec<String> {
    let bytes = s.as_bytes();
    let mut parts = Vec::with_capacity((s.len() / 30).max(1));
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_quoted(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = (depth - 1).max(0),
            b',' if depth == 0 => {
                let part = s[start..i].trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    let part = s[start..].trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }

    parts
}

/// Replace the contents of single-quoted literals with spaces, preserving byte
/// offsets, so keyword scans never match inside string data.
pub fn mask_string_literals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_literal = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if in_literal && chars.peek() == Some(&'\'') {
                chars.next();
                out.push_str("  ");
                continue;
            }
            in_literal = !in_literal;
            out.push(c);
        } else if in_literal {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            out.push(c);
        }
    }

    out
}

//! Statement splitting on `;`
//!
//! The splitter drops `--` and `/* */` comments and does not split inside
//! single-quoted literals or double-quoted identifiers. It has no notion of
//! procedural blocks: a PL/SQL body split here yields several fragments, which
//! the anchored extractors then ignore.

use std::sync::LazyLock;

use regex::Regex;

/// Statements the grammar extractor is given after preprocessing
static SCHEMA_STATEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bCREATE\s+(?:(?:GLOBAL|PRIVATE)\s+TEMPORARY\s+)?TABLE\b|\bCREATE\s+(?:UNIQUE\s+)?INDEX\b|\bALTER\s+TABLE\b",
    )
    .unwrap()
});

/// Split SQL text into trimmed, non-empty statements without their terminators.
pub fn split_statements(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut seg_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                current.push_str(&text[seg_start..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                seg_start = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                current.push_str(&text[seg_start..i]);
                current.push(' ');
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                seg_start = i;
            }
            b';' => {
                current.push_str(&text[seg_start..i]);
                flush(&mut current, &mut statements);
                i += 1;
                seg_start = i;
            }
            _ => i += 1,
        }
    }

    if seg_start < bytes.len() {
        current.push_str(&text[seg_start..]);
    }
    flush(&mut current, &mut statements);

    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Whether a statement creates a table or index, or alters a table
pub fn is_schema_statement(statement: &str) -> bool {
    SCHEMA_STATEMENT_RE.is_match(statement)
}

/// Keep only table/index creation and table alteration statements, rejoined
/// with terminators.
pub fn retain_schema_statements(text: &str) -> String {
    split_statements(text)
        .into_iter()
        .filter(|s| is_schema_statement(s))
        .map(|s| format!("{};", s))
        .collect::<Vec<_>>()
        .join("\n")
}

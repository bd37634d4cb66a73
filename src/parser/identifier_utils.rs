//! Identifier handling shared by the regex-based extractors.
//!
//! Double-quoted identifiers keep their case and lose the quotes; unquoted
//! identifiers pass through as written. Case folding is left to the lookups,
//! which are all case-insensitive.

/// Regex fragment for one identifier: `"Quoted Name"` or `unquoted_name$#`.
pub const IDENT: &str = r#"(?:"[^"]+"|[A-Za-z_][A-Za-z0-9_$#]*)"#;

/// Regex fragment for SQL*Plus lines that may precede a statement in a script
/// split on `;` (e.g. `PROMPT creating table ...` or a lone `/`).
pub const SCRIPT_LINE_PREFIX: &str =
    r"(?:\s*(?:(?:PROMPT|REM|REMARK|SET|SPOOL|WHENEVER)\b[^\n]*|/[ \t\r]*)\n)*";

/// Strips double quotes (and backticks) from an identifier.
///
/// ```
/// use rust_ddl_import::parser::normalize_identifier;
///
/// assert_eq!(normalize_identifier("\"MyTable\""), "MyTable");
/// assert_eq!(normalize_identifier("  emp  "), "emp");
/// ```
pub fn normalize_identifier(ident: &str) -> String {
    let trimmed = ident.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('`') && trimmed.ends_with('`')));
    if quoted {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalize an optional schema capture, treating an empty capture as absent.
pub fn normalize_schema(schema: Option<&str>) -> Option<String> {
    schema
        .map(normalize_identifier)
        .filter(|s| !s.is_empty())
}

/// Split a possibly qualified name (`schema.table`, `"S"."T"`, `table`) into
/// schema and name, respecting dots inside quotes. For three-part names the
/// last two parts are used.
pub fn split_qualified_name(name: &str) -> (Option<String>, String) {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in name.trim().chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '.' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    let name = parts.pop().map(|p| normalize_identifier(&p)).unwrap_or_default();
    let schema = parts.pop().and_then(|p| normalize_schema(Some(&p)));
    (schema, name)
}

/// Parse a column list body (`a, "B" DESC, c ASC`) into column names.
///
/// Sort direction keywords are dropped. Expression entries (function-based
/// index keys such as `UPPER(name)`) are kept as written.
pub fn parse_identifier_list(list: &str) -> Vec<String> {
    crate::util::split_top_level_commas(list)
        .into_iter()
        .map(|entry| {
            let mut words: Vec<&str> = entry.split_whitespace().collect();
            if words.len() > 1 {
                if let Some(last) = words.last() {
                    if last.eq_ignore_ascii_case("ASC") || last.eq_ignore_ascii_case("DESC") {
                        words.pop();
                    }
                }
            }
            let joined = words.join(" ");
            if joined.contains('(') {
                joined
            } else {
                normalize_identifier(&joined)
            }
        })
        .filter(|name| !name.is_empty())
        .collect()
}

//! Column definition parsing for `CREATE TABLE` bodies
//!
//! A column clause is read in two steps. The head (`name TYPE[(args)]`) is
//! matched with a single anchored pattern; the remainder is then scanned for
//! modifiers in any order:
//!
//! ```sql
//! name TYPE[(n [BYTE|CHAR]) | (p, s) | (*, s)] [WITH [LOCAL] TIME ZONE]
//!     [DEFAULT [ON NULL] expr] [GENERATED ... AS IDENTITY | AUTO_INCREMENT]
//!     [CONSTRAINT c] [NOT NULL | NULL] [PRIMARY KEY] [UNIQUE]
//!     [CONSTRAINT c] [REFERENCES [schema.]table [(col)] [ON DELETE action]]
//!     [CHECK (expr)]
//! ```
//!
//! Keyword scans run over a copy of the remainder with string literals and
//! CHECK bodies blanked out, so `DEFAULT 'NOT NULL'` or
//! `CHECK (x IS NOT NULL)` never set flags.

use std::sync::LazyLock;

use regex::Regex;

use super::constraint_parser::parse_referential_actions;
use super::identifier_utils::{normalize_identifier, split_qualified_name, IDENT};
use crate::model::TypeArgs;
use crate::util::{extract_balanced_parens, mask_string_literals};

/// Precision used for `NUMBER(*, s)`
const MAX_NUMERIC_PRECISION: u32 = 38;

/// Words that start table-level clauses and are never column names when
/// unquoted
const RESERVED_CLAUSE_WORDS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "FOREIGN",
    "UNIQUE",
    "CHECK",
    "SUPPLEMENTAL",
];

/// Inline `REFERENCES` on a column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineReference {
    pub constraint_name: Option<String>,
    pub target_schema: Option<String>,
    pub target_table: String,
    /// `None` when the column list was omitted
    pub target_column: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// A parsed column clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    /// Type as written, before normalization (e.g. `VARCHAR2`, `TIMESTAMP WITH TIME ZONE`)
    pub raw_type: String,
    pub type_args: Option<TypeArgs>,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub increment: bool,
    pub default: Option<String>,
    pub reference: Option<InlineReference>,
}

/// Multi-word type phrases are tried before single words.
static COLUMN_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*({id})\s+(DOUBLE\s+PRECISION|LONG\s+RAW|CHARACTER\s+VARYING|CHAR\s+VARYING|NATIONAL\s+CHAR(?:ACTER)?(?:\s+VARYING)?|[A-Za-z_][A-Za-z0-9_$#]*(?:\s*\.\s*[A-Za-z_][A-Za-z0-9_$#]*)?)(?:\s*\(\s*(\d+|\*)(?:\s+(?:BYTE|CHAR))?\s*(?:,\s*(-?\d+)\s*)?\))?(\s+WITH\s+(?:LOCAL\s+)?TIME\s+ZONE\b)?",
        id = IDENT
    ))
    .unwrap()
});

/// `KEY ix_name (col, ...)` and `INDEX ix_name (col, ...)` index clauses. A
/// column named `key` is followed by a type, never by a parenthesized name list.
static INDEX_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?is)^\s*(?:KEY|INDEX)\s+{id}\s*\(\s*(?:[A-Za-z_]|")"#,
        id = IDENT
    ))
    .unwrap()
});

static INLINE_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)(?:\bCONSTRAINT\s+({id})\s+)?\bREFERENCES\s+((?:{id}\s*\.\s*)?{id})(?:\s*\(\s*({id})\s*\))?",
        id = IDENT
    ))
    .unwrap()
});

static PRIMARY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

static NOT_NULL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());

static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:IDENTITY|AUTO_INCREMENT|AUTOINCREMENT)\b").unwrap());

static UNIQUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bUNIQUE\b").unwrap());

static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDEFAULT\s+(?:ON\s+NULL\s+)?").unwrap());

static CHECK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bCHECK\s*\(").unwrap());

/// Parse one column clause. Returns `None` when the clause is not a column
/// definition (no type, a virtual column, or a table-level clause).
pub fn parse_column_definition(clause: &str) -> Option<ColumnDefinition> {
    if INDEX_CLAUSE_RE.is_match(clause) {
        return None;
    }
    let caps = COLUMN_HEAD_RE.captures(clause)?;
    let raw_name = caps.get(1)?.as_str();
    let name = normalize_identifier(raw_name);
    if name.is_empty() {
        return None;
    }
    if !raw_name.starts_with('"')
        && RESERVED_CLAUSE_WORDS
            .iter()
            .any(|w| name.eq_ignore_ascii_case(w))
    {
        return None;
    }

    let type_word = caps.get(2)?.as_str();
    // `total AS (a + b)` is a virtual column with no declared type
    if type_word.eq_ignore_ascii_case("AS") || type_word.eq_ignore_ascii_case("GENERATED") {
        return None;
    }
    let mut raw_type = base_type_name(type_word);
    if let Some(zone) = caps.get(5) {
        raw_type.push(' ');
        raw_type.push_str(&collapse_whitespace(zone.as_str()));
    }

    let type_args = caps
        .get(3)
        .and_then(|first| parse_type_args(first.as_str(), caps.get(4).map(|m| m.as_str())));

    let head_end = caps.get(0)?.end();
    let rest = &clause[head_end..];
    let scan = blank_check_bodies(&mask_string_literals(rest));

    let primary_key = PRIMARY_KEY_RE.is_match(&scan);
    let not_null = NOT_NULL_RE.is_match(&scan);

    Some(ColumnDefinition {
        name,
        raw_type,
        type_args,
        nullable: !(not_null || primary_key),
        primary_key,
        unique: primary_key || UNIQUE_RE.is_match(&scan),
        increment: IDENTITY_RE.is_match(&scan),
        default: DEFAULT_RE
            .find(&scan)
            .and_then(|m| capture_default(&rest[m.end()..])),
        reference: parse_inline_reference(&scan),
    })
}

/// Drop a schema prefix from user-defined types (`MDSYS.SDO_GEOMETRY`) and
/// collapse inner whitespace of multi-word phrases.
fn base_type_name(type_word: &str) -> String {
    let last = type_word.rsplit('.').next().unwrap_or(type_word).trim();
    collapse_whitespace(last)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One argument is a length, two are precision and scale. `*` means the
/// maximum precision.
fn parse_type_args(first: &str, second: Option<&str>) -> Option<TypeArgs> {
    let first = if first == "*" {
        MAX_NUMERIC_PRECISION
    } else {
        first.parse().ok()?
    };
    Some(match second {
        Some(scale) => TypeArgs::PrecisionScale {
            precision: first,
            scale: scale.parse().ok()?,
        },
        None => TypeArgs::Length { length: first },
    })
}

/// Blank the bodies of `CHECK (...)` clauses, preserving byte offsets.
fn blank_check_bodies(masked: &str) -> String {
    let mut out = masked.to_string();
    let mut pos = 0;
    while let Some(m) = CHECK_RE.find_at(masked, pos) {
        let open = m.end() - 1;
        let Some((_, consumed)) = extract_balanced_parens(&masked[open..]) else {
            break;
        };
        let end = open + consumed;
        out.replace_range(open..end, &" ".repeat(end - open));
        pos = end;
    }
    out
}

/// Capture a DEFAULT value from the text right after `DEFAULT `.
///
/// A quoted literal is taken whole (with `''` escapes), a parenthesized
/// expression up to its balanced close, and anything else up to the next
/// whitespace or comma.
fn capture_default(text: &str) -> Option<String> {
    let text = text.trim_start();
    let value = if text.starts_with('\'') {
        let bytes = text.as_bytes();
        let mut i = 1;
        loop {
            match bytes.get(i) {
                Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                Some(b'\'') => break &text[..=i],
                Some(_) => i += 1,
                None => break text,
            }
        }
    } else if text.starts_with('(') {
        match extract_balanced_parens(text) {
            Some((_, end)) => &text[..end],
            None => text,
        }
    } else {
        let end = text
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(text.len());
        &text[..end]
    };

    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_inline_reference(scan: &str) -> Option<InlineReference> {
    let caps = INLINE_REFERENCE_RE.captures(scan)?;
    let (target_schema, target_table) = split_qualified_name(caps.get(2)?.as_str());
    let (on_delete, on_update) = parse_referential_actions(&scan[caps.get(0)?.end()..]);

    Some(InlineReference {
        constraint_name: caps.get(1).map(|m| normalize_identifier(m.as_str())),
        target_schema,
        target_table,
        target_column: caps.get(3).map(|m| normalize_identifier(m.as_str())),
        on_delete,
        on_update,
    })
}

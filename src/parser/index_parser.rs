//! Manual `CREATE INDEX` extraction
//!
//! ```sql
//! CREATE [UNIQUE | BITMAP] INDEX [schema.]name ON [schema.]table (col [ASC|DESC], ...)
//!     [TABLESPACE ts] [LOCAL] [COMPRESS n] ...
//! ```
//!
//! Runs over the raw statement list, so indexes in scripts the grammar parser
//! rejected are still found.

use std::sync::LazyLock;

use regex::Regex;

use super::identifier_utils::{
    parse_identifier_list, split_qualified_name, IDENT, SCRIPT_LINE_PREFIX,
};
use crate::model::{Index, TableRegistry};
use crate::util::extract_balanced_parens;

/// A `CREATE INDEX` statement before it is attached to its table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIndex {
    pub name: String,
    pub table_schema: Option<String>,
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

static CREATE_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^{prefix}\s*CREATE\s+(?:(UNIQUE|BITMAP)\s+)?INDEX\s+((?:{id}\s*\.\s*)?{id})\s+ON\s+((?:{id}\s*\.\s*)?{id})\s*\(",
        prefix = SCRIPT_LINE_PREFIX,
        id = IDENT
    ))
    .unwrap()
});

/// Parse a `CREATE INDEX` statement. Returns `None` when the statement is not
/// an index on a table column list.
pub fn parse_create_index(statement: &str) -> Option<ParsedIndex> {
    let caps = CREATE_INDEX_RE.captures(statement)?;
    let unique = caps
        .get(1)
        .is_some_and(|m| m.as_str().eq_ignore_ascii_case("UNIQUE"));
    // Index names are table-scoped in the model; the index schema is dropped.
    let (_, name) = split_qualified_name(caps.get(2)?.as_str());
    let (table_schema, table_name) = split_qualified_name(caps.get(3)?.as_str());

    let open = caps.get(0)?.end() - 1;
    let (list, _) = extract_balanced_parens(&statement[open..])?;
    let columns = parse_identifier_list(list);
    if name.is_empty() || columns.is_empty() {
        return None;
    }

    Some(ParsedIndex {
        name,
        table_schema,
        table_name,
        columns,
        unique,
    })
}

/// Attach a parsed index to its table.
///
/// Returns false when the table is unknown or already has an index with the
/// same name (case-insensitive).
pub fn apply_index(registry: &mut TableRegistry, index: ParsedIndex) -> bool {
    let Some(table) = registry.find_mut(index.table_schema.as_deref(), &index.table_name) else {
        log::debug!(
            "index {} references unknown table {}",
            index.name,
            index.table_name
        );
        return false;
    };

    let added = table.add_index(Index {
        name: index.name.clone(),
        columns: index.columns,
        unique: index.unique,
    });
    if !added {
        log::debug!("duplicate index {} on {}", index.name, table.qualified_name());
    }
    added
}

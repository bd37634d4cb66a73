//! Table-level constraint parsing
//!
//! Handles out-of-line constraints inside `CREATE TABLE` bodies and the
//! constraints added by `ALTER TABLE ... ADD`:
//!
//! ```sql
//! [CONSTRAINT name] PRIMARY KEY (col, ...)
//! [CONSTRAINT name] UNIQUE (col, ...)
//! [CONSTRAINT name] FOREIGN KEY (col, ...) REFERENCES [schema.]table [(col, ...)]
//!     [ON DELETE CASCADE|SET NULL|...] [ON UPDATE ...]
//! [CONSTRAINT name] CHECK (expr)
//! ALTER TABLE [schema.]table ADD [(] constraint [, constraint ...] [)]
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::identifier_utils::{
    normalize_identifier, parse_identifier_list, split_qualified_name, IDENT, SCRIPT_LINE_PREFIX,
};
use crate::model::ForeignKey;
use crate::util::{extract_balanced_parens, mask_string_literals, split_top_level_commas};

/// Foreign key target and columns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKeyRef {
    pub columns: Vec<String>,
    pub target_schema: Option<String>,
    pub target_table: String,
    /// Empty when `REFERENCES` omitted the column list
    pub target_columns: Vec<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey(ForeignKeyRef),
    Check,
}

/// A table-level constraint, optionally named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConstraint {
    pub name: Option<String>,
    pub kind: ConstraintKind,
}

/// A constraint added to a table by `ALTER TABLE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTableConstraint {
    pub table_schema: Option<String>,
    pub table_name: String,
    pub constraint: TableConstraint,
}

static CONSTRAINT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?is)^\s*CONSTRAINT\s+({id})\s*", id = IDENT)).unwrap());

static KEY_COLUMNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^(PRIMARY\s+KEY|UNIQUE|FOREIGN\s+KEY)\s*\(").unwrap());

static CHECK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)^CHECK\s*\(").unwrap());

static REFERENCES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*REFERENCES\s+((?:{id}\s*\.\s*)?{id})\s*",
        id = IDENT
    ))
    .unwrap()
});

static REFERENTIAL_ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bON\s+(DELETE|UPDATE)\s+(CASCADE|SET\s+NULL|SET\s+DEFAULT|RESTRICT|NO\s+ACTION)\b")
        .unwrap()
});

static ALTER_ADD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^{prefix}\s*ALTER\s+TABLE\s+((?:{id}\s*\.\s*)?{id})\s+ADD\b\s*",
        prefix = SCRIPT_LINE_PREFIX,
        id = IDENT
    ))
    .unwrap()
});

static NEXT_ADD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bADD\b\s*").unwrap());

/// Parse `ON DELETE` / `ON UPDATE` actions into `(delete, update)`, uppercased
/// with single spaces.
pub fn parse_referential_actions(text: &str) -> (Option<String>, Option<String>) {
    let mut on_delete = None;
    let mut on_update = None;
    for caps in REFERENTIAL_ACTION_RE.captures_iter(text) {
        let action = caps[2]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        let slot = if caps[1].eq_ignore_ascii_case("DELETE") {
            &mut on_delete
        } else {
            &mut on_update
        };
        if slot.is_none() {
            *slot = Some(action);
        }
    }
    (on_delete, on_update)
}

/// Parse one table-level constraint clause. Returns `None` for anything that
/// is not a constraint (e.g. a column definition).
pub fn parse_table_constraint(clause: &str) -> Option<TableConstraint> {
    parse_constraint_prefix(clause).map(|(constraint, _)| constraint)
}

/// Parse a constraint at the start of `text`, returning it with the number of
/// bytes it spans.
fn parse_constraint_prefix(text: &str) -> Option<(TableConstraint, usize)> {
    let (name, body_start) = match CONSTRAINT_NAME_RE.captures(text) {
        Some(caps) => (
            Some(normalize_identifier(caps.get(1)?.as_str())),
            caps.get(0)?.end(),
        ),
        None => (None, text.len() - text.trim_start().len()),
    };
    let body = &text[body_start..];

    if let Some(m) = CHECK_RE.find(body) {
        let open = m.end() - 1;
        let end = extract_balanced_parens(&body[open..])
            .map(|(_, consumed)| open + consumed)
            .unwrap_or(body.len());
        return Some((
            TableConstraint {
                name,
                kind: ConstraintKind::Check,
            },
            body_start + end,
        ));
    }

    let caps = KEY_COLUMNS_RE.captures(body)?;
    let keyword = caps.get(1)?.as_str().to_uppercase();
    let open = caps.get(0)?.end() - 1;
    let (list, consumed) = extract_balanced_parens(&body[open..])?;
    let columns = parse_identifier_list(list);
    let mut end = open + consumed;

    let kind = if keyword.starts_with("PRIMARY") {
        ConstraintKind::PrimaryKey(columns)
    } else if keyword == "UNIQUE" {
        ConstraintKind::Unique(columns)
    } else {
        let (fk, fk_len) = parse_references(&body[end..], columns)?;
        end += fk_len;
        ConstraintKind::ForeignKey(fk)
    };

    Some((TableConstraint { name, kind }, body_start + end))
}

/// Parse `REFERENCES target [(cols)] [actions]` following a FOREIGN KEY
/// column list.
fn parse_references(text: &str, columns: Vec<String>) -> Option<(ForeignKeyRef, usize)> {
    let caps = REFERENCES_RE.captures(text)?;
    let (target_schema, target_table) = split_qualified_name(caps.get(1)?.as_str());
    let mut end = caps.get(0)?.end();

    let mut target_columns = Vec::new();
    if text[end..].starts_with('(') {
        if let Some((list, consumed)) = extract_balanced_parens(&text[end..]) {
            target_columns = parse_identifier_list(list);
            end += consumed;
        }
    }

    // Actions directly follow the target; stop before the next ADD clause.
    let tail = &text[end..];
    let masked = mask_string_literals(tail);
    let action_span = NEXT_ADD_RE
        .find(&masked)
        .map(|m| m.start())
        .unwrap_or(tail.len());
    let (on_delete, on_update) = parse_referential_actions(&masked[..action_span]);
    if let Some(last) = REFERENTIAL_ACTION_RE.find_iter(&masked[..action_span]).last() {
        end += last.end();
    }

    Some((
        ForeignKeyRef {
            columns,
            target_schema,
            target_table,
            target_columns,
            on_delete,
            on_update,
        },
        end,
    ))
}

/// Parse every constraint an `ALTER TABLE ... ADD` statement adds.
///
/// Both `ADD CONSTRAINT ...` and the parenthesized `ADD (CONSTRAINT ..., ...)`
/// forms are accepted, as are several `ADD` clauses in one statement. Column
/// additions are ignored.
pub fn parse_alter_table_constraints(statement: &str) -> Vec<AlterTableConstraint> {
    let Some(caps) = ALTER_ADD_RE.captures(statement) else {
        return Vec::new();
    };
    let (Some(table), Some(whole)) = (caps.get(1), caps.get(0)) else {
        return Vec::new();
    };
    let (table_schema, table_name) = split_qualified_name(table.as_str());

    let mut constraints = Vec::new();
    let mut pos = whole.end();
    loop {
        let rest = &statement[pos..];
        let mut consumed = 0;
        if rest.starts_with('(') {
            if let Some((inner, len)) = extract_balanced_parens(rest) {
                constraints.extend(
                    split_top_level_commas(inner)
                        .iter()
                        .filter_map(|clause| parse_table_constraint(clause)),
                );
                consumed = len;
            }
        } else if let Some((constraint, len)) = parse_constraint_prefix(rest) {
            constraints.push(constraint);
            consumed = len;
        }

        let masked = mask_string_literals(&statement[pos + consumed..]);
        match NEXT_ADD_RE.find(&masked) {
            Some(m) if consumed > 0 => pos += consumed + m.end(),
            _ => break,
        }
    }

    constraints
        .into_iter()
        .map(|constraint| AlterTableConstraint {
            table_schema: table_schema.clone(),
            table_name: table_name.clone(),
            constraint,
        })
        .collect()
}

/// Expand a foreign key into one relationship per column pair, all sharing
/// the constraint name (or `FK_<table>_<first column>` when unnamed).
pub fn foreign_keys_from_ref(
    source_schema: Option<&str>,
    source_table: &str,
    constraint_name: Option<&str>,
    fk: &ForeignKeyRef,
) -> Vec<ForeignKey> {
    let Some(first) = fk.columns.first() else {
        return Vec::new();
    };
    let name = constraint_name
        .map(str::to_string)
        .unwrap_or_else(|| format!("FK_{}_{}", source_table, first));

    fk.columns
        .iter()
        .enumerate()
        .map(|(i, column)| ForeignKey {
            name: name.clone(),
            source_schema: source_schema.map(str::to_string),
            source_table: source_table.to_string(),
            source_column: column.clone(),
            target_schema: fk.target_schema.clone(),
            target_table: fk.target_table.clone(),
            target_column: fk.target_columns.get(i).cloned().unwrap_or_default(),
            source_table_id: None,
            target_table_id: None,
            update_action: fk.on_update.clone(),
            delete_action: fk.on_delete.clone(),
        })
        .collect()
}

/// Collect the foreign keys added by `ALTER TABLE` statements.
///
/// The result carries no table ids; the caller fills in the source id from
/// its registry and leaves the target id to the linker.
pub fn extract_foreign_keys_from_alter<S: AsRef<str>>(statements: &[S]) -> Vec<ForeignKey> {
    statements
        .iter()
        .flat_map(|statement| parse_alter_table_constraints(statement.as_ref()))
        .flat_map(|alter| match &alter.constraint.kind {
            ConstraintKind::ForeignKey(fk) => foreign_keys_from_ref(
                alter.table_schema.as_deref(),
                &alter.table_name,
                alter.constraint.name.as_deref(),
                fk,
            ),
            _ => Vec::new(),
        })
        .collect()
}

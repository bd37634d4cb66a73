//! Manual `CREATE TABLE` extraction
//!
//! Works on raw statements (no preprocessing), so vendor syntax the grammar
//! parser rejects is still read. Each body clause is classified into a
//! [`TableClause`] and handled by an exhaustive match; clauses of no known shape
//! are skipped.

use std::sync::LazyLock;

use regex::Regex;

use super::column_parser::{parse_column_definition, ColumnDefinition};
use super::constraint_parser::{
    foreign_keys_from_ref, parse_table_constraint, ConstraintKind, TableConstraint,
};
use super::identifier_utils::{split_qualified_name, IDENT, SCRIPT_LINE_PREFIX};
use crate::model::{normalize_type, Column, ForeignKey, IdGenerator, Index, Table, TableRegistry};
use crate::util::{extract_balanced_parens, split_top_level_commas, starts_with_ci};

/// Classified shape of one top-level clause in a `CREATE TABLE` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableClause {
    Column(ColumnDefinition),
    Constraint(TableConstraint),
}

static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)^{prefix}\s*CREATE\s+(?:OR\s+REPLACE\s+)?(?:(?:GLOBAL|PRIVATE)\s+TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?((?:{id}\s*\.\s*)?{id})\s*\(",
        prefix = SCRIPT_LINE_PREFIX,
        id = IDENT
    ))
    .unwrap()
});

/// Classify a body clause. Constraint shapes are tried before column
/// definitions: `FOREIGN KEY`, `PRIMARY KEY`, `UNIQUE`, `CONSTRAINT`, `CHECK`.
pub fn classify_clause(clause: &str) -> Option<TableClause> {
    let trimmed = clause.trim_start();
    let is_constraint = ["FOREIGN", "PRIMARY", "UNIQUE", "CONSTRAINT", "CHECK"]
        .iter()
        .any(|kw| {
            starts_with_ci(trimmed, kw)
                && !trimmed[kw.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_')
        });

    if is_constraint {
        parse_table_constraint(trimmed).map(TableClause::Constraint)
    } else {
        parse_column_definition(trimmed).map(TableClause::Column)
    }
}

/// Extract one `CREATE TABLE` statement into the registry.
///
/// Columns and inline references are recorded first; table-level constraints
/// are applied once every column exists. Returns the table's registry slot,
/// or `None` when the statement is not a `CREATE TABLE` with a column list.
pub fn extract_table(
    statement: &str,
    registry: &mut TableRegistry,
    relationships: &mut Vec<ForeignKey>,
    ids: &mut dyn IdGenerator,
) -> Option<usize> {
    let caps = CREATE_TABLE_RE.captures(statement)?;
    let (schema, name) = split_qualified_name(caps.get(1)?.as_str());
    if name.is_empty() {
        return None;
    }
    let open = caps.get(0)?.end() - 1;
    let (body, _) = extract_balanced_parens(&statement[open..])?;

    let slot = registry.register(schema.as_deref(), &name, ids);
    let table = registry.get_mut(slot)?;

    let mut constraints = Vec::new();
    for clause in split_top_level_commas(body) {
        match classify_clause(&clause) {
            Some(TableClause::Column(def)) => {
                apply_column(table, def, relationships);
            }
            Some(TableClause::Constraint(constraint)) => constraints.push(constraint),
            None => log::debug!("skipping clause in {}: {}", name, clause),
        }
    }

    for constraint in constraints {
        apply_constraint(table, constraint, relationships);
    }
    enforce_key_uniqueness(table);

    Some(slot)
}

/// Record a relationship unless one with the same source column and target
/// table exists. Returns false for duplicates.
pub fn push_relationship(relationships: &mut Vec<ForeignKey>, fk: ForeignKey) -> bool {
    if relationships.iter().any(|existing| existing.same_link(&fk)) {
        log::debug!(
            "duplicate relationship {}.{} -> {}",
            fk.source_table,
            fk.source_column,
            fk.target_table
        );
        return false;
    }
    relationships.push(fk);
    true
}

fn apply_column(table: &mut Table, def: ColumnDefinition, relationships: &mut Vec<ForeignKey>) {
    let mut column = Column::new(def.name.clone(), normalize_type(&def.raw_type));
    column.type_args = def.type_args;
    column.nullable = def.nullable;
    column.primary_key = def.primary_key;
    column.unique = def.unique;
    column.increment = def.increment;
    column.default = def.default;

    if !table.add_column(column) {
        log::debug!("duplicate column {} in {}", def.name, table.qualified_name());
        return;
    }

    if def.unique && !def.primary_key {
        table.add_index(Index {
            name: format!("UQ_{}_{}", table.name, def.name),
            columns: vec![def.name.clone()],
            unique: true,
        });
    }

    if let Some(reference) = def.reference {
        let name = reference
            .constraint_name
            .unwrap_or_else(|| format!("FK_{}_{}", table.name, def.name));
        push_relationship(
            relationships,
            ForeignKey {
                name,
                source_schema: table.schema.clone(),
                source_table: table.name.clone(),
                source_column: def.name,
                target_schema: reference.target_schema,
                target_table: reference.target_table,
                target_column: reference.target_column.unwrap_or_default(),
                source_table_id: None,
                target_table_id: None,
                update_action: reference.on_update,
                delete_action: reference.on_delete,
            },
        );
    }
}

/// Apply a table-level constraint to an already registered table.
///
/// Shared with the `ALTER TABLE` path, which adds keys after the fact.
pub fn apply_constraint(
    table: &mut Table,
    constraint: TableConstraint,
    relationships: &mut Vec<ForeignKey>,
) {
    match constraint.kind {
        ConstraintKind::PrimaryKey(columns) => {
            let single = columns.len() == 1;
            for name in &columns {
                match table.column_mut(name) {
                    Some(column) => {
                        column.primary_key = true;
                        column.nullable = false;
                        column.unique = single;
                    }
                    None => log::debug!(
                        "primary key column {} not found in {}",
                        name,
                        table.qualified_name()
                    ),
                }
            }
        }
        ConstraintKind::Unique(columns) => {
            if columns.is_empty() {
                return;
            }
            if let [only] = columns.as_slice() {
                if let Some(column) = table.column_mut(only) {
                    column.unique = true;
                }
            }
            let name = constraint
                .name
                .unwrap_or_else(|| format!("UQ_{}_{}", table.name, columns.join("_")));
            if !table.add_index(Index {
                name: name.clone(),
                columns,
                unique: true,
            }) {
                log::debug!("duplicate index {} on {}", name, table.qualified_name());
            }
        }
        ConstraintKind::ForeignKey(fk) => {
            for rel in foreign_keys_from_ref(
                table.schema.as_deref(),
                &table.name,
                constraint.name.as_deref(),
                &fk,
            ) {
                push_relationship(relationships, rel);
            }
        }
        ConstraintKind::Check => {}
    }
}

/// Columns of a composite primary key are not individually unique unless a
/// single-column unique index covers them.
pub fn enforce_key_uniqueness(table: &mut Table) {
    if table.primary_key_columns().len() < 2 {
        return;
    }
    let uniquely_indexed: Vec<String> = table
        .indexes
        .iter()
        .filter(|index| index.unique && index.columns.len() == 1)
        .map(|index| index.columns[0].to_lowercase())
        .collect();

    for column in table.columns.iter_mut().filter(|c| c.primary_key) {
        column.unique = uniquely_indexed.contains(&column.name.to_lowercase());
    }
}

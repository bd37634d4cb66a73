//! Schema model building
//!
//! Runs the extraction pipeline for one script:
//!
//! 1. split the raw text into statements
//! 2. manual `CREATE TABLE` extraction over the raw statements
//! 3. `ALTER TABLE ... ADD` keys over the raw statements
//! 4. grammar extraction over the preprocessed text (optional)
//! 5. manual `CREATE INDEX` extraction over the raw statements
//! 6. relationship linking and assembly
//!
//! All state lives in a registry and relationship list owned by the call.

use crate::parser::{
    apply_constraint, apply_grammar_statements, apply_index, enforce_key_uniqueness,
    extract_foreign_keys_from_alter, extract_table, parse_alter_table_constraints,
    parse_create_index, parse_schema_statements, preprocess, push_relationship, split_statements,
    ConstraintKind,
};
use crate::ParseOptions;

use super::linker::{assemble_model, link_relationships};
use super::registry::{IdGenerator, TableRegistry};
use super::{ForeignKey, SchemaModel};

/// Build a schema model from a DDL script.
///
/// Never fails on DDL content: statements and clauses of unknown shape are
/// skipped and unresolvable relationships are dropped.
pub fn build_model(sql: &str, options: &ParseOptions, ids: &mut dyn IdGenerator) -> SchemaModel {
    let raw_statements = split_statements(sql);
    let mut registry = TableRegistry::new();
    let mut relationships: Vec<ForeignKey> = Vec::new();

    for statement in &raw_statements {
        extract_table(statement, &mut registry, &mut relationships, ids);
    }

    apply_alter_keys(&raw_statements, &mut registry, &mut relationships);

    if options.grammar_extraction {
        let preprocessed = preprocess(sql);
        let statements = parse_schema_statements(&preprocessed);
        apply_grammar_statements(&statements, &mut registry, &mut relationships);
    }

    for statement in &raw_statements {
        if let Some(index) = parse_create_index(statement) {
            apply_index(&mut registry, index);
        }
    }

    let aliases = registry.aliases();
    let tables = registry.into_tables();
    let extracted = relationships.len();
    let relationships = link_relationships(&tables, relationships, &aliases);
    let model = assemble_model(tables, relationships);

    log::info!(
        "extracted {} tables and {} relationships ({} dropped as unresolved)",
        model.tables.len(),
        model.relationships.len(),
        extracted - model.relationships.len()
    );
    model
}

/// Apply keys added by `ALTER TABLE` statements.
///
/// Foreign keys get their source table id immediately, since the altered
/// table is already registered; the target id is left for the linker.
fn apply_alter_keys(
    statements: &[String],
    registry: &mut TableRegistry,
    relationships: &mut Vec<ForeignKey>,
) {
    for alter in statements.iter().flat_map(|s| parse_alter_table_constraints(s)) {
        if matches!(alter.constraint.kind, ConstraintKind::ForeignKey(_)) {
            continue;
        }
        match registry.find_mut(alter.table_schema.as_deref(), &alter.table_name) {
            Some(table) => {
                apply_constraint(table, alter.constraint, relationships);
                enforce_key_uniqueness(table);
            }
            None => log::debug!("ALTER TABLE on unknown table {}", alter.table_name),
        }
    }

    for mut fk in extract_foreign_keys_from_alter(statements) {
        fk.source_table_id = registry.resolve_id(fk.source_schema.as_deref(), &fk.source_table);
        push_relationship(relationships, fk);
    }
}

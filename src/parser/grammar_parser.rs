//! Grammar-based extraction with sqlparser-rs
//!
//! The preprocessed script is parsed with [`OracleCompatDialect`]. When the
//! whole script fails to parse, each statement is retried on its own and
//! whatever parses is kept. Failures are logged, never returned.
//!
//! Only `CREATE INDEX` and `ALTER TABLE ... ADD CONSTRAINT` nodes are read.
//! Their findings are merged into the registry the manual extractor already
//! filled: indexes are deduplicated by name, foreign keys by source table,
//! source column and target table.

use sqlparser::ast::{
    AlterTableOperation, CreateIndex, Expr, ObjectName, Statement,
    TableConstraint as SqlTableConstraint,
};
use sqlparser::parser::Parser;

use super::constraint_parser::{
    foreign_keys_from_ref, ConstraintKind, ForeignKeyRef, TableConstraint,
};
use super::index_parser::{apply_index, ParsedIndex};
use super::oracle_dialect::OracleCompatDialect;
use super::statement_splitter::split_statements;
use super::table_parser::{apply_constraint, enforce_key_uniqueness, push_relationship};
use crate::model::{ForeignKey, TableRegistry};

/// Parse preprocessed DDL, falling back to statement-by-statement parsing.
pub fn parse_schema_statements(preprocessed: &str) -> Vec<Statement> {
    let dialect = OracleCompatDialect::new();
    match Parser::parse_sql(&dialect, preprocessed) {
        Ok(statements) => statements,
        Err(e) => {
            log::warn!("grammar parse of script failed, retrying per statement: {}", e);
            split_statements(preprocessed)
                .iter()
                .filter_map(|sql| match Parser::parse_sql(&dialect, sql) {
                    Ok(statements) => Some(statements),
                    Err(e) => {
                        log::debug!("grammar parser rejected statement: {}", e);
                        None
                    }
                })
                .flatten()
                .collect()
        }
    }
}

/// Split an object name into (schema, name), keeping the last two parts.
fn object_name_parts(name: &ObjectName) -> (Option<String>, String) {
    let mut parts = name.0.iter().rev();
    let object = parts.next().map(|ident| ident.value.clone()).unwrap_or_default();
    let schema = parts
        .next()
        .map(|ident| ident.value.clone())
        .filter(|s| !s.is_empty());
    (schema, object)
}

/// Column name of an index key expression; expressions are kept as written.
fn index_column_name(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map(|ident| ident.value.clone())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn convert_create_index(index: &CreateIndex) -> Option<ParsedIndex> {
    let (_, name) = object_name_parts(index.name.as_ref()?);
    let (table_schema, table_name) = object_name_parts(&index.table_name);
    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|col| index_column_name(&col.expr))
        .filter(|c| !c.is_empty())
        .collect();
    if name.is_empty() || columns.is_empty() {
        return None;
    }
    Some(ParsedIndex {
        name,
        table_schema,
        table_name,
        columns,
        unique: index.unique,
    })
}

fn ident_values(idents: &[sqlparser::ast::Ident]) -> Vec<String> {
    idents.iter().map(|ident| ident.value.clone()).collect()
}

fn convert_constraint(constraint: &SqlTableConstraint) -> Option<TableConstraint> {
    let (name, kind) = match constraint {
        SqlTableConstraint::PrimaryKey { name, columns, .. } => {
            (name, ConstraintKind::PrimaryKey(ident_values(columns)))
        }
        SqlTableConstraint::Unique { name, columns, .. } => {
            (name, ConstraintKind::Unique(ident_values(columns)))
        }
        SqlTableConstraint::ForeignKey {
            name,
            columns,
            foreign_table,
            referred_columns,
            on_delete,
            on_update,
            ..
        } => {
            let (target_schema, target_table) = object_name_parts(foreign_table);
            (
                name,
                ConstraintKind::ForeignKey(ForeignKeyRef {
                    columns: ident_values(columns),
                    target_schema,
                    target_table,
                    target_columns: ident_values(referred_columns),
                    on_delete: on_delete.as_ref().map(ToString::to_string),
                    on_update: on_update.as_ref().map(ToString::to_string),
                }),
            )
        }
        _ => return None,
    };
    Some(TableConstraint {
        name: name.as_ref().map(|ident| ident.value.clone()),
        kind,
    })
}

fn apply_alter_constraint(
    schema: Option<&str>,
    table_name: &str,
    constraint: TableConstraint,
    registry: &mut TableRegistry,
    relationships: &mut Vec<ForeignKey>,
) {
    if let ConstraintKind::ForeignKey(fk) = &constraint.kind {
        let source_id = registry.resolve_id(schema, table_name);
        for mut rel in foreign_keys_from_ref(schema, table_name, constraint.name.as_deref(), fk) {
            rel.source_table_id = source_id.clone();
            push_relationship(relationships, rel);
        }
        return;
    }

    match registry.find_mut(schema, table_name) {
        Some(table) => {
            apply_constraint(table, constraint, relationships);
            enforce_key_uniqueness(table);
        }
        None => log::debug!("ALTER TABLE on unknown table {}", table_name),
    }
}

/// Merge `CREATE INDEX` and `ALTER TABLE ... ADD CONSTRAINT` nodes into the
/// registry and relationship list.
pub fn apply_grammar_statements(
    statements: &[Statement],
    registry: &mut TableRegistry,
    relationships: &mut Vec<ForeignKey>,
) {
    for statement in statements {
        match statement {
            Statement::CreateIndex(index) => {
                if let Some(parsed) = convert_create_index(index) {
                    apply_index(registry, parsed);
                }
            }
            Statement::AlterTable {
                name, operations, ..
            } => {
                let (schema, table_name) = object_name_parts(name);
                for operation in operations {
                    let AlterTableOperation::AddConstraint(constraint) = operation else {
                        continue;
                    };
                    if let Some(constraint) = convert_constraint(constraint) {
                        apply_alter_constraint(
                            schema.as_deref(),
                            &table_name,
                            constraint,
                            registry,
                            relationships,
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

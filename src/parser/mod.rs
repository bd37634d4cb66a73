//! DDL text parsing: preprocessing, splitting, and the manual and grammar
//! extractors

mod column_parser;
mod constraint_parser;
mod grammar_parser;
mod identifier_utils;
mod index_parser;
mod oracle_dialect;
mod preprocess_parser;
mod statement_splitter;
mod table_parser;

pub use column_parser::{parse_column_definition, ColumnDefinition, InlineReference};
pub use constraint_parser::{
    extract_foreign_keys_from_alter, foreign_keys_from_ref, parse_alter_table_constraints,
    parse_referential_actions, parse_table_constraint, AlterTableConstraint, ConstraintKind,
    ForeignKeyRef, TableConstraint,
};
pub use grammar_parser::{apply_grammar_statements, parse_schema_statements};
pub use identifier_utils::{normalize_identifier, split_qualified_name};
pub use index_parser::{apply_index, parse_create_index, ParsedIndex};
pub use oracle_dialect::OracleCompatDialect;
pub use preprocess_parser::{
    neutralize_check_constraints, preprocess, rewrite_default_functions, rewrite_identity_columns,
    rewrite_sequence_defaults, strip_anonymous_blocks, strip_dynamic_sql, strip_length_semantics,
    strip_procedural_blocks, strip_session_commands, strip_storage_clauses, RewriteRule,
    CHECK_PLACEHOLDER, REWRITE_RULES, SEQUENCE_DEFAULT_SENTINEL,
};
pub use statement_splitter::{is_schema_statement, retain_schema_statements, split_statements};
pub use table_parser::{
    apply_constraint, classify_clause, enforce_key_uniqueness, extract_table, push_relationship,
    TableClause,
};

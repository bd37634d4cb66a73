//! Oracle-compatible dialect for sqlparser-rs
//!
//! Wraps `GenericDialect` and widens identifier rules to the vendor's
//! (`$` and `#` are legal identifier characters). Everything else is delegated;
//! vendor-only syntax the grammar cannot handle is removed or rewritten by the
//! preprocessor before the grammar parser sees it.

use std::any::TypeId;

use sqlparser::dialect::{Dialect, GenericDialect};

/// Generic grammar with Oracle identifier rules.
///
/// # Example
///
/// ```
/// use sqlparser::parser::Parser;
/// use rust_ddl_import::parser::OracleCompatDialect;
///
/// let dialect = OracleCompatDialect::new();
/// let statements = Parser::parse_sql(&dialect, "CREATE TABLE emp$hist (id INT)").unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
#[derive(Debug)]
pub struct OracleCompatDialect {
    base: GenericDialect,
}

impl Default for OracleCompatDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleCompatDialect {
    pub fn new() -> Self {
        Self {
            base: GenericDialect {},
        }
    }
}

impl Dialect for OracleCompatDialect {
    // Report as GenericDialect so dialect_of!() checks (AUTO_INCREMENT and
    // friends) behave as they do for the generic grammar.
    fn dialect(&self) -> TypeId {
        TypeId::of::<GenericDialect>()
    }

    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '#'
    }

    fn is_delimited_identifier_start(&self, ch: char) -> bool {
        ch == '"'
    }

    fn supports_connect_by(&self) -> bool {
        true
    }

    fn supports_boolean_literals(&self) -> bool {
        self.base.supports_boolean_literals()
    }

    fn supports_filter_during_aggregation(&self) -> bool {
        self.base.supports_filter_during_aggregation()
    }
}

//! rust-ddl-import: a resilient importer for vendor SQL DDL scripts
//!
//! This library turns `CREATE TABLE` / `CREATE INDEX` / `ALTER TABLE` scripts,
//! including the administrative and procedural noise real exports carry, into
//! a normalized schema model of tables, columns, indexes, and linked foreign
//! keys.
//!
//! ```
//! let model = rust_ddl_import::parse_ddl(
//!     "CREATE TABLE t(id NUMBER(10) PRIMARY KEY, name VARCHAR2(50) NOT NULL);",
//! )
//! .unwrap();
//! assert_eq!(model.tables[0].columns.len(), 2);
//! ```

pub mod error;
pub mod input;
pub mod model;
pub mod parser;
pub mod util;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub use error::DdlImportError;
pub use model::{IdGenerator, SchemaModel, SequentialIdGenerator, UuidIdGenerator};

/// Options for a DDL import
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Run the grammar-based extractor after the manual one. When disabled
    /// only the manual table and index extractors contribute.
    pub grammar_extraction: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            grammar_extraction: true,
        }
    }
}

/// File count at which `parse_ddl_files` switches to rayon
const PARALLEL_THRESHOLD: usize = 8;

/// Parse a DDL script with default options and random table ids
pub fn parse_ddl(sql: &str) -> Result<SchemaModel, DdlImportError> {
    parse_ddl_with(sql, &ParseOptions::default(), &mut UuidIdGenerator)
}

/// Parse a DDL script.
///
/// Noise in the DDL never fails the call. An error is returned only when the
/// pipeline itself breaks, wrapped as [`DdlImportError::DdlParseError`].
pub fn parse_ddl_with(
    sql: &str,
    options: &ParseOptions,
    ids: &mut dyn IdGenerator,
) -> Result<SchemaModel, DdlImportError> {
    panic::catch_unwind(AssertUnwindSafe(|| model::build_model(sql, options, ids))).map_err(
        |payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown internal error".to_string());
            DdlImportError::DdlParseError { message }
        },
    )
}

/// Read and parse one DDL file
pub fn parse_ddl_file(path: &Path, options: &ParseOptions) -> Result<SchemaModel, DdlImportError> {
    let sql = input::read_sql_file(path)?;
    log::debug!("parsing {}", path.display());
    parse_ddl_with(&sql, options, &mut UuidIdGenerator)
}

/// Parse several DDL files independently, each with its own registry.
///
/// Results keep the order of `paths`; the first error is returned.
pub fn parse_ddl_files(
    paths: &[PathBuf],
    options: &ParseOptions,
) -> Result<Vec<(PathBuf, SchemaModel)>, DdlImportError> {
    let parse_one = |path: &PathBuf| parse_ddl_file(path, options).map(|m| (path.clone(), m));

    if paths.len() >= PARALLEL_THRESHOLD {
        paths.par_iter().map(parse_one).collect()
    } else {
        paths.iter().map(parse_one).collect()
    }
}

//! Common test utilities for rust-ddl-import tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Test context with a temporary directory of DDL scripts
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    /// Write a script relative to the context directory, creating parent
    /// directories as needed
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, contents).expect("Failed to write script");
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }
}

/// A small two-table schema split over two scripts, with the reference
/// pointing across files
pub fn write_split_schema(ctx: &TestContext) -> (PathBuf, PathBuf) {
    let parent = ctx.write(
        "ddl/01_customers.sql",
        "CREATE TABLE customers (\n  id NUMBER(10) PRIMARY KEY,\n  name VARCHAR2(100) NOT NULL\n);\n",
    );
    let child = ctx.write(
        "ddl/02_orders.sql",
        "CREATE TABLE orders (\n  id NUMBER(10) PRIMARY KEY,\n  customer_id NUMBER(10)\n);\n\
         ALTER TABLE orders ADD CONSTRAINT fk_orders_customer FOREIGN KEY (customer_id) REFERENCES customers (id);\n",
    );
    (parent, child)
}

pub fn read_to_string(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

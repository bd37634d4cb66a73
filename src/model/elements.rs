//! Schema model element types

use serde::Serialize;

/// Type arguments attached to a column
///
/// The shape is decided by argument count, not by type name: one argument is a
/// length, two arguments are precision and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypeArgs {
    Length { length: u32 },
    PrecisionScale { precision: u32, scale: i32 },
}

/// A column within a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Canonical lowercase type (see `model::normalize_type`)
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_args: Option<TypeArgs>,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub increment: bool,
    /// Raw default expression as written in the DDL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            type_args: None,
            nullable: true,
            primary_key: false,
            unique: false,
            increment: false,
            default: None,
        }
    }
}

/// An index on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// A table in the schema model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Process-generated id, unique within one parse
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    /// First-seen sequence in the source text, used only for output ordering
    pub order: usize,
}

impl Table {
    pub fn new(id: String, schema: Option<String>, name: String, order: usize) -> Self {
        Self {
            id,
            name,
            schema,
            columns: Vec::new(),
            indexes: Vec::new(),
            order,
        }
    }

    /// Qualified display name, e.g. `hr.employees`
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Add a column unless one with the same name (case-insensitive) exists.
    /// Returns false when the column was a duplicate.
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.column(&column.name).is_some() {
            return false;
        }
        self.columns.push(column);
        true
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indexes
            .iter()
            .any(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Add an index unless one with the same name (case-insensitive) exists.
    /// Returns false when the index was a duplicate.
    pub fn add_index(&mut self, index: Index) -> bool {
        if self.has_index(&index.name) {
            return false;
        }
        self.indexes.push(index);
        true
    }

    /// Names of the primary key columns, in column order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// A foreign key relationship between two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub name: String,
    pub source_schema: Option<String>,
    pub source_table: String,
    pub source_column: String,
    pub target_schema: Option<String>,
    pub target_table: String,
    /// Empty when the DDL omitted the referenced column list and the target
    /// has no single primary key column to fall back on
    pub target_column: String,
    /// Filled by the linker
    pub source_table_id: Option<String>,
    /// Filled by the linker
    pub target_table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_action: Option<String>,
}

impl ForeignKey {
    /// Whether this relationship links the same source column to the same
    /// target table as `other` (case-insensitive, schemas included)
    pub fn same_link(&self, other: &ForeignKey) -> bool {
        same_schema(&self.source_schema, &other.source_schema)
            && self.source_table.eq_ignore_ascii_case(&other.source_table)
            && self.source_column.eq_ignore_ascii_case(&other.source_column)
            && same_schema(&self.target_schema, &other.target_schema)
            && self.target_table.eq_ignore_ascii_case(&other.target_table)
    }

    pub fn is_linked(&self) -> bool {
        self.source_table_id.is_some() && self.target_table_id.is_some()
    }
}

fn same_schema(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// The normalized result of a DDL import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaModel {
    pub tables: Vec<Table>,
    pub relationships: Vec<ForeignKey>,
}

impl SchemaModel {
    /// Find a table by name, optionally schema-qualified (case-insensitive)
    pub fn table(&self, schema: Option<&str>, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| {
            t.name.eq_ignore_ascii_case(name)
                && match (schema, &t.schema) {
                    (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
                    (Some(_), None) => false,
                    (None, _) => true,
                }
        })
    }
}

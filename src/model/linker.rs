//! Relationship linking and final model assembly

use std::collections::HashMap;

use super::registry::table_key;
use super::{ForeignKey, Index, SchemaModel, Table};

/// Case-insensitive `schema.table` / `table` -> table id lookup
struct TableLookup {
    ids: HashMap<String, String>,
}

impl TableLookup {
    /// Seed from the aliases extraction recorded, then add any table the
    /// aliases do not cover yet.
    fn new(tables: &[Table], aliases: &HashMap<String, String>) -> Self {
        let mut ids = aliases.clone();
        for table in tables {
            if let Some(schema) = &table.schema {
                ids.entry(table_key(Some(schema), &table.name))
                    .or_insert_with(|| table.id.clone());
            }
            ids.entry(table_key(None, &table.name))
                .or_insert_with(|| table.id.clone());
        }
        Self { ids }
    }

    fn resolve(&self, schema: Option<&str>, table: &str) -> Option<String> {
        if let Some(schema) = schema.filter(|s| !s.is_empty()) {
            if let Some(id) = self.ids.get(&table_key(Some(schema), table)) {
                return Some(id.clone());
            }
        }
        self.ids.get(&table_key(None, table)).cloned()
    }
}

/// Resolve every relationship's table references to table ids.
///
/// Relationships whose source or target cannot be resolved are dropped: they
/// usually point at tables outside the supplied script.
pub fn link_relationships(
    tables: &[Table],
    relationships: Vec<ForeignKey>,
    aliases: &HashMap<String, String>,
) -> Vec<ForeignKey> {
    let lookup = TableLookup::new(tables, aliases);
    let by_id: HashMap<&str, &Table> = tables.iter().map(|t| (t.id.as_str(), t)).collect();

    relationships
        .into_iter()
        .filter_map(|mut rel| {
            if rel.source_table_id.is_none() {
                rel.source_table_id =
                    lookup.resolve(rel.source_schema.as_deref(), &rel.source_table);
            }
            if rel.target_table_id.is_none() {
                rel.target_table_id =
                    lookup.resolve(rel.target_schema.as_deref(), &rel.target_table);
            }

            if !rel.is_linked() {
                log::debug!(
                    "dropping relationship {}: {} -> {} does not resolve",
                    rel.name,
                    rel.source_table,
                    rel.target_table
                );
                return None;
            }

            if rel.target_column.is_empty() {
                // REFERENCES without a column list points at the target's primary key
                let target = rel.target_table_id.as_deref().and_then(|id| by_id.get(id));
                if let Some(target) = target {
                    if let [pk] = target.primary_key_columns().as_slice() {
                        rel.target_column = pk.to_string();
                    }
                }
            }

            Some(rel)
        })
        .collect()
}

/// Drop repeated index names (case-insensitive), keeping the first declaration
fn dedupe_indexes(indexes: Vec<Index>) -> Vec<Index> {
    let mut kept: Vec<Index> = Vec::with_capacity(indexes.len());
    for index in indexes {
        if kept.iter().any(|k| k.name.eq_ignore_ascii_case(&index.name)) {
            continue;
        }
        kept.push(index);
    }
    kept
}

/// Order tables by first appearance, dedupe their indexes, and package the model
pub fn assemble_model(mut tables: Vec<Table>, relationships: Vec<ForeignKey>) -> SchemaModel {
    for table in &mut tables {
        let indexes = std::mem::take(&mut table.indexes);
        table.indexes = dedupe_indexes(indexes);
    }
    tables.sort_by_key(|t| t.order);

    SchemaModel {
        tables,
        relationships,
    }
}

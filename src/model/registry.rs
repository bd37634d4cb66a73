//! Table registry shared by the extractors of a single parse
//!
//! The registry is an arena of tables plus a case-insensitive alias index.
//! Each table is reachable under `schema.name` (when it has a schema) and under
//! its bare `name`. Several tables may share a bare name across schemas; lookups
//! then prefer the exact schema match and otherwise return the first-registered
//! table.

use std::collections::HashMap;

use super::Table;

/// Source of table ids. Ids must be unique within one parse.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUID ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic ids `t1`, `t2`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialIdGenerator {
    next: usize,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("t{}", self.next)
    }
}

/// Build the lowercase lookup key for a table reference
pub fn table_key(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => {
            format!("{}.{}", schema.to_lowercase(), name.to_lowercase())
        }
        _ => name.to_lowercase(),
    }
}

/// Arena of tables discovered during one parse
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: Vec<Table>,
    /// `schema.name` keys -> arena slot
    qualified: HashMap<String, usize>,
    /// bare `name` keys -> arena slots in registration order
    bare: HashMap<String, Vec<usize>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table and return its arena slot.
    ///
    /// A table already registered under the same `schema.name` is reused, so a
    /// repeated `CREATE TABLE` merges into the first definition.
    pub fn register(
        &mut self,
        schema: Option<&str>,
        name: &str,
        ids: &mut dyn IdGenerator,
    ) -> usize {
        if let Some(existing) = self.find_exact(schema, name) {
            log::debug!("table {} registered twice; reusing first definition", name);
            return existing;
        }

        let slot = self.tables.len();
        let table = Table::new(
            ids.next_id(),
            schema.map(str::to_string),
            name.to_string(),
            slot,
        );
        self.tables.push(table);

        if let Some(schema) = schema.filter(|s| !s.is_empty()) {
            self.qualified.insert(table_key(Some(schema), name), slot);
        }
        self.bare.entry(table_key(None, name)).or_default().push(slot);

        slot
    }

    /// Exact lookup: `schema.name` when a schema is given, otherwise a table
    /// registered without a schema under `name`.
    fn find_exact(&self, schema: Option<&str>, name: &str) -> Option<usize> {
        match schema.filter(|s| !s.is_empty()) {
            Some(schema) => self.qualified.get(&table_key(Some(schema), name)).copied(),
            None => self
                .bare
                .get(&table_key(None, name))?
                .iter()
                .copied()
                .find(|&slot| self.tables[slot].schema.is_none()),
        }
    }

    /// Schema-aware lookup with name-only fallback
    pub fn find(&self, schema: Option<&str>, name: &str) -> Option<usize> {
        if let Some(slot) = self.find_exact(schema, name) {
            return Some(slot);
        }
        self.bare
            .get(&table_key(None, name))
            .and_then(|slots| slots.first().copied())
    }

    pub fn get(&self, slot: usize) -> Option<&Table> {
        self.tables.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Table> {
        self.tables.get_mut(slot)
    }

    pub fn find_mut(&mut self, schema: Option<&str>, name: &str) -> Option<&mut Table> {
        let slot = self.find(schema, name)?;
        self.tables.get_mut(slot)
    }

    /// Id of the table a reference resolves to
    pub fn resolve_id(&self, schema: Option<&str>, name: &str) -> Option<String> {
        self.find(schema, name).map(|slot| self.tables[slot].id.clone())
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All alias keys recorded during registration, mapped to table ids.
    /// Ambiguous bare names map to the first-registered table.
    pub fn aliases(&self) -> HashMap<String, String> {
        let mut aliases = HashMap::with_capacity(self.qualified.len() + self.bare.len());
        for (key, &slot) in &self.qualified {
            aliases.insert(key.clone(), self.tables[slot].id.clone());
        }
        for (key, slots) in &self.bare {
            if let Some(&slot) = slots.first() {
                aliases.insert(key.clone(), self.tables[slot].id.clone());
            }
        }
        aliases
    }

    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }
}

//! Per-statement table aliases.
//!
//! Every mapped type that takes part in one statement gets a short alias (`t0`, `t1`, ...)
//! in registration order. Aliases are never reused or renumbered, so join aliases stay
//! stable no matter in which order types show up in the statement.

use std::sync::Arc;

use crate::entity::{EntityType, TypeKey};
use crate::error::{OrmError, OrmResult};
use crate::schema::{TypeMetadata, discover_type};

/// One registered type.
#[derive(Debug, Clone)]
pub struct TableAliasEntry {
    pub ty: EntityType,
    pub metadata: Arc<TypeMetadata>,
    pub alias: String,
    pub is_primary: bool,
}

impl TableAliasEntry {
    /// `[schema].[table]`
    pub fn qualified_name(&self) -> String {
        self.metadata.qualified_name()
    }
}

/// Alias bookkeeping for one statement.
#[derive(Debug, Clone, Default)]
pub struct TableAliasRegistry {
    entries: Vec<TableAliasEntry>,
}

impl TableAliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, discovering its schema on first sight.
    ///
    /// Registering a known type keeps its alias. Registering any type as primary
    /// clears the flag on the previous primary.
    pub fn register(&mut self, ty: EntityType, is_primary: bool) -> OrmResult<&TableAliasEntry> {
        let idx = match self.position(&ty.key()) {
            Some(idx) => idx,
            None => {
                let metadata = discover_type(ty)?;
                let alias = format!("t{}", self.entries.len());
                self.entries.push(TableAliasEntry {
                    ty,
                    metadata,
                    alias,
                    is_primary: false,
                });
                self.entries.len() - 1
            }
        };

        if is_primary {
            for (i, entry) in self.entries.iter_mut().enumerate() {
                entry.is_primary = i == idx;
            }
        }
        Ok(&self.entries[idx])
    }

    /// Alias of a registered type.
    pub fn alias_of(&self, key: &TypeKey) -> Option<&str> {
        self.get(key).map(|e| e.alias.as_str())
    }

    pub fn get(&self, key: &TypeKey) -> Option<&TableAliasEntry> {
        self.position(key).map(|idx| &self.entries[idx])
    }

    /// Alias of a registered table, looked up by bare or qualified table name.
    pub fn alias_by_table_name(&self, name: &str) -> Option<&str> {
        self.by_table_name(name).map(|e| e.alias.as_str())
    }

    pub fn by_table_name(&self, name: &str) -> Option<&TableAliasEntry> {
        self.entries.iter().find(|e| e.metadata.matches_table_name(name))
    }

    /// The statement's FROM/target table.
    pub fn primary_table(&self) -> OrmResult<&TableAliasEntry> {
        self.entries.iter().find(|e| e.is_primary).ok_or_else(|| {
            OrmError::InvariantViolation("no primary table has been registered".to_string())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableAliasEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &TypeKey) -> Option<usize> {
        self.entries.iter().position(|e| e.ty.key() == *key)
    }
}

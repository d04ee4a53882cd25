//! Name-keyed collection of entities for one generation run

use std::collections::HashMap;

use super::EntityMetadata;
use crate::error::SchemaGenError;

/// All entities discovered in one run, in scan order
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entities: Vec<EntityMetadata>,
    by_name: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Two declarations with the same type name are an error.
    pub fn insert(&mut self, entity: EntityMetadata) -> Result<(), SchemaGenError> {
        if let Some(&idx) = self.by_name.get(&entity.name) {
            return Err(SchemaGenError::DuplicateEntity {
                name: entity.name,
                first: self.entities[idx].source_file.clone(),
                second: entity.source_file,
            });
        }
        self.by_name.insert(entity.name.clone(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EntityMetadata> {
        self.by_name.get(name).map(|&idx| &self.entities[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityMetadata> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities declaring at least one relationship
    pub fn entities_with_relationships(&self) -> impl Iterator<Item = &EntityMetadata> {
        self.entities.iter().filter(|e| e.has_relationships())
    }

    /// Entities using `table`, in scan order
    pub fn find_by_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a EntityMetadata> {
        self.entities.iter().filter(move |e| e.table_name == table)
    }

    /// Attach each relationship's target table name. Targets missing from the
    /// registry stay unresolved.
    pub fn resolve_relationship_targets(&mut self) {
        let tables: HashMap<String, String> = self
            .entities
            .iter()
            .map(|e| (e.name.clone(), e.table_name.clone()))
            .collect();

        for entity in &mut self.entities {
            for rel in &mut entity.relationships {
                rel.target_table = tables.get(rel.descriptor.target()).cloned();
            }
        }
    }
}

//! Cached tag parsing for one generation run

use std::collections::HashMap;

use super::{AttributeSet, RelationshipDescriptor, TagParseError};

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Tag parser owning a read-through cache keyed by raw tag text.
///
/// One instance lives for one run; identical tags on different fields parse once.
/// Failed relationship parses are not cached.
#[derive(Debug, Default)]
pub struct TagParser {
    attributes: HashMap<String, AttributeSet>,
    relationships: HashMap<String, RelationshipDescriptor>,
    stats: CacheStats,
}

impl TagParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_attributes(&mut self, raw: &str) -> AttributeSet {
        if let Some(set) = self.attributes.get(raw) {
            self.stats.hits += 1;
            return set.clone();
        }
        self.stats.misses += 1;
        let set = AttributeSet::parse(raw);
        self.attributes.insert(raw.to_string(), set.clone());
        set
    }

    pub fn parse_relationship(
        &mut self,
        raw: &str,
    ) -> Result<RelationshipDescriptor, TagParseError> {
        if let Some(descriptor) = self.relationships.get(raw) {
            self.stats.hits += 1;
            return Ok(descriptor.clone());
        }
        self.stats.misses += 1;
        let descriptor = RelationshipDescriptor::parse(raw)?;
        self.relationships
            .insert(raw.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of distinct tags held in the cache.
    pub fn cached_len(&self) -> usize {
        self.attributes.len() + self.relationships.len()
    }
}

//! Entity model registry.
//!
//! The resolver maps logical entity names to physical tables and logical
//! property names to physical columns. It is populated up front by the
//! host application and consulted read-only during generation; nothing in
//! the compiler mutates it.
//!
//! Relationship properties (entity-valued, the targets of JOIN clauses)
//! are registered alongside scalar columns so that property-path access
//! like `u.Orders.Total` can be rejected with a precise error instead of
//! an unknown-property one.

use crate::error::{Error, Result};
use hashbrown::HashMap;

#[derive(Debug, Clone)]
enum Property {
    Column(String),
    Relationship { target: String },
}

#[derive(Debug, Clone)]
struct Entity {
    table: String,
    properties: HashMap<String, Property>,
}

/// What a property name resolved to on a given entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'r> {
    /// Physical column name, ready for quoting.
    Column(&'r str),
    /// Relationship to another entity; never representable as a column.
    Relationship { target: &'r str },
}

#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    entities: HashMap<String, Entity>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or re-registers) an entity and its physical table.
    /// Re-registering keeps previously registered properties.
    pub fn register_entity(&mut self, entity: impl Into<String>, table: impl Into<String>) {
        let entity = entity.into();
        let table = table.into();
        self.entities
            .entry(entity)
            .and_modify(|e| e.table = table.clone())
            .or_insert_with(|| Entity {
                table,
                properties: HashMap::new(),
            });
    }

    /// Maps a property to a column. Registering against an entity that was
    /// never registered creates it with the entity name doubling as the
    /// table name, until a later
    /// [`register_entity`](Self::register_entity) supplies the real one.
    pub fn register_property(
        &mut self,
        entity: impl Into<String>,
        property: impl Into<String>,
        column: impl Into<String>,
    ) {
        let entity = entity.into();
        self.entities
            .entry(entity.clone())
            .or_insert_with(|| Entity {
                table: entity,
                properties: HashMap::new(),
            })
            .properties
            .insert(property.into(), Property::Column(column.into()));
    }

    pub fn register_relationship(
        &mut self,
        entity: impl Into<String>,
        property: impl Into<String>,
        target: impl Into<String>,
    ) {
        let entity = entity.into();
        self.entities
            .entry(entity.clone())
            .or_insert_with(|| Entity {
                table: entity,
                properties: HashMap::new(),
            })
            .properties
            .insert(
                property.into(),
                Property::Relationship {
                    target: target.into(),
                },
            );
    }

    pub fn is_registered(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Physical table for an entity. Lookup is exact (case-sensitive).
    pub fn resolve_table(&self, entity: &str) -> Result<&str> {
        self.entities
            .get(entity)
            .map(|e| e.table.as_str())
            .ok_or_else(|| Error::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    /// Resolves a property on an entity to a column or relationship.
    pub fn resolve_property(&self, entity: &str, property: &str) -> Result<Resolved<'_>> {
        let meta = self.entities.get(entity).ok_or_else(|| Error::UnknownEntity {
            entity: entity.to_string(),
        })?;
        match meta.properties.get(property) {
            Some(Property::Column(column)) => Ok(Resolved::Column(column)),
            Some(Property::Relationship { target }) => Ok(Resolved::Relationship { target }),
            None => Err(Error::UnknownProperty {
                entity: entity.to_string(),
                property: property.to_string(),
            }),
        }
    }

    /// Column for a scalar property; a relationship here is a construct
    /// the generator cannot express.
    pub fn resolve_column(&self, entity: &str, property: &str) -> Result<&str> {
        match self.resolve_property(entity, property)? {
            Resolved::Column(column) => Ok(column),
            Resolved::Relationship { target } => Err(Error::unsupported(format!(
                "property '{property}' on entity '{entity}' is a relationship to '{target}' \
                 and has no column mapping; join the target entity explicitly"
            ))),
        }
    }
}

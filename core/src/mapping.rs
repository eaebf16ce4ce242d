//! Mapping context: the set of entity types known to the mapper.
//!
//! # Architecture
//!
//! Same shape as a type registry: a [`MappingContextBuilder`] collects
//! [`PersistentEntity`] descriptions keyed by `TypeId`, then
//! [`build()`](MappingContextBuilder::build) freezes them into an immutable
//! [`MappingContext`]. No registration is possible after build, so a context can
//! be shared across threads behind an `Arc` and read concurrently.
//!
//! Registering an entity also registers every entity it references. A type is
//! described at most once, which is what makes self-referencing and mutually
//! referencing types terminate.
//!
//! # Example
//!
//! ```
//! use exemplar::{Entity, MappingContextBuilder, PersistentEntity, PersistentProperty};
//!
//! struct Node;
//! impl Entity for Node {
//!     fn persistent_entity() -> PersistentEntity {
//!         PersistentEntity::new("Node")
//!             .property(PersistentProperty::new("label"))
//!             .property(PersistentProperty::entity::<Node>("next"))
//!     }
//! }
//!
//! let context = MappingContextBuilder::new().entity::<Node>().build();
//! assert_eq!(context.len(), 1);
//! assert_eq!(context.entity::<Node>().map(|e| e.type_name()), Some("Node"));
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use crate::schema::{Entity, EntityRef, PersistentEntity};

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`MappingContext`].
#[derive(Debug, Default)]
pub struct MappingContextBuilder {
    entities: HashMap<TypeId, PersistentEntity>,
}

impl MappingContextBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` and, transitively, every entity type its properties hold.
    #[must_use]
    pub fn entity<E: Entity>(mut self) -> Self {
        self.register(EntityRef::of::<E>());
        self
    }

    /// Register a hand-built description under `E`'s type id.
    ///
    /// Replaces any description already registered for `E`. Nested entity types
    /// referenced by `entity` are registered as usual.
    #[must_use]
    pub fn entity_with<E: 'static>(mut self, entity: PersistentEntity) -> Self {
        let nested = nested_refs(&entity);
        self.entities.insert(TypeId::of::<E>(), entity);
        for entity_ref in nested {
            self.register(entity_ref);
        }
        self
    }

    fn register(&mut self, root: EntityRef) {
        let mut pending = vec![root];
        while let Some(entity_ref) = pending.pop() {
            if self.entities.contains_key(&entity_ref.type_id()) {
                continue;
            }
            let entity = entity_ref.describe();
            pending.extend(nested_refs(&entity));
            self.entities.insert(entity_ref.type_id(), entity);
        }
    }

    /// Freeze the context. No further registration is possible.
    #[must_use]
    pub fn build(self) -> MappingContext {
        MappingContext {
            entities: self.entities,
        }
    }
}

fn nested_refs(entity: &PersistentEntity) -> Vec<EntityRef> {
    entity
        .properties()
        .iter()
        .filter_map(|p| p.entity_type().copied())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// MappingContext
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable set of entity descriptions.
#[derive(Debug, Default)]
pub struct MappingContext {
    entities: HashMap<TypeId, PersistentEntity>,
}

impl MappingContext {
    /// The description registered for `T`, if any.
    #[must_use]
    pub fn entity<T: 'static>(&self) -> Option<&PersistentEntity> {
        self.entity_by_id(TypeId::of::<T>())
    }

    /// The description registered under `type_id`, if any.
    #[must_use]
    pub fn entity_by_id(&self, type_id: TypeId) -> Option<&PersistentEntity> {
        self.entities.get(&type_id)
    }

    /// Returns `true` if `T` is registered.
    #[must_use]
    pub fn has_entity<T: 'static>(&self) -> bool {
        self.entities.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered entity types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entities
            .values()
            .map(PersistentEntity::type_name)
            .collect();
        names.sort_unstable();
        names
    }
}

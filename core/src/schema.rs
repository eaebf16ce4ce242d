//! Entity metadata: what properties a type declares and how they serialize.
//!
//! A [`PersistentEntity`] lists a type's properties in declaration order. Each
//! [`PersistentProperty`] pairs the in-memory property name (the *logical* name
//! used by matcher paths) with the field name the converter writes. Properties
//! whose type is itself an [`Entity`] carry a reference to that nested schema.
//!
//! Types describe themselves once by implementing [`Entity`]:
//!
//! ```
//! use exemplar::{Entity, PersistentEntity, PersistentProperty};
//!
//! struct Address;
//! impl Entity for Address {
//!     fn persistent_entity() -> PersistentEntity {
//!         PersistentEntity::new("Address")
//!             .property(PersistentProperty::new("city"))
//!             .property(PersistentProperty::new("street").with_field_name("street_name"))
//!     }
//! }
//!
//! struct Person;
//! impl Entity for Person {
//!     fn persistent_entity() -> PersistentEntity {
//!         PersistentEntity::new("Person")
//!             .property(PersistentProperty::new("id").with_field_name("_id").id())
//!             .property(PersistentProperty::entity::<Address>("address"))
//!     }
//! }
//!
//! let person = Person::persistent_entity();
//! assert_eq!(person.id_property().map(|p| p.field_name()), Some("_id"));
//! assert!(person.property_by_name("address").is_some_and(|p| p.is_entity()));
//! ```

use crate::document::Document;
use serde_json::Value;
use std::any::TypeId;
use std::fmt;

/// A record type that can describe its own persistent layout.
///
/// Implemented once per type that appears in a probe, either by hand or by
/// generated code.
pub trait Entity: 'static {
    /// Build the type's metadata.
    fn persistent_entity() -> PersistentEntity;
}

/// Reference from a property to the nested entity type it holds.
#[derive(Clone, Copy)]
pub struct EntityRef {
    type_id: TypeId,
    describe: fn() -> PersistentEntity,
}

impl EntityRef {
    /// Reference to the entity type `E`.
    #[must_use]
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            describe: E::persistent_entity,
        }
    }

    /// The referenced type's id.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Build the referenced type's metadata.
    #[must_use]
    pub fn describe(&self) -> PersistentEntity {
        (self.describe)()
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// A declared property of an entity.
#[derive(Debug, Clone)]
pub struct PersistentProperty {
    name: String,
    field_name: String,
    entity: Option<EntityRef>,
    is_id: bool,
}

impl PersistentProperty {
    /// A scalar property whose field name equals its logical name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            field_name: name.clone(),
            name,
            entity: None,
            is_id: false,
        }
    }

    /// A property holding the nested entity type `E`.
    pub fn entity<E: Entity>(name: impl Into<String>) -> Self {
        Self {
            entity: Some(EntityRef::of::<E>()),
            ..Self::new(name)
        }
    }

    /// Override the serialized field name.
    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    /// Mark this property as the entity's identifier.
    #[must_use]
    pub fn id(mut self) -> Self {
        self.is_id = true;
        self
    }

    /// Logical (in-memory) property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serialized field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns `true` if the property holds a nested entity.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        self.entity.is_some()
    }

    /// The nested entity type, if any.
    #[must_use]
    pub fn entity_type(&self) -> Option<&EntityRef> {
        self.entity.as_ref()
    }

    /// Returns `true` if this is the identifier property.
    #[must_use]
    pub fn is_id(&self) -> bool {
        self.is_id
    }
}

/// Metadata for one entity type.
#[derive(Debug, Clone)]
pub struct PersistentEntity {
    type_name: String,
    properties: Vec<PersistentProperty>,
}

impl PersistentEntity {
    /// An entity with no properties yet.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Vec::new(),
        }
    }

    /// Declare the next property. Declaration order is preserved.
    #[must_use]
    pub fn property(mut self, property: PersistentProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Name of the described type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Look up a property by its logical name.
    ///
    /// Field names are not consulted; see
    /// [`resolve_property_path`](crate::resolve_property_path) for the fallback.
    #[must_use]
    pub fn property_by_name(&self, name: &str) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// All declared properties, in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PersistentProperty] {
        &self.properties
    }

    /// The identifier property, if one was declared.
    #[must_use]
    pub fn id_property(&self) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.is_id)
    }

    /// Returns `true` if an identifier property was declared.
    #[must_use]
    pub fn has_id_property(&self) -> bool {
        self.id_property().is_some()
    }

    /// Read the identifier value from a converted probe.
    ///
    /// Returns `None` when there is no identifier property, or its field is
    /// absent or null.
    #[must_use]
    pub fn identifier<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        let id = self.id_property()?;
        document.get(id.field_name()).filter(|v| !v.is_null())
    }
}

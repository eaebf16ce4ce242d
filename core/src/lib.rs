//! exemplar - query-by-example for document stores
//!
//! Compiles a partially populated *probe* value plus matching rules into a
//! filter document that a document store (MongoDB and friends) can execute.
//!
//! # Architecture
//!
//! - [`Entity`] / [`PersistentEntity`]: per-type metadata (property names,
//!   serialized field names, nested entity types, identifier)
//! - [`MappingContext`]: immutable registry of entity metadata
//! - [`DocumentConverter`]: probe → raw [`Document`] (serde by default)
//! - [`Example`] / [`ExampleMatcher`] / [`PropertySpecifier`]: what to match and how
//! - [`resolve_property_path`]: serialized field paths → logical property paths
//! - [`ExampleMapper`]: the compiler tying it together
//!
//! # Key Invariants
//!
//! 1. **Specifier paths are logical.** The document is keyed by field names;
//!    path resolution bridges the two. A specifier under the raw field path
//!    still wins and skips resolution.
//!
//! 2. **No null `_id`.** An unset identifier is removed, never matched as null.
//!
//! 3. **`IgnoreNull` output is flat.** No null values and no nested documents,
//!    only dotted keys and operator documents.
//!
//! # Example
//!
//! ```
//! use exemplar::prelude::*;
//! use serde::Serialize;
//! use serde_json::json;
//!
//! #[derive(Serialize)]
//! struct User {
//!     #[serde(rename = "_id")]
//!     id: Option<String>,
//!     #[serde(rename = "user_name")]
//!     username: String,
//! }
//!
//! impl Entity for User {
//!     fn persistent_entity() -> PersistentEntity {
//!         PersistentEntity::new("User")
//!             .property(PersistentProperty::new("id").with_field_name("_id").id())
//!             .property(PersistentProperty::new("username").with_field_name("user_name"))
//!     }
//! }
//!
//! let mapper = ExampleMapper::new(MappingContextBuilder::new().entity::<User>().build());
//! let example = Example::new(
//!     User { id: None, username: "Ada".into() },
//!     ExampleMatcher::new().with_ignore_case_for(["username"]),
//! );
//!
//! let filter = mapper.mapped_example(&example).unwrap();
//! assert_eq!(
//!     serde_json::Value::Object(filter),
//!     json!({ "user_name": { "$regex": "Ada", "$options": "i" } })
//! );
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod config;
mod converter;
mod document;
mod example;
mod mapper;
mod mapping;
mod path;
mod schema;
mod string_match;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use config::{
    register_core_transformers, ExampleMatcherConfig, PropertySpecifierConfig,
    TransformerRegistry, TransformerRegistryBuilder,
};
pub use converter::{ConversionError, DocumentConverter, JsonConverter};
pub use document::{
    flatten, is_operator, join_path, Document, ID_FIELD, OPTIONS_OPERATOR, REGEX_OPERATOR,
};
pub use example::{
    BoxError, Example, ExampleMatcher, NullHandling, PropertySpecifier, PropertyValueTransformer,
};
pub use mapper::ExampleMapper;
pub use mapping::{MappingContext, MappingContextBuilder};
pub use path::resolve_property_path;
pub use schema::{Entity, EntityRef, PersistentEntity, PersistentProperty};
pub use string_match::{quote, to_regular_expression, StringMatcher};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use exemplar::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Metadata
        Entity,
        // Configuration
        Example,
        // Mapping
        ExampleMapper,
        ExampleMatcher,
        MappingContext,
        MappingContextBuilder,
        // Errors
        MappingError,
        NullHandling,
        PersistentEntity,
        PersistentProperty,
        PropertySpecifier,
        StringMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of a converted probe.
///
/// Deeper documents are rejected with [`MappingError::DepthExceeded`] instead of
/// recursing without bound.
pub const MAX_DEPTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from mapping an example or loading matcher configuration.
///
/// Every mapping error is fatal to the call that raised it; no partial filter is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A path segment matches no property of the entity it was resolved against.
    #[error("no property of {root_type} matches segment \"{segment}\" of path \"{path}\"")]
    PathResolution {
        /// The full dotted field path being resolved.
        path: String,
        /// The segment that failed.
        segment: String,
        /// Name of the root entity type.
        root_type: String,
    },

    /// The probe could not be converted into a document.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A property specifier's transformer failed.
    #[error("transformer for \"{path}\" failed: {source}")]
    Transform {
        /// Path the specifier is registered under.
        path: String,
        /// The transformer's error.
        #[source]
        source: BoxError,
    },

    /// The probe's type has no registered entity metadata.
    #[error("no entity registered for type {type_name}{}", registered_suffix(.available))]
    UnknownEntity {
        /// Rust type name of the probe.
        type_name: String,
        /// Entity type names that ARE registered.
        available: Vec<String>,
    },

    /// The converted probe nests deeper than [`MAX_DEPTH`].
    #[error("document nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// Matcher configuration could not be deserialized.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },

    /// Configuration names a transformer that is not registered.
    #[error("unknown transformer \"{name}\"{}", registered_suffix(.available))]
    UnknownTransformer {
        /// The unregistered name.
        name: String,
        /// Transformer names that ARE registered.
        available: Vec<String>,
    },
}

fn registered_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " — none are registered".to_owned()
    } else {
        format!(" — registered: {}", available.join(", "))
    }
}

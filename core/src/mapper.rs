//! `ExampleMapper`: compiles an [`Example`] into a filter [`Document`]
//!
//! # Pipeline
//!
//! 1. Convert the probe with the [`DocumentConverter`].
//! 2. Remove the identifier field if the probe's identifier is unset.
//! 3. Walk the document depth-first. At every field, find the
//!    [`PropertySpecifier`](crate::PropertySpecifier) that applies and run its
//!    transformer; a null result removes the field. Then turn strings into
//!    `$regex` operator documents where the string matcher or case sensitivity
//!    calls for it. Nested documents are walked with the field's path as prefix.
//! 4. Under [`NullHandling::IgnoreNull`], flatten into dotted keys and drop nulls.
//!    Under [`NullHandling::IncludeNull`], return the nested document as is.
//!
//! # Specifier lookup
//!
//! A specifier registered under the field's raw dotted path wins outright. Only
//! when there is none is the path resolved to logical property names (see
//! [`resolve_property_path`]) and looked up again. Paths are not resolved at all
//! when the matcher has neither specifiers nor ignored paths.
//!
//! # Example
//!
//! ```
//! use exemplar::prelude::*;
//! use serde::Serialize;
//! use serde_json::json;
//!
//! #[derive(Serialize)]
//! struct Address { city: String }
//!
//! #[derive(Serialize)]
//! struct Person { name: String, address: Address }
//!
//! impl Entity for Address {
//!     fn persistent_entity() -> PersistentEntity {
//!         PersistentEntity::new("Address").property(PersistentProperty::new("city"))
//!     }
//! }
//!
//! impl Entity for Person {
//!     fn persistent_entity() -> PersistentEntity {
//!         PersistentEntity::new("Person")
//!             .property(PersistentProperty::new("name"))
//!             .property(PersistentProperty::entity::<Address>("address"))
//!     }
//! }
//!
//! let mapper = ExampleMapper::new(MappingContextBuilder::new().entity::<Person>().build());
//! let probe = Person { name: "Alice".into(), address: Address { city: "NYC".into() } };
//! let example = Example::new(
//!     probe,
//!     ExampleMatcher::new().with_matcher("address.city", StringMatcher::Starting),
//! );
//!
//! let filter = mapper.mapped_example(&example).unwrap();
//! assert_eq!(
//!     serde_json::Value::Object(filter),
//!     json!({ "name": "Alice", "address.city": { "$regex": "^NYC" } })
//! );
//! ```

use std::any::type_name;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::converter::{DocumentConverter, JsonConverter};
use crate::document::{flatten, join_path, Document, ID_FIELD, OPTIONS_OPERATOR, REGEX_OPERATOR};
use crate::example::{Example, ExampleMatcher, NullHandling};
use crate::mapping::MappingContext;
use crate::path::resolve_property_path;
use crate::schema::PersistentEntity;
use crate::string_match::{quote, to_regular_expression, StringMatcher};
use crate::{MappingError, MAX_DEPTH};

/// Maps examples into filter documents for one [`MappingContext`].
///
/// Holds no per-call state; one mapper can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct ExampleMapper<C = JsonConverter> {
    context: Arc<MappingContext>,
    converter: C,
}

impl ExampleMapper<JsonConverter> {
    /// A mapper using the serde-based [`JsonConverter`].
    pub fn new(context: impl Into<Arc<MappingContext>>) -> Self {
        Self::with_converter(context, JsonConverter)
    }
}

impl<C: DocumentConverter> ExampleMapper<C> {
    /// A mapper using a custom converter.
    pub fn with_converter(context: impl Into<Arc<MappingContext>>, converter: C) -> Self {
        Self {
            context: context.into(),
            converter,
        }
    }

    /// The entity metadata this mapper resolves against.
    #[must_use]
    pub fn context(&self) -> &MappingContext {
        &self.context
    }

    /// Map `example`, taking entity metadata from the probe's type.
    ///
    /// # Errors
    ///
    /// - [`MappingError::UnknownEntity`]: `T` is not registered in the context
    /// - everything [`mapped_example_for`](Self::mapped_example_for) returns
    pub fn mapped_example<T: Serialize + 'static>(
        &self,
        example: &Example<T>,
    ) -> Result<Document, MappingError> {
        let entity = self
            .context
            .entity::<T>()
            .ok_or_else(|| MappingError::UnknownEntity {
                type_name: type_name::<T>().to_owned(),
                available: self
                    .context
                    .type_names()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            })?;
        self.mapped_example_for(example, entity)
    }

    /// Map `example` against explicitly supplied entity metadata.
    ///
    /// # Errors
    ///
    /// - [`MappingError::Conversion`]: the probe could not be converted
    /// - [`MappingError::PathResolution`]: a field path does not resolve against `entity`
    /// - [`MappingError::Transform`]: a specifier's transformer failed
    /// - [`MappingError::DepthExceeded`]: nesting deeper than [`MAX_DEPTH`]
    #[tracing::instrument(level = "debug", skip_all, fields(entity = entity.type_name()))]
    pub fn mapped_example_for<T: Serialize>(
        &self,
        example: &Example<T>,
        entity: &PersistentEntity,
    ) -> Result<Document, MappingError> {
        let mut reference = self.converter.to_document(example.probe())?;

        if let Some(id) = entity.id_property() {
            if entity.identifier(&reference).is_none() {
                let id_field = id.field_name();
                tracing::trace!(field = id_field, "identifier unset, removing");
                reference = reference
                    .into_iter()
                    .filter(|(key, _)| key != id_field)
                    .collect();
            }
        }

        let builder = FilterBuilder {
            context: &self.context,
            entity,
            matcher: example.matcher(),
        };
        let mapped = builder.apply_property_specs("", reference, 1)?;

        let result = match example.matcher().null_handling() {
            NullHandling::IncludeNull => mapped,
            NullHandling::IgnoreNull => flatten(mapped, true),
        };
        tracing::debug!(fields = result.len(), "mapped example");
        Ok(result)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Filter builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable state threaded through one mapping call.
struct FilterBuilder<'a> {
    context: &'a MappingContext,
    entity: &'a PersistentEntity,
    matcher: &'a ExampleMatcher,
}

impl FilterBuilder<'_> {
    fn apply_property_specs(
        &self,
        path: &str,
        source: Document,
        depth: usize,
    ) -> Result<Document, MappingError> {
        if depth > MAX_DEPTH {
            return Err(MappingError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }

        let mut target = Document::new();

        for (key, value) in source {
            if key == ID_FIELD && value.is_null() {
                continue;
            }

            let property_path = join_path(path, &key);
            if self.matcher.is_ignored_path(&property_path) {
                tracing::trace!(path = %property_path, "ignored path");
                continue;
            }

            let mapped_path = self.mapped_path(&property_path)?;
            if let Some(mapped) = mapped_path.as_deref() {
                if mapped != property_path && self.matcher.is_ignored_path(mapped) {
                    tracing::trace!(path = %property_path, mapped, "ignored path");
                    continue;
                }
            }

            let mut string_matcher = self.matcher.default_string_matcher();
            let mut ignore_case = self.matcher.is_ignore_case_enabled();
            let mut value = value;

            let specifier = mapped_path
                .as_deref()
                .and_then(|mapped| self.matcher.property_specifier(mapped));
            if let Some(specifier) = specifier {
                if let Some(m) = specifier.string_matcher() {
                    string_matcher = m;
                }
                if let Some(ic) = specifier.ignore_case() {
                    ignore_case = ic;
                }

                match specifier.transform_value(value) {
                    Ok(Some(transformed)) => value = transformed,
                    Ok(None) => {
                        tracing::trace!(path = %property_path, "transformer removed field");
                        continue;
                    }
                    Err(source) => {
                        return Err(MappingError::Transform {
                            path: specifier.path().to_owned(),
                            source,
                        })
                    }
                }
            }

            let value = match value {
                Value::String(s) => apply_string_matcher(s, string_matcher, ignore_case),
                Value::Object(nested) => {
                    Value::Object(self.apply_property_specs(&property_path, nested, depth + 1)?)
                }
                other => other,
            };
            target.insert(key, value);
        }

        Ok(target)
    }

    /// The path to look specifiers and ignored paths up under.
    ///
    /// A specifier registered under the raw field path short-circuits resolution.
    /// `None` when the matcher has nothing to look up.
    fn mapped_path(&self, property_path: &str) -> Result<Option<String>, MappingError> {
        if !self.matcher.has_property_specifiers() && !self.matcher.has_ignored_paths() {
            return Ok(None);
        }

        if self.matcher.has_property_specifier(property_path) {
            return Ok(Some(property_path.to_owned()));
        }

        resolve_property_path(self.context, self.entity, property_path).map(Some)
    }
}

/// Replace a string with a `$regex` operator document when matching needs one.
fn apply_string_matcher(value: String, string_matcher: StringMatcher, ignore_case: bool) -> Value {
    let pattern = match string_matcher {
        StringMatcher::Default if !ignore_case => return Value::String(value),
        StringMatcher::Default => quote(&value),
        other => to_regular_expression(&value, other),
    };

    let mut operator = Document::new();
    operator.insert(REGEX_OPERATOR.to_owned(), Value::String(pattern));
    if ignore_case {
        operator.insert(OPTIONS_OPERATOR.to_owned(), Value::String("i".to_owned()));
    }
    Value::Object(operator)
}

//! Config types for building an [`ExampleMatcher`] from JSON or YAML.
//!
//! Transformers are code, so config refers to them by name. A
//! [`TransformerRegistry`] maps names to functions and turns an
//! [`ExampleMatcherConfig`] into a runtime [`ExampleMatcher`] via
//! [`load_matcher()`](TransformerRegistry::load_matcher).
//!
//! ```json
//! {
//!   "string_matcher": "containing",
//!   "ignore_case": true,
//!   "null_handling": "ignore_null",
//!   "ignored_paths": ["age"],
//!   "properties": {
//!     "address.city": { "string_matcher": "starting", "ignore_case": false },
//!     "nickname": { "transformer": "lowercase" }
//!   }
//! }
//! ```
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type |
//! |-------------|--------------|
//! | [`ExampleMatcherConfig`] | [`ExampleMatcher`] |
//! | [`PropertySpecifierConfig`] | [`PropertySpecifier`] |

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::example::{
    BoxError, ExampleMatcher, NullHandling, PropertySpecifier, PropertyValueTransformer,
};
use crate::string_match::StringMatcher;
use crate::MappingError;

/// Configuration for an [`ExampleMatcher`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleMatcherConfig {
    /// Default string matcher.
    #[serde(default)]
    pub string_matcher: StringMatcher,

    /// Default case sensitivity.
    #[serde(default)]
    pub ignore_case: bool,

    #[serde(default)]
    pub null_handling: NullHandling,

    /// Paths removed from the filter.
    #[serde(default)]
    pub ignored_paths: Vec<String>,

    /// Per-path overrides, keyed by dotted path.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpecifierConfig>,
}

/// Configuration for a [`PropertySpecifier`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpecifierConfig {
    #[serde(default)]
    pub string_matcher: Option<StringMatcher>,

    #[serde(default)]
    pub ignore_case: Option<bool>,

    /// Name of a transformer registered in the [`TransformerRegistry`].
    #[serde(default)]
    pub transformer: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`TransformerRegistry`].
#[derive(Default)]
pub struct TransformerRegistryBuilder {
    transformers: HashMap<String, PropertyValueTransformer>,
}

impl TransformerRegistryBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible transformer under `name`.
    #[must_use]
    pub fn transformer<F>(self, name: &str, transformer: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.fallible_transformer(name, move |value| Ok(transformer(value)))
    }

    /// Register a transformer that can fail.
    #[must_use]
    pub fn fallible_transformer<F>(mut self, name: &str, transformer: F) -> Self
    where
        F: Fn(Value) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        self.transformers
            .insert(name.to_owned(), Arc::new(transformer));
        self
    }

    /// Freeze the registry. No further registration is possible.
    #[must_use]
    pub fn build(self) -> TransformerRegistry {
        TransformerRegistry {
            transformers: self.transformers,
        }
    }
}

/// Register the built-in transformers.
///
/// - `lowercase`, `uppercase`, `trim` rewrite strings and pass other values through
/// - `drop` removes the field from the filter
#[must_use]
pub fn register_core_transformers(
    builder: TransformerRegistryBuilder,
) -> TransformerRegistryBuilder {
    builder
        .transformer("lowercase", |v| Some(map_str(v, str::to_lowercase)))
        .transformer("uppercase", |v| Some(map_str(v, str::to_uppercase)))
        .transformer("trim", |v| Some(map_str(v, |s| s.trim().to_owned())))
        .transformer("drop", |_| None)
}

fn map_str(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable set of named transformers.
pub struct TransformerRegistry {
    transformers: HashMap<String, PropertyValueTransformer>,
}

impl TransformerRegistry {
    /// A registry holding only the built-in transformers.
    #[must_use]
    pub fn core() -> Self {
        register_core_transformers(TransformerRegistryBuilder::new()).build()
    }

    /// Returns the number of registered transformers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// Returns `true` if no transformers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    /// Registered transformer names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an [`ExampleMatcher`] from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnknownTransformer`] if a property names a
    /// transformer that is not registered.
    pub fn load_matcher(
        &self,
        config: ExampleMatcherConfig,
    ) -> Result<ExampleMatcher, MappingError> {
        let mut matcher = ExampleMatcher::new()
            .with_string_matcher(config.string_matcher)
            .with_ignore_case(config.ignore_case)
            .with_null_handling(config.null_handling)
            .with_ignore_paths(config.ignored_paths);

        for (path, property) in config.properties {
            matcher = matcher.with_specifier(self.load_specifier(path, property)?);
        }

        Ok(matcher)
    }

    /// Parse JSON and build an [`ExampleMatcher`] from it.
    ///
    /// # Errors
    ///
    /// - [`MappingError::InvalidConfig`]: the JSON does not describe a matcher
    /// - [`MappingError::UnknownTransformer`]: see [`load_matcher`](Self::load_matcher)
    pub fn load_matcher_json(&self, json: &str) -> Result<ExampleMatcher, MappingError> {
        let config: ExampleMatcherConfig =
            serde_json::from_str(json).map_err(|e| MappingError::InvalidConfig {
                reason: e.to_string(),
            })?;
        self.load_matcher(config)
    }

    fn load_specifier(
        &self,
        path: String,
        config: PropertySpecifierConfig,
    ) -> Result<PropertySpecifier, MappingError> {
        let mut specifier = PropertySpecifier::new(path);
        if let Some(string_matcher) = config.string_matcher {
            specifier = specifier.with_string_matcher(string_matcher);
        }
        if let Some(ignore_case) = config.ignore_case {
            specifier = specifier.with_ignore_case(ignore_case);
        }
        if let Some(name) = config.transformer {
            let transformer =
                self.transformers
                    .get(&name)
                    .ok_or_else(|| MappingError::UnknownTransformer {
                        available: self.names().into_iter().map(str::to_owned).collect(),
                        name: name.clone(),
                    })?;
            specifier = specifier.with_shared_transformer(Arc::clone(transformer));
        }
        Ok(specifier)
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

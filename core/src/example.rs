//! `Example`: a probe plus the rules for matching it
//!
//! An [`Example`] pairs a partially populated probe with an [`ExampleMatcher`].
//! The matcher holds the global defaults (string matching mode, case
//! sensitivity, null handling) and per-path [`PropertySpecifier`] overrides.
//!
//! Paths are dotted and use *logical* property names (`address.street`), though
//! a specifier registered under a serialized field path (`address.street_name`)
//! is honoured too, and wins when both would apply.
//!
//! # Example
//!
//! ```
//! use exemplar::{ExampleMatcher, NullHandling, StringMatcher};
//!
//! let matcher = ExampleMatcher::new()
//!     .with_string_matcher(StringMatcher::Containing)
//!     .with_ignore_case_for(["lastname"])
//!     .with_matcher("address.city", StringMatcher::Starting)
//!     .with_transformer("nickname", |v| v.as_str().map(|s| s.to_lowercase().into()));
//!
//! assert_eq!(matcher.null_handling(), NullHandling::IgnoreNull);
//! assert!(matcher.has_property_specifier("address.city"));
//! assert_eq!(
//!     matcher.property_specifier("lastname").and_then(|s| s.ignore_case()),
//!     Some(true)
//! );
//! ```

use crate::string_match::StringMatcher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Error type transformers may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A value transformation applied before matching.
///
/// `Ok(None)` (or `Ok(Some(Value::Null))`) removes the field from the filter.
pub type PropertyValueTransformer =
    Arc<dyn Fn(Value) -> Result<Option<Value>, BoxError> + Send + Sync>;

/// What to do with null-valued probe properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Drop nulls and flatten the filter into dotted keys.
    #[default]
    IgnoreNull,
    /// Keep nulls (matching absent/null store fields) and nested documents.
    IncludeNull,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PropertySpecifier
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-path override of matching behaviour.
#[derive(Clone)]
pub struct PropertySpecifier {
    path: String,
    string_matcher: Option<StringMatcher>,
    ignore_case: Option<bool>,
    transformer: Option<PropertyValueTransformer>,
}

impl PropertySpecifier {
    /// A specifier for `path` that overrides nothing yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            string_matcher: None,
            ignore_case: None,
            transformer: None,
        }
    }

    /// Override the string matcher on this path.
    #[must_use]
    pub fn with_string_matcher(mut self, string_matcher: StringMatcher) -> Self {
        self.string_matcher = Some(string_matcher);
        self
    }

    /// Override case sensitivity on this path.
    #[must_use]
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = Some(ignore_case);
        self
    }

    /// Transform the value before matching. Returning `None` drops the field.
    #[must_use]
    pub fn with_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.transformer = Some(Arc::new(
            move |value: Value| -> Result<Option<Value>, BoxError> { Ok(transformer(value)) },
        ));
        self
    }

    /// Like [`with_transformer`](Self::with_transformer), for transformations
    /// that can fail. Failures abort the mapping call.
    #[must_use]
    pub fn with_fallible_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(Value) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    /// Install an already shared transformer.
    #[must_use]
    pub fn with_shared_transformer(mut self, transformer: PropertyValueTransformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// The dotted path this specifier applies to.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// String matcher override, if any.
    #[must_use]
    pub fn string_matcher(&self) -> Option<StringMatcher> {
        self.string_matcher
    }

    /// Case-sensitivity override, if any.
    #[must_use]
    pub fn ignore_case(&self) -> Option<bool> {
        self.ignore_case
    }

    /// Returns `true` if a transformer is set.
    #[must_use]
    pub fn has_transformer(&self) -> bool {
        self.transformer.is_some()
    }

    /// Apply the transformer. Without one, the value passes through.
    ///
    /// A null result is normalised to `None`, so a specified path never keeps
    /// a null value, even when no transformer is set.
    ///
    /// # Errors
    ///
    /// Returns whatever the transformer fails with.
    pub fn transform_value(&self, value: Value) -> Result<Option<Value>, BoxError> {
        let transformed = match &self.transformer {
            Some(transformer) => transformer(value)?,
            None => Some(value),
        };
        Ok(transformed.filter(|v| !v.is_null()))
    }
}

impl fmt::Debug for PropertySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpecifier")
            .field("path", &self.path)
            .field("string_matcher", &self.string_matcher)
            .field("ignore_case", &self.ignore_case)
            .field("transformer", &self.transformer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ExampleMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable matching configuration for an [`Example`].
///
/// Built by chaining `with_*` calls; each returns a new value.
#[derive(Debug, Clone, Default)]
pub struct ExampleMatcher {
    default_string_matcher: StringMatcher,
    ignore_case: bool,
    null_handling: NullHandling,
    specifiers: HashMap<String, PropertySpecifier>,
    ignored_paths: HashSet<String>,
}

impl ExampleMatcher {
    /// Exact, case-sensitive matching that ignores null values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default string matcher for properties without an override.
    #[must_use]
    pub fn with_string_matcher(mut self, string_matcher: StringMatcher) -> Self {
        self.default_string_matcher = string_matcher;
        self
    }

    /// Set the default case sensitivity.
    #[must_use]
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Ignore case on the given paths only.
    #[must_use]
    pub fn with_ignore_case_for<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.update_specifier(path.into(), |s| s.with_ignore_case(true));
        }
        self
    }

    /// Set how null-valued properties are treated.
    #[must_use]
    pub fn with_null_handling(mut self, null_handling: NullHandling) -> Self {
        self.null_handling = null_handling;
        self
    }

    /// Keep null values and nesting; shorthand for [`NullHandling::IncludeNull`].
    #[must_use]
    pub fn with_include_null_values(self) -> Self {
        self.with_null_handling(NullHandling::IncludeNull)
    }

    /// Drop null values and flatten; shorthand for [`NullHandling::IgnoreNull`].
    #[must_use]
    pub fn with_ignore_null_values(self) -> Self {
        self.with_null_handling(NullHandling::IgnoreNull)
    }

    /// Override the string matcher on one path, keeping its other settings.
    #[must_use]
    pub fn with_matcher(mut self, path: impl Into<String>, string_matcher: StringMatcher) -> Self {
        self.update_specifier(path.into(), |s| s.with_string_matcher(string_matcher));
        self
    }

    /// Attach a transformer to one path, keeping its other settings.
    #[must_use]
    pub fn with_transformer<F>(mut self, path: impl Into<String>, transformer: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.update_specifier(path.into(), |s| s.with_transformer(transformer));
        self
    }

    /// Register `specifier`, replacing any specifier already on its path.
    #[must_use]
    pub fn with_specifier(mut self, specifier: PropertySpecifier) -> Self {
        self.specifiers.insert(specifier.path.clone(), specifier);
        self
    }

    /// Exclude the given paths from the filter entirely.
    #[must_use]
    pub fn with_ignore_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    fn update_specifier(
        &mut self,
        path: String,
        update: impl FnOnce(PropertySpecifier) -> PropertySpecifier,
    ) {
        let current = self
            .specifiers
            .remove(&path)
            .unwrap_or_else(|| PropertySpecifier::new(path.clone()));
        self.specifiers.insert(path, update(current));
    }

    /// The string matcher used on paths without an override.
    #[must_use]
    pub fn default_string_matcher(&self) -> StringMatcher {
        self.default_string_matcher
    }

    /// Returns `true` if case is ignored on paths without an override.
    #[must_use]
    pub fn is_ignore_case_enabled(&self) -> bool {
        self.ignore_case
    }

    /// How null-valued properties are treated.
    #[must_use]
    pub fn null_handling(&self) -> NullHandling {
        self.null_handling
    }

    /// Returns `true` if any path has a specifier.
    #[must_use]
    pub fn has_property_specifiers(&self) -> bool {
        !self.specifiers.is_empty()
    }

    /// Returns `true` if `path` has a specifier.
    #[must_use]
    pub fn has_property_specifier(&self, path: &str) -> bool {
        self.specifiers.contains_key(path)
    }

    /// The specifier registered under `path`, if any.
    #[must_use]
    pub fn property_specifier(&self, path: &str) -> Option<&PropertySpecifier> {
        self.specifiers.get(path)
    }

    /// All specifiers, in no particular order.
    pub fn property_specifiers(&self) -> impl Iterator<Item = &PropertySpecifier> {
        self.specifiers.values()
    }

    /// Returns `true` if any path is ignored.
    #[must_use]
    pub fn has_ignored_paths(&self) -> bool {
        !self.ignored_paths.is_empty()
    }

    /// Returns `true` if `path` is excluded from the filter.
    #[must_use]
    pub fn is_ignored_path(&self, path: &str) -> bool {
        self.ignored_paths.contains(path)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Example
// ═══════════════════════════════════════════════════════════════════════════════

/// A probe and the matcher describing how to match it.
#[derive(Debug, Clone)]
pub struct Example<T> {
    probe: T,
    matcher: ExampleMatcher,
}

impl<T> Example<T> {
    /// An example using the default [`ExampleMatcher`].
    pub fn of(probe: T) -> Self {
        Self::new(probe, ExampleMatcher::default())
    }

    /// An example matched according to `matcher`.
    pub fn new(probe: T, matcher: ExampleMatcher) -> Self {
        Self { probe, matcher }
    }

    /// The probe whose populated fields are matched on.
    #[must_use]
    pub fn probe(&self) -> &T {
        &self.probe
    }

    /// The matching rules.
    #[must_use]
    pub fn matcher(&self) -> &ExampleMatcher {
        &self.matcher
    }
}

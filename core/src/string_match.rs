//! `StringMatcher`: how a string property of the probe is matched
//!
//! A probe's string value either stays a literal (exact equality in the store)
//! or becomes a pattern for the store's `$regex` operator. This module owns the
//! second half: turning a literal plus a [`StringMatcher`] mode into a pattern
//! string via [`to_regular_expression()`].
//!
//! Literal text is escaped with [`regex::escape`], which neutralises every
//! regex metacharacter. Escaped non-alphanumeric characters are literals in the
//! store's PCRE dialect as well.
//!
//! # Example
//!
//! ```
//! use exemplar::{to_regular_expression, StringMatcher};
//!
//! assert_eq!(to_regular_expression("NYC", StringMatcher::Starting), "^NYC");
//! assert_eq!(to_regular_expression("a.b", StringMatcher::Ending), r"a\.b$");
//! assert_eq!(to_regular_expression("^raw$", StringMatcher::Regex), "^raw$");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// String matching mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMatcher {
    /// Store default: literal equality. Case-insensitive matching falls back to
    /// an unanchored escaped pattern.
    #[default]
    Default,
    /// Whole-string equality, always expressed as an anchored pattern.
    Exact,
    /// Value starts with the probe's string.
    Starting,
    /// Value ends with the probe's string.
    Ending,
    /// Value contains the probe's string.
    Containing,
    /// The probe's string is itself a regular expression.
    Regex,
}

impl StringMatcher {
    /// Snake-case name, as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Exact => "exact",
            Self::Starting => "starting",
            Self::Ending => "ending",
            Self::Containing => "containing",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for StringMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escape `source` so it matches itself literally.
#[must_use]
pub fn quote(source: &str) -> String {
    regex::escape(source)
}

/// Build the pattern expressing `source` under `matcher`.
///
/// `Regex` passes `source` through untouched; every other mode escapes it first.
#[must_use]
pub fn to_regular_expression(source: &str, matcher: StringMatcher) -> String {
    match matcher {
        StringMatcher::Regex => source.to_owned(),
        StringMatcher::Default | StringMatcher::Exact => format!("^{}$", quote(source)),
        StringMatcher::Starting => format!("^{}", quote(source)),
        StringMatcher::Ending => format!("{}$", quote(source)),
        StringMatcher::Containing => format!(".*{}.*", quote(source)),
    }
}

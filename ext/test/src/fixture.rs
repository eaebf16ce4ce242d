//! Conformance fixture runner
//!
//! Loads YAML fixtures and maps each case's probe with the case's matcher
//! configuration. A case expects either a filter document or an error kind.
//!
//! ```yaml
//! name: starting_matcher
//! description: STARTING anchors the pattern at the start
//! cases:
//!   - name: city_prefix
//!     probe: { first_name: Alice, addr: { city: NYC } }
//!     matcher:
//!       properties:
//!         address.city: { string_matcher: starting }
//!     expect: { first_name: Alice, addr.city: { "$regex": "^NYC" } }
//! ```

use exemplar::{Example, MappingError, TransformerRegistry};
use serde::Deserialize;
use serde_json::Value;

use crate::{mapper, Person};

/// A complete test fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    pub probe: Person,
    #[serde(default)]
    pub matcher: exemplar::ExampleMatcherConfig,
    /// Expected filter document.
    #[serde(default)]
    pub expect: Option<Value>,
    /// Expected error kind, see [`error_kind`].
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// Short, stable name for a mapping error variant.
#[must_use]
pub fn error_kind(error: &MappingError) -> &'static str {
    match error {
        MappingError::PathResolution { .. } => "path_resolution",
        MappingError::Conversion(_) => "conversion",
        MappingError::Transform { .. } => "transform",
        MappingError::UnknownEntity { .. } => "unknown_entity",
        MappingError::DepthExceeded { .. } => "depth_exceeded",
        MappingError::InvalidConfig { .. } => "invalid_config",
        MappingError::UnknownTransformer { .. } => "unknown_transformer",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// What a case produced: a filter or an error kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Filter(Value),
    Error(String),
}

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Option<Outcome>,
    pub actual: Outcome,
}

impl TestCase {
    /// What the fixture says this case should produce.
    pub fn expected(&self) -> Option<Outcome> {
        match (&self.expect, &self.expect_error) {
            (Some(filter), None) => Some(Outcome::Filter(filter.clone())),
            (None, Some(kind)) => Some(Outcome::Error(kind.clone())),
            _ => None,
        }
    }

    /// Map this case's probe. Matcher config goes through `registry`.
    pub fn run(&self, registry: &TransformerRegistry) -> Outcome {
        let result = registry
            .load_matcher(self.matcher.clone())
            .and_then(|matcher| {
                mapper().mapped_example(&Example::new(self.probe.clone(), matcher))
            });

        match result {
            Ok(filter) => Outcome::Filter(Value::Object(filter)),
            Err(e) => Outcome::Error(error_kind(&e).to_owned()),
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases against the built-in transformers.
    pub fn run(&self) -> Vec<CaseResult> {
        let registry = TransformerRegistry::core();
        self.cases
            .iter()
            .map(|case| {
                let expected = case.expected();
                let actual = case.run(&registry);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: expected.as_ref() == Some(&actual),
                    expected,
                    actual,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_runs_inline_fixture() {
        let yaml = r#"
name: inline
cases:
  - name: literal
    probe: { first_name: Alice }
    expect: { first_name: Alice }
  - name: unused_specifier
    probe: { first_name: Alice }
    matcher:
      properties:
        nickname: { ignore_case: true }
    expect: { first_name: Alice }
"#;
        let fixture = Fixture::from_yaml(yaml).unwrap();
        let results = fixture.run();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn case_without_expectation_fails() {
        let yaml = "name: x\ncases:\n  - name: none\n    probe: {}\n";
        let fixture = Fixture::from_yaml(yaml).unwrap();
        assert!(!fixture.run()[0].passed);
    }

    #[test]
    fn unknown_transformer_is_an_error_outcome() {
        let yaml = r#"
name: x
cases:
  - name: unknown
    probe: { first_name: Alice }
    matcher:
      properties:
        firstname: { transformer: reverse }
    expect_error: unknown_transformer
"#;
        Fixture::from_yaml(yaml).unwrap().run_and_assert();
    }
}

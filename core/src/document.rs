//! `Document`: the filter document being built
//!
//! A document is a `serde_json` object map. The workspace enables serde_json's
//! `preserve_order` feature, so entries iterate in insertion order: the order the
//! converter wrote them in.
//!
//! # Flattening
//!
//! [`flatten`] collapses nested documents into dotted top-level keys. Operator
//! entries (keys starting with `$`) are not paths: they are gathered into one
//! operator document stored at the path of the document that held them.
//!
//! ```
//! use exemplar::{flatten, Document};
//! use serde_json::json;
//!
//! let nested: Document = serde_json::from_value(json!({
//!     "name": "Alice",
//!     "address": { "city": { "$regex": "^NYC" }, "zip": null }
//! })).unwrap();
//!
//! let flat = flatten(nested, true);
//! assert_eq!(
//!     serde_json::Value::Object(flat),
//!     json!({ "name": "Alice", "address.city": { "$regex": "^NYC" } })
//! );
//! ```

use serde_json::{Map, Value};

/// A filter document: field name → scalar, nested document, or operator document.
pub type Document = Map<String, Value>;

/// Field name of the store's primary key.
pub const ID_FIELD: &str = "_id";

/// Key of the regular-expression operator.
pub const REGEX_OPERATOR: &str = "$regex";

/// Key of the regular-expression options operator.
pub const OPTIONS_OPERATOR: &str = "$options";

/// Returns `true` if `key` names a query operator rather than a field.
#[must_use]
pub fn is_operator(key: &str) -> bool {
    key.starts_with('$')
}

/// Joins a dotted path prefix and a field name. An empty prefix yields the name.
#[must_use]
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Collapse nested documents into dotted keys.
///
/// When `drop_nulls` is set, null leaves are omitted. Nested documents without
/// any leaves disappear entirely.
#[must_use]
pub fn flatten(document: Document, drop_nulls: bool) -> Document {
    let mut target = Document::new();
    flatten_into("", document, drop_nulls, &mut target);
    target
}

fn flatten_into(path: &str, document: Document, drop_nulls: bool, target: &mut Document) {
    for (key, value) in document {
        if is_operator(&key) {
            match target.get_mut(path) {
                Some(Value::Object(operators)) => {
                    operators.insert(key, value);
                }
                _ => {
                    let mut operators = Document::new();
                    operators.insert(key, value);
                    target.insert(path.to_owned(), Value::Object(operators));
                }
            }
            continue;
        }

        let field_path = join_path(path, &key);
        match value {
            Value::Object(nested) => flatten_into(&field_path, nested, drop_nulls, target),
            Value::Null if drop_nulls => {}
            leaf => {
                target.insert(field_path, leaf);
            }
        }
    }
}

//! Path resolution: serialized field paths → logical property paths.
//!
//! The converted document is keyed by field names, but specifiers are
//! registered under property names. [`resolve_property_path`] walks the entity
//! metadata segment by segment to translate one into the other:
//!
//! 1. look the segment up as a logical property name;
//! 2. failing that, scan the declared properties for one whose field name equals
//!    the segment (first declared wins);
//! 3. failing that, the path does not resolve.
//!
//! Resolution descends into nested entity types and stops at the first property
//! that is not one. Trailing segments belong to that property's value and are
//! not translated.

use crate::mapping::MappingContext;
use crate::schema::{PersistentEntity, PersistentProperty};
use crate::MappingError;

/// Translate a dotted field path into a dotted property path.
///
/// # Errors
///
/// Returns [`MappingError::PathResolution`] if a segment matches neither a
/// property name nor a field name of the entity it is resolved against.
pub fn resolve_property_path(
    context: &MappingContext,
    root: &PersistentEntity,
    path: &str,
) -> Result<String, MappingError> {
    let mut entity = root;
    let mut resolved: Vec<&str> = Vec::new();

    for segment in path.split('.') {
        let property = property_by_name(entity, segment)
            .or_else(|| property_by_field_name(entity, segment))
            .ok_or_else(|| MappingError::PathResolution {
                path: path.to_owned(),
                segment: segment.to_owned(),
                root_type: root.type_name().to_owned(),
            })?;

        resolved.push(property.name());

        match property
            .entity_type()
            .and_then(|nested| context.entity_by_id(nested.type_id()))
        {
            Some(nested) => entity = nested,
            None => break,
        }
    }

    let logical = resolved.join(".");
    tracing::trace!(path, logical = %logical, root = root.type_name(), "resolved property path");
    Ok(logical)
}

/// Direct lookup by logical name.
fn property_by_name<'a>(
    entity: &'a PersistentEntity,
    segment: &str,
) -> Option<&'a PersistentProperty> {
    entity.property_by_name(segment)
}

/// Fallback: first declared property whose field name is `segment`.
fn property_by_field_name<'a>(
    entity: &'a PersistentEntity,
    segment: &str,
) -> Option<&'a PersistentProperty> {
    entity
        .properties()
        .iter()
        .find(|property| property.field_name() == segment)
}

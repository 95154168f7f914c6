//! Identifier and filter field resolution

use super::types::{Describe, Field, FieldTag, FieldValue, Fields, Identifier};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Embedded records already walked, keyed by address and type so a record
/// and its first field (which share an address) stay distinct.
type Visited = HashSet<(usize, &'static str)>;

fn record_key(value: &dyn Describe) -> (usize, &'static str) {
    let addr = std::ptr::from_ref(value).cast::<()>() as usize;
    (addr, value.type_name())
}

/// Walk every field of `fields`, descending into embedded records once each.
///
/// `visit` receives the dotted path of the field and the field itself.
/// Embedded fields carrying a tag are reported to `visit` instead of being
/// descended into.
fn walk<'a>(
    fields: Fields<'a>,
    prefix: &str,
    visited: &mut Visited,
    visit: &mut dyn FnMut(String, Field<'a>),
) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };

        match (field.tag, field.value) {
            (None, FieldValue::Embedded(Some(inner))) => {
                if visited.insert(record_key(inner)) {
                    walk(inner.fields(), &path, visited, visit);
                }
            }
            (None, FieldValue::Embedded(None)) => {}
            _ => visit(path, field),
        }
    }
}

/// Resolve the identifier of `value`.
///
/// With `single_object` set, an empty identifier is an error as well: the
/// caller is about to address one concrete resource with it.
pub fn resolve_identifier(value: &dyn Describe, single_object: bool) -> Result<Identifier> {
    let type_name = value.type_name();
    let fields = value.fields();
    if fields.is_opaque() {
        return Err(Error::type_not_supported(type_name));
    }

    let mut visited = Visited::new();
    visited.insert(record_key(value));

    let mut found: Vec<(String, FieldValue<'_>)> = Vec::new();
    walk(fields, "", &mut visited, &mut |path, field| {
        if field.tag == Some(FieldTag::Identifier) {
            found.push((path, field.value));
        }
    });

    let (path, field_value) = match found.len() {
        0 => {
            return Err(Error::ObjectWithoutIdentifier {
                type_name: type_name.to_string(),
            })
        }
        1 => found.remove(0),
        _ => {
            return Err(Error::ObjectWithMultipleIdentifier {
                type_name: type_name.to_string(),
                fields: found.into_iter().map(|(path, _)| path).collect(),
            })
        }
    };

    let identifier = match field_value {
        FieldValue::Text(text) => Identifier::Text(text.to_string()),
        FieldValue::Uuid(uuid) => Identifier::Uuid(*uuid),
        other => {
            return Err(Error::ObjectIdentifierTypeNotSupported {
                field: path,
                field_type: other.type_name(),
            })
        }
    };

    if single_object && identifier.is_empty() {
        return Err(Error::UnidentifiedObject {
            type_name: type_name.to_string(),
        });
    }

    Ok(identifier)
}

/// Query pairs for every populated field tagged [`FieldTag::Filterable`].
///
/// Opaque values have no filters. Filterable fields of types other than
/// text and UUID are skipped.
pub fn filter_query(value: &dyn Describe) -> Vec<(String, String)> {
    let fields = value.fields();
    let mut visited = Visited::new();
    visited.insert(record_key(value));

    let mut pairs = Vec::new();
    walk(fields, "", &mut visited, &mut |_, field| {
        if field.tag != Some(FieldTag::Filterable) {
            return;
        }
        match field.value {
            FieldValue::Text(text) if !text.is_empty() => {
                pairs.push((field.name.to_string(), text.to_string()));
            }
            FieldValue::Uuid(uuid) if !uuid.is_nil() => {
                pairs.push((field.name.to_string(), uuid.to_string()));
            }
            _ => {}
        }
    });
    pairs
}

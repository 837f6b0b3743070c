//! Generic schema extractor.
//!
//! One routine driven by [`SchemaDescriptor`]s replaces per-kind handlers:
//! select the payload under the root key, merge top-level keys into it,
//! resolve enums, expand repeated fields element by element, then populate
//! the typed record by field name.

use serde_json::{Map, Value};
use val_api::error::DecodeError;
use val_api::record::TypedRecord;

use crate::resolver::resolve;
use crate::schema::SchemaDescriptor;

/// Successful extraction. `element_errors` lists repeated-field elements that
/// were skipped, in sequence order; the record is produced regardless.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: TypedRecord,
    pub element_errors: Vec<DecodeError>,
}

/// Extract a typed record from a parsed tree.
pub fn extract(tree: &Value, desc: &SchemaDescriptor) -> Result<Extraction, DecodeError> {
    let mut element_errors = Vec::new();
    let shaped = shape(tree, desc, &mut element_errors)?;
    let record = desc
        .kind
        .populate(shaped)
        .map_err(|e| e.with_context(desc.name))?;
    Ok(Extraction { record, element_errors })
}

/// Rewrite `tree` into the exact field layout of `desc.kind`.
fn shape(
    tree: &Value,
    desc: &SchemaDescriptor,
    element_errors: &mut Vec<DecodeError>,
) -> Result<Value, DecodeError> {
    let top = as_object(tree, desc.name)?;

    let mut payload = match desc.root {
        Some(root) => match top.get(root.key) {
            Some(nested) => as_object(nested, root.key)?.clone(),
            None if root.required => return Err(DecodeError::missing_root(root.key)),
            None => top.clone(),
        },
        None => top.clone(),
    };

    for key in desc.merge_keys {
        if let Some(v) = top.get(*key) {
            payload.insert((*key).to_string(), v.clone());
        }
    }

    for (field, table) in desc.enum_fields {
        let value = resolve(table, payload.get(*field));
        payload.insert((*field).to_string(), Value::from(value));
    }

    for repeated in desc.repeated_fields {
        let items = match payload.remove(repeated.field) {
            None | Some(Value::Null) => continue,
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(DecodeError::mismatch(format!(
                    "'{}' must be a list, found {}",
                    repeated.field,
                    type_name(&other)
                )));
            }
        };

        let mut kept = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let ctx = format!("{}[{index}]", repeated.field);
            let mut nested_errors = Vec::new();
            let element = shape(item, repeated.element, &mut nested_errors).and_then(|shaped| {
                // Populate once to validate, so a bad element is dropped here
                // instead of failing the parent.
                repeated.element.kind.populate(shaped.clone()).map(|_| shaped)
            });
            match element {
                Ok(shaped) => {
                    kept.push(shaped);
                    element_errors.extend(nested_errors.into_iter().map(|e| e.with_context(&ctx)));
                }
                Err(e) => element_errors.push(e.with_context(&ctx)),
            }
        }
        payload.insert(repeated.field.to_string(), Value::Array(kept));
    }

    for nested in desc.nested_fields {
        let Some(value) = payload.get(nested.field).filter(|v| !v.is_null()) else {
            continue;
        };
        let mut nested_errors = Vec::new();
        let shaped = shape(value, nested.descriptor, &mut nested_errors)
            .map_err(|e| e.with_context(nested.field))?;
        element_errors.extend(nested_errors.into_iter().map(|e| e.with_context(nested.field)));
        payload.insert(nested.field.to_string(), shaped);
    }

    if let Some(nest) = desc.nest {
        let mut outer = Map::new();
        for key in nest.carry {
            if let Some(v) = top.get(*key) {
                outer.insert((*key).to_string(), v.clone());
            }
        }
        outer.insert(nest.key.to_string(), Value::Object(payload));
        payload = outer;
    }

    Ok(Value::Object(payload))
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| {
        DecodeError::mismatch(format!("'{what}' must be an object, found {}", type_name(value)))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

//! Flat persisted-state layout
//!
//! The host serializes resource state as a flat map from attribute key to
//! string, with nested blocks flattened using dot-plus-index keys:
//!
//! ```text
//! name                                      = "api"
//! logging_configuration.#                   = "1"
//! logging_configuration.0.redacted_fields.# = "2"
//! logging_configuration.0.redacted_fields.0 = "uri"
//! tags.%                                    = "1"
//! tags.Environment                          = "test"
//! ```
//!
//! `flatten` produces that layout from a typed attribute map; `expand`
//! reconstructs the typed map using the schema to recover value types.

use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::value::{AttrType, AttrValue};
use std::collections::BTreeMap;

/// Flatten a typed attribute map into the persisted layout
pub fn flatten(values: &BTreeMap<String, AttrValue>) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (key, value) in values {
        flatten_value(key, value, &mut flat);
    }
    flat
}

fn flatten_value(key: &str, value: &AttrValue, flat: &mut BTreeMap<String, String>) {
    match value {
        AttrValue::List(items) | AttrValue::Set(items) => {
            flat.insert(format!("{key}.#"), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_value(&format!("{key}.{i}"), item, flat);
            }
        }
        AttrValue::Map(entries) => {
            flat.insert(format!("{key}.%"), entries.len().to_string());
            for (name, item) in entries {
                flatten_value(&format!("{key}.{name}"), item, flat);
            }
        }
        AttrValue::Block(blocks) => {
            flat.insert(format!("{key}.#"), blocks.len().to_string());
            for (i, block) in blocks.iter().enumerate() {
                for (name, item) in block {
                    flatten_value(&format!("{key}.{i}.{name}"), item, flat);
                }
            }
        }
        scalar => {
            // scalar_string is total for non-collection values
            if let Some(s) = scalar.scalar_string() {
                flat.insert(key.to_string(), s);
            }
        }
    }
}

/// Expand a flat persisted map back into typed attribute values
pub fn expand(
    schema: &Schema,
    flat: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, AttrValue>> {
    let mut values = BTreeMap::new();
    for (name, attr) in schema.iter() {
        if let Some(value) = expand_value(name, &attr.ty, flat)? {
            values.insert(name.clone(), value);
        }
    }
    Ok(values)
}

fn expand_value(
    key: &str,
    ty: &AttrType,
    flat: &BTreeMap<String, String>,
) -> Result<Option<AttrValue>> {
    match ty {
        AttrType::List(elem) | AttrType::Set(elem) => {
            let Some(count) = flat.get(&format!("{key}.#")) else {
                return Ok(None);
            };
            let count = parse_count(key, count)?;
            let mut items = Vec::with_capacity(count);
            for i in 0..count {
                let item_key = format!("{key}.{i}");
                match expand_value(&item_key, elem, flat)? {
                    Some(item) => items.push(item),
                    None => {
                        return Err(SchemaError::MalformedState {
                            key: item_key,
                            message: "missing collection element".to_string(),
                        });
                    }
                }
            }
            Ok(Some(match ty {
                AttrType::Set(_) => AttrValue::Set(items),
                _ => AttrValue::List(items),
            }))
        }
        AttrType::Map(elem) => {
            if !flat.contains_key(&format!("{key}.%")) {
                return Ok(None);
            }
            let prefix = format!("{key}.");
            let mut entries = BTreeMap::new();
            for (flat_key, _) in flat.range(prefix.clone()..) {
                let Some(rest) = flat_key.strip_prefix(&prefix) else {
                    break;
                };
                if rest == "%" || rest.contains('.') {
                    continue;
                }
                let item_key = format!("{key}.{rest}");
                if let Some(item) = expand_value(&item_key, elem, flat)? {
                    entries.insert(rest.to_string(), item);
                }
            }
            Ok(Some(AttrValue::Map(entries)))
        }
        AttrType::Block(nested) => {
            let Some(count) = flat.get(&format!("{key}.#")) else {
                return Ok(None);
            };
            let count = parse_count(key, count)?;
            let mut blocks = Vec::with_capacity(count);
            for i in 0..count {
                let mut block = BTreeMap::new();
                for (name, attr) in nested.iter() {
                    let item_key = format!("{key}.{i}.{name}");
                    if let Some(item) = expand_value(&item_key, &attr.ty, flat)? {
                        block.insert(name.clone(), item);
                    }
                }
                blocks.push(block);
            }
            Ok(Some(AttrValue::Block(blocks)))
        }
        scalar_ty => {
            let Some(raw) = flat.get(key) else {
                return Ok(None);
            };
            parse_scalar(key, scalar_ty, raw).map(Some)
        }
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.parse().map_err(|_| SchemaError::MalformedState {
        key: format!("{key}.#"),
        message: format!("invalid element count {raw:?}"),
    })
}

fn parse_scalar(key: &str, ty: &AttrType, raw: &str) -> Result<AttrValue> {
    let malformed = |message: String| SchemaError::MalformedState {
        key: key.to_string(),
        message,
    };
    match ty {
        AttrType::String => Ok(AttrValue::String(raw.to_string())),
        AttrType::Int => raw
            .parse()
            .map(AttrValue::Int)
            .map_err(|_| malformed(format!("invalid int {raw:?}"))),
        AttrType::Float => raw
            .parse()
            .map(AttrValue::Float)
            .map_err(|_| malformed(format!("invalid float {raw:?}"))),
        AttrType::Bool => raw
            .parse()
            .map(AttrValue::Bool)
            .map_err(|_| malformed(format!("invalid bool {raw:?}"))),
        other => Err(malformed(format!("expected {other} value"))),
    }
}

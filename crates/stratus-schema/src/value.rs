//! Attribute types and runtime values

use crate::schema::Schema;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The closed sum of attribute types a schema may declare
#[derive(Debug, Clone)]
pub enum AttrType {
    String,
    Int,
    Float,
    Bool,
    /// Ordered collection of one element type
    List(Box<AttrType>),
    /// Unordered collection of one element type
    Set(Box<AttrType>),
    /// String-keyed map of one element type
    Map(Box<AttrType>),
    /// Nested block: a list of objects described by their own schema
    Block(Arc<Schema>),
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::String => write!(f, "string"),
            AttrType::Int => write!(f, "int"),
            AttrType::Float => write!(f, "float"),
            AttrType::Bool => write!(f, "bool"),
            AttrType::List(elem) => write!(f, "list({elem})"),
            AttrType::Set(elem) => write!(f, "set({elem})"),
            AttrType::Map(elem) => write!(f, "map({elem})"),
            AttrType::Block(_) => write!(f, "block"),
        }
    }
}

/// A runtime attribute value, mirroring [`AttrType`]
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<AttrValue>),
    Set(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    Block(Vec<BTreeMap<String, AttrValue>>),
}

impl AttrValue {
    /// Whether this value inhabits the given type
    pub fn matches(&self, ty: &AttrType) -> bool {
        match (self, ty) {
            (AttrValue::String(_), AttrType::String) => true,
            (AttrValue::Int(_), AttrType::Int) => true,
            (AttrValue::Float(_), AttrType::Float) => true,
            (AttrValue::Bool(_), AttrType::Bool) => true,
            (AttrValue::List(items), AttrType::List(elem))
            | (AttrValue::Set(items), AttrType::Set(elem)) => {
                items.iter().all(|v| v.matches(elem))
            }
            (AttrValue::Map(entries), AttrType::Map(elem)) => {
                entries.values().all(|v| v.matches(elem))
            }
            (AttrValue::Block(blocks), AttrType::Block(schema)) => blocks
                .iter()
                .all(|b| b.iter().all(|(k, v)| schema.attribute(k).is_some_and(|a| v.matches(&a.ty)))),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Render a scalar as its flat-map string form; collections return None
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            AttrValue::String(s) => Some(s.clone()),
            AttrValue::Int(i) => Some(i.to_string()),
            AttrValue::Float(f) => Some(f.to_string()),
            AttrValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value` (used by raw state bags)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttrValue::String(s) => serde_json::Value::String(s.clone()),
            AttrValue::Int(i) => serde_json::Value::from(*i),
            AttrValue::Float(f) => serde_json::Value::from(*f),
            AttrValue::Bool(b) => serde_json::Value::Bool(*b),
            AttrValue::List(items) | AttrValue::Set(items) => {
                serde_json::Value::Array(items.iter().map(AttrValue::to_json).collect())
            }
            AttrValue::Map(entries) => serde_json::Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            AttrValue::Block(blocks) => serde_json::Value::Array(
                blocks
                    .iter()
                    .map(|b| {
                        serde_json::Value::Object(
                            b.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

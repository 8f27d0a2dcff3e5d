//! Resource schema descriptor

use crate::attribute::Attribute;
use crate::error::{Result, SchemaError};
use crate::value::AttrValue;
use std::collections::BTreeMap;

/// The attribute schema of one resource type
///
/// Built once at registration and shared immutably; lifecycle callbacks and
/// the flat-map codec consult it through `ResourceData`.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute (builder style)
    pub fn attr(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.attributes.iter()
    }

    /// Names of attributes whose change forces replacement
    pub fn force_new_keys(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.force_new)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Validate a user configuration against this schema
    ///
    /// Checks required presence, rejects unknown and computed-only keys,
    /// type-checks every value and runs declared validators.
    pub fn validate_config(&self, config: &BTreeMap<String, AttrValue>) -> Result<()> {
        for (name, value) in config {
            let Some(attr) = self.attributes.get(name) else {
                return Err(SchemaError::UnknownAttribute(name.clone()));
            };
            if attr.computed && !attr.required && !attr.optional {
                return Err(SchemaError::ComputedInput(name.clone()));
            }
            attr.check(name, value)?;
        }
        for (name, attr) in &self.attributes {
            if attr.required && !config.contains_key(name) {
                return Err(SchemaError::MissingRequired(name.clone()));
            }
        }
        Ok(())
    }

    /// Fill declared defaults for optional attributes the user left unset
    pub fn apply_defaults(&self, config: &mut BTreeMap<String, AttrValue>) {
        for (name, attr) in &self.attributes {
            if let Some(default) = &attr.default {
                config
                    .entry(name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttrType;

    fn schema() -> Schema {
        Schema::new()
            .attr("name", Attribute::required(AttrType::String).force_new())
            .attr("size", Attribute::optional(AttrType::Int).with_default(10i64))
            .attr("arn", Attribute::computed(AttrType::String))
    }

    #[test]
    fn test_required_missing() {
        let config = BTreeMap::new();
        assert!(matches!(
            schema().validate_config(&config),
            Err(SchemaError::MissingRequired(n)) if n == "name"
        ));
    }

    #[test]
    fn test_computed_rejected_as_input() {
        let mut config = BTreeMap::new();
        config.insert("name".to_string(), AttrValue::from("a"));
        config.insert("arn".to_string(), AttrValue::from("arn:x"));
        assert!(matches!(
            schema().validate_config(&config),
            Err(SchemaError::ComputedInput(n)) if n == "arn"
        ));
    }

    #[test]
    fn test_unknown_rejected() {
        let mut config = BTreeMap::new();
        config.insert("name".to_string(), AttrValue::from("a"));
        config.insert("bogus".to_string(), AttrValue::from("x"));
        assert!(matches!(
            schema().validate_config(&config),
            Err(SchemaError::UnknownAttribute(n)) if n == "bogus"
        ));
    }

    #[test]
    fn test_defaults_applied() {
        let mut config = BTreeMap::new();
        config.insert("name".to_string(), AttrValue::from("a"));
        schema().apply_defaults(&mut config);
        assert_eq!(config.get("size"), Some(&AttrValue::from(10i64)));
    }

    #[test]
    fn test_force_new_keys() {
        assert_eq!(schema().force_new_keys(), vec!["name"]);
    }
}

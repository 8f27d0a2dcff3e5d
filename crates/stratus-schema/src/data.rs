//! Per-call attribute bundle

use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::timeouts::{Operation, Timeouts};
use crate::value::AttrValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// An instance's attribute bundle for the duration of one lifecycle call
///
/// The driver constructs one per callback; the host owns the persisted state
/// it is built from and the state it is written back to. `has_change`
/// compares against the prior bundle captured at construction.
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<Schema>,
    values: BTreeMap<String, AttrValue>,
    prior: BTreeMap<String, AttrValue>,
    id: Option<String>,
    new_resource: bool,
    timeouts: Timeouts,
}

impl ResourceData {
    /// Bundle for a Create call: validated configuration, no prior state
    pub fn for_create(
        schema: Arc<Schema>,
        mut config: BTreeMap<String, AttrValue>,
        timeouts: Timeouts,
    ) -> Result<Self> {
        schema.validate_config(&config)?;
        schema.apply_defaults(&mut config);
        Ok(Self {
            schema,
            values: config,
            prior: BTreeMap::new(),
            id: None,
            new_resource: true,
            timeouts,
        })
    }

    /// Bundle for Read or Delete: identifier plus previously persisted state
    pub fn for_state(
        schema: Arc<Schema>,
        id: impl Into<String>,
        prior: BTreeMap<String, AttrValue>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            schema,
            values: prior.clone(),
            prior,
            id: Some(id.into()),
            new_resource: false,
            timeouts,
        }
    }

    /// Bundle for Update: prior state plus the desired configuration
    pub fn for_update(
        schema: Arc<Schema>,
        id: impl Into<String>,
        prior: BTreeMap<String, AttrValue>,
        mut desired: BTreeMap<String, AttrValue>,
        timeouts: Timeouts,
    ) -> Result<Self> {
        schema.validate_config(&desired)?;
        schema.apply_defaults(&mut desired);
        // Carry computed values forward; Update finishes with Read anyway,
        // but callbacks may consult them (e.g. an ARN) before that.
        for (name, attr) in schema.iter() {
            if attr.computed && !desired.contains_key(name) {
                if let Some(value) = prior.get(name) {
                    desired.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(Self {
            schema,
            values: desired,
            prior,
            id: Some(id.into()),
            new_resource: false,
            timeouts,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(AttrValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(AttrValue::as_int)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(AttrValue::as_bool)
    }

    /// Set an attribute, schema-checked
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let value = value.into();
        let Some(attr) = self.schema.attribute(name) else {
            return Err(SchemaError::UnknownAttribute(name.to_string()));
        };
        attr.check(name, &value)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove an attribute (used when the remote reports it unset)
    pub fn unset(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Whether the attribute differs from the prior bundle
    pub fn has_change(&self, name: &str) -> bool {
        self.values.get(name) != self.prior.get(name)
    }

    /// All attribute names that differ from the prior bundle
    pub fn changed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .values
            .iter()
            .filter(|(k, v)| self.prior.get(*k) != Some(v))
            .map(|(k, _)| k.as_str())
            .collect();
        for key in self.prior.keys() {
            if !self.values.contains_key(key) {
                keys.push(key.as_str());
            }
        }
        keys
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Signal "resource no longer exists, drop from state"
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_new_resource(&self) -> bool {
        self.new_resource
    }

    pub fn timeout(&self, operation: Operation) -> Duration {
        self.timeouts.get(operation)
    }

    /// The attribute map the host persists
    pub fn values(&self) -> &BTreeMap<String, AttrValue> {
        &self.values
    }
}

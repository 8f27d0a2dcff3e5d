//! Attribute descriptors

use crate::error::{Result, SchemaError};
use crate::value::{AttrType, AttrValue};

/// Validator invoked on configured values; the first argument is the
/// attribute name for error reporting.
pub type ValidatorFn = fn(&str, &AttrValue) -> Result<()>;

/// Declarative contract for a single attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub ty: AttrType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// A change to this attribute requires replacing the resource
    pub force_new: bool,
    pub default: Option<AttrValue>,
    pub validator: Option<ValidatorFn>,
}

impl Attribute {
    fn new(ty: AttrType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            default: None,
            validator: None,
        }
    }

    /// An attribute the user must configure
    pub fn required(ty: AttrType) -> Self {
        Self {
            required: true,
            ..Self::new(ty)
        }
    }

    /// An attribute the user may configure
    pub fn optional(ty: AttrType) -> Self {
        Self {
            optional: true,
            ..Self::new(ty)
        }
    }

    /// An attribute only the driver writes, never consulted as input
    pub fn computed(ty: AttrType) -> Self {
        Self {
            computed: true,
            ..Self::new(ty)
        }
    }

    /// Mark an optional attribute as also computed (remote fills it when
    /// the user leaves it unset)
    pub fn also_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_validator(mut self, validator: ValidatorFn) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Run type check and validator against a configured value
    pub fn check(&self, name: &str, value: &AttrValue) -> Result<()> {
        if !value.matches(&self.ty) {
            return Err(SchemaError::TypeMismatch {
                attribute: name.to_string(),
                expected: self.ty.to_string(),
            });
        }
        if let Some(validator) = self.validator {
            validator(name, value)?;
        }
        Ok(())
    }
}

//! Typed value objects with generated field accessors.
//!
//! A [`StructDef`] lists property descriptors; each descriptor yields a
//! [`PropertyAccessor`] whose setter either writes the field or, for
//! immutable properties, always fails. Construction writes fields directly,
//! so immutable properties are populated exactly once.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use tenet_core::config::Configuration;
use tenet_core::descriptor::TypeDescriptor;
use tenet_core::types::{ContractError, Value};

use crate::checker::{StructuralChecker, TypeChecker};

/// Options for a property declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropRules {
    /// `Some(_)` means the caller chose mutability explicitly.
    pub immutable: Option<bool>,
    /// Used when construction does not supply the field.
    pub default: Option<Value>,
}

impl PropRules {
    pub fn with_default(value: impl Into<Value>) -> Self {
        Self {
            immutable: None,
            default: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub mutable: bool,
    pub ty: TypeDescriptor,
    pub default: Option<Value>,
}

/// Getter/setter pair for one property.
#[derive(Debug, Clone)]
pub struct PropertyAccessor {
    descriptor: Arc<PropertyDescriptor>,
}

impl PropertyAccessor {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor
    }

    pub fn get(&self, instance: &Instance) -> Result<Value, ContractError> {
        instance
            .fields
            .get(&self.descriptor.name)
            .cloned()
            .ok_or_else(|| ContractError::MissingField {
                owner: instance.def.name.clone(),
                name: self.descriptor.name.clone(),
            })
    }

    /// Immutable properties reject every write, even one that would not
    /// change the value.
    pub fn set(&self, instance: &mut Instance, value: Value) -> Result<(), ContractError> {
        if !self.descriptor.mutable {
            return Err(ContractError::ImmutableField {
                name: self.descriptor.name.clone(),
            });
        }
        let value = instance.def.check_field(&self.descriptor, value)?;
        instance.fields.insert(self.descriptor.name.clone(), value);
        Ok(())
    }
}

/// Declaration of a value-object type.
pub struct StructDef {
    name: String,
    config: Arc<Configuration>,
    checker: Arc<dyn TypeChecker>,
    props: IndexMap<String, PropertyAccessor>,
}

impl StructDef {
    pub fn new(name: impl Into<String>, config: Arc<Configuration>) -> Self {
        Self {
            name: name.into(),
            config,
            checker: Arc::new(StructuralChecker),
            props: IndexMap::new(),
        }
    }

    pub fn with_checker(mut self, checker: Arc<dyn TypeChecker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a property and return its accessor. Redefining a name
    /// replaces the earlier descriptor.
    pub fn define_property(
        &mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        mutable: bool,
        default: Option<Value>,
    ) -> PropertyAccessor {
        let name = name.into();
        let accessor = PropertyAccessor {
            descriptor: Arc::new(PropertyDescriptor {
                name: name.clone(),
                mutable,
                ty,
                default,
            }),
        };
        self.props.insert(name, accessor.clone());
        accessor
    }

    pub fn prop(
        &mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        rules: PropRules,
    ) -> PropertyAccessor {
        let mutable = !rules.immutable.unwrap_or(false);
        self.define_property(name, ty, mutable, rules.default)
    }

    /// Register an immutable property. `rules` may not set `immutable`
    /// itself.
    pub fn constant(
        &mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        rules: PropRules,
    ) -> Result<PropertyAccessor, ContractError> {
        if rules.immutable.is_some() {
            return Err(ContractError::InvalidArgument(
                "Cannot pass 'immutable' argument when using 'const' keyword to define a prop"
                    .to_string(),
            ));
        }
        Ok(self.define_property(name, ty, false, rules.default))
    }

    pub fn accessor(&self, name: &str) -> Option<&PropertyAccessor> {
        self.props.get(name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.props.values().map(|a| a.descriptor())
    }

    /// Build an instance from named values, bypassing setters.
    ///
    /// Unknown names are rejected. Absent names take the property default,
    /// or stay unset and fail on read.
    pub fn instantiate(
        self: &Arc<Self>,
        values: IndexMap<String, Value>,
    ) -> Result<Instance, ContractError> {
        if let Some(unknown) = values.keys().find(|k| !self.props.contains_key(*k)) {
            return Err(ContractError::InvalidArgument(format!(
                "Unknown prop `{}` for {}",
                unknown, self.name
            )));
        }
        let mut values = values;
        let mut fields = IndexMap::new();
        for (name, accessor) in &self.props {
            let desc = accessor.descriptor();
            match values.shift_remove(name) {
                Some(value) => {
                    let value = self.check_field(desc, value)?;
                    fields.insert(name.clone(), value);
                }
                None => {
                    if let Some(default) = &desc.default {
                        fields.insert(name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(Instance {
            def: self.clone(),
            fields,
        })
    }

    /// Type-check a field value when runtime checks are on. A handler that
    /// lets the failure pass keeps the value.
    fn check_field(&self, desc: &PropertyDescriptor, value: Value) -> Result<Value, ContractError> {
        if !self.config.runtime_check_enabled() || self.checker.matches(&desc.ty, &value) {
            return Ok(value);
        }
        let message = format!(
            "Can't set {}.{} to {} (instance of {}) - need a {}",
            self.name,
            desc.name,
            value,
            value.class_name(),
            desc.ty
        );
        self.config
            .inline_type_error(ContractError::InlineAssertion(message))?;
        Ok(value)
    }
}

impl fmt::Debug for StructDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructDef")
            .field("name", &self.name)
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An instance of a [`StructDef`] with its field store.
#[derive(Debug, Clone)]
pub struct Instance {
    def: Arc<StructDef>,
    fields: IndexMap<String, Value>,
}

impl Instance {
    pub fn def(&self) -> &Arc<StructDef> {
        &self.def
    }

    fn accessor(&self, name: &str) -> Result<PropertyAccessor, ContractError> {
        self.def.accessor(name).cloned().ok_or_else(|| {
            ContractError::InvalidArgument(format!(
                "undefined prop `{}` for {}",
                name, self.def.name
            ))
        })
    }

    pub fn get(&self, name: &str) -> Result<Value, ContractError> {
        self.accessor(name)?.get(self)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ContractError> {
        self.accessor(name)?.set(self, value.into())
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object {
            class: self.def.name.clone(),
            fields: self.fields.clone(),
        }
    }
}

#[cfg(test)]
#[path = "props_tests.rs"]
mod tests;

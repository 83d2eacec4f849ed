//! Type-descriptor constructors and inline assertions.
//!
//! The constructors only build [`TypeDescriptor`] values for signatures and
//! assertions to carry. The inline assertions pass their input through
//! unchanged unless it fails, whatever the runtime-check switch says; that
//! switch only governs signature wrapping.

use tenet_core::config::Configuration;
use tenet_core::descriptor::TypeDescriptor;
use tenet_core::types::{ContractError, Value};

use crate::checker::{StructuralChecker, TypeChecker};

pub fn named(class: impl Into<String>) -> TypeDescriptor {
    TypeDescriptor::Simple(class.into())
}

pub fn any(
    a: TypeDescriptor,
    b: TypeDescriptor,
    rest: impl IntoIterator<Item = TypeDescriptor>,
) -> TypeDescriptor {
    TypeDescriptor::Any([a, b].into_iter().chain(rest).collect())
}

pub fn all(
    a: TypeDescriptor,
    b: TypeDescriptor,
    rest: impl IntoIterator<Item = TypeDescriptor>,
) -> TypeDescriptor {
    TypeDescriptor::All([a, b].into_iter().chain(rest).collect())
}

pub fn nilable(ty: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::Nilable(Box::new(ty))
}

pub fn untyped() -> TypeDescriptor {
    TypeDescriptor::Untyped
}

pub fn noreturn() -> TypeDescriptor {
    TypeDescriptor::Noreturn
}

pub fn boolean() -> TypeDescriptor {
    TypeDescriptor::Boolean
}

pub fn enum_of(values: impl IntoIterator<Item = Value>) -> TypeDescriptor {
    TypeDescriptor::Enum(values.into_iter().collect())
}

pub fn proc_type() -> TypeDescriptor {
    TypeDescriptor::Proc
}

pub fn self_type() -> TypeDescriptor {
    TypeDescriptor::SelfType
}

pub fn class_of(class: impl Into<String>) -> TypeDescriptor {
    TypeDescriptor::ClassOf(class.into())
}

/// Aliases are transparent at runtime.
pub fn type_alias(ty: TypeDescriptor) -> TypeDescriptor {
    ty
}

pub fn type_parameter(name: impl Into<String>) -> TypeDescriptor {
    TypeDescriptor::TypeParameter(name.into())
}

pub fn array_of(ty: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::Array(Box::new(ty))
}

pub fn hash_of(key: TypeDescriptor, value: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::Hash(Box::new(key), Box::new(value))
}

pub fn enumerable_of(ty: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::Enumerable(Box::new(ty))
}

/// Inline assertions bound to a configuration.
///
/// Failures go through the inline-assertion handler. `must` returns whatever
/// that handler returns; `cast`, `let_`, and `assert_type` return the
/// original value once the handler lets the failure pass.
pub struct Inline<'a> {
    config: &'a Configuration,
    checker: &'a dyn TypeChecker,
}

impl<'a> Inline<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self {
            config,
            checker: &StructuralChecker,
        }
    }

    pub fn with_checker(config: &'a Configuration, checker: &'a dyn TypeChecker) -> Self {
        Self { config, checker }
    }

    pub fn must(&self, value: Value, message: Option<&str>) -> Result<Value, ContractError> {
        if !value.is_nil() {
            return Ok(value);
        }
        let message = message.unwrap_or("Passed `nil` into must");
        self.config
            .inline_type_error(ContractError::InlineAssertion(message.to_string()))
    }

    pub fn cast(
        &self,
        value: Value,
        ty: &TypeDescriptor,
        checked: bool,
    ) -> Result<Value, ContractError> {
        self.check("cast", value, ty, checked)
    }

    pub fn let_(
        &self,
        value: Value,
        ty: &TypeDescriptor,
        checked: bool,
    ) -> Result<Value, ContractError> {
        self.check("let", value, ty, checked)
    }

    pub fn assert_type(
        &self,
        value: Value,
        ty: &TypeDescriptor,
        checked: bool,
    ) -> Result<Value, ContractError> {
        self.check("assert_type", value, ty, checked)
    }

    /// Opt a value out of checking.
    pub fn unchecked(&self, value: Value) -> Value {
        value
    }

    pub fn reveal_type(&self, value: Value) -> Value {
        value
    }

    fn check(
        &self,
        op: &str,
        value: Value,
        ty: &TypeDescriptor,
        checked: bool,
    ) -> Result<Value, ContractError> {
        if !checked || self.checker.matches(ty, &value) {
            return Ok(value);
        }
        let message = format!(
            "{}: {}",
            op,
            self.checker.error_message(ty, &value, self.config)
        );
        self.config
            .inline_type_error(ContractError::InlineAssertion(message))?;
        Ok(value)
    }
}

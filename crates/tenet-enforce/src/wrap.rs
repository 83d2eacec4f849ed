//! Call-time enforcement for methods declared with an active signature.
//!
//! The signature is built on first call, not at declaration time, so build
//! and validation failures surface when the method is first used.

use std::sync::{Arc, OnceLock};

use tenet_core::config::Configuration;
use tenet_core::descriptor::TypeDescriptor;
use tenet_core::handlers::{CallValidationError, SigValidationContext, ViolationKind};
use tenet_core::signature::{CheckedLevel, Declaration, MethodRef, Mode, ReturnType, Signature};
use tenet_core::types::{ContractError, SourceLocation, Value};

use crate::builder::DeclBuilder;
use crate::checker::TypeChecker;
use crate::sig::{MethodBody, Module, SigBlock};

/// Outcome of building a signature.
#[derive(Debug, Clone)]
pub(crate) enum Resolution {
    /// Arguments and return values are checked against the signature.
    Checked(Arc<Signature>),
    /// The original body runs as-is. Carries the signature when one was
    /// built but its checked level excludes runtime checking.
    Unchecked(Option<Arc<Signature>>),
}

impl Resolution {
    pub(crate) fn signature(&self) -> Option<Arc<Signature>> {
        match self {
            Resolution::Checked(sig) => Some(sig.clone()),
            Resolution::Unchecked(sig) => sig.clone(),
        }
    }
}

/// A method body paired with the declaration that guards it.
pub(crate) struct WrappedMethod {
    pub(crate) method: MethodRef,
    body: MethodBody,
    block: SigBlock,
    sig_location: SourceLocation,
    parent: Option<Arc<Module>>,
    config: Arc<Configuration>,
    checker: Arc<dyn TypeChecker>,
    resolved: OnceLock<Resolution>,
}

impl WrappedMethod {
    pub(crate) fn new(
        method: MethodRef,
        body: MethodBody,
        block: SigBlock,
        sig_location: SourceLocation,
        parent: Option<Arc<Module>>,
        config: Arc<Configuration>,
        checker: Arc<dyn TypeChecker>,
    ) -> Self {
        Self {
            method,
            body,
            block,
            sig_location,
            parent,
            config,
            checker,
            resolved: OnceLock::new(),
        }
    }

    /// Build and validate the signature once. A failure whose handler
    /// raised is not cached, so the next call reports it again.
    pub(crate) fn resolve(&self) -> Result<Resolution, ContractError> {
        if let Some(resolution) = self.resolved.get() {
            return Ok(resolution.clone());
        }
        let resolution = self.build()?;
        tracing::debug!(method = %self.method, ?resolution, "signature resolved");
        Ok(self.resolved.get_or_init(|| resolution).clone())
    }

    fn build(&self) -> Result<Resolution, ContractError> {
        let mut builder = DeclBuilder::new(self.sig_location.clone());
        (self.block)(&mut builder);
        let decl = match builder.finish() {
            Ok(decl) => Arc::new(decl),
            Err(e) => {
                // A handler that returns normally leaves the method unchecked.
                self.config
                    .sig_builder_error(e, self.sig_location.clone())?;
                return Ok(Resolution::Unchecked(None));
            }
        };

        let super_signature = match &self.parent {
            Some(parent) => parent.signature(&self.method.name)?,
            None => None,
        };

        if let Err(e) = self.check_params(&decl) {
            self.config.sig_validation_error(
                e,
                self.context(&decl, None, super_signature.clone()),
            )?;
            return Ok(Resolution::Unchecked(None));
        }

        let signature = Arc::new(Signature {
            method: self.method.clone(),
            params: decl.params.clone().unwrap_or_default(),
            block_param: decl.block_param.clone(),
            returns: decl.returns.clone().unwrap_or(ReturnType::Void),
            mode: decl.mode,
            checked: decl.checked.unwrap_or_default(),
        });

        if let Err(e) = self.check_override(&signature, super_signature.as_deref()) {
            // Suppressed validation failures keep the signature enforced.
            self.config.sig_validation_error(
                e,
                self.context(&decl, Some(signature.clone()), super_signature.clone()),
            )?;
        }

        let skip = match signature.checked {
            CheckedLevel::Always => false,
            CheckedLevel::Tests => !self.config.checked_tests_enabled(),
            CheckedLevel::Never => true,
        };
        if skip {
            Ok(Resolution::Unchecked(Some(signature)))
        } else {
            Ok(Resolution::Checked(signature))
        }
    }

    fn context(
        &self,
        decl: &Arc<Declaration>,
        signature: Option<Arc<Signature>>,
        super_signature: Option<Arc<Signature>>,
    ) -> SigValidationContext {
        SigValidationContext {
            method: self.method.clone(),
            declaration: decl.clone(),
            signature,
            super_signature,
        }
    }

    fn check_params(&self, decl: &Declaration) -> Result<(), ContractError> {
        let declared: Vec<&String> = decl.params.iter().flat_map(|p| p.keys()).collect();
        let missing: Vec<&str> = self
            .method
            .params
            .iter()
            .filter(|p| !declared.contains(p))
            .map(String::as_str)
            .collect();
        let extra: Vec<&str> = declared
            .iter()
            .filter(|p| !self.method.params.contains(**p))
            .map(|p| p.as_str())
            .collect();
        if !extra.is_empty() {
            return Err(ContractError::ContractValidation(format!(
                "The declaration for `{}` has extra parameter(s): {}",
                self.method.name,
                extra.join(", ")
            )));
        }
        if !missing.is_empty() {
            return Err(ContractError::ContractValidation(format!(
                "The declaration for `{}` is missing parameter(s): {}",
                self.method.name,
                missing.join(", ")
            )));
        }
        Ok(())
    }

    fn check_override(
        &self,
        signature: &Signature,
        super_signature: Option<&Signature>,
    ) -> Result<(), ContractError> {
        let has_super = self
            .parent
            .as_ref()
            .is_some_and(|p| p.responds_to(&self.method.name));
        if signature.mode == Mode::Override && !has_super {
            return Err(ContractError::ContractValidation(format!(
                "You marked `{}` as .override, but that method doesn't already exist \
                 in this class/module to be overridden.",
                self.method.name
            )));
        }
        if let Some(sup) = super_signature {
            let requires_override = matches!(
                sup.mode,
                Mode::Abstract | Mode::Overridable | Mode::Override
            );
            if requires_override && signature.mode == Mode::Standard {
                return Err(ContractError::ContractValidation(format!(
                    "You must use `.override` when overriding the existing method `{}` from {}.",
                    self.method.name, sup.method.owner
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn call(
        &self,
        args: &[Value],
        block: Option<&Value>,
        caller: &SourceLocation,
    ) -> Result<Value, ContractError> {
        let signature = match self.resolve()? {
            Resolution::Checked(sig) => sig,
            Resolution::Unchecked(_) => return (self.body)(args, block),
        };
        if signature.is_abstract() {
            return Err(ContractError::AbstractMethod {
                owner: self.method.owner.clone(),
                method: self.method.name.clone(),
            });
        }

        for (name, value) in self.method.params.iter().zip(args) {
            if let Some(ty) = signature.params.get(name) {
                self.check_value(
                    &signature,
                    ViolationKind::Parameter,
                    Some(name),
                    ty,
                    value,
                    caller,
                )?;
            }
        }
        if let Some((name, ty)) = &signature.block_param {
            let value = block.cloned().unwrap_or(Value::Nil);
            self.check_value(
                &signature,
                ViolationKind::BlockParameter,
                Some(name),
                ty,
                &value,
                caller,
            )?;
        }

        let result = (self.body)(args, block)?;
        match &signature.returns {
            ReturnType::Void => Ok(Value::Nil),
            ReturnType::Type(ty) => {
                self.check_value(
                    &signature,
                    ViolationKind::ReturnValue,
                    None,
                    ty,
                    &result,
                    caller,
                )?;
                Ok(result)
            }
        }
    }

    fn check_value(
        &self,
        signature: &Arc<Signature>,
        kind: ViolationKind,
        name: Option<&String>,
        ty: &TypeDescriptor,
        value: &Value,
        caller: &SourceLocation,
    ) -> Result<(), ContractError> {
        if self.checker.matches(ty, value) {
            return Ok(());
        }
        let payload = CallValidationError {
            signature: signature.clone(),
            kind,
            name: name.cloned(),
            expected_type: ty.clone(),
            value: value.clone(),
            message: self.checker.error_message(ty, value, &self.config),
            location: caller.clone(),
        };
        self.config.call_validation_error(&payload)?;
        Ok(())
    }
}

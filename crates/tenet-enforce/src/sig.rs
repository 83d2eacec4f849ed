//! Signature declaration gate.
//!
//! A [`Module`] plays the part of a class that methods are declared on.
//! `sig` records a declaration for the next `define_method`, but only while
//! runtime checks are enabled; the decision is made once, when the method is
//! defined, and later changes to the switch do not affect it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use tenet_core::config::Configuration;
use tenet_core::signature::{MethodRef, Signature};
use tenet_core::types::{ContractError, SourceLocation, Value};

use crate::builder::DeclBuilder;
use crate::checker::{StructuralChecker, TypeChecker};
use crate::wrap::WrappedMethod;

/// A method implementation: positional arguments plus an optional block.
pub type MethodBody =
    Arc<dyn Fn(&[Value], Option<&Value>) -> Result<Value, ContractError> + Send + Sync>;

/// A deferred declaration block, evaluated when the signature is built.
pub type SigBlock = Arc<dyn Fn(&mut DeclBuilder) + Send + Sync>;

/// Whether a declaration installed enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Active,
    Inert,
}

struct PendingSig {
    block: SigBlock,
    location: SourceLocation,
}

enum Installed {
    Plain { method: MethodRef, body: MethodBody },
    Wrapped(Arc<WrappedMethod>),
}

impl Installed {
    fn method(&self) -> &MethodRef {
        match self {
            Installed::Plain { method, .. } => method,
            Installed::Wrapped(w) => &w.method,
        }
    }
}

/// A named collection of methods that signatures can be declared on.
pub struct Module {
    name: String,
    config: Arc<Configuration>,
    checker: Arc<dyn TypeChecker>,
    parent: Option<Arc<Module>>,
    pending: Mutex<Option<PendingSig>>,
    methods: RwLock<IndexMap<String, Arc<Installed>>>,
}

impl Module {
    pub fn new(name: impl Into<String>, config: Arc<Configuration>) -> Self {
        Self {
            name: name.into(),
            config,
            checker: Arc::new(StructuralChecker),
            parent: None,
            pending: Mutex::new(None),
            methods: RwLock::new(IndexMap::new()),
        }
    }

    /// Use a custom type checker for signatures declared on this module.
    pub fn with_checker(mut self, checker: Arc<dyn TypeChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// A module inheriting this one's methods, configuration, and checker.
    pub fn subclass(self: &Arc<Self>, name: impl Into<String>) -> Module {
        Module {
            name: name.into(),
            config: self.config.clone(),
            checker: self.checker.clone(),
            parent: Some(self.clone()),
            pending: Mutex::new(None),
            methods: RwLock::new(IndexMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Arc<Configuration> {
        &self.config
    }

    /// Declare a signature for the next method defined on this module.
    ///
    /// Returns `Inert` without storing anything when runtime checks are
    /// disabled, and drops any declaration still pending from earlier.
    /// Declaring twice without a method in between is a builder error.
    #[track_caller]
    pub fn sig<F>(&self, block: F) -> Result<GateState, ContractError>
    where
        F: Fn(&mut DeclBuilder) + Send + Sync + 'static,
    {
        let location = SourceLocation::caller();
        if !self.config.runtime_check_enabled() {
            // An inert sig still replaces any earlier declaration.
            self.pending.lock().take();
            tracing::debug!(
                module = %self.name,
                %location,
                "runtime checks disabled, sig is inert"
            );
            return Ok(GateState::Inert);
        }

        let already_pending = self.pending.lock().is_some();
        if already_pending {
            self.config.sig_builder_error(
                ContractError::ContractBuild(
                    "You called sig twice without declaring a method in between".to_string(),
                ),
                location.clone(),
            )?;
        }

        self.config.note_sig_forwarded();
        *self.pending.lock() = Some(PendingSig {
            block: Arc::new(block),
            location,
        });
        Ok(GateState::Active)
    }

    /// Define (or redefine) a method, consuming any pending signature.
    #[track_caller]
    pub fn define_method<F>(&self, name: impl Into<String>, params: &[&str], body: F) -> GateState
    where
        F: Fn(&[Value], Option<&Value>) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        let method = MethodRef {
            owner: self.name.clone(),
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            location: SourceLocation::caller(),
        };
        let body: MethodBody = Arc::new(body);
        let pending = self.pending.lock().take();

        let (installed, state) = match pending {
            Some(sig) => {
                let wrapped = WrappedMethod::new(
                    method.clone(),
                    body,
                    sig.block,
                    sig.location,
                    self.parent.clone(),
                    self.config.clone(),
                    self.checker.clone(),
                );
                (Installed::Wrapped(Arc::new(wrapped)), GateState::Active)
            }
            None => (Installed::Plain { method: method.clone(), body }, GateState::Inert),
        };
        tracing::debug!(method = %method, ?state, "method defined");
        self.methods
            .write()
            .insert(method.name.clone(), Arc::new(installed));
        state
    }

    fn lookup(&self, name: &str) -> Option<Arc<Installed>> {
        if let Some(m) = self.methods.read().get(name) {
            return Some(m.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    pub fn responds_to(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Names of methods defined directly on this module, in definition order.
    pub fn method_names(&self) -> Vec<String> {
        self.methods.read().keys().cloned().collect()
    }

    /// The built signature of `name`, building it if necessary. `None` for
    /// undeclared methods and for declarations that failed to build.
    pub fn signature(&self, name: &str) -> Result<Option<Arc<Signature>>, ContractError> {
        match self.lookup(name).as_deref() {
            Some(Installed::Wrapped(w)) => Ok(w.resolve()?.signature()),
            _ => Ok(None),
        }
    }

    #[track_caller]
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ContractError> {
        self.call_with_block(name, args, None)
    }

    #[track_caller]
    pub fn call_with_block(
        &self,
        name: &str,
        args: &[Value],
        block: Option<Value>,
    ) -> Result<Value, ContractError> {
        let caller = SourceLocation::caller();
        let installed = self.lookup(name).ok_or_else(|| ContractError::NoMethod {
            owner: self.name.clone(),
            name: name.to_string(),
        })?;
        let expected = installed.method().params.len();
        if args.len() != expected {
            return Err(ContractError::Arity {
                given: args.len(),
                expected,
            });
        }
        match installed.as_ref() {
            Installed::Plain { body, .. } => body(args, block.as_ref()),
            Installed::Wrapped(w) => w.call(args, block.as_ref(), &caller),
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .field("parent", &self.parent.as_ref().map(|p| p.name.clone()))
            .finish()
    }
}

/// Declare a signature that is visible to static tooling only.
///
/// Always inert, whatever the runtime-check switch says.
pub fn without_runtime<F>(_block: F) -> GateState
where
    F: FnOnce(&mut DeclBuilder),
{
    GateState::Inert
}

#[cfg(test)]
#[path = "sig_tests.rs"]
mod tests;

//! Violation-handler slots and the payloads they receive.
//!
//! Every event category works the same way: a slot holds an optional
//! override; dispatch calls the override if one is installed and the
//! built-in default otherwise. The handler's result (or error) is returned
//! to the caller untouched.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::descriptor::TypeDescriptor;
use crate::signature::{sig_error, Declaration, MethodRef, Signature};
use crate::types::{ContractError, SourceLocation, Value};

/// The seven categories of contract events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    InlineAssertion,
    SigBuilderError,
    SigValidationError,
    CallValidationError,
    LogInfo,
    SoftAssert,
    HardAssert,
}

impl EventCategory {
    pub const ALL: [EventCategory; 7] = [
        EventCategory::InlineAssertion,
        EventCategory::SigBuilderError,
        EventCategory::SigValidationError,
        EventCategory::CallValidationError,
        EventCategory::LogInfo,
        EventCategory::SoftAssert,
        EventCategory::HardAssert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::InlineAssertion => "inline_assertion",
            EventCategory::SigBuilderError => "sig_builder_error",
            EventCategory::SigValidationError => "sig_validation_error",
            EventCategory::CallValidationError => "call_validation_error",
            EventCategory::LogInfo => "log_info",
            EventCategory::SoftAssert => "soft_assert",
            EventCategory::HardAssert => "hard_assert",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handler payload. `to_args` is the positional form handed to
/// dynamically-typed handlers installed as a [`Value::Proc`].
pub trait Payload: Send + Sync + 'static {
    fn to_args(&self) -> Vec<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineTypeError {
    pub error: ContractError,
}

impl Payload for InlineTypeError {
    fn to_args(&self) -> Vec<Value> {
        vec![Value::Error(self.error.clone())]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigBuilderError {
    pub error: ContractError,
    /// Where the offending declaration was written.
    pub location: SourceLocation,
}

impl Payload for SigBuilderError {
    fn to_args(&self) -> Vec<Value> {
        vec![
            Value::Error(self.error.clone()),
            Value::Location(self.location.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigValidationContext {
    pub method: MethodRef,
    pub declaration: Arc<Declaration>,
    /// `None` if validation failed before a signature existed.
    pub signature: Option<Arc<Signature>>,
    /// Signature of the overridden method, when there is one.
    pub super_signature: Option<Arc<Signature>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigValidationError {
    pub error: ContractError,
    pub context: SigValidationContext,
}

impl Payload for SigValidationError {
    fn to_args(&self) -> Vec<Value> {
        let ctx = &self.context;
        let opts = Value::hash([
            ("method", Value::symbol(ctx.method.name.clone())),
            ("owner", Value::string(ctx.method.owner.clone())),
            ("declaration", Value::Declaration(ctx.declaration.clone())),
            (
                "signature",
                ctx.signature.clone().map_or(Value::Nil, Value::Signature),
            ),
            (
                "super_signature",
                ctx.super_signature.clone().map_or(Value::Nil, Value::Signature),
            ),
        ]);
        vec![Value::Error(self.error.clone()), opts]
    }
}

/// What part of a call failed its contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Parameter,
    BlockParameter,
    ReturnValue,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Parameter => "Parameter",
            ViolationKind::BlockParameter => "Block parameter",
            ViolationKind::ReturnValue => "Return value",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallValidationError {
    pub signature: Arc<Signature>,
    pub kind: ViolationKind,
    /// Parameter name; `None` for return values.
    pub name: Option<String>,
    pub expected_type: TypeDescriptor,
    pub value: Value,
    /// Type checker's description of the mismatch.
    pub message: String,
    /// Where the failing call was made.
    pub location: SourceLocation,
}

impl Payload for CallValidationError {
    fn to_args(&self) -> Vec<Value> {
        let opts = Value::hash([
            ("message", Value::string(self.message.clone())),
            ("kind", Value::string(self.kind.as_str())),
            ("name", self.name.clone().map_or(Value::Nil, Value::Symbol)),
            ("type", Value::Type(self.expected_type.clone())),
            ("value", self.value.clone()),
            ("location", Value::Location(self.location.clone())),
        ]);
        vec![Value::Signature(self.signature.clone()), opts]
    }
}

/// Payload shared by the log, soft-assert, and hard-assert categories.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    pub message: String,
    pub extra: IndexMap<String, Value>,
}

impl LogMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: IndexMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    fn render(&self) -> String {
        format!("{}, extra: {}", self.message, Value::Hash(self.extra.clone()))
    }
}

impl Payload for LogMessage {
    fn to_args(&self) -> Vec<Value> {
        vec![
            Value::string(self.message.clone()),
            Value::Hash(self.extra.clone()),
        ]
    }
}

/// Statically-typed handler for payload `P`.
pub type HandlerFn<P> = Arc<dyn Fn(&P) -> Result<Value, ContractError> + Send + Sync>;

/// One override-or-default slot.
pub struct HandlerSlot<P> {
    category: EventCategory,
    installed: RwLock<Option<HandlerFn<P>>>,
    default: fn(&P) -> Result<Value, ContractError>,
}

impl<P: Payload> HandlerSlot<P> {
    pub fn new(category: EventCategory, default: fn(&P) -> Result<Value, ContractError>) -> Self {
        Self {
            category,
            installed: RwLock::new(None),
            default,
        }
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    /// Install an override, or reset to the default with `None`.
    pub fn set(&self, handler: Option<HandlerFn<P>>) {
        *self.installed.write() = handler;
    }

    /// Install a dynamically-typed override. `Value::Nil` resets; anything
    /// that is not a `Value::Proc` is rejected and leaves the slot unchanged.
    pub fn set_value(&self, value: Value) -> Result<(), ContractError> {
        match value {
            Value::Nil => {
                self.set(None);
                Ok(())
            }
            Value::Proc(proc) => {
                self.set(Some(Arc::new(move |payload: &P| {
                    proc.call(&payload.to_args())
                })));
                Ok(())
            }
            _ => Err(ContractError::InvalidArgument(
                "Provided value must respond to :call".to_string(),
            )),
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.installed.read().is_some()
    }

    pub fn dispatch(&self, payload: &P) -> Result<Value, ContractError> {
        // Release the lock before calling out; handlers may reconfigure.
        let installed = self.installed.read().clone();
        match installed {
            Some(handler) => {
                tracing::debug!(category = %self.category, "dispatching to override");
                handler(payload)
            }
            None => {
                tracing::debug!(category = %self.category, "dispatching to default");
                (self.default)(payload)
            }
        }
    }
}

impl<P> fmt::Debug for HandlerSlot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("category", &self.category)
            .field("overridden", &self.installed.read().is_some())
            .finish()
    }
}

pub(crate) fn inline_type_error_default(p: &InlineTypeError) -> Result<Value, ContractError> {
    Err(p.error.clone())
}

pub(crate) fn sig_builder_error_default(p: &SigBuilderError) -> Result<Value, ContractError> {
    Err(sig_error(&p.location, &p.error.to_string()))
}

pub(crate) fn sig_validation_error_default(p: &SigValidationError) -> Result<Value, ContractError> {
    Err(p.error.clone())
}

pub(crate) fn call_validation_error_default(
    p: &CallValidationError,
) -> Result<Value, ContractError> {
    let name = p
        .name
        .as_ref()
        .map(|n| format!(" '{}'", n))
        .unwrap_or_default();
    Err(ContractError::CallContractViolation(format!(
        "{}{}: {}\nCaller: {}\nDefinition: {}",
        p.kind, name, p.message, p.location, p.signature.method.location
    )))
}

pub(crate) fn log_info_default(p: &LogMessage) -> Result<Value, ContractError> {
    println!("{}", p.render());
    Ok(Value::Nil)
}

pub(crate) fn soft_assert_default(p: &LogMessage) -> Result<Value, ContractError> {
    println!("{}", p.render());
    Ok(Value::Nil)
}

pub(crate) fn hard_assert_default(p: &LogMessage) -> Result<Value, ContractError> {
    Err(ContractError::HardAssert(p.message.clone()))
}

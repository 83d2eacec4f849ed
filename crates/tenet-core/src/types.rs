use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;
use crate::signature::{Declaration, Signature};

/// A dynamically-typed runtime value.
///
/// Contract checks run against values whose type is only known at call time,
/// so arguments, return values, prop fields, and handler payloads all travel
/// as `Value`.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
    Array(Vec<Value>),
    Hash(IndexMap<String, Value>),
    /// An instance of a user-declared type.
    Object {
        class: String,
        fields: IndexMap<String, Value>,
    },
    /// A type used as a value (for example, a class passed to `class_of`).
    Type(TypeDescriptor),
    Proc(Proc),
    Error(ContractError),
    Location(SourceLocation),
    Signature(Arc<Signature>),
    Declaration(Arc<Declaration>),
}

impl Value {
    /// Name of the runtime class of this value.
    pub fn class_name(&self) -> &str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(true) => "True",
            Value::Bool(false) => "False",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Object { class, .. } => class,
            Value::Type(_) => "Class",
            Value::Proc(_) => "Proc",
            Value::Error(_) => "Error",
            Value::Location(_) => "Location",
            Value::Signature(_) => "Signature",
            Value::Declaration(_) => "Declaration",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Proc(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ContractError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    /// Build a `Value::Hash` from key/value pairs.
    pub fn hash<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Hash(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (
                Value::Object { class: ca, fields: fa },
                Value::Object { class: cb, fields: fb },
            ) => ca == cb && fa == fb,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Proc(a), Value::Proc(b)) => a.ptr_eq(b),
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Location(a), Value::Location(b)) => a == b,
            (Value::Signature(a), Value::Signature(b)) => Arc::ptr_eq(a, b),
            (Value::Declaration(a), Value::Declaration(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, ":{}", s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Hash(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Object { class, fields } => {
                write!(f, "#<{}", class)?;
                for (k, v) in fields {
                    write!(f, " {}={}", k, v)?;
                }
                f.write_str(">")
            }
            Value::Type(t) => write!(f, "{}", t),
            Value::Proc(_) => f.write_str("#<Proc>"),
            Value::Error(e) => write!(f, "#<Error: {}>", e),
            Value::Location(loc) => write!(f, "{}", loc),
            Value::Signature(sig) => write!(f, "#<Signature {}>", sig.method),
            Value::Declaration(decl) => write!(f, "#<Declaration {}>", decl.location),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

/// Signature of a dynamically-typed callable.
pub type ProcFn = dyn Fn(&[Value]) -> Result<Value, ContractError> + Send + Sync;

/// A callable value. Clones share the same underlying closure.
#[derive(Clone)]
pub struct Proc(Arc<ProcFn>);

impl Proc {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        Proc(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, ContractError> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Proc) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Proc> for Value {
    fn from(p: Proc) -> Self {
        Value::Proc(p)
    }
}

/// A `file:line` position in host source code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        std::panic::Location::caller().into()
    }
}

impl From<&std::panic::Location<'_>> for SourceLocation {
    fn from(loc: &std::panic::Location<'_>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Errors raised by contract checks and by registry configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    /// Bad configuration value. Never routed through a handler.
    #[error("{0}")]
    InvalidArgument(String),

    /// An inline assertion (`must`, `cast`, `let_`, `assert_type`) failed.
    #[error("{0}")]
    InlineAssertion(String),

    /// A signature declaration is malformed.
    #[error("{0}")]
    ContractBuild(String),

    /// A built signature conflicts with an override/abstract requirement.
    #[error("{0}")]
    ContractValidation(String),

    /// An argument or return value did not match its declared type.
    #[error("{0}")]
    CallContractViolation(String),

    #[error("{name} cannot be modified after creation.")]
    ImmutableField { name: String },

    #[error("{owner}#{name} was never set and has no default")]
    MissingField { owner: String, name: String },

    #[error("{0}")]
    HardAssert(String),

    #[error(
        "The method `{method}` on {owner} is declared as `abstract`. \
         It does not have an implementation."
    )]
    AbstractMethod { owner: String, method: String },

    #[error("undefined method `{name}' for {owner}")]
    NoMethod { owner: String, name: String },

    #[error("wrong number of arguments (given {given}, expected {expected})")]
    Arity { given: usize, expected: usize },
}

impl From<ContractError> for Value {
    fn from(e: ContractError) -> Self {
        Value::Error(e)
    }
}

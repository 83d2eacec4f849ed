//! Records produced by building a signature declaration.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;
use crate::types::{ContractError, SourceLocation};

/// Identifies a method a signature is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    /// Parameter names in declaration order.
    pub params: Vec<String>,
    /// Where the method was defined.
    pub location: SourceLocation,
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.name)
    }
}

/// When a signature's runtime checks are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckedLevel {
    #[default]
    Always,
    /// Only when checking for test-only sigs has been enabled.
    Tests,
    Never,
}

/// Behavioural marker of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Standard,
    Abstract,
    Override,
    Overridable,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Abstract => "abstract",
            Mode::Override => "override",
            Mode::Overridable => "overridable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    Void,
    Type(TypeDescriptor),
}

/// Raw output of a declaration block, before it is checked against the method.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub params: Option<IndexMap<String, TypeDescriptor>>,
    pub block_param: Option<(String, TypeDescriptor)>,
    pub returns: Option<ReturnType>,
    pub mode: Mode,
    pub checked: Option<CheckedLevel>,
    /// Where the declaration was written.
    pub location: SourceLocation,
}

impl Declaration {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            params: None,
            block_param: None,
            returns: None,
            mode: Mode::Standard,
            checked: None,
            location,
        }
    }
}

/// A validated signature bound to a concrete method.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub method: MethodRef,
    pub params: IndexMap<String, TypeDescriptor>,
    pub block_param: Option<(String, TypeDescriptor)>,
    pub returns: ReturnType,
    pub mode: Mode,
    pub checked: CheckedLevel,
}

impl Signature {
    pub fn is_abstract(&self) -> bool {
        self.mode == Mode::Abstract
    }
}

/// Error-reporting routine of the signature builder: attributes a build
/// failure to the declaration site.
pub fn sig_error(location: &SourceLocation, message: &str) -> ContractError {
    ContractError::ContractBuild(format!(
        "{}: Error interpreting `sig`:\n  {}\n",
        location, message
    ))
}

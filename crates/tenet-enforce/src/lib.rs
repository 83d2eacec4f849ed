//! Signature enforcement and typed props for tenet.
//!
//! Declares method contracts and checks them at call time, reporting every
//! violation through the handlers of a shared
//! [`Configuration`](tenet_core::config::Configuration):
//! - [`sig`] — the declaration gate ([`Module::sig`](sig::Module::sig),
//!   [`without_runtime`](sig::without_runtime))
//! - [`builder`] — the declaration DSL
//! - `wrap` — call-time argument and return checks
//! - [`checker`] — the [`TypeChecker`](checker::TypeChecker) seam and its structural default
//! - [`props`] — value objects with mutable and immutable accessors
//! - [`noops`] — type-descriptor constructors and inline assertions

pub mod builder;
pub mod checker;
pub mod noops;
pub mod props;
pub mod sig;
mod wrap;

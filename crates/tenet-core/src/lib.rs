//! Core types and the contract configuration registry for tenet.
//!
//! - [`types`] — Dynamic [`Value`](types::Value) model, source locations, and the error taxonomy
//! - [`descriptor`] — Declared types ([`TypeDescriptor`](descriptor::TypeDescriptor))
//! - [`signature`] — Declarations and validated signatures
//! - [`handlers`] — Event categories, payloads, and the override-or-default handler slot
//! - [`config`] — The shared [`Configuration`](config::Configuration) and its start-up settings

pub mod config;
pub mod descriptor;
pub mod handlers;
pub mod signature;
pub mod types;

// Tests for the override-or-default handler registry
use std::sync::Arc;

use indexmap::IndexMap;
use tenet_core::config::Configuration;
use tenet_core::handlers::EventCategory;
use tenet_core::types::{ContractError, Value};

use crate::common::Recorder;

#[test]
/// A log override receives the message and the extra data positionally.
fn test_log_info_override_receives_payload() {
    let config = Configuration::new();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::LogInfo, Value::Nil);

    let mut extra = IndexMap::new();
    extra.insert("request_id".to_string(), Value::from("r-1"));
    config.log_info("slow sig build", extra.clone()).unwrap();

    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec![Value::from("slow sig build"), Value::Hash(extra)]);
}

#[test]
/// Overriding one category leaves the others on their defaults.
fn test_override_is_per_category() {
    let config = Configuration::new();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::SoftAssert, Value::Nil);

    config.soft_assert("soft", IndexMap::new()).unwrap();
    let err = config.hard_assert("hard", IndexMap::new()).unwrap_err();
    assert_eq!(err, ContractError::HardAssert("hard".to_string()));
    assert_eq!(rec.count(), 1);
    for category in EventCategory::ALL {
        assert_eq!(
            config.has_override(category),
            category == EventCategory::SoftAssert
        );
    }
}

#[test]
/// A handler may turn a default failure into success.
fn test_hard_assert_can_be_suppressed() {
    let config = Configuration::new();
    config.set_hard_assert_handler(|p| Ok(Value::string(format!("logged: {}", p.message))));
    let out = config.hard_assert("boom", IndexMap::new()).unwrap();
    assert_eq!(out, Value::from("logged: boom"));
}

#[test]
/// A handler may raise an error different from the original, unaltered.
fn test_handler_error_replaces_original() {
    let config = Configuration::new();
    config.set_inline_type_error_handler(|p| {
        Err(ContractError::HardAssert(format!("wrapped: {}", p.error)))
    });
    let err = config
        .inline_type_error(ContractError::InlineAssertion("inner".to_string()))
        .unwrap_err();
    assert_eq!(err, ContractError::HardAssert("wrapped: inner".to_string()));
}

#[test]
/// Rejected non-callables leave a typed override in place.
fn test_non_callable_keeps_typed_override() {
    let config = Configuration::new();
    config.set_log_info_handler(|_| Ok(Value::from(1)));
    for bad in [Value::from(42), Value::from("call me"), Value::Array(vec![])] {
        let err = config.set_handler(EventCategory::LogInfo, bad).unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument(_)));
    }
    assert_eq!(config.log_info("x", IndexMap::new()).unwrap(), Value::from(1));
}

#[test]
/// Reset through either surface restores the default.
fn test_reset_surfaces() {
    let config = Configuration::new();
    config.set_hard_assert_handler(|_| Ok(Value::Nil));
    config.reset_handler(EventCategory::HardAssert);
    assert!(config.hard_assert("a", IndexMap::new()).is_err());

    config.set_hard_assert_handler(|_| Ok(Value::Nil));
    config.set_handler(EventCategory::HardAssert, Value::Nil).unwrap();
    assert!(config.hard_assert("a", IndexMap::new()).is_err());
}

#[test]
/// The registry is shared across threads after start-up configuration.
fn test_shared_across_threads() {
    let config = Arc::new(Configuration::new());
    let rec = Recorder::new();
    rec.install(&config, EventCategory::SoftAssert, Value::Nil);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let config = config.clone();
            std::thread::spawn(move || {
                config
                    .soft_assert(format!("thread {}", i), IndexMap::new())
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(rec.count(), 4);
}

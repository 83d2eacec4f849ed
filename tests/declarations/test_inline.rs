// Tests for inline assertions and their handler
use tenet_core::config::Configuration;
use tenet_core::handlers::EventCategory;
use tenet_core::types::{ContractError, Value};
use tenet_enforce::noops::{any, named, Inline};

use crate::common::Recorder;

#[test]
fn test_must_nil_raises_by_default() {
    let config = Configuration::new();
    let err = Inline::new(&config).must(Value::Nil, None).unwrap_err();
    assert!(matches!(err, ContractError::InlineAssertion(_)));
}

#[test]
/// The override sees the original error and its result becomes must's result.
fn test_must_override_result_and_error() {
    let config = Configuration::new();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::InlineAssertion, Value::from(0));

    let out = Inline::new(&config).must(Value::Nil, Some("id required")).unwrap();
    assert_eq!(out, Value::from(0));
    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0][0],
        Value::Error(ContractError::InlineAssertion("id required".to_string()))
    );
}

#[test]
/// let_ keeps the original value when the override lets it pass.
fn test_let_override_keeps_value() {
    let config = Configuration::new();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::InlineAssertion, Value::Nil);
    let out = Inline::new(&config)
        .let_(Value::from(1), &named("String"), true)
        .unwrap();
    assert_eq!(out, Value::from(1));
    assert_eq!(rec.count(), 1);
    assert!(matches!(
        calls_error(&rec),
        ContractError::InlineAssertion(m) if m.starts_with("let: ")
    ));
}

fn calls_error(rec: &Recorder) -> ContractError {
    rec.calls()[0][0].as_error().cloned().unwrap()
}

#[test]
fn test_cast_and_assert_type_pass_matching_values() {
    let config = Configuration::new();
    let t = Inline::new(&config);
    let ty = any(named("Integer"), named("Float"), []);
    assert_eq!(t.cast(Value::from(1.5), &ty, true).unwrap(), Value::from(1.5));
    assert_eq!(t.assert_type(Value::from(3), &ty, true).unwrap(), Value::from(3));
    assert!(t.assert_type(Value::from("3"), &ty, true).is_err());
}

#[test]
/// The runtime switch governs signatures only; inline assertions still fire.
fn test_disabled_runtime_still_dispatches() {
    let config = Configuration::new();
    config.set_runtime_check_enabled(false);
    let t = Inline::new(&config);
    assert!(matches!(
        t.must(Value::Nil, None),
        Err(ContractError::InlineAssertion(_))
    ));

    let rec = Recorder::new();
    rec.install(&config, EventCategory::InlineAssertion, Value::symbol("fallback"));
    assert_eq!(t.must(Value::Nil, None).unwrap(), Value::symbol("fallback"));
    assert_eq!(
        t.let_(Value::from("1"), &named("Integer"), true).unwrap(),
        Value::from("1")
    );
    assert_eq!(rec.count(), 2);
    assert_eq!(
        rec.calls()[0][0],
        Value::Error(ContractError::InlineAssertion(
            "Passed `nil` into must".to_string()
        ))
    );
}

// Tests for call-time validation and its handler
use std::sync::Arc;

use tenet_core::config::Configuration;
use tenet_core::handlers::EventCategory;
use tenet_core::types::{ContractError, Value};
use tenet_enforce::noops::{array_of, named, nilable};
use tenet_enforce::sig::Module;

use crate::common::{opt, Recorder};

fn greeter(config: Arc<Configuration>) -> Module {
    let m = Module::new("Greeter", config);
    m.sig(|s| {
        s.params([("a", named("String"))]).returns(named("Symbol"));
    })
    .unwrap();
    m.define_method("foo", &["a"], |_, _| Ok(Value::symbol("bar")));
    m
}

#[test]
/// The default error names parameter, types, value, and both locations.
fn test_default_error_message() {
    let m = greeter(Configuration::shared());
    let err = m.call("foo", &[Value::from(1)]).unwrap_err();
    let ContractError::CallContractViolation(msg) = err else {
        panic!("expected a call contract violation");
    };
    let lines: Vec<&str> = msg.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Parameter 'a': Expected type String, got type Integer with value 1"
    );
    assert!(lines[1].starts_with("Caller: "));
    assert!(lines[1].contains("test_call_validation.rs"));
    assert!(lines[2].starts_with("Definition: "));
    assert!(lines[2].contains("test_call_validation.rs"));
    assert_ne!(lines[1], lines[2].replace("Definition", "Caller"));
}

#[test]
/// A dynamic override sees signature and options exactly once, and the call proceeds.
fn test_override_receives_signature_and_options() {
    let config = Configuration::shared();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::CallValidationError, Value::Nil);
    let m = greeter(config);

    assert_eq!(m.call("foo", &[Value::from(1)]).unwrap(), Value::symbol("bar"));

    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    let args = &calls[0];
    let Value::Signature(sig) = &args[0] else {
        panic!("expected a signature");
    };
    assert_eq!(sig.method.name, "foo");
    assert_eq!(sig.method.owner, "Greeter");
    let opts = &args[1];
    assert_eq!(opt(opts, "name"), &Value::symbol("a"));
    assert_eq!(opt(opts, "kind"), &Value::from("Parameter"));
    assert_eq!(opt(opts, "type"), &Value::Type(named("String")));
    assert_eq!(opt(opts, "value"), &Value::from(1));
    assert!(matches!(
        opt(opts, "location"),
        Value::Location(l) if l.file.ends_with("test_call_validation.rs")
    ));
    assert!(opt(opts, "message")
        .as_str()
        .unwrap()
        .contains("Expected type String, got type Integer with value 1"));
}

#[test]
/// Valid calls never reach the handler.
fn test_valid_call_does_not_dispatch() {
    let config = Configuration::shared();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::CallValidationError, Value::Nil);
    let m = greeter(config);
    m.call("foo", &[Value::from("ok")]).unwrap();
    assert_eq!(rec.count(), 0);
}

#[test]
/// Parameter and return failures are dispatched separately.
fn test_parameter_and_return_both_dispatch() {
    let config = Configuration::shared();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::CallValidationError, Value::Nil);
    let m = Module::new("Lists", config);
    m.sig(|s| {
        s.params([("items", array_of(named("Integer")))])
            .returns(nilable(named("Integer")));
    })
    .unwrap();
    m.define_method("first", &["items"], |_, _| Ok(Value::from("oops")));

    let out = m
        .call("first", &[Value::Array(vec![Value::from("x")])])
        .unwrap();
    assert_eq!(out, Value::from("oops"));

    let kinds: Vec<Value> = rec
        .calls()
        .iter()
        .map(|args| opt(&args[1], "kind").clone())
        .collect();
    assert_eq!(kinds, vec![Value::from("Parameter"), Value::from("Return value")]);
    assert_eq!(opt(&rec.calls()[1][1], "name"), &Value::Nil);
}

#[test]
/// A failing argument stops the call before the body runs.
fn test_default_handler_stops_before_body() {
    let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = ran.clone();
    let m = Module::new("Side", Configuration::shared());
    m.sig(|s| {
        s.params([("n", named("Integer"))]).void();
    })
    .unwrap();
    m.define_method("touch", &["n"], move |_, _| {
        flag.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(Value::Nil)
    });
    assert!(m.call("touch", &[Value::from("1")]).is_err());
    assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
/// Build errors go to the sig-builder handler with the declaration site.
fn test_builder_error_override() {
    let config = Configuration::shared();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::SigBuilderError, Value::Nil);
    let m = Module::new("Broken", config);
    m.sig(|s| {
        s.returns(named("Symbol")).void();
    })
    .unwrap();
    m.define_method("foo", &[], |_, _| Ok(Value::symbol("bar")));

    assert_eq!(m.call("foo", &[]).unwrap(), Value::symbol("bar"));
    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0][0].as_error().unwrap().to_string(),
        "You can't call .void after calling .returns."
    );
    assert!(matches!(
        &calls[0][1],
        Value::Location(l) if l.file.ends_with("test_call_validation.rs")
    ));
}

#[test]
/// Validation errors go to the sig-validation handler with context.
fn test_validation_error_override() {
    let config = Configuration::shared();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::SigValidationError, Value::Nil);
    let m = Module::new("Lonely", config);
    m.sig(|s| {
        s.override_().returns(named("Symbol"));
    })
    .unwrap();
    m.define_method("foo", &[], |_, _| Ok(Value::symbol("bar")));

    assert_eq!(m.call("foo", &[]).unwrap(), Value::symbol("bar"));
    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0][0]
        .as_error()
        .unwrap()
        .to_string()
        .contains("You marked `foo` as .override, but that method doesn't already exist"));
    let opts = &calls[0][1];
    assert_eq!(opt(opts, "method"), &Value::symbol("foo"));
    assert!(matches!(opt(opts, "declaration"), Value::Declaration(_)));
    assert!(matches!(opt(opts, "signature"), Value::Signature(_)));
    assert_eq!(opt(opts, "super_signature"), &Value::Nil);
}

#[test]
/// A handler may dispatch into another category.
fn test_reentrant_dispatch() {
    let config = Configuration::shared();
    let rec = Recorder::new();
    rec.install(&config, EventCategory::SoftAssert, Value::Nil);
    let inner = config.clone();
    config.set_call_validation_error_handler(move |p| {
        inner.soft_assert(p.message.clone(), Default::default())
    });
    let m = greeter(config);
    assert_eq!(m.call("foo", &[Value::from(2)]).unwrap(), Value::symbol("bar"));
    assert_eq!(rec.count(), 1);
}

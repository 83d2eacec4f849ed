// Tests for the declaration gate (Active vs Inert)
use std::sync::Arc;

use tenet_core::config::Configuration;
use tenet_core::types::Value;
use tenet_enforce::noops::named;
use tenet_enforce::sig::{without_runtime, GateState, Module};

fn int_method(m: &Module) -> GateState {
    m.define_method("double", &["x"], |args, _| match &args[0] {
        Value::Integer(i) => Ok(Value::from(i * 2)),
        other => Ok(other.clone()),
    })
}

#[test]
/// Declaring while disabled installs nothing; violating calls succeed.
fn test_disabled_declaration_never_enforced() {
    let config = Configuration::shared();
    config.set_runtime_check_enabled(false);
    let m = Module::new("Math", config);
    assert_eq!(
        m.sig(|s| {
            s.params([("x", named("Integer"))]).returns(named("Integer"));
        })
        .unwrap(),
        GateState::Inert
    );
    assert_eq!(int_method(&m), GateState::Inert);
    assert_eq!(m.call("double", &[Value::from("hello")]).unwrap(), Value::from("hello"));
}

#[test]
/// Re-enabling later does not wrap a method declared while disabled.
fn test_enable_after_declaration_has_no_effect() {
    let config = Configuration::shared();
    config.set_runtime_check_enabled(false);
    let m = Module::new("Math", config.clone());
    m.sig(|s| {
        s.params([("x", named("Integer"))]).returns(named("Integer"));
    })
    .unwrap();
    int_method(&m);
    config.set_runtime_check_enabled(true);
    assert_eq!(m.call("double", &[Value::from("a")]).unwrap(), Value::from("a"));
}

#[test]
/// Disabling later does not unwrap a method declared while enabled.
fn test_disable_after_declaration_has_no_effect() {
    let config = Configuration::shared();
    let m = Module::new("Math", config.clone());
    m.sig(|s| {
        s.params([("x", named("Integer"))]).returns(named("Integer"));
    })
    .unwrap();
    int_method(&m);
    config.set_runtime_check_enabled(false);
    assert!(m.call("double", &[Value::from("a")]).is_err());
    assert_eq!(m.call("double", &[Value::from(4)]).unwrap(), Value::from(8));
}

#[test]
/// The static-only entry point ignores the global switch.
fn test_without_runtime_ignores_switch() {
    let m = Module::new("Math", Configuration::shared());
    assert_eq!(
        without_runtime(|s| {
            s.params([("x", named("Integer"))]).returns(named("Integer"));
        }),
        GateState::Inert
    );
    assert_eq!(int_method(&m), GateState::Inert);
    assert_eq!(m.call("double", &[Value::from("a")]).unwrap(), Value::from("a"));
}

#[test]
/// A method without any declaration is plain.
fn test_undeclared_method_is_plain() {
    let m = Module::new("Math", Configuration::shared());
    assert_eq!(int_method(&m), GateState::Inert);
    assert!(m.signature("double").unwrap().is_none());
}

#[test]
/// Each module consults the configuration it was given.
fn test_modules_share_configuration() {
    let config = Configuration::shared();
    let a = Module::new("A", config.clone());
    let b = Arc::new(Module::new("B", config.clone()));
    config.set_runtime_check_enabled(false);
    assert_eq!(a.sig(|s| { s.void(); }).unwrap(), GateState::Inert);
    config.set_runtime_check_enabled(true);
    assert_eq!(b.sig(|s| { s.void(); }).unwrap(), GateState::Active);
}

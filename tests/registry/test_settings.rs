// Tests for start-up settings
use std::sync::Arc;

use tenet_core::config::{Configuration, Settings};
use tenet_enforce::noops::named;
use tenet_enforce::sig::{GateState, Module};

#[test]
fn test_settings_disable_runtime_checks() {
    let settings = Settings {
        runtime_checks: false,
        ..Settings::default()
    };
    let config = Arc::new(Configuration::from_settings(&settings));

    let m = Module::new("Svc", config);
    let state = m
        .sig(|s| {
            s.params([("x", named("Integer"))]).void();
        })
        .unwrap();
    assert_eq!(state, GateState::Inert);
}

#[test]
fn test_default_settings_match_new() {
    let config = Configuration::from_settings(&Settings::default());
    assert!(config.runtime_check_enabled());
    assert!(!config.checked_tests_enabled());
    assert_eq!(config.scalar_types(), Configuration::new().scalar_types());
}

#[test]
fn test_settings_scalar_types() {
    let settings = Settings {
        scalar_types: Some(vec!["Money".to_string()]),
        ..Settings::default()
    };
    let config = Configuration::from_settings(&settings);
    assert!(config.is_scalar_type("Money"));
    assert_eq!(config.scalar_types().len(), 1);
}

//! The process-wide contract configuration.
//!
//! A [`Configuration`] is built once at start-up and shared as
//! `Arc<Configuration>` with everything that declares or checks contracts.
//! Every setter takes `&self`, so any holder may reconfigure it later.
//! Reconfiguring while other threads dispatch is allowed but not atomic
//! across categories.
//!
//! [`Settings`] bundles the start-up values for [`Configuration::from_settings`].

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::handlers::{
    self, CallValidationError, EventCategory, HandlerSlot, InlineTypeError, LogMessage,
    SigBuilderError, SigValidationContext, SigValidationError,
};
use crate::types::{ContractError, SourceLocation, Value};

static DEFAULT_SCALAR_TYPES: LazyLock<Arc<BTreeSet<String>>> = LazyLock::new(|| {
    Arc::new(
        [
            "Nil", "True", "False", "Integer", "Float", "String", "Symbol", "Time",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    )
});

/// A contract event with its payload, for category-generic dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    InlineAssertion(InlineTypeError),
    SigBuilderError(SigBuilderError),
    SigValidationError(SigValidationError),
    CallValidationError(CallValidationError),
    LogInfo(LogMessage),
    SoftAssert(LogMessage),
    HardAssert(LogMessage),
}

impl Event {
    pub fn category(&self) -> EventCategory {
        match self {
            Event::InlineAssertion(_) => EventCategory::InlineAssertion,
            Event::SigBuilderError(_) => EventCategory::SigBuilderError,
            Event::SigValidationError(_) => EventCategory::SigValidationError,
            Event::CallValidationError(_) => EventCategory::CallValidationError,
            Event::LogInfo(_) => EventCategory::LogInfo,
            Event::SoftAssert(_) => EventCategory::SoftAssert,
            Event::HardAssert(_) => EventCategory::HardAssert,
        }
    }
}

/// Handler registry plus the global runtime-check switches.
#[derive(Debug)]
pub struct Configuration {
    runtime_checks: AtomicBool,
    checked_tests: AtomicBool,
    sig_forwarded: AtomicBool,
    scalar_types: RwLock<Option<Arc<BTreeSet<String>>>>,
    inline_type_error: HandlerSlot<InlineTypeError>,
    sig_builder_error: HandlerSlot<SigBuilderError>,
    sig_validation_error: HandlerSlot<SigValidationError>,
    call_validation_error: HandlerSlot<CallValidationError>,
    log_info: HandlerSlot<LogMessage>,
    soft_assert: HandlerSlot<LogMessage>,
    hard_assert: HandlerSlot<LogMessage>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            runtime_checks: AtomicBool::new(true),
            checked_tests: AtomicBool::new(false),
            sig_forwarded: AtomicBool::new(false),
            scalar_types: RwLock::new(None),
            inline_type_error: HandlerSlot::new(
                EventCategory::InlineAssertion,
                handlers::inline_type_error_default,
            ),
            sig_builder_error: HandlerSlot::new(
                EventCategory::SigBuilderError,
                handlers::sig_builder_error_default,
            ),
            sig_validation_error: HandlerSlot::new(
                EventCategory::SigValidationError,
                handlers::sig_validation_error_default,
            ),
            call_validation_error: HandlerSlot::new(
                EventCategory::CallValidationError,
                handlers::call_validation_error_default,
            ),
            log_info: HandlerSlot::new(EventCategory::LogInfo, handlers::log_info_default),
            soft_assert: HandlerSlot::new(EventCategory::SoftAssert, handlers::soft_assert_default),
            hard_assert: HandlerSlot::new(EventCategory::HardAssert, handlers::hard_assert_default),
        }
    }

    /// Build a configuration from start-up settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let config = Self::new();
        config.set_runtime_check_enabled(settings.runtime_checks);
        config.checked_tests.store(settings.checked_tests, Ordering::SeqCst);
        if let Some(names) = &settings.scalar_types {
            config.set_scalar_type_names(names.iter().cloned());
        }
        config
    }

    /// Convenience for `Arc::new(Configuration::new())`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // --- runtime switches ---

    pub fn runtime_check_enabled(&self) -> bool {
        self.runtime_checks.load(Ordering::SeqCst)
    }

    /// Only affects signatures declared after the change.
    pub fn set_runtime_check_enabled(&self, enabled: bool) {
        self.runtime_checks.store(enabled, Ordering::SeqCst);
    }

    /// Treat signatures marked `checked(Tests)` like ordinary ones.
    ///
    /// Must happen before any signature reaches the builder; fails otherwise,
    /// since earlier methods were already installed unwrapped.
    pub fn enable_checking_for_sigs_marked_checked_tests(&self) -> Result<(), ContractError> {
        if self.sig_forwarded.load(Ordering::SeqCst) {
            return Err(ContractError::InvalidArgument(
                "Checking for sigs marked checked(tests) must be enabled before any sig is declared"
                    .to_string(),
            ));
        }
        self.checked_tests.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn checked_tests_enabled(&self) -> bool {
        self.checked_tests.load(Ordering::SeqCst)
    }

    /// Record that a declaration has been forwarded to the builder.
    pub fn note_sig_forwarded(&self) {
        self.sig_forwarded.store(true, Ordering::SeqCst);
    }

    // --- scalar types ---

    /// The configured scalar type names, or the built-in default set.
    pub fn scalar_types(&self) -> Arc<BTreeSet<String>> {
        self.scalar_types
            .read()
            .clone()
            .unwrap_or_else(|| DEFAULT_SCALAR_TYPES.clone())
    }

    pub fn is_scalar_type(&self, class_name: &str) -> bool {
        self.scalar_types().contains(class_name)
    }

    /// Replace the scalar type names; `None` restores the defaults.
    ///
    /// Every element must be a `Value::String`; otherwise nothing changes.
    pub fn set_scalar_types(&self, values: Option<&[Value]>) -> Result<(), ContractError> {
        let Some(values) = values else {
            *self.scalar_types.write() = None;
            return Ok(());
        };
        let names = values
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<BTreeSet<String>>>()
            .ok_or_else(|| {
                ContractError::InvalidArgument(
                    "Provided values must all be class name strings.".to_string(),
                )
            })?;
        *self.scalar_types.write() = Some(Arc::new(names));
        Ok(())
    }

    pub fn set_scalar_type_names<S: Into<String>>(&self, names: impl IntoIterator<Item = S>) {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        *self.scalar_types.write() = Some(Arc::new(names));
    }

    // --- handler installation ---

    /// Install a dynamically-typed handler for `category`.
    ///
    /// `Value::Nil` restores the default. Non-callable values fail with
    /// `InvalidArgument` and leave the current handler in place.
    pub fn set_handler(&self, category: EventCategory, value: Value) -> Result<(), ContractError> {
        match category {
            EventCategory::InlineAssertion => self.inline_type_error.set_value(value),
            EventCategory::SigBuilderError => self.sig_builder_error.set_value(value),
            EventCategory::SigValidationError => self.sig_validation_error.set_value(value),
            EventCategory::CallValidationError => self.call_validation_error.set_value(value),
            EventCategory::LogInfo => self.log_info.set_value(value),
            EventCategory::SoftAssert => self.soft_assert.set_value(value),
            EventCategory::HardAssert => self.hard_assert.set_value(value),
        }
    }

    /// Restore the built-in default for `category`.
    pub fn reset_handler(&self, category: EventCategory) {
        match category {
            EventCategory::InlineAssertion => self.inline_type_error.set(None),
            EventCategory::SigBuilderError => self.sig_builder_error.set(None),
            EventCategory::SigValidationError => self.sig_validation_error.set(None),
            EventCategory::CallValidationError => self.call_validation_error.set(None),
            EventCategory::LogInfo => self.log_info.set(None),
            EventCategory::SoftAssert => self.soft_assert.set(None),
            EventCategory::HardAssert => self.hard_assert.set(None),
        }
    }

    pub fn has_override(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::InlineAssertion => self.inline_type_error.is_overridden(),
            EventCategory::SigBuilderError => self.sig_builder_error.is_overridden(),
            EventCategory::SigValidationError => self.sig_validation_error.is_overridden(),
            EventCategory::CallValidationError => self.call_validation_error.is_overridden(),
            EventCategory::LogInfo => self.log_info.is_overridden(),
            EventCategory::SoftAssert => self.soft_assert.is_overridden(),
            EventCategory::HardAssert => self.hard_assert.is_overridden(),
        }
    }

    pub fn set_inline_type_error_handler<F>(&self, f: F)
    where
        F: Fn(&InlineTypeError) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.inline_type_error.set(Some(Arc::new(f)));
    }

    pub fn set_sig_builder_error_handler<F>(&self, f: F)
    where
        F: Fn(&SigBuilderError) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.sig_builder_error.set(Some(Arc::new(f)));
    }

    pub fn set_sig_validation_error_handler<F>(&self, f: F)
    where
        F: Fn(&SigValidationError) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.sig_validation_error.set(Some(Arc::new(f)));
    }

    pub fn set_call_validation_error_handler<F>(&self, f: F)
    where
        F: Fn(&CallValidationError) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.call_validation_error.set(Some(Arc::new(f)));
    }

    pub fn set_log_info_handler<F>(&self, f: F)
    where
        F: Fn(&LogMessage) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.log_info.set(Some(Arc::new(f)));
    }

    pub fn set_soft_assert_handler<F>(&self, f: F)
    where
        F: Fn(&LogMessage) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.soft_assert.set(Some(Arc::new(f)));
    }

    pub fn set_hard_assert_handler<F>(&self, f: F)
    where
        F: Fn(&LogMessage) -> Result<Value, ContractError> + Send + Sync + 'static,
    {
        self.hard_assert.set(Some(Arc::new(f)));
    }

    // --- dispatch ---

    pub fn dispatch(&self, event: &Event) -> Result<Value, ContractError> {
        match event {
            Event::InlineAssertion(p) => self.inline_type_error.dispatch(p),
            Event::SigBuilderError(p) => self.sig_builder_error.dispatch(p),
            Event::SigValidationError(p) => self.sig_validation_error.dispatch(p),
            Event::CallValidationError(p) => self.call_validation_error.dispatch(p),
            Event::LogInfo(p) => self.log_info.dispatch(p),
            Event::SoftAssert(p) => self.soft_assert.dispatch(p),
            Event::HardAssert(p) => self.hard_assert.dispatch(p),
        }
    }

    pub fn inline_type_error(&self, error: ContractError) -> Result<Value, ContractError> {
        self.inline_type_error.dispatch(&InlineTypeError { error })
    }

    pub fn sig_builder_error(
        &self,
        error: ContractError,
        location: SourceLocation,
    ) -> Result<Value, ContractError> {
        self.sig_builder_error
            .dispatch(&SigBuilderError { error, location })
    }

    pub fn sig_validation_error(
        &self,
        error: ContractError,
        context: SigValidationContext,
    ) -> Result<Value, ContractError> {
        self.sig_validation_error
            .dispatch(&SigValidationError { error, context })
    }

    pub fn call_validation_error(
        &self,
        payload: &CallValidationError,
    ) -> Result<Value, ContractError> {
        self.call_validation_error.dispatch(payload)
    }

    pub fn log_info(
        &self,
        message: impl Into<String>,
        extra: IndexMap<String, Value>,
    ) -> Result<Value, ContractError> {
        self.log_info.dispatch(&LogMessage {
            message: message.into(),
            extra,
        })
    }

    pub fn soft_assert(
        &self,
        message: impl Into<String>,
        extra: IndexMap<String, Value>,
    ) -> Result<Value, ContractError> {
        self.soft_assert.dispatch(&LogMessage {
            message: message.into(),
            extra,
        })
    }

    pub fn hard_assert(
        &self,
        message: impl Into<String>,
        extra: IndexMap<String, Value>,
    ) -> Result<Value, ContractError> {
        self.hard_assert.dispatch(&LogMessage {
            message: message.into(),
            extra,
        })
    }
}

/// Start-up values for a [`Configuration`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub runtime_checks: bool,
    /// `None` keeps the default scalar types.
    pub scalar_types: Option<Vec<String>>,
    pub checked_tests: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime_checks: true,
            scalar_types: None,
            checked_tests: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

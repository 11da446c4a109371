//! Unified error type for HookBus.
//!
//! Handler authors return [`HookError`] from their handlers and lifecycle
//! hooks; the registry and the component manager wrap those failures with
//! the event or component they occurred in before surfacing them.

use std::time::Duration;

use thiserror::Error;

use crate::types::lifecycle::{ComponentState, LifecycleStage};

/// The unified error used throughout HookBus.
#[derive(Debug, Error)]
pub enum HookError {
    /// A registered handler returned a failure.
    #[error("handler '{owner}' failed on '{event}': {cause}")]
    HandlerFailure {
        /// Event or filter name.
        event: String,
        /// Owner of the failing handler.
        owner: String,
        /// What the handler returned.
        #[source]
        cause: Box<HookError>,
    },

    /// A registered handler did not complete within the configured cap.
    #[error("handler '{owner}' timed out on '{event}' after {timeout:?}")]
    HandlerTimeout {
        /// Event or filter name.
        event: String,
        /// Owner of the hanging handler.
        owner: String,
        /// The cap that was exceeded.
        timeout: Duration,
    },

    /// A payload or filter value did not have the type bound to the event.
    #[error("type mismatch on '{event}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Event or filter name.
        event: String,
        /// Type bound to the event.
        expected: String,
        /// Type that was supplied.
        found: String,
    },

    /// A component's lifecycle hook failed.
    #[error("{stage} failed for component '{component}': {cause}")]
    LifecycleFailure {
        /// Component identifier.
        component: String,
        /// Stage whose hook failed.
        stage: LifecycleStage,
        /// What the hook returned.
        #[source]
        cause: Box<HookError>,
    },

    /// A lifecycle stage was requested from a state that does not permit it.
    #[error("cannot {stage} component '{component}' while {from}")]
    InvalidTransition {
        /// Component identifier.
        component: String,
        /// State the component was in.
        from: ComponentState,
        /// Stage that was requested.
        stage: LifecycleStage,
    },

    /// No component with this identifier is known to the manager.
    #[error("component '{0}' not found")]
    ComponentNotFound(String),

    /// A component with this identifier is already known to the manager.
    #[error("component '{0}' is already registered")]
    ComponentExists(String),

    /// Component metadata failed validation.
    #[error("invalid component: {0}")]
    InvalidComponent(String),

    /// Generic failure reported by a handler or lifecycle hook.
    #[error("{0}")]
    Failed(String),

    /// Settings storage failure.
    #[error("settings error: {0}")]
    Settings(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HookError {
    /// Create a generic handler failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Create a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid-component error.
    pub fn invalid_component(message: impl Into<String>) -> Self {
        Self::InvalidComponent(message.into())
    }

    /// Wrap a handler's own error with the event and owner it occurred in.
    pub fn handler_failure(
        event: impl Into<String>,
        owner: impl Into<String>,
        cause: HookError,
    ) -> Self {
        Self::HandlerFailure {
            event: event.into(),
            owner: owner.into(),
            cause: Box::new(cause),
        }
    }

    /// Wrap a lifecycle hook's error with the component and stage.
    pub fn lifecycle_failure(
        component: impl Into<String>,
        stage: LifecycleStage,
        cause: HookError,
    ) -> Self {
        Self::LifecycleFailure {
            component: component.into(),
            stage,
            cause: Box::new(cause),
        }
    }

    /// Returns whether this is a type mismatch reported for `event`.
    pub fn is_mismatch_on(&self, event: &str) -> bool {
        matches!(self, Self::TypeMismatch { event: e, .. } if e == event)
    }

    /// Returns the innermost cause by following handler and lifecycle wrappers.
    pub fn root_cause(&self) -> &HookError {
        match self {
            Self::HandlerFailure { cause, .. } | Self::LifecycleFailure { cause, .. } => {
                cause.root_cause()
            }
            other => other,
        }
    }
}

impl From<config::ConfigError> for HookError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

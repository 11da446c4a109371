//! Component lifecycle states and the stages that move between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a component (plugin or theme).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ComponentState {
    /// Known to the host but not yet validated.
    Discovered,
    /// Validated and ready to activate, upgrade or uninstall.
    Inactive,
    /// Activation hook is running.
    Activating,
    /// Activation succeeded; the component's handlers are live.
    Active,
    /// Deactivation hook is running.
    Deactivating,
    /// Uninstall hook is running.
    Uninstalling,
    /// A lifecycle hook failed.
    Error(String),
}

impl ComponentState {
    /// Returns the snake_case name of this state without the error reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Inactive => "inactive",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Deactivating => "deactivating",
            Self::Uninstalling => "uninstalling",
            Self::Error(_) => "error",
        }
    }

    /// Returns whether a lifecycle hook is currently running in this state.
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            Self::Activating | Self::Deactivating | Self::Uninstalling
        )
    }

    /// Returns whether this is the error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the failure reason for the error state.
    pub fn error_reason(&self) -> Option<&str> {
        match self {
            Self::Error(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(reason) => write!(f, "error({reason})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// A requested lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    /// Discovered -> Inactive.
    Load,
    /// Inactive -> Active.
    Activate,
    /// Active -> Inactive.
    Deactivate,
    /// Side transition from Active or Inactive.
    Upgrade,
    /// Inactive -> Discovered.
    Uninstall,
    /// Error -> Inactive (operator reset).
    Recover,
}

impl LifecycleStage {
    /// Returns the snake_case name of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Upgrade => "upgrade",
            Self::Uninstall => "uninstall",
            Self::Recover => "recover",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

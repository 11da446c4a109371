//! Component lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the component manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Upper bound for a single lifecycle hook, in milliseconds.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_ms: u64,
    /// Whether to dispatch `hookbus/component_state_changed` after each transition.
    #[serde(default = "default_true")]
    pub emit_state_events: bool,
}

impl LifecycleConfig {
    /// Returns the per-hook cap as a `Duration`.
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_millis(self.hook_timeout_ms)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            hook_timeout_ms: default_hook_timeout(),
            emit_state_events: default_true(),
        }
    }
}

fn default_hook_timeout() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

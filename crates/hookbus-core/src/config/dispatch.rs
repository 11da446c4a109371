//! Action and filter dispatch configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dispatch settings shared by the action dispatcher and the filter pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound for a single handler invocation, in milliseconds.
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_ms: u64,
}

impl DispatchConfig {
    /// Returns the per-handler cap as a `Duration`.
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            handler_timeout_ms: default_handler_timeout(),
        }
    }
}

fn default_handler_timeout() -> u64 {
    30_000
}

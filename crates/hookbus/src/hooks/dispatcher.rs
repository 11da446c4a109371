//! Action dispatcher: fires an action to its handlers in priority order.
//!
//! - Handlers run one at a time, highest priority first.
//! - Every handler receives the same context and payload.
//! - The first failure (error or timeout) halts the dispatch and is returned.
//!   Side effects of handlers that already ran are kept.
//! - An action with no handlers is a successful no-op, reported as
//!   [`DispatchOutcome::NoHandlers`].

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, warn};

use hookbus_core::config::dispatch::DispatchConfig;
use hookbus_core::{HookError, HookResult};

use super::key::ActionKey;
use super::registry::HookRegistry;
use crate::api::context::HookContext;

/// Result of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Nothing was registered for the action.
    NoHandlers,
    /// Every registered handler ran and succeeded.
    Completed {
        /// Number of handlers invoked.
        invoked: usize,
    },
}

impl DispatchOutcome {
    /// Returns whether nothing was registered for the action.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoHandlers)
    }

    /// Returns the number of handlers that ran.
    pub fn invoked(&self) -> usize {
        match self {
            Self::NoHandlers => 0,
            Self::Completed { invoked } => *invoked,
        }
    }
}

/// Dispatches actions to all registered handlers.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Cap on a single handler invocation.
    handler_timeout: Duration,
}

impl HookDispatcher {
    /// Creates a new action dispatcher.
    pub fn new(registry: Arc<HookRegistry>, config: &DispatchConfig) -> Self {
        Self {
            registry,
            handler_timeout: config.handler_timeout(),
        }
    }

    /// Dispatches `payload` to every handler registered for `key`.
    ///
    /// Handlers are read from a snapshot taken when the dispatch starts;
    /// registrations made while it runs apply to the next dispatch.
    pub async fn dispatch<P>(
        &self,
        key: &ActionKey<P>,
        ctx: &HookContext,
        payload: &P,
    ) -> HookResult<DispatchOutcome>
    where
        P: Send + Sync + 'static,
    {
        let handlers = self.registry.action_snapshot(key).await?;

        if handlers.is_empty() {
            debug!(event = %key, request_id = %ctx.request_id, "No action handlers registered");
            return Ok(DispatchOutcome::NoHandlers);
        }

        debug!(
            event = %key,
            request_id = %ctx.request_id,
            handler_count = handlers.len(),
            "Dispatching action"
        );

        let erased: &(dyn Any + Send + Sync) = payload;

        for entry in &handlers {
            let call = entry.handler.call(key.name(), ctx, erased);

            match tokio::time::timeout(self.handler_timeout, call).await {
                Ok(Ok(())) => {
                    debug!(
                        event = %key,
                        owner = %entry.owner,
                        handler_id = entry.id.as_u64(),
                        "Action handler completed"
                    );
                }
                Ok(Err(err)) if err.is_mismatch_on(key.name()) => {
                    error!(event = %key, owner = %entry.owner, error = %err, "Action payload type mismatch");
                    return Err(err);
                }
                Ok(Err(err)) => {
                    warn!(
                        event = %key,
                        owner = %entry.owner,
                        error = %err,
                        "Action handler failed, halting dispatch"
                    );
                    return Err(HookError::handler_failure(key.name(), &entry.owner, err));
                }
                Err(_) => {
                    error!(
                        event = %key,
                        owner = %entry.owner,
                        timeout_ms = self.handler_timeout.as_millis() as u64,
                        "Action handler timed out, halting dispatch"
                    );
                    return Err(HookError::HandlerTimeout {
                        event: key.name().to_string(),
                        owner: entry.owner.clone(),
                        timeout: self.handler_timeout,
                    });
                }
            }
        }

        Ok(DispatchOutcome::Completed {
            invoked: handlers.len(),
        })
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

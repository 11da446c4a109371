//! Filter pipeline: threads a value through every filter registered for a name.
//!
//! The output of each filter becomes the input of the next, highest priority
//! first. With no filters registered the input is returned unchanged. Any
//! failure halts the pipeline and the partially transformed value is dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use hookbus_core::config::dispatch::DispatchConfig;
use hookbus_core::{HookError, HookResult};

use super::handler::BoxedValue;
use super::key::FilterKey;
use super::registry::HookRegistry;
use crate::api::context::HookContext;

/// Applies filters registered in a [`HookRegistry`].
#[derive(Debug)]
pub struct FilterPipeline {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Cap on a single filter invocation.
    handler_timeout: Duration,
}

impl FilterPipeline {
    /// Creates a new filter pipeline.
    pub fn new(registry: Arc<HookRegistry>, config: &DispatchConfig) -> Self {
        Self {
            registry,
            handler_timeout: config.handler_timeout(),
        }
    }

    /// Runs `initial` through every filter registered for `key`.
    pub async fn apply<V>(&self, key: &FilterKey<V>, ctx: &HookContext, initial: V) -> HookResult<V>
    where
        V: Send + 'static,
    {
        let filters = self.registry.filter_snapshot(key).await?;

        if filters.is_empty() {
            debug!(event = %key, request_id = %ctx.request_id, "No filters registered, value unchanged");
            return Ok(initial);
        }

        debug!(
            event = %key,
            request_id = %ctx.request_id,
            filter_count = filters.len(),
            "Applying filters"
        );

        let mut value: BoxedValue = Box::new(initial);

        for entry in &filters {
            let call = entry.handler.call(key.name(), ctx, value);

            value = match tokio::time::timeout(self.handler_timeout, call).await {
                Ok(Ok(next)) => {
                    debug!(
                        event = %key,
                        owner = %entry.owner,
                        handler_id = entry.id.as_u64(),
                        "Filter applied"
                    );
                    next
                }
                Ok(Err(err)) if err.is_mismatch_on(key.name()) => {
                    error!(event = %key, owner = %entry.owner, error = %err, "Filter value type mismatch");
                    return Err(err);
                }
                Ok(Err(err)) => {
                    warn!(
                        event = %key,
                        owner = %entry.owner,
                        error = %err,
                        "Filter failed, halting pipeline"
                    );
                    return Err(HookError::handler_failure(key.name(), &entry.owner, err));
                }
                Err(_) => {
                    error!(
                        event = %key,
                        owner = %entry.owner,
                        timeout_ms = self.handler_timeout.as_millis() as u64,
                        "Filter timed out, halting pipeline"
                    );
                    return Err(HookError::HandlerTimeout {
                        event: key.name().to_string(),
                        owner: entry.owner.clone(),
                        timeout: self.handler_timeout,
                    });
                }
            };
        }

        value
            .downcast::<V>()
            .map(|v| *v)
            .map_err(|_| HookError::TypeMismatch {
                event: key.name().to_string(),
                expected: std::any::type_name::<V>().to_string(),
                found: "an unrelated value type".to_string(),
            })
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

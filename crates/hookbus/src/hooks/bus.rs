//! Host-facing handle bundling the registry, dispatcher and pipeline.

use std::sync::Arc;

use hookbus_core::HookResult;
use hookbus_core::config::dispatch::DispatchConfig;

use super::dispatcher::{DispatchOutcome, HookDispatcher};
use super::handler::{ActionHandler, FilterHandler};
use super::key::{ActionKey, FilterKey};
use super::pipeline::FilterPipeline;
use super::registry::{HandlerId, HookRegistry};
use crate::api::context::HookContext;

/// Cloneable handle to one hook registry and its dispatch machinery.
///
/// The host creates one `HookBus` and passes clones to whoever needs to
/// register or fire hooks; clones share the same registry.
#[derive(Debug, Clone)]
pub struct HookBus {
    registry: Arc<HookRegistry>,
    dispatcher: Arc<HookDispatcher>,
    pipeline: Arc<FilterPipeline>,
}

impl HookBus {
    /// Creates a bus with an empty registry.
    pub fn new(config: &DispatchConfig) -> Self {
        Self::with_registry(Arc::new(HookRegistry::new()), config)
    }

    /// Creates a bus over an existing registry.
    pub fn with_registry(registry: Arc<HookRegistry>, config: &DispatchConfig) -> Self {
        Self {
            dispatcher: Arc::new(HookDispatcher::new(registry.clone(), config)),
            pipeline: Arc::new(FilterPipeline::new(registry.clone(), config)),
            registry,
        }
    }

    /// Registers an action handler.
    pub async fn add_action<P>(
        &self,
        key: &ActionKey<P>,
        owner: &str,
        priority: i32,
        handler: Arc<dyn ActionHandler<P>>,
    ) -> HookResult<HandlerId>
    where
        P: Send + Sync + 'static,
    {
        self.registry
            .register_action(key, owner, priority, handler)
            .await
    }

    /// Registers a filter handler.
    pub async fn add_filter<V>(
        &self,
        key: &FilterKey<V>,
        owner: &str,
        priority: i32,
        handler: Arc<dyn FilterHandler<V>>,
    ) -> HookResult<HandlerId>
    where
        V: Send + 'static,
    {
        self.registry
            .register_filter(key, owner, priority, handler)
            .await
    }

    /// Removes one registration; a no-op when it is not present.
    pub async fn remove(&self, event: &str, id: HandlerId) -> bool {
        self.registry.unregister(event, id).await
    }

    /// Fires an action.
    pub async fn dispatch<P>(
        &self,
        key: &ActionKey<P>,
        ctx: &HookContext,
        payload: &P,
    ) -> HookResult<DispatchOutcome>
    where
        P: Send + Sync + 'static,
    {
        self.dispatcher.dispatch(key, ctx, payload).await
    }

    /// Runs a value through a filter pipeline.
    pub async fn apply<V>(&self, key: &FilterKey<V>, ctx: &HookContext, value: V) -> HookResult<V>
    where
        V: Send + 'static,
    {
        self.pipeline.apply(key, ctx, value).await
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the action dispatcher.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    /// Returns the filter pipeline.
    pub fn pipeline(&self) -> &Arc<FilterPipeline> {
        &self.pipeline
    }
}

impl Default for HookBus {
    fn default() -> Self {
        Self::new(&DispatchConfig::default())
    }
}

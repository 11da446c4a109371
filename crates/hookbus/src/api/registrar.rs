//! Hook registrar scoped to one component.

use std::sync::Arc;

use tokio::sync::Mutex;

use hookbus_core::HookResult;

use crate::hooks::bus::HookBus;
use crate::hooks::handler::{ActionHandler, FilterHandler};
use crate::hooks::key::{ActionKey, FilterKey};
use crate::hooks::registry::HandlerId;

/// Registers handlers on behalf of a component and remembers what it added.
///
/// Every handler is owned by the component id. The component manager uses
/// the recorded registrations to roll back a failed activation.
#[derive(Debug)]
pub struct ComponentHooks {
    /// Owning component id.
    owner: String,
    /// Bus the handlers are registered on.
    bus: HookBus,
    /// (event, id) of every registration made through this registrar.
    registered: Mutex<Vec<(String, HandlerId)>>,
}

impl ComponentHooks {
    /// Creates a registrar for `owner`.
    pub fn new(owner: &str, bus: HookBus) -> Self {
        Self {
            owner: owner.to_string(),
            bus,
            registered: Mutex::new(Vec::new()),
        }
    }

    /// Returns the owning component id.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Registers an action handler owned by the component.
    pub async fn add_action<P>(
        &self,
        key: &ActionKey<P>,
        priority: i32,
        handler: Arc<dyn ActionHandler<P>>,
    ) -> HookResult<HandlerId>
    where
        P: Send + Sync + 'static,
    {
        let id = self
            .bus
            .add_action(key, &self.owner, priority, handler)
            .await?;
        self.registered
            .lock()
            .await
            .push((key.name().to_string(), id));
        Ok(id)
    }

    /// Registers a filter handler owned by the component.
    pub async fn add_filter<V>(
        &self,
        key: &FilterKey<V>,
        priority: i32,
        handler: Arc<dyn FilterHandler<V>>,
    ) -> HookResult<HandlerId>
    where
        V: Send + 'static,
    {
        let id = self
            .bus
            .add_filter(key, &self.owner, priority, handler)
            .await?;
        self.registered
            .lock()
            .await
            .push((key.name().to_string(), id));
        Ok(id)
    }

    /// Removes a registration made through this registrar.
    pub async fn remove(&self, event: &str, id: HandlerId) -> bool {
        self.registered
            .lock()
            .await
            .retain(|(e, i)| !(e == event && *i == id));
        self.bus.remove(event, id).await
    }

    /// Returns the number of live registrations made through this registrar.
    pub async fn len(&self) -> usize {
        self.registered.lock().await.len()
    }

    /// Returns whether nothing has been registered through this registrar.
    pub async fn is_empty(&self) -> bool {
        self.registered.lock().await.is_empty()
    }

    /// Unregisters everything added through this registrar.
    ///
    /// Returns the number of handlers removed from the registry.
    pub(crate) async fn rollback(&self) -> usize {
        let registered = std::mem::take(&mut *self.registered.lock().await);
        let mut removed = 0;
        for (event, id) in registered {
            if self.bus.remove(&event, id).await {
                removed += 1;
            }
        }
        removed
    }

    /// Returns the bus, for components that need to fire hooks themselves.
    pub fn bus(&self) -> &HookBus {
        &self.bus
    }
}

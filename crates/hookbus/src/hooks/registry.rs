//! Hook registry: components register handlers by event name with priority ordering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use hookbus_core::{HookError, HookResult};

use super::handler::{
    ActionHandler, ErasedAction, ErasedFilter, FilterHandler, Signature, TypedAction,
    TypedFilter,
};
use super::key::{ActionKey, FilterKey};

/// Identity of one registration, unique for the lifetime of a registry.
///
/// Ids are issued in registration order, so they double as the tie-break
/// between handlers of equal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Returns the raw sequence number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Public description of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInfo {
    /// Registration identity.
    pub id: HandlerId,
    /// Event or filter name.
    pub event: String,
    /// Component that registered the handler.
    pub owner: String,
    /// Priority (higher runs first).
    pub priority: i32,
}

enum ErasedHandler {
    Action(Arc<dyn ErasedAction>),
    Filter(Arc<dyn ErasedFilter>),
}

/// Entry in the hook registry.
struct HookEntry {
    id: HandlerId,
    owner: String,
    priority: i32,
    handler: ErasedHandler,
}

impl fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEntry")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("priority", &self.priority)
            .field("handler", &"<handler>")
            .finish()
    }
}

/// All registrations for one event name.
#[derive(Debug)]
struct EventSlot {
    signature: Signature,
    /// Sorted: priority descending, then registration order.
    entries: Vec<HookEntry>,
}

impl EventSlot {
    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
    }
}

/// A handler cloned out of the registry for the duration of one dispatch.
pub(crate) struct Snapshot<H: ?Sized> {
    pub(crate) id: HandlerId,
    pub(crate) owner: String,
    pub(crate) handler: Arc<H>,
}

/// Registry of action and filter handlers organized by event name.
///
/// The first registration for a name binds that name to an action or filter
/// signature with one payload type. Mismatched registrations are rejected
/// with [`HookError::TypeMismatch`]. When the last handler for a name is
/// removed the binding is released.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Event name → slot with its sorted handler list.
    slots: RwLock<HashMap<String, EventSlot>>,
    /// Next registration sequence number.
    next_id: AtomicU64,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action handler for `key`.
    pub async fn register_action<P>(
        &self,
        key: &ActionKey<P>,
        owner: &str,
        priority: i32,
        handler: Arc<dyn ActionHandler<P>>,
    ) -> HookResult<HandlerId>
    where
        P: Send + Sync + 'static,
    {
        self.insert(
            key.name(),
            Signature::action::<P>(),
            owner,
            priority,
            ErasedHandler::Action(TypedAction::erase(handler)),
        )
        .await
    }

    /// Registers a filter handler for `key`.
    pub async fn register_filter<V>(
        &self,
        key: &FilterKey<V>,
        owner: &str,
        priority: i32,
        handler: Arc<dyn FilterHandler<V>>,
    ) -> HookResult<HandlerId>
    where
        V: Send + 'static,
    {
        self.insert(
            key.name(),
            Signature::filter::<V>(),
            owner,
            priority,
            ErasedHandler::Filter(TypedFilter::erase(handler)),
        )
        .await
    }

    async fn insert(
        &self,
        event: &str,
        signature: Signature,
        owner: &str,
        priority: i32,
        handler: ErasedHandler,
    ) -> HookResult<HandlerId> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(event.to_string()).or_insert_with(|| EventSlot {
            signature,
            entries: Vec::new(),
        });

        if slot.signature != signature {
            return Err(HookError::TypeMismatch {
                event: event.to_string(),
                expected: slot.signature.to_string(),
                found: signature.to_string(),
            });
        }

        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        slot.entries.push(HookEntry {
            id,
            owner: owner.to_string(),
            priority,
            handler,
        });
        slot.sort();

        info!(
            event = %event,
            owner = %owner,
            priority = priority,
            handler_id = id.as_u64(),
            "Hook handler registered"
        );

        Ok(id)
    }

    /// Removes one registration. Removing an unknown handler is a no-op.
    ///
    /// Returns whether a handler was removed.
    pub async fn unregister(&self, event: &str, id: HandlerId) -> bool {
        let mut slots = self.slots.write().await;
        let Some(slot) = slots.get_mut(event) else {
            return false;
        };

        let before = slot.entries.len();
        slot.entries.retain(|e| e.id != id);
        let removed = slot.entries.len() != before;

        if slot.entries.is_empty() {
            slots.remove(event);
        }

        if removed {
            debug!(event = %event, handler_id = id.as_u64(), "Hook handler unregistered");
        }
        removed
    }

    /// Unregisters all handlers for a specific owner.
    ///
    /// Returns the number of handlers removed.
    pub async fn unregister_owner(&self, owner: &str) -> usize {
        let mut slots = self.slots.write().await;
        let mut removed = 0;

        for slot in slots.values_mut() {
            let before = slot.entries.len();
            slot.entries.retain(|e| e.owner != owner);
            removed += before - slot.entries.len();
        }

        // Remove empty event entries
        slots.retain(|_, slot| !slot.entries.is_empty());

        if removed > 0 {
            info!(owner = %owner, removed = removed, "All hooks unregistered for owner");
        }
        removed
    }

    /// Returns the action handlers for `key`, in execution order.
    pub(crate) async fn action_snapshot<P: 'static>(
        &self,
        key: &ActionKey<P>,
    ) -> HookResult<Vec<Snapshot<dyn ErasedAction>>> {
        let slots = self.slots.read().await;
        let Some(slot) = slots.get(key.name()) else {
            return Ok(Vec::new());
        };
        check_signature(key.name(), slot, Signature::action::<P>())?;

        Ok(slot
            .entries
            .iter()
            .filter_map(|e| match &e.handler {
                ErasedHandler::Action(h) => Some(Snapshot {
                    id: e.id,
                    owner: e.owner.clone(),
                    handler: h.clone(),
                }),
                ErasedHandler::Filter(_) => None,
            })
            .collect())
    }

    /// Returns the filter handlers for `key`, in execution order.
    pub(crate) async fn filter_snapshot<V: 'static>(
        &self,
        key: &FilterKey<V>,
    ) -> HookResult<Vec<Snapshot<dyn ErasedFilter>>> {
        let slots = self.slots.read().await;
        let Some(slot) = slots.get(key.name()) else {
            return Ok(Vec::new());
        };
        check_signature(key.name(), slot, Signature::filter::<V>())?;

        Ok(slot
            .entries
            .iter()
            .filter_map(|e| match &e.handler {
                ErasedHandler::Filter(h) => Some(Snapshot {
                    id: e.id,
                    owner: e.owner.clone(),
                    handler: h.clone(),
                }),
                ErasedHandler::Action(_) => None,
            })
            .collect())
    }

    /// Returns the registered handlers for an event, in execution order.
    pub async fn handlers(&self, event: &str) -> Vec<HandlerInfo> {
        let slots = self.slots.read().await;
        slots
            .get(event)
            .map(|slot| {
                slot.entries
                    .iter()
                    .map(|e| HandlerInfo {
                        id: e.id,
                        event: event.to_string(),
                        owner: e.owner.clone(),
                        priority: e.priority,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns every handler registered by `owner`, across all events.
    pub async fn handlers_of(&self, owner: &str) -> Vec<HandlerInfo> {
        let slots = self.slots.read().await;
        let mut found: Vec<HandlerInfo> = slots
            .iter()
            .flat_map(|(event, slot)| {
                slot.entries
                    .iter()
                    .filter(|e| e.owner == owner)
                    .map(move |e| HandlerInfo {
                        id: e.id,
                        event: event.clone(),
                        owner: e.owner.clone(),
                        priority: e.priority,
                    })
            })
            .collect();
        found.sort_by_key(|h| h.id);
        found
    }

    /// Returns whether any handlers are registered for an event.
    pub async fn has_handlers(&self, event: &str) -> bool {
        self.handler_count(event).await > 0
    }

    /// Returns the number of handlers registered for an event.
    pub async fn handler_count(&self, event: &str) -> usize {
        let slots = self.slots.read().await;
        slots.get(event).map(|slot| slot.entries.len()).unwrap_or(0)
    }

    /// Returns the signature an event name is currently bound to.
    pub async fn signature(&self, event: &str) -> Option<Signature> {
        let slots = self.slots.read().await;
        slots.get(event).map(|slot| slot.signature)
    }

    /// Returns all event names with at least one handler, sorted.
    pub async fn registered_events(&self) -> Vec<String> {
        let slots = self.slots.read().await;
        let mut events: Vec<String> = slots.keys().cloned().collect();
        events.sort();
        events
    }
}

fn check_signature(event: &str, slot: &EventSlot, requested: Signature) -> HookResult<()> {
    if slot.signature == requested {
        Ok(())
    } else {
        Err(HookError::TypeMismatch {
            event: event.to_string(),
            expected: slot.signature.to_string(),
            found: requested.to_string(),
        })
    }
}

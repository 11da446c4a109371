//! Action fired by the component manager after a transition settles.

use serde::{Deserialize, Serialize};

use hookbus_core::{ComponentState, LifecycleStage};

use crate::hooks::key::ActionKey;

/// Fired after every settled state change of a component.
///
/// Delivery happens after the component's transition lock is released, so
/// listeners may start new transitions. Announcements from two transitions
/// on the same component can therefore arrive out of order; compare
/// [`StateChange::sequence`] to order them.
pub const COMPONENT_STATE_CHANGED: ActionKey<StateChange> =
    ActionKey::new("hookbus/component_state_changed");

/// Payload of [`COMPONENT_STATE_CHANGED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// Component that changed.
    pub component_id: String,
    /// Per-component counter, incremented by every settled change.
    pub sequence: u64,
    /// Stage that caused the change.
    pub stage: LifecycleStage,
    /// State before the stage was requested.
    pub from: ComponentState,
    /// State the component settled in.
    pub to: ComponentState,
}

//! Component lifecycle: transition table and state-change notifications.

pub mod events;
pub mod state;

pub use events::{COMPONENT_STATE_CHANGED, StateChange};
pub use state::Transition;

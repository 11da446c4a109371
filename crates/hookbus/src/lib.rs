//! # hookbus
//!
//! Extension framework for hosts that load plugins and themes. Provides:
//!
//! - Typed action and filter keys bound to one payload type per event
//! - Hook registry with priority-ordered, owner-tagged registrations
//! - Action dispatcher that halts on the first failing handler
//! - Filter pipeline that threads a value through every filter
//! - Component lifecycle management (load, activate, deactivate, upgrade, uninstall)

pub mod api;
pub mod component;
pub mod hooks;
pub mod lifecycle;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod traits;

pub use api::context::HookContext;
pub use component::{Component, ComponentInfo, ComponentKind, ComponentRecord};
pub use hooks::{ActionKey, DispatchOutcome, FilterKey, HandlerId, HookBus, HookRegistry};
pub use manager::ComponentManager;

pub use hookbus_core::{ComponentState, HookError, HookResult, LifecycleStage};

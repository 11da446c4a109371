//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use hookbus_core::{ComponentState, HookError, HookResult, LifecycleStage};

pub use crate::api::context::{
    ActivationContext, Actor, DeactivationContext, HookContext, UninstallContext, UpgradeContext,
};
pub use crate::api::registrar::ComponentHooks;
pub use crate::api::settings::ComponentSettings;
pub use crate::component::{Component, ComponentInfo, ComponentKind};
pub use crate::hooks::handler::{ActionHandler, FilterHandler};
pub use crate::hooks::key::{ActionKey, FilterKey};
pub use crate::traits::{action_fn, filter_fn};

pub use crate::component_info;

//! Component-facing API: contexts, settings and the scoped hook registrar.

pub mod context;
pub mod registrar;
pub mod settings;

pub use context::{
    ActivationContext, Actor, DeactivationContext, HookContext, UninstallContext, UpgradeContext,
};
pub use registrar::ComponentHooks;
pub use settings::{ComponentSettings, MemorySettingsStore, SettingsStore};

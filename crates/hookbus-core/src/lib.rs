//! # hookbus-core
//!
//! Core crate for HookBus. Contains the unified error type, the result
//! alias, configuration schemas and the lifecycle state vocabulary shared
//! by the registry and the component manager.
//!
//! This crate has **no** internal dependencies on other HookBus crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::HookError;
pub use result::HookResult;
pub use types::lifecycle::{ComponentState, LifecycleStage};

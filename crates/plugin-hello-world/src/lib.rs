//! Hello World sample plugin for HookBus.
//!
//! Prefixes page titles with a configurable greeting and counts saved posts.

pub mod hooks;
pub mod plugin;

pub use hooks::{POST_SAVED, PostSaved, THE_TITLE};
pub use plugin::HelloWorldPlugin;

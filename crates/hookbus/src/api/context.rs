//! Contexts handed to hook handlers and lifecycle hooks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::registrar::ComponentHooks;
use super::settings::ComponentSettings;
use crate::component::ComponentInfo;

/// The caller on whose behalf a dispatch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User identifier.
    pub id: Uuid,
    /// Role name, e.g. `"admin"` or `"subscriber"`.
    pub role: String,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(id: Uuid, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }

    /// Returns whether the actor has the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Per-invocation bundle passed unchanged to every handler of one dispatch.
///
/// Handlers only ever see `&HookContext`; attributes are shared behind an
/// `Arc` so cloning a context for a closure handler is cheap.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Identifier of the request that triggered the dispatch.
    pub request_id: Uuid,
    /// The caller, if authenticated.
    pub actor: Option<Actor>,
    /// When the context was created.
    pub timestamp: DateTime<Utc>,
    /// Request-scoped values keyed by string.
    attributes: Arc<HashMap<String, serde_json::Value>>,
}

impl HookContext {
    /// Creates a context with a fresh request id.
    pub fn new() -> Self {
        Self::for_request(Uuid::new_v4())
    }

    /// Creates a context for a known request id.
    pub fn for_request(request_id: Uuid) -> Self {
        Self {
            request_id,
            actor: None,
            timestamp: Utc::now(),
            attributes: Arc::new(HashMap::new()),
        }
    }

    /// Sets the actor.
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Inserts an attribute value.
    pub fn with_attribute(mut self, key: &str, value: serde_json::Value) -> Self {
        Arc::make_mut(&mut self.attributes).insert(key.to_string(), value);
        self
    }

    /// Inserts a string attribute.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_attribute(key, serde_json::json!(value))
    }

    /// Gets an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Gets a string attribute.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// Gets an i64 attribute.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).and_then(|v| v.as_i64())
    }

    /// Gets a bool attribute.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(|v| v.as_bool())
    }

    /// Returns whether the actor is an administrator.
    pub fn is_admin(&self) -> bool {
        self.actor.as_ref().is_some_and(Actor::is_admin)
    }
}

impl Default for HookContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Context for `Component::activate`.
///
/// Handlers registered through [`ActivationContext::hooks`] are owned by the
/// component and rolled back if activation fails.
#[derive(Debug)]
pub struct ActivationContext {
    /// Metadata of the component being activated.
    pub info: ComponentInfo,
    /// The component's settings.
    pub settings: ComponentSettings,
    /// Registrar scoped to the component.
    pub hooks: ComponentHooks,
}

/// Context for `Component::deactivate`.
#[derive(Debug)]
pub struct DeactivationContext {
    /// Metadata of the component being deactivated.
    pub info: ComponentInfo,
    /// The component's settings.
    pub settings: ComponentSettings,
}

/// Context for `Component::upgrade`.
#[derive(Debug)]
pub struct UpgradeContext {
    /// Metadata of the component being upgraded.
    pub info: ComponentInfo,
    /// The component's settings.
    pub settings: ComponentSettings,
    /// Version recorded before the upgrade.
    pub from_version: String,
    /// Version being upgraded to.
    pub to_version: String,
}

/// Context for `Component::uninstall`.
#[derive(Debug)]
pub struct UninstallContext {
    /// Metadata of the component being uninstalled.
    pub info: ComponentInfo,
    /// The component's settings, purged after a successful uninstall.
    pub settings: ComponentSettings,
}

//! Component trait and metadata: what plugins and themes implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hookbus_core::{ComponentState, HookError, HookResult};

use crate::api::context::{
    ActivationContext, DeactivationContext, UninstallContext, UpgradeContext,
};

/// Whether a component is a plugin or a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Feature extension.
    #[default]
    Plugin,
    /// Presentation package.
    Theme,
}

/// Metadata about a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Unique identifier, also the owner of its handlers and settings.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Version string of the component code.
    pub version: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Author or maintainer.
    #[serde(default)]
    pub author: String,
    /// Plugin or theme.
    #[serde(default)]
    pub kind: ComponentKind,
}

impl ComponentInfo {
    /// Checks that the id is a lowercase slug and name/version are present.
    pub fn validate(&self) -> HookResult<()> {
        if self.id.is_empty() {
            return Err(HookError::invalid_component("component id is empty"));
        }
        let valid_id = self
            .id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_id {
            return Err(HookError::invalid_component(format!(
                "component id '{}' must contain only lowercase letters, digits, '-' or '_'",
                self.id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(HookError::invalid_component(format!(
                "component '{}' has no name",
                self.id
            )));
        }
        if self.version.trim().is_empty() {
            return Err(HookError::invalid_component(format!(
                "component '{}' has no version",
                self.id
            )));
        }
        Ok(())
    }
}

/// Trait that all plugins and themes implement.
///
/// Each lifecycle transition calls exactly one of these hooks. Handlers are
/// registered from `activate` through `ctx.hooks`; the manager removes them
/// again on deactivation, uninstall or failure.
#[async_trait]
pub trait Component: Send + Sync + std::fmt::Debug {
    /// Returns component metadata.
    fn info(&self) -> ComponentInfo;

    /// Called on Inactive -> Active.
    async fn activate(&self, ctx: &ActivationContext) -> HookResult<()>;

    /// Called on Active -> Inactive.
    async fn deactivate(&self, ctx: &DeactivationContext) -> HookResult<()>;

    /// Called when the installed version changes.
    async fn upgrade(&self, _ctx: &UpgradeContext) -> HookResult<()> {
        Ok(())
    }

    /// Called on Inactive -> Discovered. Settings are purged afterwards.
    async fn uninstall(&self, _ctx: &UninstallContext) -> HookResult<()> {
        Ok(())
    }
}

/// Lifecycle record the manager keeps for each component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentRecord {
    /// Component metadata.
    pub info: ComponentInfo,
    /// Current lifecycle state.
    pub state: ComponentState,
    /// Version recorded at load or by the last successful upgrade.
    pub installed_version: String,
    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

impl ComponentRecord {
    /// Creates a record in the `Discovered` state.
    pub fn discovered(info: ComponentInfo) -> Self {
        Self {
            installed_version: info.version.clone(),
            info,
            state: ComponentState::Discovered,
            updated_at: Utc::now(),
        }
    }
}

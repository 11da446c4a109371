//! Hello World plugin implementation: registers with the HookBus component manager.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use hookbus::prelude::*;

use crate::hooks::{GreetingTitleFilter, POST_SAVED, SaveCounter, THE_TITLE};

/// Setting holding the greeting used by the title filter.
pub const GREETING_SETTING: &str = "greeting";

/// Setting recording the version whose settings layout is stored.
pub const SCHEMA_SETTING: &str = "schema_version";

const DEFAULT_GREETING: &str = "Hello";

/// Hello World plugin.
#[derive(Debug)]
pub struct HelloWorldPlugin {
    /// Plugin information
    info: ComponentInfo,
    /// Posts saved while the plugin was active.
    saves: Arc<AtomicU64>,
}

impl HelloWorldPlugin {
    /// Create a new Hello World plugin
    pub fn new() -> Self {
        Self::with_version("1.0.0")
    }

    /// Create the plugin reporting a specific code version.
    pub fn with_version(version: &str) -> Self {
        Self {
            info: component_info!(
                id: "hello-world",
                name: "Hello World",
                version: version,
                description: "Greets on page titles and counts saved posts",
                author: "HookBus"
            ),
            saves: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns how many post saves the plugin has seen.
    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for HelloWorldPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for HelloWorldPlugin {
    fn info(&self) -> ComponentInfo {
        self.info.clone()
    }

    async fn activate(&self, ctx: &ActivationContext) -> HookResult<()> {
        let greeting = match ctx.settings.get::<String>(GREETING_SETTING).await? {
            Some(greeting) => greeting,
            None => {
                ctx.settings
                    .set(GREETING_SETTING, DEFAULT_GREETING)
                    .await?;
                DEFAULT_GREETING.to_string()
            }
        };

        ctx.hooks
            .add_filter(&THE_TITLE, 10, Arc::new(GreetingTitleFilter::new(&greeting)))
            .await?;
        ctx.hooks
            .add_action(&POST_SAVED, 0, Arc::new(SaveCounter::new(self.saves.clone())))
            .await?;

        tracing::info!(greeting = %greeting, "Hello World hooks registered: the_title, post_saved");
        Ok(())
    }

    async fn deactivate(&self, _ctx: &DeactivationContext) -> HookResult<()> {
        tracing::info!(saves = self.saves(), "Hello World plugin deactivated");
        Ok(())
    }

    async fn upgrade(&self, ctx: &UpgradeContext) -> HookResult<()> {
        ctx.settings.set(SCHEMA_SETTING, &ctx.to_version).await?;
        tracing::info!(
            from = %ctx.from_version,
            to = %ctx.to_version,
            "Hello World settings migrated"
        );
        Ok(())
    }

    async fn uninstall(&self, ctx: &UninstallContext) -> HookResult<()> {
        let removed = ctx.settings.clear().await?;
        tracing::info!(removed = removed, "Hello World settings removed");
        Ok(())
    }
}

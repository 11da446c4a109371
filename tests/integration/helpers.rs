//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use hookbus::api::context::{
    ActivationContext, DeactivationContext, UninstallContext, UpgradeContext,
};
use hookbus::api::settings::{MemorySettingsStore, SettingsStore};
use hookbus::hooks::handler::ActionHandler;
use hookbus::traits::{action_fn, filter_fn};
use hookbus::{ActionKey, Component, ComponentInfo, ComponentManager, FilterKey, HookBus};
use hookbus_core::config::dispatch::DispatchConfig;
use hookbus_core::config::lifecycle::LifecycleConfig;
use hookbus_core::{HookError, HookResult, LifecycleStage};

/// Action fired after a post is saved.
pub const SAVE_POST: ActionKey<String> = ActionKey::new("save_post");

/// Filter applied to titles.
pub const THE_TITLE: FilterKey<String> = FilterKey::new("the_title");

/// Ordered record of what handlers and hooks ran.
pub type Log = Arc<Mutex<Vec<String>>>;

/// Creates an empty log.
pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Returns a copy of the log's entries.
pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Creates a bus with a one second handler cap.
pub fn bus() -> HookBus {
    HookBus::new(&DispatchConfig {
        handler_timeout_ms: 1_000,
    })
}

/// Action handler that appends `tag:payload` to the log.
pub fn recorder(log: &Log, tag: &str) -> Arc<dyn ActionHandler<String>> {
    let log = log.clone();
    let tag = tag.to_string();
    action_fn(move |_ctx, payload: String| {
        let log = log.clone();
        let tag = tag.clone();
        async move {
            log.lock().unwrap().push(format!("{tag}:{payload}"));
            Ok(())
        }
    })
}

/// Test host: a manager plus the store it writes settings to.
pub struct TestHost {
    /// Component manager under test.
    pub manager: Arc<ComponentManager>,
    /// Backing settings store.
    pub settings: Arc<MemorySettingsStore>,
}

impl TestHost {
    /// Creates a host whose lifecycle hooks are capped at `hook_timeout_ms`.
    pub fn new(hook_timeout_ms: u64) -> Self {
        let settings = Arc::new(MemorySettingsStore::new());
        let store: Arc<dyn SettingsStore> = settings.clone();
        let manager = ComponentManager::new(
            bus(),
            store,
            LifecycleConfig {
                hook_timeout_ms,
                emit_state_events: true,
            },
        );
        Self {
            manager: Arc::new(manager),
            settings,
        }
    }

    /// Returns the bus components register on.
    pub fn bus(&self) -> &HookBus {
        self.manager.bus()
    }
}

/// Configurable component that records every hook call.
///
/// On activation it registers a `the_title` filter that appends `!` and a
/// `save_post` recorder tagged with its id, and stores a `visits` setting.
#[derive(Debug)]
pub struct TestComponent {
    id: String,
    version: String,
    log: Log,
    fail_on: Option<(LifecycleStage, String)>,
    hang_on: Option<LifecycleStage>,
    gate: Option<(LifecycleStage, Arc<Notify>)>,
}

impl TestComponent {
    /// Creates a well-behaved component.
    pub fn new(id: &str, log: &Log) -> Self {
        Self {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            log: log.clone(),
            fail_on: None,
            hang_on: None,
            gate: None,
        }
    }

    /// Makes the hook for `stage` return a failure with `reason`.
    pub fn failing(mut self, stage: LifecycleStage, reason: &str) -> Self {
        self.fail_on = Some((stage, reason.to_string()));
        self
    }

    /// Makes the hook for `stage` never complete.
    pub fn hanging(mut self, stage: LifecycleStage) -> Self {
        self.hang_on = Some(stage);
        self
    }

    /// Makes the hook for `stage` wait until `gate` is notified.
    pub fn gated(mut self, stage: LifecycleStage, gate: Arc<Notify>) -> Self {
        self.gate = Some((stage, gate));
        self
    }

    /// Overrides the reported version.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    async fn step(&self, stage: LifecycleStage) -> HookResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.id, stage));

        if let Some((gated, gate)) = &self.gate {
            if *gated == stage {
                gate.notified().await;
            }
        }
        if self.hang_on == Some(stage) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        match &self.fail_on {
            Some((failing, reason)) if *failing == stage => Err(HookError::failed(reason.clone())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Component for TestComponent {
    fn info(&self) -> ComponentInfo {
        ComponentInfo {
            id: self.id.clone(),
            name: format!("Test {}", self.id),
            version: self.version.clone(),
            description: String::new(),
            author: String::new(),
            kind: Default::default(),
        }
    }

    async fn activate(&self, ctx: &ActivationContext) -> HookResult<()> {
        ctx.hooks
            .add_filter(
                &THE_TITLE,
                0,
                filter_fn(|_ctx, title: String| async move { Ok(title + "!") }),
            )
            .await?;
        ctx.hooks
            .add_action(&SAVE_POST, 0, recorder(&self.log, &self.id))
            .await?;
        ctx.settings.set("visits", &1).await?;
        self.step(LifecycleStage::Activate).await
    }

    async fn deactivate(&self, _ctx: &DeactivationContext) -> HookResult<()> {
        self.step(LifecycleStage::Deactivate).await
    }

    async fn upgrade(&self, ctx: &UpgradeContext) -> HookResult<()> {
        self.log.lock().unwrap().push(format!(
            "{}:upgrade {} -> {}",
            self.id, ctx.from_version, ctx.to_version
        ));
        self.step(LifecycleStage::Upgrade).await
    }

    async fn uninstall(&self, _ctx: &UninstallContext) -> HookResult<()> {
        self.step(LifecycleStage::Uninstall).await
    }
}

//! Component manager: lifecycle management for all plugins and themes.
//!
//! Every transition checks the transition table, runs exactly one lifecycle
//! hook under a time cap and settles the component's state. Transitions on
//! the same component are serialized; a queued transition re-reads the
//! state once it gets its turn.
//!
//! Each transition runs on its own task. Dropping the caller's future
//! (an outer timeout, a `select!`, a cancelled request) detaches from the
//! transition without interrupting it, so a component always settles.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use hookbus_core::config::lifecycle::LifecycleConfig;
use hookbus_core::{ComponentState, HookError, HookResult, LifecycleStage};

use crate::api::context::{
    ActivationContext, DeactivationContext, HookContext, UninstallContext, UpgradeContext,
};
use crate::api::registrar::ComponentHooks;
use crate::api::settings::{ComponentSettings, SettingsStore};
use crate::component::{Component, ComponentRecord};
use crate::hooks::bus::HookBus;
use crate::lifecycle::events::{COMPONENT_STATE_CHANGED, StateChange};
use crate::lifecycle::state::Transition;

/// One managed component.
#[derive(Debug)]
struct ComponentSlot {
    component: Arc<dyn Component>,
    record: RwLock<ComponentRecord>,
    /// Held for the whole duration of a transition.
    transition: Mutex<()>,
    /// Number of settled state changes.
    changes: AtomicU64,
}

/// Everything a transition task needs besides its slot.
#[derive(Debug)]
struct Lifecycle {
    /// Bus shared with the host.
    bus: HookBus,
    /// Settings backing every component's `ComponentSettings`.
    settings: Arc<dyn SettingsStore>,
    /// Lifecycle settings.
    config: LifecycleConfig,
}

/// Drives components through their lifecycle and owns their hook registrations.
#[derive(Debug)]
pub struct ComponentManager {
    /// Shared with running transition tasks.
    lifecycle: Arc<Lifecycle>,
    /// Component id → slot.
    components: RwLock<HashMap<String, Arc<ComponentSlot>>>,
}

impl ComponentManager {
    /// Creates a manager over an existing bus and settings store.
    pub fn new(bus: HookBus, settings: Arc<dyn SettingsStore>, config: LifecycleConfig) -> Self {
        Self {
            lifecycle: Arc::new(Lifecycle {
                bus,
                settings,
                config,
            }),
            components: RwLock::new(HashMap::new()),
        }
    }

    /// Records a component in the `Discovered` state.
    pub async fn discover(&self, component: Arc<dyn Component>) -> HookResult<()> {
        let info = component.info();
        if info.id.is_empty() {
            return Err(HookError::invalid_component("component id is empty"));
        }

        let mut components = self.components.write().await;
        if components.contains_key(&info.id) {
            return Err(HookError::ComponentExists(info.id));
        }

        info!(
            component_id = %info.id,
            name = %info.name,
            version = %info.version,
            "Component discovered"
        );

        components.insert(
            info.id.clone(),
            Arc::new(ComponentSlot {
                component,
                record: RwLock::new(ComponentRecord::discovered(info)),
                transition: Mutex::new(()),
                changes: AtomicU64::new(0),
            }),
        );
        Ok(())
    }

    /// Validates a discovered component, moving it to `Inactive`.
    ///
    /// A component that fails validation stays `Discovered`.
    pub async fn load(&self, id: &str) -> HookResult<()> {
        self.transition(id, LifecycleStage::Load, |lifecycle, slot, id| async move {
            lifecycle.load(&slot, &id).await
        })
        .await
    }

    /// Discovers and loads a component in one step.
    pub async fn install(&self, component: Arc<dyn Component>) -> HookResult<()> {
        let id = component.info().id;
        self.discover(component).await?;
        self.load(&id).await
    }

    /// Activates an inactive component.
    ///
    /// If the activation hook fails, every handler it registered is removed
    /// before the component settles in `Error`.
    pub async fn activate(&self, id: &str) -> HookResult<()> {
        self.transition(id, LifecycleStage::Activate, |lifecycle, slot, id| async move {
            lifecycle.activate(&slot, &id).await
        })
        .await
    }

    /// Deactivates an active component and removes its handlers.
    pub async fn deactivate(&self, id: &str) -> HookResult<()> {
        self.transition(id, LifecycleStage::Deactivate, |lifecycle, slot, id| async move {
            lifecycle.deactivate(&slot, &id).await
        })
        .await
    }

    /// Runs the upgrade hook from the installed version to `to_version`.
    ///
    /// Available from `Active` or `Inactive`. On success the state is
    /// unchanged and `to_version` becomes the installed version. On failure
    /// the state is also unchanged and the failure is returned.
    pub async fn upgrade(&self, id: &str, to_version: &str) -> HookResult<()> {
        let to_version = to_version.to_string();
        self.transition(id, LifecycleStage::Upgrade, move |lifecycle, slot, id| async move {
            lifecycle.upgrade(&slot, &id, &to_version).await
        })
        .await
    }

    /// Uninstalls an inactive component, purging its settings and handlers.
    pub async fn uninstall(&self, id: &str) -> HookResult<()> {
        self.transition(id, LifecycleStage::Uninstall, |lifecycle, slot, id| async move {
            lifecycle.uninstall(&slot, &id).await
        })
        .await
    }

    /// Resets a component in `Error` to `Inactive` so it can be retried.
    pub async fn recover(&self, id: &str) -> HookResult<()> {
        self.transition(id, LifecycleStage::Recover, |lifecycle, slot, id| async move {
            lifecycle.recover(&slot, &id).await
        })
        .await
    }

    /// Deactivates every active component.
    ///
    /// Failures are logged; the failing component is left in `Error`.
    pub async fn shutdown(&self) {
        let mut active = Vec::new();
        for record in self.list().await {
            if record.state == ComponentState::Active {
                active.push(record.info.id);
            }
        }

        for id in &active {
            if let Err(e) = self.deactivate(id).await {
                error!(component_id = %id, error = %e, "Error deactivating component");
            }
        }

        info!(deactivated = active.len(), "Component manager shut down");
    }

    /// Returns the current state of a component.
    pub async fn state(&self, id: &str) -> HookResult<ComponentState> {
        let slot = self.slot(id).await?;
        let state = slot.record.read().await.state.clone();
        Ok(state)
    }

    /// Returns a snapshot of a component's record.
    pub async fn record(&self, id: &str) -> HookResult<ComponentRecord> {
        let slot = self.slot(id).await?;
        let record = slot.record.read().await.clone();
        Ok(record)
    }

    /// Lists all component records sorted by id.
    pub async fn list(&self) -> Vec<ComponentRecord> {
        let slots: Vec<Arc<ComponentSlot>> =
            self.components.read().await.values().cloned().collect();

        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            records.push(slot.record.read().await.clone());
        }
        records.sort_by(|a, b| a.info.id.cmp(&b.info.id));
        records
    }

    /// Returns whether a component is known to the manager.
    pub async fn contains(&self, id: &str) -> bool {
        self.components.read().await.contains_key(id)
    }

    /// Returns the bus components register on.
    pub fn bus(&self) -> &HookBus {
        &self.lifecycle.bus
    }

    /// Returns the settings accessor for a component.
    pub fn scoped_settings(&self, id: &str) -> ComponentSettings {
        self.lifecycle.scoped_settings(id)
    }

    async fn slot(&self, id: &str) -> HookResult<Arc<ComponentSlot>> {
        self.components
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| HookError::ComponentNotFound(id.to_string()))
    }

    /// Runs one transition on its own task and waits for it.
    ///
    /// If the task dies (a panicking hook), a component left in a
    /// transitional state is moved to `Error`.
    async fn transition<F, Fut>(&self, id: &str, stage: LifecycleStage, work: F) -> HookResult<()>
    where
        F: FnOnce(Arc<Lifecycle>, Arc<ComponentSlot>, String) -> Fut,
        Fut: Future<Output = HookResult<()>> + Send + 'static,
    {
        let slot = self.slot(id).await?;
        let task = tokio::spawn(work(self.lifecycle.clone(), slot.clone(), id.to_string()));

        match task.await {
            Ok(result) => result,
            Err(join) => {
                let err = HookError::lifecycle_failure(
                    id,
                    stage,
                    HookError::failed(format!("{stage} task aborted: {join}")),
                );
                self.lifecycle.abandon(&slot, id, stage, &err).await;
                Err(err)
            }
        }
    }
}

impl Lifecycle {
    fn scoped_settings(&self, id: &str) -> ComponentSettings {
        ComponentSettings::new(self.settings.clone(), id)
    }

    async fn load(&self, slot: &ComponentSlot, id: &str) -> HookResult<()> {
        let change = {
            let _guard = slot.transition.lock().await;
            let transition = self.plan(slot, id, LifecycleStage::Load).await?;

            let info = slot.component.info();
            info.validate()
                .map_err(|e| HookError::lifecycle_failure(id, LifecycleStage::Load, e))?;
            if info.id != id {
                return Err(HookError::lifecycle_failure(
                    id,
                    LifecycleStage::Load,
                    HookError::invalid_component(format!(
                        "component reports id '{}' but was discovered as '{id}'",
                        info.id
                    )),
                ));
            }

            {
                let mut record = slot.record.write().await;
                record.installed_version = info.version.clone();
                record.info = info;
            }

            info!(component_id = %id, "Component loaded");
            self.settle(slot, &transition, transition.on_success.clone())
                .await
        };

        self.emit(change).await;
        Ok(())
    }

    async fn activate(&self, slot: &ComponentSlot, id: &str) -> HookResult<()> {
        let (change, result) = {
            let _guard = slot.transition.lock().await;
            let transition = self.plan(slot, id, LifecycleStage::Activate).await?;
            self.enter_running(slot, &transition).await;

            let ctx = ActivationContext {
                info: slot.record.read().await.info.clone(),
                settings: self.scoped_settings(id),
                hooks: ComponentHooks::new(id, self.bus.clone()),
            };

            info!(component_id = %id, "Activating component");
            let outcome = self
                .run_hook(id, LifecycleStage::Activate, slot.component.activate(&ctx))
                .await;

            match outcome {
                Ok(()) => {
                    let handlers = ctx.hooks.len().await;
                    info!(component_id = %id, handlers = handlers, "Component activated");
                    let change = self
                        .settle(slot, &transition, transition.on_success.clone())
                        .await;
                    (change, Ok(()))
                }
                Err(err) => {
                    let rolled_back = ctx.hooks.rollback().await;
                    warn!(
                        component_id = %id,
                        rolled_back = rolled_back,
                        "Rolled back handlers registered during failed activation"
                    );
                    let change = self.fail(slot, &transition, &err).await;
                    (change, Err(err))
                }
            }
        };

        self.emit(change).await;
        result
    }

    async fn deactivate(&self, slot: &ComponentSlot, id: &str) -> HookResult<()> {
        let (change, result) = {
            let _guard = slot.transition.lock().await;
            let transition = self.plan(slot, id, LifecycleStage::Deactivate).await?;
            self.enter_running(slot, &transition).await;

            let ctx = DeactivationContext {
                info: slot.record.read().await.info.clone(),
                settings: self.scoped_settings(id),
            };

            info!(component_id = %id, "Deactivating component");
            let outcome = self
                .run_hook(id, LifecycleStage::Deactivate, slot.component.deactivate(&ctx))
                .await;

            match outcome {
                Ok(()) => {
                    let removed = self.bus.registry().unregister_owner(id).await;
                    info!(component_id = %id, removed = removed, "Component deactivated");
                    let change = self
                        .settle(slot, &transition, transition.on_success.clone())
                        .await;
                    (change, Ok(()))
                }
                Err(err) => {
                    let change = self.fail(slot, &transition, &err).await;
                    (change, Err(err))
                }
            }
        };

        self.emit(change).await;
        result
    }

    async fn upgrade(&self, slot: &ComponentSlot, id: &str, to_version: &str) -> HookResult<()> {
        let _guard = slot.transition.lock().await;
        self.plan(slot, id, LifecycleStage::Upgrade).await?;

        if to_version.trim().is_empty() {
            return Err(HookError::lifecycle_failure(
                id,
                LifecycleStage::Upgrade,
                HookError::invalid_component("target version is empty"),
            ));
        }

        let (info, from_version) = {
            let record = slot.record.read().await;
            (record.info.clone(), record.installed_version.clone())
        };

        let ctx = UpgradeContext {
            info,
            settings: self.scoped_settings(id),
            from_version: from_version.clone(),
            to_version: to_version.to_string(),
        };

        info!(
            component_id = %id,
            from_version = %from_version,
            to_version = %to_version,
            "Upgrading component"
        );

        match self
            .run_hook(id, LifecycleStage::Upgrade, slot.component.upgrade(&ctx))
            .await
        {
            Ok(()) => {
                let mut record = slot.record.write().await;
                record.installed_version = to_version.to_string();
                record.info = slot.component.info();
                record.updated_at = Utc::now();
                info!(component_id = %id, version = %to_version, "Component upgraded");
                Ok(())
            }
            Err(err) => {
                warn!(
                    component_id = %id,
                    error = %err,
                    "Upgrade failed, component keeps its previous state"
                );
                Err(err)
            }
        }
    }

    async fn uninstall(&self, slot: &ComponentSlot, id: &str) -> HookResult<()> {
        let (change, result) = {
            let _guard = slot.transition.lock().await;
            let transition = self.plan(slot, id, LifecycleStage::Uninstall).await?;
            self.enter_running(slot, &transition).await;

            let ctx = UninstallContext {
                info: slot.record.read().await.info.clone(),
                settings: self.scoped_settings(id),
            };

            info!(component_id = %id, "Uninstalling component");
            let mut outcome = self
                .run_hook(id, LifecycleStage::Uninstall, slot.component.uninstall(&ctx))
                .await;

            if outcome.is_ok() {
                outcome = self
                    .settings
                    .remove_all(id)
                    .await
                    .map(|purged| {
                        info!(component_id = %id, purged = purged, "Component settings purged");
                    })
                    .map_err(|e| HookError::lifecycle_failure(id, LifecycleStage::Uninstall, e));
            }

            match outcome {
                Ok(()) => {
                    self.bus.registry().unregister_owner(id).await;
                    info!(component_id = %id, "Component uninstalled");
                    let change = self
                        .settle(slot, &transition, transition.on_success.clone())
                        .await;
                    (change, Ok(()))
                }
                Err(err) => {
                    let change = self.fail(slot, &transition, &err).await;
                    (change, Err(err))
                }
            }
        };

        self.emit(change).await;
        result
    }

    async fn recover(&self, slot: &ComponentSlot, id: &str) -> HookResult<()> {
        let change = {
            let _guard = slot.transition.lock().await;
            let transition = self.plan(slot, id, LifecycleStage::Recover).await?;
            info!(component_id = %id, "Component recovered from error");
            self.settle(slot, &transition, transition.on_success.clone())
                .await
        };

        self.emit(change).await;
        Ok(())
    }

    /// Settles a component whose transition task died mid-way.
    async fn abandon(&self, slot: &ComponentSlot, id: &str, stage: LifecycleStage, err: &HookError) {
        let change = {
            let _guard = slot.transition.lock().await;
            let from = slot.record.read().await.state.clone();
            if !from.is_transitional() {
                return;
            }

            let transition = Transition {
                stage,
                running: from.clone(),
                on_success: from.clone(),
                from,
            };
            self.fail(slot, &transition, err).await
        };

        warn!(component_id = %id, stage = %stage, "Transition task aborted");
        self.emit(change).await;
    }

    async fn plan(
        &self,
        slot: &ComponentSlot,
        id: &str,
        stage: LifecycleStage,
    ) -> HookResult<Transition> {
        let from = slot.record.read().await.state.clone();
        Transition::plan(stage, &from).ok_or_else(|| HookError::InvalidTransition {
            component: id.to_string(),
            from,
            stage,
        })
    }

    async fn enter_running(&self, slot: &ComponentSlot, transition: &Transition) {
        if transition.has_running_state() {
            let mut record = slot.record.write().await;
            record.state = transition.running.clone();
            record.updated_at = Utc::now();
        }
    }

    async fn settle(
        &self,
        slot: &ComponentSlot,
        transition: &Transition,
        to: ComponentState,
    ) -> StateChange {
        let mut record = slot.record.write().await;
        record.state = to.clone();
        record.updated_at = Utc::now();

        StateChange {
            component_id: record.info.id.clone(),
            sequence: slot.changes.fetch_add(1, Ordering::SeqCst) + 1,
            stage: transition.stage,
            from: transition.from.clone(),
            to,
        }
    }

    /// Moves a component to `Error` and drops every handler it owns.
    async fn fail(
        &self,
        slot: &ComponentSlot,
        transition: &Transition,
        err: &HookError,
    ) -> StateChange {
        let id = slot.record.read().await.info.id.clone();
        let removed = self.bus.registry().unregister_owner(&id).await;
        let reason = err.root_cause().to_string();

        error!(
            component_id = %id,
            stage = %transition.stage,
            error = %err,
            removed_handlers = removed,
            "Lifecycle hook failed"
        );

        self.settle(slot, transition, ComponentState::Error(reason))
            .await
    }

    async fn run_hook<F>(&self, id: &str, stage: LifecycleStage, hook: F) -> HookResult<()>
    where
        F: Future<Output = HookResult<()>>,
    {
        let timeout = self.config.hook_timeout();
        match tokio::time::timeout(timeout, hook).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(HookError::lifecycle_failure(id, stage, err)),
            Err(_) => Err(HookError::lifecycle_failure(
                id,
                stage,
                HookError::failed(format!("{stage} hook timed out after {timeout:?}")),
            )),
        }
    }

    async fn emit(&self, change: StateChange) {
        if !self.config.emit_state_events {
            return;
        }

        let ctx = HookContext::new().with_string("component_id", &change.component_id);
        if let Err(err) = self
            .bus
            .dispatch(&COMPONENT_STATE_CHANGED, &ctx, &change)
            .await
        {
            warn!(
                component_id = %change.component_id,
                error = %err,
                "Component state listener failed"
            );
        }
    }
}

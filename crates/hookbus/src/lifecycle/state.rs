//! Transition table for component lifecycle states.

use hookbus_core::{ComponentState, LifecycleStage};

/// A permitted lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Requested stage.
    pub stage: LifecycleStage,
    /// State before the transition.
    pub from: ComponentState,
    /// State while the stage's hook runs.
    pub running: ComponentState,
    /// State after the hook succeeds.
    pub on_success: ComponentState,
}

impl Transition {
    /// Plans `stage` from `from`, or returns `None` if it is not permitted.
    ///
    /// Stages without an intermediate state (load, upgrade, recover) report
    /// `running == from`.
    pub fn plan(stage: LifecycleStage, from: &ComponentState) -> Option<Self> {
        use ComponentState::*;

        let (running, on_success) = match (stage, from) {
            (LifecycleStage::Load, Discovered) => (Discovered, Inactive),
            (LifecycleStage::Activate, Inactive) => (Activating, Active),
            (LifecycleStage::Deactivate, Active) => (Deactivating, Inactive),
            (LifecycleStage::Uninstall, Inactive) => (Uninstalling, Discovered),
            (LifecycleStage::Upgrade, Active) => (Active, Active),
            (LifecycleStage::Upgrade, Inactive) => (Inactive, Inactive),
            (LifecycleStage::Recover, Error(_)) => (from.clone(), Inactive),
            _ => return None,
        };

        Some(Self {
            stage,
            from: from.clone(),
            running,
            on_success,
        })
    }

    /// Returns whether the state changes while the hook runs.
    pub fn has_running_state(&self) -> bool {
        self.running != self.from
    }
}

//! Integration tests for component lifecycle management.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use hookbus::lifecycle::{COMPONENT_STATE_CHANGED, StateChange};
use hookbus::traits::action_fn;
use hookbus::{ComponentInfo, HookContext};
use hookbus_core::{ComponentState, HookError, LifecycleStage};

use helpers::{SAVE_POST, THE_TITLE, TestComponent, TestHost, entries, log};

#[tokio::test]
async fn test_full_lifecycle() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;

    manager
        .install(Arc::new(TestComponent::new("seo", &log)))
        .await
        .unwrap();
    assert_eq!(manager.state("seo").await.unwrap(), ComponentState::Inactive);

    manager.activate("seo").await.unwrap();
    assert_eq!(manager.state("seo").await.unwrap(), ComponentState::Active);

    let ctx = HookContext::new();
    let title = host
        .bus()
        .apply(&THE_TITLE, &ctx, "Hi".to_string())
        .await
        .unwrap();
    assert_eq!(title, "Hi!");
    host.bus()
        .dispatch(&SAVE_POST, &ctx, &"p1".to_string())
        .await
        .unwrap();

    manager.upgrade("seo", "1.1.0").await.unwrap();
    let record = manager.record("seo").await.unwrap();
    assert_eq!(record.state, ComponentState::Active);
    assert_eq!(record.installed_version, "1.1.0");

    manager.deactivate("seo").await.unwrap();
    assert_eq!(manager.state("seo").await.unwrap(), ComponentState::Inactive);
    assert!(host.bus().registry().handlers_of("seo").await.is_empty());
    assert_eq!(host.settings.len(), 1);

    manager.uninstall("seo").await.unwrap();
    assert_eq!(manager.state("seo").await.unwrap(), ComponentState::Discovered);
    assert!(host.settings.is_empty());

    assert_eq!(
        entries(&log),
        vec![
            "seo:activate",
            "seo:p1",
            "seo:upgrade 1.0.0 -> 1.1.0",
            "seo:upgrade",
            "seo:deactivate",
            "seo:uninstall",
        ]
    );
}

#[tokio::test]
async fn test_failed_activation_rolls_back_registrations() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;
    manager
        .install(Arc::new(
            TestComponent::new("shop", &log).failing(LifecycleStage::Activate, "missing table"),
        ))
        .await
        .unwrap();

    let err = manager.activate("shop").await.unwrap_err();
    assert!(matches!(
        err,
        HookError::LifecycleFailure {
            stage: LifecycleStage::Activate,
            ..
        }
    ));
    assert_eq!(
        manager.state("shop").await.unwrap(),
        ComponentState::Error("missing table".to_string())
    );
    assert!(!host.bus().registry().has_handlers("the_title").await);
    assert!(!host.bus().registry().has_handlers("save_post").await);

    let title = host
        .bus()
        .apply(&THE_TITLE, &HookContext::new(), "Hi".to_string())
        .await
        .unwrap();
    assert_eq!(title, "Hi");

    manager.recover("shop").await.unwrap();
    assert_eq!(manager.state("shop").await.unwrap(), ComponentState::Inactive);
}

#[tokio::test]
async fn test_uninstall_failure_enters_error() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;
    manager
        .install(Arc::new(
            TestComponent::new("forum", &log).failing(LifecycleStage::Uninstall, "reason"),
        ))
        .await
        .unwrap();

    assert!(manager.uninstall("forum").await.is_err());
    let state = manager.state("forum").await.unwrap();
    assert_eq!(state, ComponentState::Error("reason".to_string()));
    assert_eq!(state.error_reason(), Some("reason"));
    assert!(manager.contains("forum").await);
    assert!(!manager.contains("missing").await);
}

#[tokio::test]
async fn test_deactivation_failure_purges_handlers() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;
    manager
        .install(Arc::new(
            TestComponent::new("cache", &log).failing(LifecycleStage::Deactivate, "flush failed"),
        ))
        .await
        .unwrap();
    manager.activate("cache").await.unwrap();

    assert!(manager.deactivate("cache").await.is_err());
    assert!(manager.state("cache").await.unwrap().is_error());
    assert!(host.bus().registry().handlers_of("cache").await.is_empty());
}

#[tokio::test]
async fn test_upgrade_failure_keeps_state_and_version() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;
    manager
        .install(Arc::new(
            TestComponent::new("blog", &log).failing(LifecycleStage::Upgrade, "migration failed"),
        ))
        .await
        .unwrap();
    manager.activate("blog").await.unwrap();

    let err = manager.upgrade("blog", "2.0.0").await.unwrap_err();
    assert_eq!(err.root_cause().to_string(), "migration failed");

    let record = manager.record("blog").await.unwrap();
    assert_eq!(record.state, ComponentState::Active);
    assert_eq!(record.installed_version, "1.0.0");
    assert!(host.bus().registry().has_handlers("save_post").await);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_activation_times_out() {
    let host = TestHost::new(100);
    let log = log();
    let manager = &host.manager;
    manager
        .install(Arc::new(
            TestComponent::new("slow", &log).hanging(LifecycleStage::Activate),
        ))
        .await
        .unwrap();

    let err = manager.activate("slow").await.unwrap_err();
    assert!(err.root_cause().to_string().contains("timed out"));
    assert!(manager.state("slow").await.unwrap().is_error());
    assert!(host.bus().registry().handlers_of("slow").await.is_empty());
}

#[tokio::test]
async fn test_disallowed_stages_are_rejected() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;
    manager
        .install(Arc::new(TestComponent::new("seo", &log)))
        .await
        .unwrap();

    let err = manager.deactivate("seo").await.unwrap_err();
    assert!(matches!(
        err,
        HookError::InvalidTransition {
            from: ComponentState::Inactive,
            stage: LifecycleStage::Deactivate,
            ..
        }
    ));

    manager.activate("seo").await.unwrap();
    assert!(manager.uninstall("seo").await.is_err());
    assert!(manager.load("seo").await.is_err());
    assert!(manager.recover("seo").await.is_err());
    assert_eq!(manager.state("seo").await.unwrap(), ComponentState::Active);
    assert_eq!(entries(&log), vec!["seo:activate"]);
}

#[tokio::test]
async fn test_transitions_are_serialized_and_observable() {
    let host = TestHost::new(5_000);
    let log = log();
    let gate = Arc::new(Notify::new());
    host.manager
        .install(Arc::new(
            TestComponent::new("gallery", &log).gated(LifecycleStage::Activate, gate.clone()),
        ))
        .await
        .unwrap();

    let first = {
        let manager = host.manager.clone();
        tokio::spawn(async move { manager.activate("gallery").await })
    };

    while host.manager.state("gallery").await.unwrap() != ComponentState::Activating {
        tokio::task::yield_now().await;
    }

    // Upgrade is not permitted from `Activating`; it can only succeed by
    // waiting for the activation to settle.
    let second = {
        let manager = host.manager.clone();
        tokio::spawn(async move { manager.upgrade("gallery", "1.1.0").await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!second.is_finished());
    assert!(!first.is_finished());

    gate.notify_one();

    assert!(first.await.unwrap().is_ok());
    second.await.unwrap().unwrap();

    let record = host.manager.record("gallery").await.unwrap();
    assert_eq!(record.state, ComponentState::Active);
    assert_eq!(record.installed_version, "1.1.0");
    assert_eq!(
        entries(&log),
        vec![
            "gallery:activate",
            "gallery:upgrade 1.0.0 -> 1.1.0",
            "gallery:upgrade",
        ]
    );
}

#[tokio::test]
async fn test_dropped_activation_still_settles() {
    let host = TestHost::new(5_000);
    let log = log();
    let gate = Arc::new(Notify::new());
    host.manager
        .install(Arc::new(
            TestComponent::new("seo", &log).gated(LifecycleStage::Activate, gate.clone()),
        ))
        .await
        .unwrap();

    let cancelled =
        tokio::time::timeout(Duration::from_millis(50), host.manager.activate("seo")).await;
    assert!(cancelled.is_err());

    gate.notify_one();
    while host.manager.state("seo").await.unwrap().is_transitional() {
        tokio::task::yield_now().await;
    }

    assert_eq!(host.manager.state("seo").await.unwrap(), ComponentState::Active);
    assert_eq!(host.bus().registry().handlers_of("seo").await.len(), 2);
    host.manager.deactivate("seo").await.unwrap();
    assert!(host.bus().registry().handlers_of("seo").await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_failing_activation_rolls_back() {
    let host = TestHost::new(100);
    let log = log();
    host.manager
        .install(Arc::new(
            TestComponent::new("slow", &log).hanging(LifecycleStage::Activate),
        ))
        .await
        .unwrap();

    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), host.manager.activate("slow")).await;
    assert!(cancelled.is_err());

    while host.manager.state("slow").await.unwrap().is_transitional() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let state = host.manager.state("slow").await.unwrap();
    assert!(state.error_reason().is_some_and(|r| r.contains("timed out")));
    assert!(host.bus().registry().handlers_of("slow").await.is_empty());

    host.manager.recover("slow").await.unwrap();
    assert_eq!(host.manager.state("slow").await.unwrap(), ComponentState::Inactive);
}

#[tokio::test]
async fn test_state_changes_are_announced() {
    let host = TestHost::new(1_000);
    let log = log();
    let changes = helpers::log();

    let seen = changes.clone();
    host.bus()
        .add_action(
            &COMPONENT_STATE_CHANGED,
            "host",
            10,
            action_fn(move |_ctx, change: StateChange| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(format!(
                        "{}#{}:{}:{}->{}",
                        change.component_id,
                        change.sequence,
                        change.stage,
                        change.from,
                        change.to
                    ));
                    Ok(())
                }
            }),
        )
        .await
        .unwrap();
    host.bus()
        .add_action(
            &COMPONENT_STATE_CHANGED,
            "broken-listener",
            0,
            action_fn(|_ctx, _change: StateChange| async move {
                Err(HookError::failed("listener down"))
            }),
        )
        .await
        .unwrap();

    let manager = &host.manager;
    manager
        .install(Arc::new(
            TestComponent::new("seo", &log).failing(LifecycleStage::Deactivate, "stuck"),
        ))
        .await
        .unwrap();
    manager.activate("seo").await.unwrap();
    assert!(manager.deactivate("seo").await.is_err());

    assert_eq!(
        entries(&changes),
        vec![
            "seo#1:load:discovered->inactive",
            "seo#2:activate:inactive->active",
            "seo#3:deactivate:active->error(stuck)",
        ]
    );
}

#[tokio::test]
async fn test_components_keep_separate_handlers() {
    let host = TestHost::new(1_000);
    let log = log();
    let manager = &host.manager;
    for id in ["alpha", "beta"] {
        manager
            .install(Arc::new(TestComponent::new(id, &log)))
            .await
            .unwrap();
        manager.activate(id).await.unwrap();
    }

    manager.deactivate("alpha").await.unwrap();
    host.bus()
        .dispatch(&SAVE_POST, &HookContext::new(), &"p".to_string())
        .await
        .unwrap();
    assert!(entries(&log).contains(&"beta:p".to_string()));
    assert!(!entries(&log).contains(&"alpha:p".to_string()));

    manager.shutdown().await;
    let states: Vec<ComponentState> = manager
        .list()
        .await
        .into_iter()
        .map(|record| record.state)
        .collect();
    assert_eq!(states, vec![ComponentState::Inactive, ComponentState::Inactive]);
    assert!(!host.bus().registry().has_handlers("save_post").await);
}

#[tokio::test]
async fn test_invalid_metadata_stays_discovered() {
    #[derive(Debug)]
    struct Nameless;

    #[async_trait::async_trait]
    impl hookbus::Component for Nameless {
        fn info(&self) -> ComponentInfo {
            ComponentInfo {
                id: "nameless".into(),
                name: String::new(),
                version: "1.0.0".into(),
                description: String::new(),
                author: String::new(),
                kind: Default::default(),
            }
        }

        async fn activate(
            &self,
            _ctx: &hookbus::api::context::ActivationContext,
        ) -> hookbus_core::HookResult<()> {
            Ok(())
        }

        async fn deactivate(
            &self,
            _ctx: &hookbus::api::context::DeactivationContext,
        ) -> hookbus_core::HookResult<()> {
            Ok(())
        }
    }

    let host = TestHost::new(1_000);
    let err = host.manager.install(Arc::new(Nameless)).await.unwrap_err();
    assert!(matches!(
        err.root_cause(),
        HookError::InvalidComponent(_)
    ));
    assert_eq!(
        host.manager.state("nameless").await.unwrap(),
        ComponentState::Discovered
    );
    assert!(host.manager.activate("nameless").await.is_err());
}

#[tokio::test]
async fn test_hello_world_plugin() {
    use plugin_hello_world::{HelloWorldPlugin, POST_SAVED, PostSaved};

    let host = TestHost::new(1_000);
    let manager = &host.manager;
    let plugin = Arc::new(HelloWorldPlugin::new());
    manager.install(plugin.clone()).await.unwrap();
    manager
        .scoped_settings("hello-world")
        .set("greeting", "Howdy")
        .await
        .unwrap();
    manager.activate("hello-world").await.unwrap();

    let ctx = HookContext::new();
    let title = host
        .bus()
        .apply(&plugin_hello_world::THE_TITLE, &ctx, "partner".to_string())
        .await
        .unwrap();
    assert_eq!(title, "Howdy, partner");

    host.bus()
        .dispatch(
            &POST_SAVED,
            &ctx,
            &PostSaved {
                post_id: 1,
                title,
            },
        )
        .await
        .unwrap();
    assert_eq!(plugin.saves(), 1);

    manager.deactivate("hello-world").await.unwrap();
    manager.uninstall("hello-world").await.unwrap();
    assert!(host.settings.is_empty());
}

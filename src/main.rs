//! HookBus demo host: drives the Hello World plugin through its lifecycle.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use hookbus::api::settings::{MemorySettingsStore, SettingsStore};
use hookbus::lifecycle::{COMPONENT_STATE_CHANGED, StateChange};
use hookbus::traits::action_fn;
use hookbus::{ComponentManager, HookBus, HookContext};
use hookbus_core::HookError;
use hookbus_core::config::HookBusConfig;
use plugin_hello_world::{HelloWorldPlugin, POST_SAVED, PostSaved, THE_TITLE};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "hookbus-demo", version, about = "Run the Hello World plugin through HookBus")]
struct Args {
    /// Configuration file (optional; HOOKBUS__* variables override it)
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Greeting stored in the plugin's settings before activation
    #[arg(short, long)]
    greeting: Option<String>,

    /// Title passed through the `the_title` filter
    #[arg(short, long, default_value = "World")]
    title: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match HookBusConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, args).await {
        tracing::error!("Demo error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &HookBusConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: HookBusConfig, args: Args) -> Result<(), HookError> {
    tracing::info!("Starting HookBus demo v{}", env!("CARGO_PKG_VERSION"));

    let bus = HookBus::new(&config.dispatch);
    let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::new());
    let manager = ComponentManager::new(bus.clone(), settings, config.lifecycle.clone());

    bus.add_action(
        &COMPONENT_STATE_CHANGED,
        "host",
        0,
        action_fn(|_ctx, change: StateChange| async move {
            tracing::info!(
                component_id = %change.component_id,
                stage = %change.stage,
                from = %change.from,
                to = %change.to,
                "Component state changed"
            );
            Ok(())
        }),
    )
    .await?;

    manager.install(Arc::new(HelloWorldPlugin::new())).await?;

    if let Some(greeting) = &args.greeting {
        manager
            .scoped_settings("hello-world")
            .set("greeting", greeting)
            .await?;
    }

    manager.activate("hello-world").await?;

    let ctx = HookContext::new();
    let title = bus.apply(&THE_TITLE, &ctx, args.title.clone()).await?;
    tracing::info!(input = %args.title, output = %title, "Filtered title");

    let outcome = bus
        .dispatch(
            &POST_SAVED,
            &ctx,
            &PostSaved {
                post_id: 1,
                title: title.clone(),
            },
        )
        .await?;
    tracing::info!(invoked = outcome.invoked(), "Dispatched post_saved");

    manager.upgrade("hello-world", "1.1.0").await?;

    for record in manager.list().await {
        tracing::info!(
            "{}",
            serde_json::to_string(&record).unwrap_or_else(|_| record.info.id.clone())
        );
    }

    manager.deactivate("hello-world").await?;
    let unfiltered = bus.apply(&THE_TITLE, &ctx, args.title.clone()).await?;
    tracing::info!(output = %unfiltered, "Title after deactivation");

    manager.uninstall("hello-world").await?;
    manager.shutdown().await;

    tracing::info!("HookBus demo finished");
    Ok(())
}

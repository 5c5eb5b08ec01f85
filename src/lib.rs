//! Bookstore application library
//!
//! Wires settings, the document store and the access gate into the module
//! registry, and runs the HTTP server over it.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use bookstore_authz::AccessGate;
use bookstore_db::{DocumentStore, MemoryStore, MongoStore};
use bookstore_kernel::{
    settings::{AuthSettings, DatabaseSettings, Settings},
    InitCtx, ModuleRegistry,
};

/// Open the document store described by `settings`: MongoDB when a URL is
/// configured, otherwise an in-memory store
pub async fn open_store(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match &settings.url {
        Some(url) => {
            let store = MongoStore::connect(url, &settings.name)
                .await
                .with_context(|| format!("failed to connect to database '{}'", settings.name))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no database.url configured, books are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Build the access gate from the configured shared secret
pub fn access_gate(settings: &AuthSettings) -> anyhow::Result<AccessGate> {
    let secret = settings
        .api_key
        .clone()
        .context("auth.api_key must be configured")?;
    AccessGate::static_key(secret)
}

/// Build a registry with every module registered against `store`
pub fn build_registry(
    settings: &Settings,
    store: Arc<dyn DocumentStore>,
) -> anyhow::Result<ModuleRegistry> {
    let gate = access_gate(&settings.auth)?;
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, store, gate)?;
    Ok(registry)
}

/// Run the service until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings.database).await?;
    let registry = build_registry(&settings, store)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &settings).await;

    // Stop modules even when the server failed, then report the server error first.
    let stopped = registry.stop_all().await;
    served?;
    stopped?;

    tracing::info!("bookstore-app shutdown complete");
    Ok(())
}

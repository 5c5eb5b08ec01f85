use async_trait::async_trait;
use axum::Router;

/// What a module sees of the running service while it boots.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A slice of the bookstore API: its routes, its OpenAPI paths and the hooks the
/// registry drives at boot and shutdown.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key; must be unique across the service.
    fn name(&self) -> &'static str;

    /// Prepare the module's backing resources, e.g. indexes on its collection.
    /// Runs before the listener binds; an error aborts startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes merged at the application root, so paths are absolute.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI `paths`/`components` fragment folded into `/api-docs/openapi.json`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Runs once every module has initialized, just before serving.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server drained, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub mod books;

use std::sync::Arc;

use bookstore_authz::AccessGate;
use bookstore_db::DocumentStore;
use bookstore_kernel::{settings::Settings, ModuleRegistry};

/// Register all application modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    store: Arc<dyn DocumentStore>,
    gate: AccessGate,
) -> anyhow::Result<()> {
    let repository = books::repository::BookRepository::new(store, &settings.database.collection);
    registry.register(books::create_module(repository, gate))?;
    Ok(())
}

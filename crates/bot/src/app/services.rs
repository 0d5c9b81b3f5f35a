//! Engine wiring for the running process.

use std::sync::Arc;

use keydrop_auth::RoleAdminCheck;
use keydrop_events::TracingLogSink;
use keydrop_infra::{CatalogStore, EntitlementEngine, InMemoryMailbox, JsonFileStore, StoreError};

use crate::config::BotConfig;

/// Engine as wired in production: JSON catalog file, in-process mailbox,
/// role-based admin check, audit records through `tracing`.
pub type BotEngine = EntitlementEngine<JsonFileStore, Arc<InMemoryMailbox>, RoleAdminCheck, TracingLogSink>;

#[derive(Debug)]
pub struct AppServices {
    pub engine: BotEngine,
    pub admin: RoleAdminCheck,
}

impl AppServices {
    pub fn mailbox(&self) -> &InMemoryMailbox {
        self.engine.delivery()
    }
}

/// Load the catalog and assemble the engine. Fails on an unreadable catalog file.
pub fn build_services(config: &BotConfig) -> Result<AppServices, StoreError> {
    let catalog = CatalogStore::load(JsonFileStore::new(config.catalog_path.clone()))?;
    let admin = RoleAdminCheck::new(config.admin_role);

    let engine = EntitlementEngine::new(catalog, Arc::new(InMemoryMailbox::new()), admin, TracingLogSink::new())
        .with_supersede_policy(config.supersede);

    Ok(AppServices { engine, admin })
}

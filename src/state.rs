use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::{CatalogService, ProvisioningService};

/// Shared application state: the database manager plus the services built on
/// it, constructed once at startup and injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub provisioning: Arc<ProvisioningService>,
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseManager>, config: &AppConfig) -> Self {
        let provisioning = Arc::new(ProvisioningService::new(db.clone()));
        let catalog = Arc::new(CatalogService::new(
            db.clone(),
            config.catalog.discovery_sample_size,
        ));
        Self {
            db,
            provisioning,
            catalog,
        }
    }
}

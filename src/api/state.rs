use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::storage::StorageLayout;
use crate::tool::ProvenanceTool;
use crate::workflow::ScratchCleanup;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub layout: Arc<StorageLayout>,
    pub tool: Arc<dyn ProvenanceTool>,
    pub cleanup: ScratchCleanup,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, tool: Arc<dyn ProvenanceTool>) -> Self {
        let layout = StorageLayout::new(config.storage.clone(), config.server.public_url.clone());
        let cleanup = ScratchCleanup::from_secs(config.storage.scratch_ttl_secs);

        Self {
            config: Arc::new(config),
            layout: Arc::new(layout),
            tool,
            cleanup,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

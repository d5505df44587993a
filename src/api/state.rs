use crate::conversation::Orchestrator;
use crate::core::AppConfig;
use crate::roles::RoleCatalog;

pub struct AppState {
    pub catalog: RoleCatalog,
    // Cheap to clone; handlers take a copy before awaiting model calls
    pub orchestrator: Orchestrator,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(catalog: RoleCatalog, orchestrator: Orchestrator, config: AppConfig) -> Self {
        Self {
            catalog,
            orchestrator,
            config,
        }
    }
}

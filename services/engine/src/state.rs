use crate::config::Config;
use crate::directory::InMemoryActorDirectory;
use crate::manager::BoosterManager;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub manager: BoosterManager,
    pub directory: Arc<InMemoryActorDirectory>,
}

impl AppState {
    pub fn new(config: Config, manager: BoosterManager, directory: Arc<InMemoryActorDirectory>) -> Self {
        Self {
            config: Arc::new(config),
            manager,
            directory,
        }
    }
}

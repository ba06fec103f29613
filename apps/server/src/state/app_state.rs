use std::sync::Arc;

use crate::config::Settings;
use crate::ws::registry::RoomRegistry;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<RoomRegistry>,
    settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            registry: Arc::new(RoomRegistry::new()),
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

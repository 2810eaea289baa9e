use std::sync::Arc;

use edex_terminal::TerminalManager;

use crate::allocator::StaticPortAllocator;
use crate::app::setup::AppConfig;
use crate::sounds::SoundBoard;

/// Everything the driver needs, built once in `main` and passed by reference
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub manager: TerminalManager,
    pub sounds: SoundBoard,
    pub allocator: Arc<StaticPortAllocator>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let manager = TerminalManager::websocket(config.manager_options());
        Self::with_manager(config, manager)
    }

    /// Context around an already-built manager
    pub fn with_manager(config: AppConfig, manager: TerminalManager) -> Self {
        let sounds = SoundBoard::new(config.audio);
        let allocator = Arc::new(StaticPortAllocator::new(config.endpoint.port));
        Self {
            config,
            manager,
            sounds,
            allocator,
        }
    }

    /// Tear every session down; safe to call more than once
    pub fn shutdown(&mut self) {
        self.manager.destroy_all();
    }
}

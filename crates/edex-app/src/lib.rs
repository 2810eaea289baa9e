//! edex-shell application library
//!
//! Command line, configuration, application context and the interactive
//! driver around the terminal session manager.

pub mod cli;
pub mod app;
pub mod sounds;
pub mod allocator;

pub use edex_terminal::{self as terminal, TerminalManager};
pub use edex_types as types;

pub use cli::Cli;
pub use app::{init_logging, run_repl_mode, setup_from_cli, AppConfig, AppContext};
pub use sounds::{NullPlayer, SoundBoard, SoundPlayer};
pub use allocator::StaticPortAllocator;

/// Banner written into the main shell on startup
pub const WELCOME_BANNER: &str = "Welcome to eDEX-UI v1.0.0";

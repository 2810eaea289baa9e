pub mod setup;
pub mod context;
pub mod repl;

pub use setup::{init_logging, setup_from_cli, AppConfig};
pub use context::AppContext;
pub use repl::run_repl_mode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use edex_app::{init_logging, run_repl_mode, setup_from_cli, AppContext, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = setup_from_cli(&cli)?;
    let mut ctx = AppContext::new(config);

    if let Err(e) = ctx.manager.initialize().await {
        eprintln!("{} {}", "✗".red(), e.to_string().red());
        return Err(e).context("Terminal system unavailable");
    }
    if !ctx.manager.slot(0)?.is_live() {
        eprintln!(
            "{} {}",
            "⚠".yellow(),
            format!("Main shell at {} is not connected; use :tab 1 to retry", ctx.config.endpoint)
                .yellow()
        );
    }

    let result = run_repl_mode(&mut ctx).await;
    ctx.shutdown();
    result
}

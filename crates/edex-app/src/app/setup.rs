use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use edex_terminal::{ManagerOptions, SurfaceConfig};
use edex_types::{Endpoint, Theme};

use crate::cli::Cli;
use crate::WELCOME_BANNER;

/// Application configuration derived from CLI arguments and environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: Endpoint,
    pub theme: Theme,
    pub font_size: u16,
    pub welcome: bool,
    pub audio: bool,
}

impl AppConfig {
    /// Options the terminal manager is built with
    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            surface: SurfaceConfig::from_theme(&self.theme, self.font_size),
            default_endpoint: self.endpoint.clone(),
            welcome: self.welcome.then(|| WELCOME_BANNER.to_string()),
            ..ManagerOptions::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            theme: Theme::default(),
            font_size: edex_terminal::DEFAULT_FONT_SIZE,
            welcome: true,
            audio: false,
        }
    }
}

/// Load a theme file
pub fn load_theme(path: &Path) -> Result<Theme> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read theme file {}", path.display()))?;
    Theme::from_json(&json).with_context(|| format!("Invalid theme file {}", path.display()))
}

/// Set up application configuration from CLI arguments
pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let theme = match &cli.theme {
        Some(path) => load_theme(path)?,
        None => Theme::default(),
    };

    if cli.font_size == 0 {
        anyhow::bail!("--font-size must be at least 1");
    }

    Ok(AppConfig {
        endpoint: Endpoint::new(cli.host.clone(), cli.port),
        theme,
        font_size: cli.font_size,
        welcome: !cli.no_welcome,
        audio: cli.audio,
    })
}

/// Initialise the `log` backend. An explicit filter wins over `RUST_LOG`.
pub fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.format_timestamp_millis();
    // A second init (tests) is not an error worth reporting
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_setup_with_theme_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"colors": {{"r": 255, "g": 150, "b": 0}}, "terminal": {{"fontSize": 18}}}}"#).unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["edex-shell", "--port", "3100", "--theme", path]).unwrap();
        let config = setup_from_cli(&cli).unwrap();

        assert_eq!(config.endpoint.port, 3100);
        assert_eq!(config.theme.accent_hex(), "#ff9600");

        let options = config.manager_options();
        assert_eq!(options.surface.font_size, 18);
        assert_eq!(options.default_endpoint.port, 3100);
        assert_eq!(options.welcome.as_deref(), Some(WELCOME_BANNER));
    }

    #[test]
    fn test_missing_theme_file() {
        let cli = Cli::try_parse_from(["edex-shell", "--theme", "/nonexistent/theme.json"]).unwrap();
        let err = setup_from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to read theme file"));
    }

    #[test]
    fn test_no_welcome() {
        let cli = Cli::try_parse_from(["edex-shell", "--no-welcome"]).unwrap();
        let options = setup_from_cli(&cli).unwrap().manager_options();
        assert_eq!(options.welcome, None);
    }
}

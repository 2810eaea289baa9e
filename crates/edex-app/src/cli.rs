use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for edex-shell
#[derive(Parser, Debug)]
#[command(name = "edex-shell")]
#[command(about = "Tabbed terminal client for an eDEX-UI style shell server")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Host of the terminal server
    #[arg(long, default_value = "127.0.0.1", env = "EDEX_HOST")]
    pub host: String,

    /// Port of the main shell's WebSocket
    #[arg(long, default_value = "3000", env = "EDEX_PORT")]
    pub port: u16,

    /// Theme file (eDEX theme JSON)
    #[arg(long, value_name = "PATH", env = "EDEX_THEME")]
    pub theme: Option<PathBuf>,

    /// Terminal font size, used when the theme does not set one
    #[arg(long, default_value = "15")]
    pub font_size: u16,

    /// Do not print the welcome banner in the main shell
    #[arg(long)]
    pub no_welcome: bool,

    /// Enable sound feedback
    #[arg(long)]
    pub audio: bool,

    /// Log filter (error, warn, info, debug, trace or a RUST_LOG style directive)
    #[arg(long, value_name = "LEVEL", env = "EDEX_LOG")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["edex-shell"]).unwrap();
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.font_size, 15);
        assert!(!cli.no_welcome);
        assert!(cli.theme.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "edex-shell",
            "--host",
            "10.0.0.2",
            "--port",
            "4000",
            "--theme",
            "tron.json",
            "--no-welcome",
            "--audio",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.host, "10.0.0.2");
        assert_eq!(cli.port, 4000);
        assert_eq!(cli.theme, Some(PathBuf::from("tron.json")));
        assert!(cli.no_welcome && cli.audio);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["edex-shell", "--port", "70000"]).is_err());
    }
}

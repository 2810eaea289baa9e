use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::time::Duration;

use edex_terminal::{Key, KeyEvent, SlotEventKind, TabShortcut, TerminalManager, MAX_SLOTS};

use crate::app::context::AppContext;

/// How long to let the remote shell answer before showing the screen
const ECHO_WAIT: Duration = Duration::from_millis(150);

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Shortcut(TabShortcut),
    New,
    /// Zero-based slot; the focused one when unset
    Close(Option<usize>),
    Screen,
    Tabs,
    Echo(bool),
    Cwd(Option<String>),
    Key(KeyEvent),
    Help,
    Quit,
    /// Anything that is not a command goes to the focused shell
    Send(String),
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix(':') else {
            return Ok(Self::Send(line.to_string()));
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match (name, arg) {
            ("tab", Some(n)) => format!("TAB_{}", n).parse().map(Self::Shortcut),
            ("tab", None) => Err("Usage: :tab <1-5>".to_string()),
            ("next", _) => Ok(Self::Shortcut(TabShortcut::Next)),
            ("prev", _) => Ok(Self::Shortcut(TabShortcut::Previous)),
            ("new", _) => Ok(Self::New),
            ("close", None) => Ok(Self::Close(None)),
            ("close", Some(n)) => match n.parse::<usize>() {
                Ok(n) if (1..=MAX_SLOTS).contains(&n) => Ok(Self::Close(Some(n - 1))),
                _ => Err(format!("No such tab: {}", n)),
            },
            ("screen", _) => Ok(Self::Screen),
            ("tabs", _) => Ok(Self::Tabs),
            ("echo", Some("on")) => Ok(Self::Echo(true)),
            ("echo", Some("off")) => Ok(Self::Echo(false)),
            ("echo", _) => Err("Usage: :echo on|off".to_string()),
            ("cwd", path) => Ok(Self::Cwd(path.map(str::to_string))),
            ("key", Some(key)) => key.parse().map(Self::Key),
            ("key", None) => Err("Usage: :key <name>, e.g. :key ctrl+c".to_string()),
            ("help", _) => Ok(Self::Help),
            ("quit", _) | ("exit", _) => Ok(Self::Quit),
            (other, _) => Err(format!("Unknown command ':{}' (try :help)", other)),
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_cyan().bold());
    for (command, description) in [
        (":tab N", "focus tab N (1-5), opening it if needed"),
        (":next / :prev", "cycle through open tabs"),
        (":new", "ask the server for another shell"),
        (":close [N]", "close tab N, or the focused one"),
        (":screen", "show the focused terminal"),
        (":tabs", "list every tab"),
        (":echo on|off", "render typed input locally"),
        (":cwd [path]", "show or set the focused shell's directory"),
        (":key <name>", "send a key, e.g. ctrl+c, up, tab"),
        (":quit", "close every session and exit"),
    ] {
        println!("  {:<16} {}", command.bright_green(), description.bright_black());
    }
    println!("{}", "Anything else is sent to the focused shell.".bright_black());
}

fn render_tab_bar(manager: &TerminalManager) -> String {
    manager
        .tabs()
        .iter()
        .map(|tab| {
            let label = format!(" {} ", tab.label);
            if tab.active {
                label.black().on_cyan().bold().to_string()
            } else {
                label.cyan().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn print_screen(manager: &TerminalManager) {
    let index = manager.current_index();
    match manager.screen(index) {
        Ok(Some(screen)) => {
            println!("{}", "─".repeat(40).bright_black());
            println!("{}", screen.trim_end());
            println!("{}", "─".repeat(40).bright_black());
        }
        _ => println!("{}", "(no terminal in this tab)".bright_black()),
    }
}

fn print_tabs(manager: &TerminalManager) {
    let tabs = manager.tabs();
    for (info, tab) in manager.slot_info().iter().zip(tabs.iter()) {
        let marker = if info.focused { "*" } else { " " };
        let geometry = info
            .geometry
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".to_string());
        let endpoint = info
            .endpoint
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "-".to_string());
        let since = info
            .created_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {:<14} {:<24} {:>8} {:<21} {} {}",
            marker,
            info.index + 1,
            tab.label.bright_white(),
            info.status.to_string().bright_black(),
            geometry,
            endpoint,
            since.bright_black(),
            info.working_directory
        );
    }
}

/// Report lifecycle changes that happened since the last prompt
fn report_events(ctx: &mut AppContext) {
    for event in ctx.manager.process_events() {
        match event.kind {
            SlotEventKind::Opened => ctx.sounds.play("granted"),
            SlotEventKind::Closed => {
                ctx.sounds.play("denied");
                println!(
                    "{} {}",
                    "⚠".yellow(),
                    format!("Shell {} closed by the server", event.index + 1).yellow()
                );
            }
            SlotEventKind::Failed(reason) => {
                ctx.sounds.play("alarm");
                eprintln!(
                    "{} {}",
                    "✗".red(),
                    format!("Tab {} failed: {}", event.index + 1, reason).red()
                );
            }
        }
    }
}

/// Hand unused ports back to the allocator
fn reclaim_ports(ctx: &AppContext) {
    let held: Vec<u16> = ctx
        .manager
        .slot_info()
        .iter()
        .filter_map(|info| info.endpoint.as_ref().map(|e| e.port))
        .collect();
    ctx.allocator.reclaim(&held);
}

async fn open_new_shell(ctx: &mut AppContext) -> Result<()> {
    let Some(index) = (1..MAX_SLOTS).find(|&i| {
        ctx.manager
            .slot(i)
            .map(|slot| slot.is_vacant())
            .unwrap_or(false)
    }) else {
        println!("{}", "All tabs are in use".yellow());
        return Ok(());
    };

    let opened = ctx.manager.open_shell(index, &*ctx.allocator).await;
    if opened.is_err() {
        reclaim_ports(ctx);
    }
    opened?;
    ctx.manager.focus_session(index).await?;
    Ok(())
}

/// Run one command; returns false when the driver should exit
async fn execute(ctx: &mut AppContext, command: Command) -> Result<bool> {
    match command {
        Command::Shortcut(shortcut) => {
            ctx.sounds.play("folder");
            ctx.manager.apply_shortcut(shortcut).await?;
            println!("{}", render_tab_bar(&ctx.manager));
        }
        Command::New => {
            open_new_shell(ctx).await?;
            println!("{}", render_tab_bar(&ctx.manager));
        }
        Command::Close(index) => {
            let index = index.unwrap_or_else(|| ctx.manager.current_index());
            ctx.manager.destroy_session(index)?;
            reclaim_ports(ctx);
            ctx.sounds.play("panels");
            println!("{}", render_tab_bar(&ctx.manager));
        }
        Command::Screen => print_screen(&ctx.manager),
        Command::Tabs => print_tabs(&ctx.manager),
        Command::Echo(enabled) => {
            let index = ctx.manager.current_index();
            ctx.manager.set_local_echo(index, enabled)?;
            println!("Local echo {} for tab {}", if enabled { "on" } else { "off" }, index + 1);
        }
        Command::Cwd(Some(path)) => {
            let index = ctx.manager.current_index();
            ctx.manager.report_cwd(index, path)?;
        }
        Command::Cwd(None) => {
            let cwd = ctx.manager.current_cwd();
            println!("{}", if cwd.is_empty() { "(unknown)" } else { cwd });
        }
        Command::Key(event) => {
            ctx.sounds.play("keyboard");
            if !ctx.manager.send_key(&event) {
                println!("{}", "No focused terminal".yellow());
            }
        }
        Command::Help => print_help(),
        Command::Quit => return Ok(false),
        Command::Send(line) => {
            ctx.sounds.play("stdin");
            let index = ctx.manager.current_index();
            ctx.manager.write(index, format!("{}\r", line).as_bytes())?;
            tokio::time::sleep(ECHO_WAIT).await;
            print_screen(&ctx.manager);
        }
    }
    Ok(true)
}

/// Run interactive REPL mode
pub async fn run_repl_mode(ctx: &mut AppContext) -> Result<()> {
    println!("{}", "edex-shell".bright_cyan().bold());
    println!(
        "{}",
        format!("Connected to {} • type :help for commands", ctx.config.endpoint).bright_black()
    );
    println!("{}", render_tab_bar(&ctx.manager));

    let mut rl = DefaultEditor::new().context("Failed to start line editor")?;

    loop {
        report_events(ctx);

        let label = ctx
            .manager
            .tabs()
            .into_iter()
            .find(|tab| tab.active)
            .map(|tab| tab.label)
            .unwrap_or_default();
        let prompt = format!("{} {} ", format!("[{}]", label).bright_magenta(), "$".bright_green().bold());

        let readline = tokio::task::block_in_place(|| rl.readline(&prompt));
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match Command::parse(&line) {
                    Ok(command) => match execute(ctx, command).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                    },
                    Err(message) => eprintln!("{}", message.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // ^C belongs to the remote shell
                ctx.manager.send_key(&KeyEvent::ctrl(Key::Char('c')));
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    println!("{}", "Goodbye".bright_black());
    Ok(())
}

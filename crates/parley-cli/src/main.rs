//! parley CLI: Terminal chat widget and headless commands

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use parley_engine::{
    clear_session_id, get_or_create_session_id, ChatWidget, ConfigError, FileStore,
    KeyValueStore, SendOutcome, ThemeController, WidgetConfig, CONFIG_FILE, SESSION_KEY,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Chat with a search-backed assistant from the terminal
#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding config.json, store.json and exports
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the chat backend
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request deadline in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one message and print the reply
    Ask {
        /// Message text
        message: String,

        /// Output the reply as JSON
        #[arg(long, conflicts_with = "html")]
        json: bool,

        /// Output the conversation as a standalone HTML page
        #[arg(long)]
        html: bool,
    },

    /// Print the session identifier
    Session {
        /// Forget the current session and start a new one
        #[arg(long)]
        reset: bool,
    },

    /// Show or switch the color theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Write the default config to the data directory
    Init,

    /// Print resolved configuration and stored state
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum ThemeAction {
    /// Print the active theme (default)
    Show,
    /// Switch between light and dark
    Toggle,
}

/// Flag values layered over the config file.
#[derive(Debug, Default)]
struct Overrides {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
}

const APP_DIR: &str = "parley";
const LOG_ENV: &str = "PARLEY_LOG";
const LOG_FILE: &str = "parley.log";

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();
    let overrides = Overrides {
        base_url: cli.base_url,
        timeout_ms: cli.timeout_ms,
    };

    let result = resolve_data_dir(cli.data_dir).and_then(|data_dir| match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&data_dir, &overrides),
        Some(Commands::Ask {
            message,
            json,
            html,
        }) => cmd_ask(&data_dir, &overrides, &message, json, html),
        Some(Commands::Session { reset }) => cmd_session(&data_dir, reset),
        Some(Commands::Theme { action }) => {
            cmd_theme(&data_dir, &overrides, action.unwrap_or(ThemeAction::Show))
        }
        Some(Commands::Init) => cmd_init(&data_dir, &overrides),
        Some(Commands::Doctor { json }) => cmd_doctor(&data_dir, &overrides, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    flag.or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
        .ok_or_else(|| "could not determine a data directory, pass --data-dir".into())
}

/// Config file values with flag overrides applied.
fn resolve_config(data_dir: &Path, overrides: &Overrides) -> Result<WidgetConfig, ConfigError> {
    let mut config = WidgetConfig::load_or_default(&data_dir.join(CONFIG_FILE))?;
    if let Some(base_url) = &overrides.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file so the alternate screen stays clean.
fn init_file_logging(data_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_widget(
    data_dir: &Path,
    config: WidgetConfig,
) -> Result<ChatWidget, Box<dyn std::error::Error>> {
    let store = FileStore::in_dir(data_dir)?;
    debug!(path = %store.path().display(), "Opened store");
    Ok(ChatWidget::new(config, Box::new(store))?)
}

fn cmd_tui(data_dir: &Path, overrides: &Overrides) -> CliResult {
    init_file_logging(data_dir)?;
    let config = resolve_config(data_dir, overrides)?;
    let widget = open_widget(data_dir, config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(parley_tui::run_tui(widget, data_dir))
}

fn cmd_ask(
    data_dir: &Path,
    overrides: &Overrides,
    message: &str,
    json: bool,
    html: bool,
) -> CliResult {
    init_stderr_logging();
    let config = resolve_config(data_dir, overrides)?;
    let mut widget = open_widget(data_dir, config)?;

    let rt = tokio::runtime::Runtime::new()?;
    widget.set_input(message);
    let outcome = rt.block_on(widget.send());

    match outcome {
        SendOutcome::Ignored => Err("message is empty".into()),
        SendOutcome::Failed(text) => {
            if json {
                println!("{}", serde_json::json!({ "error": text }));
            }
            Err(text.into())
        }
        SendOutcome::Replied => {
            if html {
                println!("{}", widget.export_html());
                return Ok(());
            }

            let Some(reply) = widget.transcript().messages().last() else {
                return Err("no reply in transcript".into());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(reply)?);
            } else {
                println!("{}", reply.text);
                if !reply.sources.is_empty() {
                    println!();
                    for source in &reply.sources {
                        println!("  {source}");
                    }
                }
            }
            Ok(())
        }
    }
}

fn cmd_session(data_dir: &Path, reset: bool) -> CliResult {
    init_stderr_logging();
    let mut store = FileStore::in_dir(data_dir)?;
    if reset {
        clear_session_id(&mut store);
    }
    println!("{}", get_or_create_session_id(&mut store));
    Ok(())
}

fn cmd_theme(data_dir: &Path, overrides: &Overrides, action: ThemeAction) -> CliResult {
    init_stderr_logging();
    let config = resolve_config(data_dir, overrides)?;
    let mut store = FileStore::in_dir(data_dir)?;
    let mut theme = ThemeController::initialize(&store, config.enable_theme_toggle);

    if action == ThemeAction::Toggle {
        if !theme.toggle_enabled() {
            return Err("theme toggle is disabled (enable_theme_toggle is false)".into());
        }
        theme.toggle(&mut store);
    }
    println!("{} {}", theme.icon(), theme.marker());
    Ok(())
}

fn cmd_init(data_dir: &Path, overrides: &Overrides) -> CliResult {
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    let config = resolve_config(data_dir, overrides)?;
    config.save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_doctor(data_dir: &Path, overrides: &Overrides, json: bool) -> CliResult {
    let config = resolve_config(data_dir, overrides)?;
    let config_path = data_dir.join(CONFIG_FILE);
    let store = FileStore::in_dir(data_dir)?;
    let session_id = store.get(SESSION_KEY)?;
    let theme = ThemeController::initialize(&store, config.enable_theme_toggle);

    if json {
        let report = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": data_dir,
            "config_file": config_path,
            "config_file_exists": config_path.exists(),
            "store_file": store.path(),
            "session_id": session_id,
            "theme": theme.marker(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("parley {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Data dir:    {}", data_dir.display());
    let suffix = if config_path.exists() { "" } else { " (missing, using defaults)" };
    println!("Config file: {}{suffix}", config_path.display());
    println!("Store file:  {}", store.path().display());
    println!();
    println!("Base URL:    {}", config.base_url);
    println!("Timeout:     {} ms", config.timeout_ms);
    println!("Markdown:    {}", on_off(config.enable_markdown));
    println!("Steps:       {}", on_off(config.enable_thinking_log));
    println!("Toggle:      {}", on_off(config.enable_theme_toggle));
    println!();
    println!("Session:     {}", session_id.as_deref().unwrap_or("(none yet)"));
    println!("Theme:       {} {}", theme.icon(), theme.marker());
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

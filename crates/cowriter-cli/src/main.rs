use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cowriter_core::CowriterConfig;

/// cowriter — an AI pair writer in your terminal.
///
/// Opens a draft editor that fetches a continuation whenever you pause
/// typing and renders it as ghost text; Tab accepts it, typing through it
/// consumes it. `cowriter serve` runs the suggestion backend the editor
/// talks to.
#[derive(Parser, Debug)]
#[command(name = "cowriter", version, about)]
struct Cli {
    /// Connect to a running suggestion backend instead of starting one
    /// inside the editor (e.g. http://127.0.0.1:8000).
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Debounce window in milliseconds before a paused draft is sent out.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the suggestion backend in the foreground.
    Serve {
        /// Bind host (overrides the config file).
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides the config file).
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve { host, port }) => serve(host, port, cli.verbose).await,
        None => edit(cli.endpoint, cli.debounce_ms, cli.verbose).await,
    }
}

/// Run the suggestion backend until interrupted.
async fn serve(host: Option<String>, port: Option<u16>, verbose: u8) -> Result<()> {
    // The server owns the terminal's stderr, so log there directly.
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    cowriter_backend::server::start_server(&config).await
}

/// Run the ghost-text editor.
async fn edit(endpoint: Option<String>, debounce_ms: Option<u64>, verbose: u8) -> Result<()> {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Log to a file to avoid corrupting the TUI output. If the log file
    // can't be opened, silently discard logs rather than polluting the
    // alternate screen buffer.
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("cowriter");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("cowriter.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(filter))
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            // Fallback: discard all logs to avoid TUI corruption.
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }

    let mut config = load_config();
    if let Some(debounce) = debounce_ms {
        config.editor.debounce_ms = debounce;
    }

    tracing::info!("Starting cowriter v{}", env!("CARGO_PKG_VERSION"));

    let mut app = cowriter_tui::App::new(config, endpoint);
    app.run().await?;

    tracing::info!("cowriter exited cleanly");
    Ok(())
}

/// Build the log filter: `COWRITER_LOG` wins, then `RUST_LOG`, then the
/// verbosity flags.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env("COWRITER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_config() -> CowriterConfig {
    CowriterConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        CowriterConfig::default()
    })
}

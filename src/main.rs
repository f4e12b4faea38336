// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::info;

use taskdeck::api::ApiClient;
use taskdeck::app::App;
use taskdeck::config::Config;
use taskdeck::session::{sign_out, SessionStore};

#[derive(Parser)]
#[command(
    name = "taskdeck",
    about = "Terminal client for the team task manager",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// API root URL, e.g. http://127.0.0.1:8000/api
    #[arg(long, env = "TASKDECK_API_URL")]
    api_url: Option<String>,

    /// Data directory for the session file and config.toml
    #[arg(long, env = "TASKDECK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, env = "TASKDECK_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKDECK_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Launch the interactive terminal UI (default when no subcommand given).
    ///
    /// Sign in with an existing account or register a new one; a stored
    /// session resumes without a password prompt.
    ///
    /// Examples:
    ///   taskdeck
    ///   taskdeck ui
    Ui,
    /// Print the account behind the stored session.
    ///
    /// Asks the server who the stored access token belongs to. Exits 1
    /// when no session is stored or the server rejects the token.
    ///
    /// Examples:
    ///   taskdeck whoami
    ///   taskdeck whoami --json
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Invalidate the server-side session and forget the local one.
    ///
    /// The local session file is removed even when the server cannot be
    /// reached, so this always leaves the machine signed out.
    ///
    /// Examples:
    ///   taskdeck logout
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::new(args.api_url, args.data_dir, args.log);

    match args.command {
        None | Some(Command::Ui) => {
            // The TUI owns the terminal, so logs go to a rolling file,
            // never to stdout.
            let _file_guard = setup_tui_logging(&config, args.log_file.as_deref());
            info!(
                version = env!("CARGO_PKG_VERSION"),
                api_url = %config.api_url,
                "starting taskdeck"
            );
            App::new(config)?.run().await?;
        }
        Some(Command::Whoami { json }) => {
            setup_cli_logging(&config);
            let code = run_whoami(&config, json).await;
            std::process::exit(code);
        }
        Some(Command::Logout) => {
            setup_cli_logging(&config);
            run_logout(&config).await?;
        }
    }

    Ok(())
}

// ─── Logging setup ───────────────────────────────────────────────────────

/// File-only tracing for the TUI. Returns a `WorkerGuard` that must stay
/// alive for the process lifetime. If the log directory cannot be
/// created, logging is disabled rather than corrupting the screen.
fn setup_tui_logging(
    config: &Config,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let path = log_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.data_dir.join("taskdeck.log"));
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let filename = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("taskdeck.log"));

    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "warn: could not create log directory '{}': {e}; file logging disabled",
            dir.display()
        );
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(EnvFilter::new(&config.log))
            .with(fmt::layer().json().with_writer(non_blocking))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::new(&config.log))
            .with(fmt::layer().compact().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Some(guard)
}

/// Stderr tracing for the one-shot subcommands; stdout stays clean for
/// their own output.
fn setup_cli_logging(config: &Config) {
    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(config.log.as_str())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(config.log.as_str())
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

// ─── taskdeck whoami ─────────────────────────────────────────────────────

/// Returns exit code: 0 = signed in, 1 = no session or rejected token.
async fn run_whoami(config: &Config, json: bool) -> i32 {
    let store = SessionStore::new(&config.data_dir);
    let Some(session) = store.load() else {
        eprintln!("Not signed in. Launch the UI to sign in: taskdeck");
        return 1;
    };

    let api = match ApiClient::new(&config.api_url, config.timeout()) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Checking session...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = api.me(&session.access).await;
    spinner.finish_and_clear();

    match result {
        Ok(user) => {
            if json {
                match serde_json::to_string_pretty(&user) {
                    Ok(s) => println!("{s}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        return 1;
                    }
                }
            } else {
                println!("{} ({}) <{}>", user.username, user.role, user.email);
            }
            0
        }
        Err(err) => {
            eprintln!("Session invalid: {err}");
            1
        }
    }
}

// ─── taskdeck logout ─────────────────────────────────────────────────────

async fn run_logout(config: &Config) -> Result<()> {
    let store = SessionStore::new(&config.data_dir);
    if store.load().is_none() {
        println!("No session stored.");
        return Ok(());
    }
    let api = ApiClient::new(&config.api_url, config.timeout())?;
    sign_out(&api, &store).await?;
    println!("Logged out.");
    Ok(())
}

#![deny(unsafe_code)]

mod config;
mod exit_code;

use std::io::{self, IsTerminal};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "tokio-console")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webdav_utils::{ServerConfig, WebDavError, WebDavServer};

use crate::config::{Config, Overrides};

/// Serve a local directory over WebDAV with permissive CORS headers
#[derive(Parser)]
#[command(name = "webdav-utils")]
#[command(author, version)]
#[command(after_help = "EXAMPLES:
    # Serve ./data on port 8011 to any origin
    webdav-utils

    # Serve a project directory to a single web editor, locally only
    webdav-utils --dir ~/projects --bind 127.0.0.1 --allow-origin https://editor.example.com
")]
struct Cli {
    /// Directory to serve (created if missing) [default: ./data]
    #[arg(short, long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Port to listen on, 0 to auto-assign [default: 8011]
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(short, long, value_name = "IP")]
    bind: Option<IpAddr>,

    /// URL path to serve the directory under [default: /]
    #[arg(long, value_name = "PATH")]
    prefix: Option<String>,

    /// Value of Access-Control-Allow-Origin [default: *]
    #[arg(long, value_name = "ORIGIN")]
    allow_origin: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", env = "WEBDAV_UTILS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            dir: cli.dir.clone(),
            port: cli.port,
            bind: cli.bind,
            prefix: cli.prefix.clone(),
            allow_origin: cli.allow_origin.clone(),
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(categorize_error(&e))
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose, cli.quiet);

    let file_config = Config::load(cli.config.as_deref())?;
    let server_config = file_config.resolve(&Overrides::from(&cli))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(serve(server_config))
}

/// Run the server until Ctrl-C or SIGTERM.
async fn serve(config: ServerConfig) -> Result<()> {
    let server = WebDavServer::start(config)
        .await
        .context("Failed to start WebDAV server")?;

    info!(root = %server.root().display(), "WebDAV server running on {}", server.addr);

    shutdown_signal().await;

    info!("Shutting down");
    server.stop().await;
    Ok(())
}

/// Resolve when the process is asked to terminate.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Map an error to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    let startup_failure = e
        .chain()
        .filter_map(|cause| cause.downcast_ref::<WebDavError>())
        .any(WebDavError::is_startup_failure);

    if startup_failure {
        exit_code::STARTUP_FAILED
    } else {
        exit_code::GENERAL_ERROR
    }
}

fn setup_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let ansi = io::stderr().is_terminal();

    #[cfg(feature = "tokio-console")]
    {
        use std::net::SocketAddr;
        use tracing_subscriber::Layer;

        let console_port: u16 = std::env::var("TOKIO_CONSOLE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(6669);

        let console_addr: SocketAddr = ([127, 0, 0, 1], console_port).into();
        let fmt_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

        let console_layer = console_subscriber::ConsoleLayer::builder()
            .server_addr(console_addr)
            .spawn();
        tracing_subscriber::registry()
            .with(console_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(io::stderr)
                    .with_filter(fmt_filter),
            )
            .init();
        info!("tokio-console enabled, connect with: tokio-console http://127.0.0.1:{}", console_port);
    }

    #[cfg(not(feature = "tokio-console"))]
    {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(ansi)
            .with_writer(io::stderr)
            .init();
    }
}

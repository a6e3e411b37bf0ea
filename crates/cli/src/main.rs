//! `chainview`: drive the OAuth credential lifecycle from a terminal.

#![allow(clippy::print_stdout)]

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use chainview_domain::ChainViewError;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "chainview", version, about = "ChainView credential manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON); overrides environment variables.
    #[arg(long, global = true, env = "CHAINVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an authorization and print the URL to open.
    Authorize,
    /// Complete an authorization from the provider's redirect.
    Callback {
        /// Full redirect URL as shown in the browser address bar.
        #[arg(long, conflicts_with_all = ["code", "state"])]
        url: Option<String>,
        /// Authorization code from the redirect.
        #[arg(long, requires = "state")]
        code: Option<String>,
        /// State parameter from the redirect.
        #[arg(long, requires = "code")]
        state: Option<String>,
    },
    /// Authorize, receive the redirect on the loopback address, and report.
    Login {
        /// Keep running and refresh the access token before it expires.
        #[arg(long)]
        keep_alive: bool,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    match cli.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chainview_infra::config::load_dotenv();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "chainview starting");

    let config = chainview_infra::config::load(cli.config.clone())?;
    for warning in config.validate() {
        warn!(%warning, "Configuration warning");
    }

    let result = match cli.command {
        Commands::Authorize => commands::authorize(&config).await,
        Commands::Callback { url, code, state } => {
            let input = commands::CallbackInput::from_args(url, code, state)?;
            commands::callback(&config, input).await
        }
        Commands::Login { keep_alive } => commands::login(&config, keep_alive).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(err) = &result {
        if let Some(domain) = err.downcast_ref::<ChainViewError>() {
            error!(kind = domain.label(), error = %domain, "Command failed");
        }
    }
    result
}

//! Prescription Console - command-line front-end for the prescription API

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use prescription_console::{
    cli::{self, Cli},
    config::{AppConfig, LoggingConfig},
    error::ErrorCode,
    services::Services,
    AppError, AppState,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(e.code() as u8);
        }
    };

    let _guard = init_tracing(&config.logging);
    tracing::debug!("Prescription Console v{}", env!("CARGO_PKG_VERSION"));

    match run(config, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            let code = e
                .downcast_ref::<AppError>()
                .map(AppError::code)
                .unwrap_or(ErrorCode::Failure);
            ExitCode::from(code as u8)
        }
    }
}

fn load_config(args: &Cli) -> Result<AppConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

async fn run(config: AppConfig, args: Cli) -> anyhow::Result<()> {
    let services = Services::from_config(&config).context("Failed to create API client")?;
    let state = AppState::new(config, services);

    let mut stdout = std::io::stdout().lock();
    cli::run(&state, args.command, &mut stdout).await?;
    Ok(())
}

/// Install the global subscriber; the guard must live until exit to flush file output
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("prescription_console={}", config.level).into());

    let (writer, guard) = match &config.file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "prescription-console.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry.with(fmt::layer().with_writer(writer)).init();
    }

    guard
}

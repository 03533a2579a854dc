//! `waddle` - read Gmail and Facebook from one terminal prompt.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use waddle_core::service::{
    FacebookCredentials, FacebookRenderer, GmailCredentials, GmailRenderer, facebook, gmail,
};
use waddle_core::{
    Config, Console, Router, Runnable, ServiceController, ServiceSession, SharedRuntime,
};

#[derive(Parser)]
#[command(name = "waddle")]
#[command(about = "Read Gmail and Facebook from one prompt", long_about = None)]
struct Cli {
    /// Log more to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to <config dir>/waddle/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("waddle: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let default = format!("waddle={level},waddle_core={level},waddle_oauth={level}");

    // stdout belongs to the console.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&path).context("loading configuration")?;
    info!("configuration loaded from {}", path.display());

    let runtime: SharedRuntime = Arc::new(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("starting the async runtime")?,
    );
    let timeout = config.http_timeout();

    let gmail = ServiceSession::new(
        gmail::profile(&config.gmail),
        GmailCredentials::new(config.gmail.clone(), timeout, Arc::clone(&runtime)),
        GmailRenderer,
    );
    let facebook = ServiceSession::new(
        facebook::profile(&config.facebook),
        FacebookCredentials::new(config.facebook.clone(), timeout, Arc::clone(&runtime)),
        FacebookRenderer,
    );

    let services: Vec<Box<dyn ServiceController>> = vec![Box::new(gmail), Box::new(facebook)];
    let mut router = Router::new(services)?;
    info!(
        services = ?router.service_names().collect::<Vec<_>>(),
        "starting"
    );

    router.run(&mut Console::stdio())?;
    info!("shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["waddle", "-vv", "--config", "/tmp/waddle.json"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/waddle.json")));
    }
}

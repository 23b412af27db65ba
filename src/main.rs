//! `send-mqtt`: publish JSON Lines from standard input to an MQTT broker.
//!
//! ```text
//! cat logfile | send-mqtt -H broker.local -t ucentral
//! ```

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ucmsg::app;
use ucmsg::config::{Cli, Config};
use ucmsg::network::tcp::TcpConnector;

fn main() -> ExitCode {
    // Variables already set in the environment take precedence over `.env`.
    dotenvy::dotenv().ok();
    let config = Config::from(Cli::parse());
    init_tracing(config.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut connector = TcpConnector::default();
    match app::run(&config, &mut connector, io::stdin().lock(), &mut out) {
        Ok(status) => status.into(),
        Err(e) => {
            error!(error = %e, "writing output failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

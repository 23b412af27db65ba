//! One complete `send-mqtt` run: connect, drain input, disconnect, report.
//!
//! The connector and the input are parameters so the whole flow can run
//! against in-memory connections.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing::{debug, error};

use crate::config::Config;
use crate::driver::{Driver, Outcome, Summary};
use crate::network::application::mqtt::Client;
use crate::network::error::Error;
use crate::network::{Connect, Read};

/// How a run ended, as far as the exit code is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Input was drained, possibly with skipped lines.
    Completed,
    /// The broker could not be reached or refused the session. No input was
    /// read.
    ConnectFailed(Error),
    /// A publish failed and the rest of the input was left unread.
    PublishFailed(Error),
}

impl Status {
    /// Process exit code: 0 for [`Status::Completed`], 1 otherwise.
    pub fn code(&self) -> u8 {
        match self {
            Status::Completed => 0,
            Status::ConnectFailed(_) | Status::PublishFailed(_) => 1,
        }
    }

    fn from_summary(summary: &Summary) -> Self {
        match &summary.outcome {
            Outcome::PublishFailed(e) => Status::PublishFailed(*e),
            Outcome::Drained | Outcome::InputFailed(_) => Status::Completed,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/// Runs the tool once with `config`.
///
/// In dry-run mode `connector` is never used. Errors are only returned for
/// failures writing to `out`; connection and publish failures are reported
/// on `out` and in the returned [`Status`].
pub fn run<K, R, W>(config: &Config, connector: &mut K, input: R, out: &mut W) -> io::Result<Status>
where
    K: Connect<Error = Error>,
    <K::Connection as Read>::Error: Into<Error>,
    R: BufRead,
    W: Write,
{
    debug!(
        host = %config.host,
        port = config.port,
        topic = %config.topic,
        dry_run = config.dry_run,
        "starting"
    );
    writeln!(
        out,
        "Connect to {}:{} as {} using topic {}",
        config.host, config.port, config.user, config.topic
    )?;

    if config.dry_run {
        let summary = Driver::new(config, &mut *out).run(input, None)?;
        writeln!(out, "{summary}")?;
        return Ok(Status::from_summary(&summary));
    }

    let connected = connector
        .connect(&config.broker_address())
        .and_then(|connection| Client::connect(connection, config.mqtt_options()));
    let (mut client, ack) = match connected {
        Ok(connected) => connected,
        Err(e) => {
            writeln!(out, "Failed to connect to MQTT broker: {e}")?;
            error!(error = %e, address = %config.broker_address(), "connect failed");
            return Ok(Status::ConnectFailed(e));
        }
    };
    if config.verbose {
        writeln!(out, "onconnect: Session present: {}", ack.session_present)?;
    }

    let summary = Driver::new(config, &mut *out).run(input, Some(&mut client))?;

    let disconnected = client.disconnect();
    if config.verbose {
        writeln!(
            out,
            "ondisconnect: flags packet_sent={}",
            disconnected.packet_sent
        )?;
        match disconnected.error {
            Some(e) => writeln!(out, "Disconnect rc={e}")?,
            None => writeln!(out, "Disconnect rc=success")?,
        }
    } else {
        writeln!(out, "Disconnected")?;
    }

    writeln!(out, "{summary}")?;
    Ok(Status::from_summary(&summary))
}

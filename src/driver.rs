//! Drains JSON Lines input into the broker, one envelope per line.
//!
//! Lines are handled strictly in order. A line that does not parse is
//! reported and skipped; a publish failure ends the run. Nothing is retried.

use std::fmt;
use std::io::{self, BufRead};

use tracing::{debug, warn};

use crate::config::Config;
use crate::envelope::{Envelope, Rejection};
use crate::network::Connection;
use crate::network::application::mqtt::{Client, QoS};
use crate::network::error::Error;

/// Publishing side of the broker connection.
pub trait Publish {
    /// Hands one message to the transport. Returns once the transport has
    /// accepted it.
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), Error>;
}

impl<C: Connection> Publish for Client<C> {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), Error> {
        Client::publish(self, topic, payload, qos, retain)
    }
}

/// How draining ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Input reached its end.
    Drained,
    /// A publish call failed; remaining input was left unread.
    PublishFailed(Error),
    /// Reading input failed; treated as end of input.
    InputFailed(io::ErrorKind),
}

/// Result of one run over the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Envelopes published, or encoded in dry-run mode.
    pub sent: usize,
    /// Lines skipped because they produced no envelope.
    pub rejected: usize,
    /// Why draining stopped.
    pub outcome: Outcome,
}

impl Summary {
    /// True unless a publish failed.
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, Outcome::PublishFailed(_))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sent == 1 {
            write!(f, "Sent 1 message")
        } else {
            write!(f, "Sent {} messages", self.sent)
        }
    }
}

/// Turns input lines into envelopes and publishes them.
///
/// Progress and per-line diagnostics go to `out`.
#[derive(Debug)]
pub struct Driver<'a, W: io::Write> {
    config: &'a Config,
    out: W,
}

impl<'a, W: io::Write> Driver<'a, W> {
    /// A driver publishing to `config.topic`, writing progress to `out`.
    pub fn new(config: &'a Config, out: W) -> Self {
        Self { config, out }
    }

    /// Encodes one line, reporting progress or the rejection.
    ///
    /// A rejection is returned as `Ok(Err(_))`; the outer error is only for
    /// failures writing to `out`.
    pub fn encode(&mut self, line: &str) -> io::Result<Result<Vec<u8>, Rejection>> {
        let envelope = match Envelope::from_json_line(line) {
            Ok(envelope) => envelope,
            Err(rejection) => {
                writeln!(
                    self.out,
                    "Error: Can't parse JSON line: {}",
                    line.trim_end_matches(['\r', '\n'])
                )?;
                warn!(%rejection, "skipping input line");
                return Ok(Err(rejection));
            }
        };
        writeln!(
            self.out,
            "Sending message: topic: {}, serial: {}, timestamp: {}",
            envelope.topic, envelope.serial, envelope.timestamp
        )?;
        if self.config.verbose {
            writeln!(self.out, "  Message: {}", envelope.msg)?;
        }
        Ok(Ok(envelope.encode()))
    }

    /// Drains `input` line by line.
    ///
    /// With `publisher` set to `None`, or in dry-run mode, envelopes are
    /// encoded and counted but never published.
    pub fn run<R: BufRead>(
        &mut self,
        input: R,
        mut publisher: Option<&mut dyn Publish>,
    ) -> io::Result<Summary> {
        let mut summary = Summary {
            sent: 0,
            rejected: 0,
            outcome: Outcome::Drained,
        };

        for chunk in input.split(b'\n') {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "reading input failed");
                    summary.outcome = Outcome::InputFailed(e.kind());
                    break;
                }
            };

            let encoded = match std::str::from_utf8(&chunk) {
                Ok(line) => self.encode(line)?,
                Err(_) => {
                    writeln!(
                        self.out,
                        "Error: Can't parse JSON line: {}",
                        String::from_utf8_lossy(&chunk).trim_end_matches(['\r', '\n'])
                    )?;
                    warn!(rejection = %Rejection::NotUtf8, "skipping input line");
                    Err(Rejection::NotUtf8)
                }
            };
            let payload = match encoded {
                Ok(payload) => payload,
                Err(_) => {
                    summary.rejected += 1;
                    continue;
                }
            };

            if !self.config.dry_run {
                if let Some(publisher) = publisher.as_deref_mut() {
                    if let Err(e) =
                        publisher.publish(&self.config.topic, &payload, QoS::AtMostOnce, false)
                    {
                        writeln!(self.out, "Failed to send message: {e}")?;
                        warn!(error = %e, sent = summary.sent, "publish failed, stopping");
                        summary.outcome = Outcome::PublishFailed(e);
                        break;
                    }
                }
            }
            summary.sent += 1;
        }

        debug!(
            sent = summary.sent,
            rejected = summary.rejected,
            outcome = ?summary.outcome,
            "input drained"
        );
        Ok(summary)
    }
}

//! Runtime configuration.
//!
//! Built once at startup from the command line, with `MQTT_*` environment
//! variables (optionally from a `.env` file) filling in anything not given on
//! the command line, and hard-coded defaults behind those.

use clap::Parser;
use rand::Rng;

use crate::network::application::mqtt::{Credentials, Options};

/// Broker host when neither `--host` nor `MQTT_HOST` is given.
pub const DEFAULT_HOST: &str = "localhost";
/// Broker port when neither `--port` nor `MQTT_PORT` is given.
pub const DEFAULT_PORT: u16 = 1883;
/// Broker topic when neither `--topic` nor `MQTT_TOPIC` is given.
pub const DEFAULT_TOPIC: &str = "ucentral";
/// User name when neither `--user` nor `MQTT_USER` is given.
pub const DEFAULT_USER: &str = "test";
/// Password when neither `--password` nor `MQTT_PASS` is given.
pub const DEFAULT_PASS: &str = "";

const CLIENT_ID_PREFIX: &str = "ucentralmqtt-pub";
const KEEP_ALIVE_SECONDS: u16 = 60;

/// Command line surface of `send-mqtt`.
#[derive(Parser, Debug, Clone)]
#[command(name = "send-mqtt")]
#[command(about = "Send MQTT messages from JSONL read on standard input")]
pub struct Cli {
    /// Don't send to MQTT
    #[arg(short = 'd', long = "dryrun", default_value_t = false)]
    pub dry_run: bool,

    /// Host to send to
    #[arg(short = 'H', long, env = "MQTT_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Password
    #[arg(
        short = 'p',
        long,
        env = "MQTT_PASS",
        default_value = DEFAULT_PASS,
        hide_env_values = true
    )]
    pub password: String,

    /// Port to send on
    #[arg(short = 'P', long, env = "MQTT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Topic on which to send to
    #[arg(short = 't', long, env = "MQTT_TOPIC", default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// User name
    #[arg(short = 'u', long, env = "MQTT_USER", default_value = DEFAULT_USER)]
    pub user: String,

    /// Verbose tracing
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Everything the run needs, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Broker topic every envelope is published to.
    pub topic: String,
    /// Broker user name.
    pub user: String,
    /// Broker password, possibly empty.
    pub password: String,
    /// MQTT client identifier.
    pub client_id: String,
    /// Encode and report without connecting or publishing.
    pub dry_run: bool,
    /// Print payloads and connection events.
    pub verbose: bool,
}

impl Config {
    /// `host:port` suitable for socket address resolution. IPv6 literals are
    /// bracketed.
    pub fn broker_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// CONNECT options for this configuration: clean session, 60 second
    /// keep-alive, user name and password always sent.
    pub fn mqtt_options(&self) -> Options<'_> {
        Options {
            client_id: &self.client_id,
            keep_alive_seconds: KEEP_ALIVE_SECONDS,
            clean_session: true,
            credentials: Some(Credentials {
                username: &self.user,
                password: Some(&self.password),
            }),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let client_id = format!(
            "{CLIENT_ID_PREFIX}-{}",
            rand::thread_rng().gen_range(0..=1000)
        );
        Self {
            host: cli.host,
            port: cli.port,
            topic: cli.topic,
            user: cli.user,
            password: cli.password,
            client_id,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        }
    }
}

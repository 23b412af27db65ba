//! # ucmsg - JSON Lines to MQTT envelope publisher
//!
//! Reads device records as JSON Lines, wraps each one in a small protobuf
//! envelope and publishes it to an MQTT broker.
//!
//! ## Input
//!
//! One JSON object per line:
//!
//! ```text
//! {"timestamp": 100, "topic": "dev1", "serial": "AA:BB", "msg": {"x": 1}}
//! ```
//!
//! ## Layers
//!
//! - [`envelope`]: record parsing and the binary envelope codec
//! - [`driver`]: the line-by-line encode and publish loop
//! - [`network`]: transport traits, a TCP transport and an MQTT 3.1.1 client
//! - [`config`]: command line and environment configuration
//! - [`app`]: one full run of the `send-mqtt` tool
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::io::{self, BufReader};
//!
//! use ucmsg::config::Config;
//! use ucmsg::driver::Driver;
//! use ucmsg::network::Connect;
//! use ucmsg::network::application::mqtt::Client;
//! use ucmsg::network::tcp::TcpConnector;
//!
//! # fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
//! let connection = TcpConnector::default().connect(&config.broker_address())?;
//! let (mut client, _ack) = Client::connect(connection, config.mqtt_options())?;
//!
//! let input = BufReader::new(io::stdin());
//! let summary = Driver::new(&config, io::stdout()).run(input, Some(&mut client))?;
//! println!("{summary}");
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

/// Connect, drain, disconnect and report, as the binary runs it.
pub mod app;

/// Command line and environment configuration.
pub mod config;

/// Line-by-line encode and publish loop.
pub mod driver;

/// Parsing of input records and the binary envelope codec.
pub mod envelope;

/// Network abstraction layer: transport traits, TCP transport and the MQTT
/// client.
pub mod network;

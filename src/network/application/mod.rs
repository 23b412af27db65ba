//! # Application Layer Network Protocols
//!
//! Protocol clients that sit on top of the core network traits. Each client
//! owns a type implementing [`Connection`](crate::network::Connection) and
//! speaks its protocol over it without knowing what the transport is.
//!
//! ## Usage Pattern
//!
//! 1. Create a connection using your transport layer
//! 2. Wrap it with the protocol client
//! 3. Use protocol-specific methods for communication
//!
//! ```rust,no_run
//! use ucmsg::network::application::mqtt::{Client, Options, QoS};
//! use ucmsg::network::tcp::TcpConnector;
//! use ucmsg::network::Connect;
//!
//! # fn main() -> Result<(), ucmsg::network::error::Error> {
//! // 1. Create connection
//! let connection = TcpConnector::default().connect("localhost:1883")?;
//!
//! // 2. Wrap with protocol client
//! let options = Options::new("sensor_device_01");
//! let (mut client, _ack) = Client::connect(connection, options)?;
//!
//! // 3. Use protocol methods
//! client.publish("ucentral", b"payload", QoS::AtMostOnce, false)?;
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

/// MQTT client implementation.
///
/// Provides an MQTT 3.1.1 client for lightweight publish-subscribe messaging,
/// commonly used in IoT applications.
pub mod mqtt;

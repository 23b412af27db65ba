//! MQTT 3.1.1 publishing client.
//!
//! MQTT (Message Queuing Telemetry Transport) is a lightweight publish-subscribe
//! messaging protocol:
//! - **Publishers** send messages to topics
//! - **Subscribers** receive messages from topics they're interested in
//! - **Brokers** route messages between publishers and subscribers
//!
//! This client covers the publisher side only: CONNECT with optional
//! credentials, PUBLISH at any QoS level (without acknowledgement tracking),
//! and DISCONNECT. Connection events are returned as values ([`ConnAck`],
//! [`Disconnected`]) rather than delivered through callbacks.

/// MQTT client implementation and supporting types.
pub mod client;

pub use client::{Client, ConnAck, Credentials, Disconnected, Options, QoS};

//! MQTT 3.1.1 client for publishing over any [`Connection`].
//!
//! # Protocol Overview
//!
//! Every MQTT control packet starts with a fixed header: one byte carrying the
//! packet type and flags, followed by the "remaining length" encoded as a
//! variable-length integer of one to four bytes. Strings inside packets are
//! prefixed with their length as a big-endian `u16`.
//!
//! The client handles three packets:
//!
//! - `CONNECT`, answered by the broker with `CONNACK`
//! - `PUBLISH`, written and flushed before the call returns
//! - `DISCONNECT`, after which the connection is closed
//!
//! # Examples
//!
//! ```rust,no_run
//! use ucmsg::network::application::mqtt::{Client, Credentials, Options, QoS};
//! use ucmsg::network::tcp::TcpConnector;
//! use ucmsg::network::Connect;
//!
//! # fn main() -> Result<(), ucmsg::network::error::Error> {
//! let connection = TcpConnector::default().connect("localhost:1883")?;
//! let options = Options {
//!     credentials: Some(Credentials {
//!         username: "test",
//!         password: Some("secret"),
//!     }),
//!     ..Options::new("sensor_device_01")
//! };
//!
//! let (mut client, ack) = Client::connect(connection, options)?;
//! assert!(!ack.session_present);
//! client.publish("sensors/temperature", b"23.5", QoS::AtMostOnce, false)?;
//! let disconnected = client.disconnect();
//! assert!(disconnected.is_clean());
//! # Ok(())
//! # }
//! ```

use crate::network::error::{ConnectReturnCode, Error};
use crate::network::{Close, Connection, Read, Write};
use tracing::{debug, trace};

// MQTT Control Packet types - these are the fixed header packet type values
const CONNECT: u8 = 0x10;
const CONNACK: u8 = 0x20;
const PUBLISH: u8 = 0x30;
const DISCONNECT: u8 = 0xE0;

// Protocol constants defined by MQTT 3.1.1 specification
const PROTOCOL_NAME: &[u8] = b"MQTT";
const PROTOCOL_LEVEL: u8 = 4; // MQTT 3.1.1

// CONNECT flag bits
const FLAG_CLEAN_SESSION: u8 = 0x02;
const FLAG_PASSWORD: u8 = 0x40;
const FLAG_USERNAME: u8 = 0x80;

// PUBLISH flag bits
const FLAG_RETAIN: u8 = 0x01;

/// Largest value the four-byte remaining length field can carry.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Quality of Service levels for MQTT messages.
///
/// Determines the guarantee of message delivery between client and broker.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QoS {
    /// Fire and forget. No acknowledgement, no retry.
    AtMostOnce = 0,
    /// At least once delivery.
    AtLeastOnce = 1,
    /// Exactly once delivery.
    ExactlyOnce = 2,
}

/// Username and optional password sent in CONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    /// Broker user name.
    pub username: &'a str,
    /// Broker password. An empty password is still sent when `Some`.
    pub password: Option<&'a str>,
}

/// Options for configuring the MQTT client connection.
#[derive(Debug, Clone)]
pub struct Options<'a> {
    /// The client identifier, must be unique per broker.
    pub client_id: &'a str,
    /// The keep-alive time in seconds.
    pub keep_alive_seconds: u16,
    /// Whether to start a clean session.
    pub clean_session: bool,
    /// Optional authentication.
    pub credentials: Option<Credentials<'a>>,
}

impl<'a> Options<'a> {
    /// Clean session, 60 second keep-alive, no credentials.
    pub fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            keep_alive_seconds: 60,
            clean_session: true,
            credentials: None,
        }
    }
}

/// Outcome of a successful CONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnAck {
    /// Whether the broker resumed a stored session for this client id.
    pub session_present: bool,
}

/// Notification produced when the client shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected {
    /// Whether the DISCONNECT packet reached the transport.
    pub packet_sent: bool,
    /// The first failure hit while sending DISCONNECT or closing, if any.
    pub error: Option<Error>,
}

impl Disconnected {
    /// True when DISCONNECT was sent and the transport closed cleanly.
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}

/// An MQTT 3.1.1 client.
///
/// Owns the connection for its whole lifetime. Consumed by
/// [`disconnect`](Client::disconnect).
#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
    next_packet_id: u16,
}

impl<C: Connection> Client<C> {
    /// Establishes an MQTT session with the broker.
    ///
    /// Sends `CONNECT` and blocks until `CONNACK` arrives. A refusal from the
    /// broker surfaces as [`Error::ConnectionRefused`] with the return code;
    /// a transport read timeout while waiting surfaces as [`Error::Timeout`].
    pub fn connect(mut connection: C, options: Options) -> Result<(Self, ConnAck), Error>
    where
        <C as Read>::Error: Into<Error>,
    {
        // --- Variable Header ---
        let mut vh: heapless::Vec<u8, 10> = heapless::Vec::new();
        vh.extend_from_slice(&(PROTOCOL_NAME.len() as u16).to_be_bytes())
            .map_err(|_| Error::ProtocolError)?;
        vh.extend_from_slice(PROTOCOL_NAME)
            .map_err(|_| Error::ProtocolError)?;
        vh.push(PROTOCOL_LEVEL).map_err(|_| Error::ProtocolError)?;

        let mut connect_flags = 0;
        if options.clean_session {
            connect_flags |= FLAG_CLEAN_SESSION;
        }
        if let Some(credentials) = &options.credentials {
            connect_flags |= FLAG_USERNAME;
            if credentials.password.is_some() {
                connect_flags |= FLAG_PASSWORD;
            }
        }
        vh.push(connect_flags).map_err(|_| Error::ProtocolError)?;
        vh.extend_from_slice(&options.keep_alive_seconds.to_be_bytes())
            .map_err(|_| Error::ProtocolError)?;

        // --- Payload ---
        // Order is fixed by the protocol: client id, will, user name, password.
        let mut payload = Vec::new();
        write_string(&mut payload, options.client_id.as_bytes())?;
        if let Some(credentials) = &options.credentials {
            write_string(&mut payload, credentials.username.as_bytes())?;
            if let Some(password) = credentials.password {
                write_string(&mut payload, password.as_bytes())?;
            }
        }

        // --- Fixed Header ---
        let fixed_header = fixed_header(CONNECT, vh.len() + payload.len())?;

        debug!(
            client_id = options.client_id,
            keep_alive = options.keep_alive_seconds,
            clean_session = options.clean_session,
            authenticated = options.credentials.is_some(),
            "sending CONNECT"
        );
        connection.write_all(&fixed_header)?;
        connection.write_all(&vh)?;
        connection.write_all(&payload)?;
        connection.flush().map_err(|_| Error::WriteError)?;

        // Wait for and parse CONNACK
        let mut connack_buf = [0u8; 4];
        read_exact(&mut connection, &mut connack_buf)?;

        if connack_buf[0] != CONNACK || connack_buf[1] != 2 {
            return Err(Error::ProtocolError);
        }

        match connack_buf[3] {
            0 => {
                let ack = ConnAck {
                    session_present: connack_buf[2] & 0x01 == 0x01,
                };
                debug!(session_present = ack.session_present, "received CONNACK");
                Ok((
                    Self {
                        connection,
                        next_packet_id: 1,
                    },
                    ack,
                ))
            }
            code => match ConnectReturnCode::from_byte(code) {
                Some(refusal) => Err(Error::ConnectionRefused(refusal)),
                None => Err(Error::ProtocolError),
            },
        }
    }

    /// Publishes `payload` on `topic`.
    ///
    /// The packet is written and flushed before returning. For QoS 1 and 2 a
    /// packet identifier is allocated, but acknowledgements are not awaited.
    pub fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), Error> {
        if topic.is_empty() {
            return Err(Error::ProtocolError);
        }

        // --- Variable Header ---
        let mut vh = Vec::with_capacity(topic.len() + 4);
        write_string(&mut vh, topic.as_bytes())?;
        if qos != QoS::AtMostOnce {
            let packet_id = self.allocate_packet_id();
            vh.extend_from_slice(&packet_id.to_be_bytes());
        }

        // --- Fixed Header ---
        let mut flags = PUBLISH | ((qos as u8) << 1);
        if retain {
            flags |= FLAG_RETAIN;
        }
        let fixed_header = fixed_header(flags, vh.len() + payload.len())?;

        trace!(topic, bytes = payload.len(), ?qos, retain, "sending PUBLISH");
        self.connection.write_all(&fixed_header)?;
        self.connection.write_all(&vh)?;
        self.connection.write_all(payload)?;
        self.connection.flush().map_err(|_| Error::WriteError)?;

        Ok(())
    }

    /// Sends DISCONNECT and closes the transport.
    ///
    /// Never fails; problems are reported in the returned [`Disconnected`].
    pub fn disconnect(mut self) -> Disconnected {
        let sent = self
            .connection
            .write_all(&[DISCONNECT, 0x00])
            .and_then(|_| self.connection.flush().map_err(|_| Error::WriteError));
        let closed = self.connection.close().map_err(|_| Error::ConnectionClosed);
        let packet_sent = sent.is_ok();
        let error = sent.and(closed).err();
        debug!(packet_sent, ?error, "disconnected");
        Disconnected { packet_sent, error }
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    fn allocate_packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        // Zero is not a valid packet identifier.
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(1);
        id
    }
}

fn fixed_header(packet_type: u8, remaining_len: usize) -> Result<heapless::Vec<u8, 5>, Error> {
    let mut header: heapless::Vec<u8, 5> = heapless::Vec::new();
    header
        .push(packet_type)
        .map_err(|_| Error::ProtocolError)?;
    encode_remaining_length(&mut header, remaining_len).map_err(|_| Error::PacketTooLarge)?;
    Ok(header)
}

/// Appends `len` to `buf` as an MQTT variable byte integer.
///
/// Fails when the encoding would not fit in the buffer, which for a five byte
/// fixed header means the length exceeds [`MAX_REMAINING_LENGTH`].
pub fn encode_remaining_length(buf: &mut heapless::Vec<u8, 5>, mut len: usize) -> Result<(), ()> {
    loop {
        if buf.is_full() {
            return Err(());
        }
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 0x80;
        }
        buf.push(byte).map_err(|_| ())?;
        if len == 0 {
            break;
        }
    }
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), Error> {
    let len = u16::try_from(bytes.len()).map_err(|_| Error::PacketTooLarge)?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn read_exact<C>(connection: &mut C, buf: &mut [u8]) -> Result<(), Error>
where
    C: Read,
    C::Error: Into<Error>,
{
    let mut total_read = 0;
    while total_read < buf.len() {
        match connection.read(&mut buf[total_read..]) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => total_read += n,
            Err(e) => {
                return Err(match e.into() {
                    Error::Timeout => Error::Timeout,
                    _ => Error::ReadError,
                });
            }
        }
    }
    Ok(())
}

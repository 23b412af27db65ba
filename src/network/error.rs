//! Common error types for network operations

use thiserror::Error;

/// Refusal codes a broker may return in CONNACK (MQTT 3.1.1, section 3.2.2.3).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ConnectReturnCode {
    /// 0x01
    #[error("unacceptable protocol version")]
    UnacceptableProtocolVersion,
    /// 0x02
    #[error("identifier rejected")]
    IdentifierRejected,
    /// 0x03
    #[error("server unavailable")]
    ServerUnavailable,
    /// 0x04
    #[error("bad user name or password")]
    BadUserNameOrPassword,
    /// 0x05
    #[error("not authorized")]
    NotAuthorized,
}

impl ConnectReturnCode {
    /// Maps a non-zero CONNACK return code. Zero (accepted) and reserved
    /// values yield `None`.
    pub fn from_byte(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::UnacceptableProtocolVersion),
            2 => Some(Self::IdentifierRejected),
            3 => Some(Self::ServerUnavailable),
            4 => Some(Self::BadUserNameOrPassword),
            5 => Some(Self::NotAuthorized),
            _ => None,
        }
    }
}

/// A common error type for network operations.
///
/// Small and `Copy` so that transport implementations can map their own
/// failures into it without carrying allocations around.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    #[error("connection is not open")]
    NotOpen,
    /// An error occurred during a write operation.
    #[error("write to connection failed")]
    WriteError,
    /// An error occurred during a read operation.
    #[error("read from connection failed")]
    ReadError,
    /// The broker refused the connection.
    #[error("connection refused: {0}")]
    ConnectionRefused(ConnectReturnCode),
    /// A timeout occurred.
    #[error("timed out")]
    Timeout,
    /// The connection was closed.
    #[error("connection closed by peer")]
    ConnectionClosed,
    /// An invalid address was provided.
    #[error("invalid address")]
    InvalidAddress,
    /// A packet field does not fit the MQTT encoding limits.
    #[error("packet too large")]
    PacketTooLarge,
    /// A protocol-specific error occurred.
    #[error("protocol error")]
    ProtocolError,
}

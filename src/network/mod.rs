//! Transport abstraction for the broker connection.
//!
//! The MQTT client never touches sockets directly. It talks to anything that
//! implements [`Connection`], which lets the same client run over TCP in the
//! binary and over in-memory buffers in tests.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application protocols layered over a [`Connection`]
pub mod application;

/// `std::net` backed transport
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Byte source half of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte sink half of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write the whole buffer, looping over short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), error::Error> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(error::Error::ConnectionClosed),
                Ok(n) => buf = &buf[n..],
                Err(_) => return Err(error::Error::WriteError),
            }
        }
        Ok(())
    }
}

/// Orderly shutdown of a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote`, given as `host:port`
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use super::error::Error;
use super::{Close, Connect, Connection, Read, Write};

/// A [`Connection`] over a blocking [`TcpStream`].
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    /// Wraps an already connected stream.
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Read for TcpConnection {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream.read(buf).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
            _ => Error::ReadError,
        })
    }
}

impl Write for TcpConnection {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for TcpConnection {
    type Error = Error;
    fn close(self) -> Result<(), Self::Error> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // The broker closes its side right after DISCONNECT.
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(_) => Err(Error::ConnectionClosed),
        }
    }
}

impl Connection for TcpConnection {}

/// Opens [`TcpConnection`]s to `host:port` addresses.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    read_timeout: Option<Duration>,
}

impl TcpConnector {
    /// A connector whose sockets give up on reads after `read_timeout`.
    pub fn new(read_timeout: Option<Duration>) -> Self {
        Self { read_timeout }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(10)))
    }
}

impl Connect for TcpConnector {
    type Connection = TcpConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let addrs: Vec<_> = remote
            .to_socket_addrs()
            .map_err(|_| Error::InvalidAddress)?
            .collect();
        if addrs.is_empty() {
            return Err(Error::InvalidAddress);
        }
        debug!(remote, candidates = addrs.len(), "opening tcp connection");
        let stream = TcpStream::connect(&addrs[..]).map_err(|e| match e.kind() {
            ErrorKind::TimedOut => Error::Timeout,
            _ => Error::NotOpen,
        })?;
        stream
            .set_read_timeout(self.read_timeout)
            .map_err(|_| Error::NotOpen)?;
        stream.set_nodelay(true).map_err(|_| Error::NotOpen)?;
        Ok(TcpConnection::new(stream))
    }
}

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use ucmsg::config::Config;
use ucmsg::driver::Publish;
use ucmsg::network::application::mqtt::QoS;
use ucmsg::network::error::Error;
use ucmsg::network::{Close, Connect, Connection, Read, Write};

pub const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

/// In-memory connection. Written bytes and the closed flag are shared so
/// tests can inspect them after the client has consumed the connection.
#[derive(Debug, Default)]
pub struct MockConnection {
    incoming: VecDeque<u8>,
    pub written: Rc<RefCell<Vec<u8>>>,
    pub closed: Rc<Cell<bool>>,
    pub fail_writes: Rc<Cell<bool>>,
    /// Fail the n-th flush (1-based); later flushes succeed again.
    pub fail_on_flush: Rc<Cell<Option<usize>>>,
    pub flushes: Rc<Cell<usize>>,
    /// Report a read timeout once the incoming bytes run out.
    pub stall_reads: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection whose broker answers CONNECT with `reply`.
    pub fn replying(reply: &[u8]) -> Self {
        let mut connection = Self::new();
        connection.incoming.extend(reply.iter().copied());
        connection
    }
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.closed.get() {
            return Err(Error::NotOpen);
        }
        if self.stall_reads && self.incoming.is_empty() {
            return Err(Error::Timeout);
        }
        let len = buf.len().min(self.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..len)) {
            *slot = byte;
        }
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.closed.get() {
            return Err(Error::NotOpen);
        }
        if self.fail_writes.get() {
            return Err(Error::WriteError);
        }
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.closed.get() {
            return Err(Error::NotOpen);
        }
        self.flushes.set(self.flushes.get() + 1);
        if self.fail_on_flush.get() == Some(self.flushes.get()) {
            return Err(Error::WriteError);
        }
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        if self.closed.get() {
            return Err(Error::NotOpen);
        }
        self.closed.set(true);
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Hands out one [`MockConnection`] per attempt, all sharing the same
/// recorded state.
#[derive(Debug, Default)]
pub struct MockConnector {
    /// What the broker answers to CONNECT.
    pub reply: Vec<u8>,
    /// Fail at the transport level instead of connecting.
    pub refuse: bool,
    pub attempts: usize,
    pub remotes: Vec<String>,
    pub written: Rc<RefCell<Vec<u8>>>,
    pub closed: Rc<Cell<bool>>,
    pub fail_on_flush: Rc<Cell<Option<usize>>>,
}

impl MockConnector {
    pub fn replying(reply: &[u8]) -> Self {
        Self {
            reply: reply.to_vec(),
            ..Self::default()
        }
    }
}

impl Connect for MockConnector {
    type Connection = MockConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        self.attempts += 1;
        self.remotes.push(remote.to_string());
        if self.refuse {
            return Err(Error::NotOpen);
        }
        let mut connection = MockConnection::replying(&self.reply);
        connection.written = self.written.clone();
        connection.closed = self.closed.clone();
        connection.fail_on_flush = self.fail_on_flush.clone();
        Ok(connection)
    }
}

/// One recorded publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Records publish calls; optionally fails the n-th call (1-based).
#[derive(Debug, Default)]
pub struct MockPublisher {
    pub calls: Vec<Published>,
    pub fail_on: Option<usize>,
}

impl Publish for MockPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), Error> {
        self.calls.push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
            retain,
        });
        if self.fail_on == Some(self.calls.len()) {
            return Err(Error::WriteError);
        }
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        host: "localhost".to_string(),
        port: 1883,
        topic: "ucentral".to_string(),
        user: "test".to_string(),
        password: String::new(),
        client_id: "ucentralmqtt-pub-7".to_string(),
        dry_run: false,
        verbose: false,
    }
}

//! The binary message envelope published to the broker.
//!
//! An envelope carries one device record. Its wire form is a protobuf message
//! with the following schema:
//!
//! ```text
//! message UCentralMsg {
//!     uint32 version   = 1;
//!     int64  timestamp = 2;
//!     string topic     = 3;
//!     string serial    = 4;
//!     string msg       = 5;
//! }
//! ```
//!
//! Fields are written in tag order and proto3 default values (zero, empty
//! string) are omitted, so encoding is deterministic.

mod wire;

use serde::Deserialize;
use thiserror::Error;

use wire::{Reader, WIRE_LEN, WIRE_VARINT};

/// Envelope format version stamped on every message this build produces.
pub const MSG_VERSION: u32 = 1;

const TAG_VERSION: u32 = 1;
const TAG_TIMESTAMP: u32 = 2;
const TAG_TOPIC: u32 = 3;
const TAG_SERIAL: u32 = 4;
const TAG_MSG: u32 = 5;

/// Why an input line produced no envelope.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The line is empty or whitespace only.
    #[error("empty line")]
    Blank,
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    NotUtf8,
    /// Malformed JSON, a missing key, or a key with the wrong type.
    #[error("invalid record: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Failure to parse an envelope from its wire form.
#[derive(Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DecodeError {
    #[error("message truncated")]
    Truncated,
    #[error("varint longer than 10 bytes")]
    VarintOverflow,
    #[error("invalid field tag")]
    InvalidTag,
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),
    #[error("field {tag} has wire type {found}")]
    WrongWireType { tag: u32, found: u8 },
    #[error("field {0} is not valid UTF-8")]
    NotUtf8(u32),
    #[error("version {0} does not fit in uint32")]
    VersionOverflow(u64),
}

/// One input line as the producer writes it.
#[derive(Debug, Deserialize)]
struct Record {
    timestamp: i64,
    topic: String,
    serial: String,
    msg: serde_json::Value,
}

/// A decoded device message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Format version, [`MSG_VERSION`] for envelopes built here.
    pub version: u32,
    /// Producer-defined time value, copied through untouched.
    pub timestamp: i64,
    /// Originating device or session. Not the broker topic.
    pub topic: String,
    /// Device serial number.
    pub serial: String,
    /// The record's `msg` value as JSON text.
    pub msg: String,
}

impl Envelope {
    /// Builds an envelope from one JSON Lines record.
    ///
    /// The record must be an object with an integer `timestamp`, string
    /// `topic` and `serial`, and a `msg` of any JSON type. `msg` is
    /// re-serialized as compact JSON with object keys sorted, which makes the
    /// result independent of the key order the producer used. Numbers keep
    /// their source text, so integers beyond 64 bits survive unchanged. A
    /// key given more than once takes its last value.
    pub fn from_json_line(line: &str) -> Result<Self, Rejection> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(Rejection::Blank);
        }
        // Going through a map first lets a repeated key keep its last value
        // instead of failing the derive's duplicate field check.
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(line)?;
        let record = Record::deserialize(serde_json::Value::Object(object))?;
        let msg = serde_json::to_string(&record.msg)?;
        Ok(Self {
            version: MSG_VERSION,
            timestamp: record.timestamp,
            topic: record.topic,
            serial: record.serial,
            msg,
        })
    }

    /// Serializes to the protobuf wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            self.topic.len() + self.serial.len() + self.msg.len() + 24,
        );
        if self.version != 0 {
            wire::put_key(&mut buf, TAG_VERSION, WIRE_VARINT);
            wire::put_varint(&mut buf, u64::from(self.version));
        }
        if self.timestamp != 0 {
            wire::put_key(&mut buf, TAG_TIMESTAMP, WIRE_VARINT);
            // int64 is sign-extended to ten bytes when negative.
            wire::put_varint(&mut buf, self.timestamp as u64);
        }
        for (tag, text) in [
            (TAG_TOPIC, &self.topic),
            (TAG_SERIAL, &self.serial),
            (TAG_MSG, &self.msg),
        ] {
            if !text.is_empty() {
                wire::put_bytes(&mut buf, tag, text.as_bytes());
            }
        }
        buf
    }

    /// Parses the protobuf wire form. Unknown fields are skipped and a
    /// repeated field keeps its last value.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut envelope = Self {
            version: 0,
            timestamp: 0,
            topic: String::new(),
            serial: String::new(),
            msg: String::new(),
        };
        let mut reader = Reader::new(buf);
        while !reader.is_empty() {
            let (tag, wire_type) = reader.key()?;
            match tag {
                TAG_VERSION | TAG_TIMESTAMP => {
                    if wire_type != WIRE_VARINT {
                        return Err(DecodeError::WrongWireType {
                            tag,
                            found: wire_type,
                        });
                    }
                    let value = reader.varint()?;
                    if tag == TAG_VERSION {
                        envelope.version = u32::try_from(value)
                            .map_err(|_| DecodeError::VersionOverflow(value))?;
                    } else {
                        envelope.timestamp = value as i64;
                    }
                }
                TAG_TOPIC | TAG_SERIAL | TAG_MSG => {
                    if wire_type != WIRE_LEN {
                        return Err(DecodeError::WrongWireType {
                            tag,
                            found: wire_type,
                        });
                    }
                    let text = std::str::from_utf8(reader.bytes()?)
                        .map_err(|_| DecodeError::NotUtf8(tag))?
                        .to_owned();
                    match tag {
                        TAG_TOPIC => envelope.topic = text,
                        TAG_SERIAL => envelope.serial = text,
                        _ => envelope.msg = text,
                    }
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(envelope)
    }

    /// Parses [`msg`](Self::msg) back into a JSON value.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.msg)
    }
}

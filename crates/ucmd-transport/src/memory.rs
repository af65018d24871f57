use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory device stub.
///
/// Records every write and answers with scripted replies: when a write starts
/// with a byte that has a registered reply, that reply is queued and handed
/// out by the next [`Transport::read_available`]. Open/close calls are
/// counted so tests can check the acquisition pattern of their callers.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    name: String,
    open: bool,
    inbound: BytesMut,
    replies: HashMap<u8, Bytes>,
    writes: Vec<Bytes>,
    open_count: usize,
    close_count: usize,
    read_count: usize,
    write_failure: Option<std::io::ErrorKind>,
}

impl MemoryTransport {
    /// Create a closed stub named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reply with `reply` whenever a write starts with `first_byte`.
    pub fn with_reply(mut self, first_byte: u8, reply: impl Into<Bytes>) -> Self {
        self.set_reply(first_byte, reply);
        self
    }

    /// Register or replace the reply for writes starting with `first_byte`.
    pub fn set_reply(&mut self, first_byte: u8, reply: impl Into<Bytes>) {
        self.replies.insert(first_byte, reply.into());
    }

    /// Queue unsolicited inbound bytes.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend_from_slice(bytes);
    }

    /// Make every subsequent write fail with `kind` (or succeed again with `None`).
    pub fn set_write_failure(&mut self, kind: Option<std::io::ErrorKind>) {
        self.write_failure = kind;
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> &[Bytes] {
        &self.writes
    }

    /// The most recent successful write.
    pub fn last_write(&self) -> Option<&Bytes> {
        self.writes.last()
    }

    /// Number of `open` calls that succeeded.
    pub fn open_count(&self) -> usize {
        self.open_count
    }

    /// Number of `close` calls that closed an open link.
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    /// Number of `read_available` calls.
    pub fn read_count(&self) -> usize {
        self.read_count
    }
}

impl Transport for MemoryTransport {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(TransportError::AlreadyOpen(self.name.clone()));
        }
        self.open = true;
        self.open_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.close_count += 1;
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.open {
            return Err(TransportError::NotOpen(self.name.clone()));
        }
        if let Some(kind) = self.write_failure {
            return Err(TransportError::Io(std::io::Error::new(
                kind,
                "injected write failure",
            )));
        }

        trace!(port = %self.name, len = bytes.len(), "memory write");
        if let Some(reply) = bytes.first().and_then(|first| self.replies.get(first)) {
            self.inbound.extend_from_slice(reply);
        }
        self.writes.push(Bytes::copy_from_slice(bytes));
        Ok(())
    }

    fn read_available(&mut self) -> Result<Bytes> {
        if !self.open {
            return Err(TransportError::NotOpen(self.name.clone()));
        }
        self.read_count += 1;
        Ok(self.inbound.split().freeze())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn port_name(&self) -> &str {
        &self.name
    }
}

use bytes::Bytes;
use tracing::warn;

use crate::error::Result;
use crate::traits::Transport;

/// Scoped use of a transport: opened on acquire, closed on every exit path.
///
/// Call [`TransportSession::release`] on the happy path to observe close
/// errors. If the session is dropped instead (early return, `?`, panic), the
/// transport is still closed and a failure to close is logged.
pub struct TransportSession<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    released: bool,
}

impl<'a, T: Transport + ?Sized> TransportSession<'a, T> {
    /// Open `transport` for the lifetime of the returned session.
    pub fn acquire(transport: &'a mut T) -> Result<Self> {
        transport.open()?;
        Ok(Self {
            transport,
            released: false,
        })
    }

    /// Write every byte of `bytes`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport.write(bytes)
    }

    /// Drain the bytes the device has sent so far.
    pub fn read_available(&mut self) -> Result<Bytes> {
        self.transport.read_available()
    }

    /// Close the transport and report the outcome.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.transport.close()
    }
}

impl<T: Transport + ?Sized> Drop for TransportSession<'_, T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.transport.close() {
            warn!(port = %self.transport.port_name(), %err, "failed to close transport");
        }
    }
}

use bytes::Bytes;

use crate::error::Result;

/// A byte link to a device.
///
/// Implementations carry no protocol knowledge. Callers open the link, write
/// a request, optionally drain the bytes that arrived, and close it again.
pub trait Transport {
    /// Open the link. Opening an already open transport is an error.
    fn open(&mut self) -> Result<()>;

    /// Close the link. Closing a closed transport is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Write every byte of `bytes` (blocking).
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read whatever bytes are currently buffered, without waiting for more.
    fn read_available(&mut self) -> Result<Bytes>;

    /// Whether the link is currently open.
    fn is_open(&self) -> bool;

    /// Port identifier, for diagnostics.
    fn port_name(&self) -> &str;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read_available(&mut self) -> Result<Bytes> {
        (**self).read_available()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn port_name(&self) -> &str {
        (**self).port_name()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read_available(&mut self) -> Result<Bytes> {
        (**self).read_available()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn port_name(&self) -> &str {
        (**self).port_name()
    }
}

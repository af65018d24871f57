use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use bytes::Bytes;
use serialport::SerialPort;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Baud rate used when none is given.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial link parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed. Default: 115200.
    pub baud_rate: u32,
    /// Timeout applied to blocking reads and writes.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Serial port transport.
///
/// The port is not touched until [`Transport::open`] is called, and it is
/// released again by [`Transport::close`] (or on drop).
pub struct SerialTransport {
    port: String,
    config: SerialConfig,
    inner: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create a transport for `port` at `baud_rate`.
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self::with_config(
            port,
            SerialConfig {
                baud_rate,
                ..SerialConfig::default()
            },
        )
    }

    /// Create a transport with explicit configuration.
    pub fn with_config(port: impl Into<String>, config: SerialConfig) -> Self {
        Self {
            port: port.into(),
            config,
            inner: None,
        }
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }

    /// Current link configuration.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<()> {
        if self.inner.is_some() {
            return Err(TransportError::AlreadyOpen(self.port.clone()));
        }

        let port = serialport::new(&self.port, self.config.baud_rate)
            .timeout(self.config.timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: self.port.clone(),
                source,
            })?;

        debug!(port = %self.port, baud_rate = self.config.baud_rate, "opened serial port");
        self.inner = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.inner.take().is_some() {
            debug!(port = %self.port, "closed serial port");
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(port) = self.inner.as_mut() else {
            return Err(TransportError::NotOpen(self.port.clone()));
        };

        let mut offset = 0usize;
        while offset < bytes.len() {
            match port.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "serial port accepted no bytes",
                    )))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match port.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        debug!(port = %self.port, len = bytes.len(), "wrote bytes");
        Ok(())
    }

    fn read_available(&mut self) -> Result<Bytes> {
        let Some(port) = self.inner.as_mut() else {
            return Err(TransportError::NotOpen(self.port.clone()));
        };

        let pending = port.bytes_to_read()? as usize;
        let mut buf = vec![0u8; pending];
        if pending > 0 {
            port.read_exact(&mut buf)?;
        }

        debug!(port = %self.port, len = pending, "read available bytes");
        Ok(Bytes::from(buf))
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn port_name(&self) -> &str {
        &self.port
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port)
            .field("config", &self.config)
            .field("open", &self.inner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_PORT: &str = "/dev/ucmd-test-no-such-port";

    #[test]
    fn default_config_uses_115200() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn new_keeps_port_and_baud() {
        let transport = SerialTransport::new("/dev/ttyACM0", 9600);
        assert_eq!(transport.port_name(), "/dev/ttyACM0");
        assert_eq!(transport.baud_rate(), 9600);
        assert!(!transport.is_open());
    }

    #[test]
    fn open_missing_port_fails_with_open_error() {
        let mut transport = SerialTransport::new(MISSING_PORT, DEFAULT_BAUD_RATE);
        let result = transport.open();
        assert!(matches!(result, Err(TransportError::Open { ref port, .. }) if port == MISSING_PORT));
        assert!(!transport.is_open());
    }

    #[test]
    fn io_on_closed_port_is_rejected() {
        let mut transport = SerialTransport::new(MISSING_PORT, DEFAULT_BAUD_RATE);
        assert!(matches!(
            transport.write(&[0xFF]),
            Err(TransportError::NotOpen(_))
        ));
        assert!(matches!(
            transport.read_available(),
            Err(TransportError::NotOpen(_))
        ));
    }

    #[test]
    fn close_on_closed_port_is_noop() {
        let mut transport = SerialTransport::new(MISSING_PORT, DEFAULT_BAUD_RATE);
        assert!(transport.close().is_ok());
        assert!(transport.close().is_ok());
    }
}

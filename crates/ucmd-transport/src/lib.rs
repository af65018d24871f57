//! Byte transport abstraction for talking to microcontroller firmware.
//!
//! A transport knows nothing about the command protocol. It can be opened,
//! closed, written to, and drained of whatever bytes the device has sent:
//! - [`SerialTransport`] drives a real serial port via `serialport`
//! - [`MemoryTransport`] is an in-memory device stub for tests and emulation
//!
//! This is the lowest layer of ucmd. Everything else builds on top of the
//! [`Transport`] trait provided here.

pub mod error;
pub mod memory;
pub mod ports;
pub mod serial;
pub mod session;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use ports::{list_ports, PortInfo, PortKind};
pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
pub use session::TransportSession;
pub use traits::Transport;

//! Discover and run typed commands on microcontroller firmware over serial.
//!
//! The device advertises its commands as text; ucmd parses them into a typed
//! command table and turns calls into fixed-width binary frames.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte transport abstraction (serial port, in-memory stub)
//! - [`frame`]: Type tags and command frame encoding
//! - [`registry`]: Descriptor parsing, argument binding, command invocation

/// Re-export transport types.
pub mod transport {
    pub use ucmd_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ucmd_frame::*;
}

/// Re-export registry types.
pub mod registry {
    pub use ucmd_registry::*;
}

pub use ucmd_registry::{Arguments, CommandRegistry, CommandSpec, RegistryError};
pub use ucmd_transport::SerialTransport;

/// Open a registry on a serial port. Nothing is sent until discovery.
pub fn open_serial(port: impl Into<String>, baud_rate: u32) -> CommandRegistry<SerialTransport> {
    CommandRegistry::new(SerialTransport::new(port, baud_rate))
}

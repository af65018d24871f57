//! Command discovery, argument binding and invocation.
//!
//! A device advertises its commands as text, one `name(types|names)` line
//! per command. [`CommandRegistry`] fetches and parses that descriptor once,
//! assigns wire ids in advertisement order, and runs commands by name:
//! arguments are bound (positional, named, zero defaults), validated, packed
//! into a frame and written to the transport.

pub mod args;
pub mod command;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod shared;

pub use args::Arguments;
pub use command::CommandSpec;
pub use config::RegistryConfig;
pub use descriptor::{parse_descriptor, parse_line, Advertisement};
pub use error::{RegistryError, Result, ValidationError};
pub use registry::CommandRegistry;
pub use shared::SharedRegistry;

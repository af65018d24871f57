//! Type-tag table and command frame encoding.
//!
//! A command frame is the exact byte sequence sent for one invocation:
//! - a 1-byte wire id identifying the command
//! - each argument packed little-endian at the fixed width of its type tag
//!
//! There are no markers, length prefixes or checksums. Both sides know the
//! layout from the command descriptor the device advertised.

pub mod codec;
pub mod error;
pub mod typetag;
pub mod value;

pub use codec::{
    decode_args, encode_args, encode_frame, encode_value, Frame, DISCOVERY_REQUEST,
    DISCOVERY_SETTLE, MAX_WIRE_ID,
};
pub use error::{FrameError, Result};
pub use typetag::{packed_width, parse_type_codes, TypeTag};
pub use value::Value;

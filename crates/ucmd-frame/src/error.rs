use crate::typetag::TypeTag;
use crate::value::Value;

/// Errors that can occur while encoding or decoding command frames.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// A type code outside the type table.
    #[error("unknown type tag {0:?}")]
    UnknownTypeTag(char),

    /// The number of values does not match the number of type tags.
    #[error("expected {expected} values, got {received}")]
    ValueCount { expected: usize, received: usize },

    /// A fractional value was supplied for an integer type.
    #[error("{tag} requires an integer, got {value}")]
    NotAnInteger { tag: TypeTag, value: f64 },

    /// The value does not fit the width of its type.
    #[error("{value} is out of range for {tag}")]
    OutOfRange { tag: TypeTag, value: Value },

    /// A textual value is neither an integer nor a decimal number.
    #[error("invalid numeric value {0:?}")]
    InvalidLiteral(String),

    /// Not enough bytes to decode the declared arguments.
    #[error("truncated arguments ({actual} bytes, need {expected})")]
    Truncated { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;

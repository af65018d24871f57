use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::typetag::{packed_width, TypeTag};
use crate::value::Value;

/// Single byte the host writes to ask the device for its descriptor.
pub const DISCOVERY_REQUEST: u8 = 0xFF;

/// Highest wire id a command can take; `0xFF` is reserved for discovery.
pub const MAX_WIRE_ID: u8 = DISCOVERY_REQUEST - 1;

/// Time the device gets to answer a discovery request before the host reads.
pub const DISCOVERY_SETTLE: Duration = Duration::from_millis(50);

/// One encoded command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command identifier, assigned by discovery order.
    pub wire_id: u8,
    /// Packed argument bytes.
    pub args: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(wire_id: u8, args: impl Into<Bytes>) -> Self {
        Self {
            wire_id,
            args: args.into(),
        }
    }

    /// The total wire size of this frame (id byte + arguments).
    pub fn wire_size(&self) -> usize {
        1 + self.args.len()
    }

    /// The exact bytes to put on the link.
    ///
    /// Wire format:
    /// ```text
    /// ┌──────────┬───────────┬───────────┬─────┬─────────────┐
    /// │ Id (1B)  │ Arg 0     │ Arg 1     │ ... │ Arg N-1     │
    /// │          │ (LE, w0)  │ (LE, w1)  │     │ (LE, wN-1)  │
    /// └──────────┴───────────┴───────────┴─────┴─────────────┘
    /// ```
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        buf.put_u8(self.wire_id);
        buf.put_slice(&self.args);
        buf.freeze()
    }
}

/// Pack one value at the width of `tag`.
pub fn encode_value(tag: TypeTag, value: Value, dst: &mut BytesMut) -> Result<()> {
    match (tag, value) {
        (TypeTag::Float, Value::Float(v)) => {
            let narrowed = v as f32;
            if v.is_finite() && narrowed.is_infinite() {
                return Err(FrameError::OutOfRange { tag, value });
            }
            dst.put_f32_le(narrowed);
        }
        (TypeTag::Float, Value::Int(v)) => dst.put_f32_le(v as f32),
        (tag, Value::Float(v)) => return Err(FrameError::NotAnInteger { tag, value: v }),
        (tag, Value::Int(v)) => encode_int(tag, v, dst)?,
    }
    Ok(())
}

fn encode_int(tag: TypeTag, v: i64, dst: &mut BytesMut) -> Result<()> {
    if tag.is_float() {
        dst.put_f32_le(v as f32);
        return Ok(());
    }
    let (min, max) = tag.int_range();
    if v < min || v > max {
        return Err(FrameError::OutOfRange {
            tag,
            value: Value::Int(v),
        });
    }
    // Low `width` bytes of the two's complement form.
    dst.put_int_le(v, tag.width());
    Ok(())
}

/// Pack `values` in order, one per tag.
pub fn encode_args(tags: &[TypeTag], values: &[Value], dst: &mut BytesMut) -> Result<()> {
    if tags.len() != values.len() {
        return Err(FrameError::ValueCount {
            expected: tags.len(),
            received: values.len(),
        });
    }
    dst.reserve(packed_width(tags));
    for (tag, value) in tags.iter().zip(values) {
        encode_value(*tag, *value, dst)?;
    }
    Ok(())
}

/// Build the frame for command `wire_id` called with `values`.
pub fn encode_frame(wire_id: u8, tags: &[TypeTag], values: &[Value]) -> Result<Frame> {
    let mut args = BytesMut::with_capacity(packed_width(tags));
    encode_args(tags, values, &mut args)?;
    Ok(Frame::new(wire_id, args.freeze()))
}

/// Unpack argument bytes as the device sees them.
///
/// Trailing bytes beyond the declared arguments are ignored.
pub fn decode_args(tags: &[TypeTag], mut src: &[u8]) -> Result<Vec<Value>> {
    let expected = packed_width(tags);
    if src.len() < expected {
        return Err(FrameError::Truncated {
            expected,
            actual: src.len(),
        });
    }

    let values = tags
        .iter()
        .map(|tag| {
            let width = tag.width();
            if tag.is_float() {
                return Value::Float(f64::from(src.get_f32_le()));
            }
            let raw = src.get_uint_le(width);
            if tag.is_signed() {
                let shift = 64 - 8 * width as u32;
                Value::Int(((raw << shift) as i64) >> shift)
            } else {
                Value::Int(raw as i64)
            }
        })
        .collect();
    Ok(values)
}

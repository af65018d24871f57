//! The closed set of argument types a device can advertise.
//!
//! Each type is a single character in the descriptor and maps to exactly one
//! display name and byte width. Widths are fixed and never depend on the host
//! platform.

use std::fmt;

use crate::error::{FrameError, Result};

/// Argument wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `c`: a raw byte.
    Char,
    /// `b`: i8.
    SignedChar,
    /// `B`: u8.
    UnsignedChar,
    /// `h`: i16.
    Short,
    /// `H`: u16.
    UnsignedShort,
    /// `i`: i32.
    Int,
    /// `I`: u32.
    UnsignedInt,
    /// `l`: i32 (a 4-byte AVR `long`).
    Long,
    /// `L`: u32.
    UnsignedLong,
    /// `f`: IEEE-754 single precision.
    Float,
}

struct TypeMeta {
    code: char,
    name: &'static str,
    width: usize,
    signed: bool,
}

// Indexed by `TypeTag as usize`.
static TYPE_TABLE: [TypeMeta; 10] = [
    TypeMeta { code: 'c', name: "CHAR", width: 1, signed: false },
    TypeMeta { code: 'b', name: "SIGNED_CHAR", width: 1, signed: true },
    TypeMeta { code: 'B', name: "UNSIGNED_CHAR", width: 1, signed: false },
    TypeMeta { code: 'h', name: "SIGNED_SHORT_INT", width: 2, signed: true },
    TypeMeta { code: 'H', name: "UNSIGNED_SHORT_INT", width: 2, signed: false },
    TypeMeta { code: 'i', name: "SIGNED_INT", width: 4, signed: true },
    TypeMeta { code: 'I', name: "UNSIGNED_INT", width: 4, signed: false },
    TypeMeta { code: 'l', name: "SIGNED_LONG", width: 4, signed: true },
    TypeMeta { code: 'L', name: "UNSIGNED_LONG", width: 4, signed: false },
    TypeMeta { code: 'f', name: "FLOAT", width: 4, signed: true },
];

impl TypeTag {
    /// Every type tag, in table order.
    pub const ALL: [TypeTag; 10] = [
        TypeTag::Char,
        TypeTag::SignedChar,
        TypeTag::UnsignedChar,
        TypeTag::Short,
        TypeTag::UnsignedShort,
        TypeTag::Int,
        TypeTag::UnsignedInt,
        TypeTag::Long,
        TypeTag::UnsignedLong,
        TypeTag::Float,
    ];

    /// Look up the type for a descriptor code.
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.code() == code)
    }

    /// Descriptor code.
    pub fn code(self) -> char {
        self.meta().code
    }

    /// Display name used in listings and help text.
    pub fn name(self) -> &'static str {
        self.meta().name
    }

    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        self.meta().width
    }

    pub fn is_float(self) -> bool {
        self == TypeTag::Float
    }

    /// Whether negative values are representable.
    pub fn is_signed(self) -> bool {
        self.meta().signed
    }

    /// Smallest and largest integer the type can carry.
    pub fn int_range(self) -> (i64, i64) {
        let bits = self.width() * 8;
        if self.is_signed() {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        } else {
            (0, (1i64 << bits) - 1)
        }
    }

    fn meta(self) -> &'static TypeMeta {
        &TYPE_TABLE[self as usize]
    }
}

impl TryFrom<char> for TypeTag {
    type Error = FrameError;

    fn try_from(code: char) -> Result<Self> {
        Self::from_code(code).ok_or(FrameError::UnknownTypeTag(code))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a descriptor type group (e.g. `"hhf"`) into type tags.
pub fn parse_type_codes(codes: &str) -> Result<Vec<TypeTag>> {
    codes.chars().map(TypeTag::try_from).collect()
}

/// Total encoded width of a type group.
pub fn packed_width(tags: &[TypeTag]) -> usize {
    tags.iter().map(|tag| tag.width()).sum()
}

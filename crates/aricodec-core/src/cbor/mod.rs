//! The ARI binary form CODEC.
//!
//! One ARI is one CBOR data item. The wire layer (`raw`) is written
//! directly against RFC 8949 because the profile is strict: definite
//! lengths only, minimal-width heads on output, shortest float width that
//! preserves the value. Byte-identical output for identical input is a
//! requirement, not an optimization.

mod decode;
mod encode;
mod raw;

pub use decode::{decode, DecodeOptions, Decoder};
pub use encode::{encode, EncodeOptions, Encoder};
pub use raw::{
    f16_to_f32, read_one, shortest_float, to_diag, FloatBits, RawItem, Writer,
};

use crate::ari::InvariantError;
use crate::types::TypeError;
use core::fmt;

/// A binary-form decode failure.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeError {
    /// What went wrong.
    pub kind: DecodeErrorKind,
    /// Byte offset where the failure was detected.
    pub offset: usize,
}

impl DecodeError {
    pub(crate) const fn new(kind: DecodeErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Decode failure kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeErrorKind {
    /// Input ended inside an item.
    Truncated,
    /// Indefinite-length items are not part of the profile.
    IndefiniteLength,
    /// Reserved additional-information value in an item head.
    ReservedHead,
    /// Text string is not valid UTF-8.
    BadUtf8,
    /// Nesting exceeded the depth limit.
    DepthLimit,
    /// Bytes remained after one complete item.
    TrailingBytes,
    /// A simple value outside the recognized set.
    UnknownSimple(u8),
    /// A tag outside the recognized set.
    UnknownTag(u64),
    /// An item shape that is not an ARI.
    Shape(&'static str),
    /// A time value outside the integer/decimal-fraction forms.
    BadTimeValue,
    /// The typed value does not fit the declared type.
    Type(TypeError),
    /// A structural invariant failed during construction.
    Invariant(InvariantError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decode error at byte {}: ", self.offset)?;
        match &self.kind {
            DecodeErrorKind::Truncated => write!(f, "truncated item"),
            DecodeErrorKind::IndefiniteLength => write!(f, "indefinite length not allowed"),
            DecodeErrorKind::ReservedHead => write!(f, "reserved head value"),
            DecodeErrorKind::BadUtf8 => write!(f, "text is not valid UTF-8"),
            DecodeErrorKind::DepthLimit => write!(f, "nesting too deep"),
            DecodeErrorKind::TrailingBytes => write!(f, "trailing bytes after item"),
            DecodeErrorKind::UnknownSimple(v) => write!(f, "unknown simple value {v}"),
            DecodeErrorKind::UnknownTag(n) => write!(f, "unknown tag {n}"),
            DecodeErrorKind::Shape(what) => write!(f, "not an ARI item: {what}"),
            DecodeErrorKind::BadTimeValue => write!(f, "bad time value"),
            DecodeErrorKind::Type(err) => write!(f, "{err}"),
            DecodeErrorKind::Invariant(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A binary-form encode failure.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// Relative and namespace-only references have no binary form.
    PartialReference,
    /// An integer outside the encodable CBOR domain.
    IntRange,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartialReference => {
                write!(f, "reference without org/model/type/object has no binary form")
            }
            Self::IntRange => write!(f, "integer outside the CBOR domain"),
        }
    }
}

impl std::error::Error for EncodeError {}

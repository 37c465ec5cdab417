//! The ARI text form CODEC.
//!
//! Decoding is a hand-written recursive descent over a small token stream
//! (`lexer`), with value segments interpreted by first-match shape
//! (`prim`). Encoding produces the canonical text form, with options for
//! the variations the form allows (`encode`).
//!
//! Parsed references are unresolved: identifiers stay in whatever
//! text/numeric form the input used. Resolution and nickname conversion
//! are separate passes over the value.

mod encode;
mod escape;
mod lexer;
mod parse;
mod prim;

pub use encode::{EncodeOptions, Encoder, FloatForm, IntBase, SchemePrefix};
pub use escape::EscapeError;
pub use parse::{decode, Decoder};

use crate::ari::InvariantError;
use crate::types::TypeError;
use core::fmt;

/// A text-form parse failure.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Byte offset in the input (after scheme prefix removal).
    pub pos: usize,
}

/// Parse failure kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseErrorKind {
    /// Input ended before a complete ARI.
    UnexpectedEnd,
    /// A token other than the expected one.
    Expected(&'static str),
    /// Input remained after one complete ARI.
    TrailingInput,
    /// Percent or backslash escape failure.
    Escape(EscapeError),
    /// Unknown or non-literal type in a literal position.
    InvalidType(String),
    /// Unknown or non-object type in a reference position.
    InvalidObjectType(String),
    /// A value segment matched no shape for its position.
    InvalidValue(String),
    /// Named actual parameters are not representable.
    NamedParams,
    /// A required structure key (for example `c` or `r`) is missing.
    MissingStructKey(&'static str),
    /// Duplicate key in an AM literal.
    DuplicateMapKey,
    /// A structural invariant failed during construction.
    Invariant(InvariantError),
    /// The typed literal's value does not fit the declared type.
    Type(TypeError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at byte {}: ", self.pos)?;
        match &self.kind {
            ParseErrorKind::UnexpectedEnd => write!(f, "unexpected end of input"),
            ParseErrorKind::Expected(what) => write!(f, "expected {what}"),
            ParseErrorKind::TrailingInput => write!(f, "trailing input after ARI"),
            ParseErrorKind::Escape(err) => write!(f, "escape error: {err:?}"),
            ParseErrorKind::InvalidType(seg) => write!(f, "invalid literal type {seg:?}"),
            ParseErrorKind::InvalidObjectType(seg) => {
                write!(f, "invalid object type {seg:?}")
            }
            ParseErrorKind::InvalidValue(seg) => write!(f, "invalid value segment {seg:?}"),
            ParseErrorKind::NamedParams => write!(f, "named parameters are not supported"),
            ParseErrorKind::MissingStructKey(key) => write!(f, "missing {key}= key"),
            ParseErrorKind::DuplicateMapKey => write!(f, "duplicate map key"),
            ParseErrorKind::Invariant(err) => write!(f, "{err}"),
            ParseErrorKind::Type(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<TypeError> for ParseErrorKind {
    fn from(err: TypeError) -> Self {
        Self::Type(err)
    }
}

impl From<InvariantError> for ParseErrorKind {
    fn from(err: InvariantError) -> Self {
        match err {
            InvariantError::DuplicateMapKey => Self::DuplicateMapKey,
            other => Self::Invariant(other),
        }
    }
}

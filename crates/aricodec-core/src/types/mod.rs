//! Semantic typing for ARI values.
//!
//! Two layers: the built-in types keyed by [`AriType`](crate::ari::AriType)
//! code (`builtin`), and semantic type expressions used by ADM typedefs and
//! object declarations (`semtype`, checked in `check`).
//!
//! Checking has two modes throughout, following the AMM rules:
//!
//! - **get**: non-coercing; the value either already matches the type or it
//!   does not.
//! - **convert**: coercing; integers widen within range, integers promote
//!   to reals, numeric seconds become time values. A real never silently
//!   becomes an integer and values are never truncated.

pub mod builtin;
mod check;
mod semtype;

pub use check::{TypeChecker, TypedefLookup};
pub use semtype::{Bound, Constraint, RangePair, SemType, TableColumn, TableTemplate, TypeRef, TypeUse, TypedefRef};

use crate::ari::AriType;
use core::fmt;

/// A typing failure.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// The value's shape does not match the declared type.
    Mismatch {
        /// The declared type.
        type_id: AriType,
    },
    /// The value is outside the declared type's numeric domain.
    OutOfRange {
        /// The declared type.
        type_id: AriType,
    },
    /// A literal declared with an object kind instead of a literal type.
    NotLiteralType(AriType),
    /// The undefined value cannot carry a type.
    UndefinedTyped,
    /// No alternative of a union accepted the value.
    UnionNoMatch,
    /// A constraint rejected the value.
    Constraint {
        /// Constraint description.
        detail: String,
    },
    /// A typedef reference did not resolve.
    UnresolvedTypedef {
        /// The referenced typedef name.
        name: String,
    },
    /// Typedef expansion revisited a definition.
    TypedefCycle {
        /// The name at which the cycle closed.
        name: String,
    },
    /// The value is a reference where a literal is required, or vice versa.
    WrongCategory,
    /// Actual parameter list longer than the formal list.
    TooManyParams {
        /// Formal parameter count.
        formal: usize,
        /// Actual parameter count.
        actual: usize,
    },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { type_id } => {
                write!(f, "value does not match declared type {type_id}")
            }
            Self::OutOfRange { type_id } => {
                write!(f, "value outside the domain of type {type_id}")
            }
            Self::NotLiteralType(type_id) => {
                write!(f, "{type_id} is an object kind, not a literal type")
            }
            Self::UndefinedTyped => write!(f, "the undefined value cannot carry a type"),
            Self::UnionNoMatch => write!(f, "no union alternative matched"),
            Self::Constraint { detail } => write!(f, "constraint violated: {detail}"),
            Self::UnresolvedTypedef { name } => write!(f, "typedef {name} did not resolve"),
            Self::TypedefCycle { name } => write!(f, "typedef cycle through {name}"),
            Self::WrongCategory => write!(f, "literal/reference category mismatch"),
            Self::TooManyParams { formal, actual } => {
                write!(f, "{actual} actual parameters for {formal} formals")
            }
        }
    }
}

impl std::error::Error for TypeError {}

//! The ARI value model.
//!
//! An ARI is one closed sum: a literal value (optionally carrying a
//! declared type) or a reference to an ADM-defined object. References are
//! symbolic; they never hold catalog pointers, so values stay shareable
//! across catalog reloads.

mod time;
mod type_id;
mod value;

pub use time::{dtn_epoch, DecFrac, TimeBase, TimeVal};
pub use type_id::{AriType, OBJECT_KINDS};
pub use value::{AriMap, ExecSet, Report, RptSet, Table, Value};

use crate::types::TypeError;
use core::fmt;

/// Violation of a structural ARI invariant.
///
/// These surface from checked constructors; a value breaking one of these
/// rules is never observable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvariantError {
    /// Map key is not an untyped primitive literal.
    InvalidMapKey,
    /// Map key already present under ARI equality.
    DuplicateMapKey,
    /// Table cell count is not a multiple of the column count.
    TableShape,
    /// Nonce outside the null / u64 / byte-string domain.
    InvalidNonce,
    /// Report set with no reports.
    EmptyReportSet,
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMapKey => write!(f, "map key must be an untyped primitive literal"),
            Self::DuplicateMapKey => write!(f, "duplicate map key"),
            Self::TableShape => write!(f, "table cell count does not fill whole rows"),
            Self::InvalidNonce => write!(f, "nonce must be null, unsigned integer, or bytes"),
            Self::EmptyReportSet => write!(f, "report set must contain at least one report"),
        }
    }
}

impl std::error::Error for InvariantError {}

/// One identifier segment of a reference: symbolic text or numeric enum.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdSegment {
    /// Symbolic name.
    Name(String),
    /// Numeric enumeration.
    Num(i64),
}

impl IdSegment {
    /// The symbolic form, if this segment is symbolic.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Num(_) => None,
        }
    }

    /// The numeric form, if this segment is numeric.
    #[must_use]
    pub const fn as_num(&self) -> Option<i64> {
        match self {
            Self::Name(_) => None,
            Self::Num(num) => Some(*num),
        }
    }
}

impl fmt::Display for IdSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Num(num) => write!(f, "{num}"),
        }
    }
}

impl From<&str> for IdSegment {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}

impl From<i64> for IdSegment {
    fn from(num: i64) -> Self {
        Self::Num(num)
    }
}

/// The identity of a referenced object.
///
/// Either identifier form (text or numeric) is legal in any component;
/// catalog resolution chooses a canonical form for output. A missing
/// organization marks a module- or org-relative reference, which only the
/// text form can carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    /// Organization identifier.
    pub org: Option<IdSegment>,
    /// Model identifier within the organization.
    pub model: Option<IdSegment>,
    /// Specific model revision date, if pinned.
    pub rev: Option<String>,
    /// Referenced object kind.
    pub type_id: Option<AriType>,
    /// Object identifier within the model and kind bucket.
    pub obj: Option<IdSegment>,
}

impl Identity {
    /// An absolute identity with all components present.
    #[must_use]
    pub fn new(
        org: impl Into<IdSegment>,
        model: impl Into<IdSegment>,
        type_id: AriType,
        obj: impl Into<IdSegment>,
    ) -> Self {
        Self {
            org: Some(org.into()),
            model: Some(model.into()),
            rev: None,
            type_id: Some(type_id),
            obj: Some(obj.into()),
        }
    }

    /// Check that all of organization, model, kind, and object are present.
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.org.is_some() && self.model.is_some() && self.type_id.is_some() && self.obj.is_some()
    }
}

/// An object reference ARI.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reference {
    /// Identity of the referenced object.
    pub ident: Identity,
    /// Actual parameters. `None` (no parens) is distinct from `Some`
    /// of an empty list (empty parens).
    pub params: Option<Vec<Ari>>,
}

/// A literal ARI: a value and an optional declared type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    /// Declared type, or `None` for an untyped literal.
    pub type_id: Option<AriType>,
    /// The value payload.
    pub value: Value,
}

impl Literal {
    /// An untyped literal.
    #[must_use]
    pub const fn untyped(value: Value) -> Self {
        Self { type_id: None, value }
    }

    /// A typed literal, checked and coerced against the declared type.
    ///
    /// # Errors
    ///
    /// Returns the type mismatch when the value cannot represent the
    /// declared type.
    pub fn typed(type_id: AriType, value: Value) -> Result<Self, TypeError> {
        let value = crate::types::builtin::convert_value(type_id, value)?;
        Ok(Self { type_id: Some(type_id), value })
    }

    /// Check if this is the undefined sentinel.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self.value, Value::Undefined)
    }
}

/// An Application Resource Identifier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ari {
    /// A literal value.
    Literal(Literal),
    /// An object reference.
    Reference(Box<Reference>),
}

impl Ari {
    /// The undefined value.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Literal(Literal::untyped(Value::Undefined))
    }

    /// The untyped null value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::untyped(Value::Null))
    }

    /// Wrap an identity (without parameters) as a reference ARI.
    #[must_use]
    pub fn reference(ident: Identity) -> Self {
        Self::Reference(Box::new(Reference { ident, params: None }))
    }

    /// Check if this is the undefined value.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Literal(lit) if lit.is_undefined())
    }

    /// The literal payload, if this is a literal.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            Self::Reference(_) => None,
        }
    }

    /// The reference payload, if this is a reference.
    #[must_use]
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Literal(_) => None,
            Self::Reference(re) => Some(re),
        }
    }

    /// Call a visitor on this ARI and every ARI nested within it,
    /// including reference parameters.
    pub fn visit<F: FnMut(&Ari)>(&self, visitor: &mut F) {
        match self {
            Self::Literal(lit) => lit.value.visit(visitor),
            Self::Reference(re) => {
                if let Some(params) = &re.params {
                    for param in params {
                        param.visit(visitor);
                    }
                }
            }
        }
        visitor(self);
    }
}

impl From<bool> for Ari {
    fn from(v: bool) -> Self {
        Self::Literal(Literal::untyped(Value::Bool(v)))
    }
}

impl From<i64> for Ari {
    fn from(v: i64) -> Self {
        Self::Literal(Literal::untyped(Value::Int(v.into())))
    }
}

impl From<u64> for Ari {
    fn from(v: u64) -> Self {
        Self::Literal(Literal::untyped(Value::Int(v.into())))
    }
}

impl From<f64> for Ari {
    fn from(v: f64) -> Self {
        Self::Literal(Literal::untyped(Value::Real(v)))
    }
}

impl From<&str> for Ari {
    fn from(v: &str) -> Self {
        Self::Literal(Literal::untyped(Value::Text(v.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_equals_undefined() {
        assert_eq!(Ari::undefined(), Ari::undefined());
        assert_ne!(Ari::undefined(), Ari::null());
    }

    #[test]
    fn test_typed_and_untyped_null_differ() {
        let untyped = Ari::null();
        let typed = Ari::Literal(Literal::typed(AriType::Null, Value::Null).unwrap());
        assert_ne!(untyped, typed);
    }

    #[test]
    fn test_params_none_differs_from_empty() {
        let ident = Identity::new("adm", "mod", AriType::Ctrl, "name");
        let bare = Ari::reference(ident.clone());
        let parens = Ari::Reference(Box::new(Reference { ident, params: Some(vec![]) }));
        assert_ne!(bare, parens);
    }

    #[test]
    fn test_visit_reaches_params() {
        let ident = Identity::new("adm", "mod", AriType::Ctrl, "name");
        let re = Ari::Reference(Box::new(Reference {
            ident,
            params: Some(vec![Ari::from(1i64), Ari::from(2i64)]),
        }));
        let mut count = 0usize;
        re.visit(&mut |_| count += 1);
        // two params plus the reference itself
        assert_eq!(count, 3);
    }
}

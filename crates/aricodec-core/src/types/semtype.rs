//! Semantic type expressions.
//!
//! These are the type shapes ADM modules declare: uses of built-ins or
//! typedefs with refinements, unions, uniform and diverse lists, uniform
//! maps, and table templates. They are plain data; checking lives in
//! [`check`](super::check).

use crate::ari::{AriType, IdSegment, Value};
use std::collections::BTreeMap;

/// A semantic type expression.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SemType {
    /// Use of a base type, optionally refined.
    Use(TypeUse),
    /// Ordered union of alternatives; first match wins.
    Union(Vec<SemType>),
    /// Uniform list over an AC value.
    UList {
        /// Element type.
        item: Box<SemType>,
    },
    /// Heterogeneous fixed-shape list over an AC value.
    DList {
        /// Element types, one per position.
        items: Vec<SemType>,
    },
    /// Uniform map over an AM value.
    UMap {
        /// Key type.
        key: Box<SemType>,
        /// Value type.
        value: Box<SemType>,
    },
    /// Table template over a TBL value.
    TblTemplate(TableTemplate),
}

impl SemType {
    /// A bare use of a built-in type.
    #[must_use]
    pub fn builtin(type_id: AriType) -> Self {
        Self::Use(TypeUse {
            base: TypeRef::BuiltIn(type_id),
            units: None,
            constraints: Vec::new(),
        })
    }
}

/// Use of a named base type with optional refinements.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeUse {
    /// The base type being used.
    pub base: TypeRef,
    /// Optional unit name.
    pub units: Option<String>,
    /// Value constraints applied after the base accepts.
    pub constraints: Vec<Constraint>,
}

/// Reference to a base type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeRef {
    /// A built-in literal type, or an object kind (matching references of
    /// that kind).
    BuiltIn(AriType),
    /// Any literal ARI.
    AnyLit,
    /// Any object reference ARI.
    AnyRef,
    /// An ADM typedef.
    Typedef(TypedefRef),
}

/// Identity of a referenced typedef.
///
/// Organization and model may be omitted for module-local references; the
/// checker supplies the defining module as context.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedefRef {
    /// Organization, if qualified.
    pub org: Option<IdSegment>,
    /// Model, if qualified.
    pub model: Option<IdSegment>,
    /// Typedef name.
    pub name: String,
}

/// One endpoint pair of a numeric or size range (inclusive, open ends
/// omitted).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangePair {
    /// Lower bound, if any.
    pub min: Option<Bound>,
    /// Upper bound, if any.
    pub max: Option<Bound>,
}

/// A range endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    /// Integer endpoint.
    Int(i64),
    /// Real endpoint.
    Real(f64),
}

impl Bound {
    fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => n as f64,
            Self::Real(v) => v,
        }
    }
}

impl RangePair {
    /// Check a numeric value against this range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min.as_f64() {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max.as_f64() {
                return false;
            }
        }
        true
    }
}

/// A refinement constraint on a type use.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint {
    /// Length limit on text (characters) or bytes (octets).
    Size {
        /// Acceptable length ranges (any may match).
        ranges: Vec<RangePair>,
    },
    /// Numeric value ranges (any may match).
    Range {
        /// Acceptable value ranges.
        ranges: Vec<RangePair>,
    },
    /// Full-match regular expression over text values.
    Pattern {
        /// The pattern source.
        regex: String,
    },
    /// Named integer enumeration restriction.
    IntEnum {
        /// Valid values and their labels.
        values: BTreeMap<i64, String>,
    },
}

impl Constraint {
    /// Check a value against this constraint.
    ///
    /// A constraint applied to a value shape it does not cover fails
    /// closed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_valid(&self, value: &Value) -> bool {
        match self {
            Self::Size { ranges } => {
                let len = match value {
                    Value::Text(s) => s.chars().count(),
                    Value::Bytes(b) => b.len(),
                    _ => return false,
                };
                ranges.iter().any(|r| r.contains(len as f64))
            }
            Self::Range { ranges } => {
                let num = match value {
                    #[allow(clippy::cast_precision_loss)]
                    Value::Int(n) => *n as f64,
                    Value::Real(v) => *v,
                    _ => return false,
                };
                ranges.iter().any(|r| r.contains(num))
            }
            Self::Pattern { regex } => {
                let Value::Text(text) = value else {
                    return false;
                };
                match regex::Regex::new(&format!("^(?:{regex})$")) {
                    Ok(re) => re.is_match(text),
                    Err(_) => false,
                }
            }
            Self::IntEnum { values } => {
                let Value::Int(n) = value else {
                    return false;
                };
                i64::try_from(*n).is_ok_and(|n| values.contains_key(&n))
            }
        }
    }
}

/// One column of a table template.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableColumn {
    /// Unique column name.
    pub name: String,
    /// Column value type.
    pub typeobj: SemType,
}

/// A template constraining TBL values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableTemplate {
    /// Column definitions, in order.
    pub columns: Vec<TableColumn>,
    /// Name of the key column, if declared.
    pub key: Option<String>,
    /// Column tuples whose values must be unique across rows.
    pub unique: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let pair = RangePair { min: Some(Bound::Int(0)), max: Some(Bound::Int(10)) };
        assert!(pair.contains(0.0));
        assert!(pair.contains(10.0));
        assert!(!pair.contains(-1.0));
        assert!(!pair.contains(10.5));
    }

    #[test]
    fn test_size_constraint() {
        let con = Constraint::Size {
            ranges: vec![RangePair { min: None, max: Some(Bound::Int(3)) }],
        };
        assert!(con.is_valid(&Value::Text("abc".into())));
        assert!(!con.is_valid(&Value::Text("abcd".into())));
        assert!(con.is_valid(&Value::Bytes(vec![1, 2])));
        assert!(!con.is_valid(&Value::Int(1)));
    }

    #[test]
    fn test_pattern_full_match() {
        let con = Constraint::Pattern { regex: "[a-z]+".into() };
        assert!(con.is_valid(&Value::Text("abc".into())));
        assert!(!con.is_valid(&Value::Text("abc1".into())));
    }

    #[test]
    fn test_int_enum() {
        let mut values = BTreeMap::new();
        values.insert(1, "one".to_string());
        values.insert(2, "two".to_string());
        let con = Constraint::IntEnum { values };
        assert!(con.is_valid(&Value::Int(1)));
        assert!(!con.is_valid(&Value::Int(3)));
    }
}

//! Value patterns over object references.
//!
//! A pattern matches references component by component: a set of text
//! labels, a set of integer enumerations (run-length encoded on the
//! wire), the wildcard, or absence. Patterns are values; matching never
//! consults the catalog.

use crate::ari::{Ari, IdSegment, Identity};
use crate::cbor::{read_one, DecodeError, DecodeErrorKind, RawItem};
use std::collections::BTreeSet;

/// Pattern for one reference identifier component.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentPattern {
    /// Match any of these text labels.
    pub text: Option<BTreeSet<String>>,
    /// Match integers inside any of these half-open ranges.
    pub ranges: Option<Vec<(i64, i64)>>,
    /// Match any present component.
    pub wildcard: bool,
}

impl ComponentPattern {
    /// The wildcard pattern.
    #[must_use]
    pub fn any() -> Self {
        Self { text: None, ranges: None, wildcard: true }
    }

    /// A single-label text pattern.
    #[must_use]
    pub fn label(name: &str) -> Self {
        let mut set = BTreeSet::new();
        set.insert(name.to_string());
        Self { text: Some(set), ranges: None, wildcard: false }
    }

    /// A single-value integer pattern.
    #[must_use]
    pub fn num(value: i64) -> Self {
        Self { text: None, ranges: Some(vec![(value, value + 1)]), wildcard: false }
    }

    /// Match one identity component.
    ///
    /// With neither text nor ranges nor wildcard, only an absent
    /// component matches.
    #[must_use]
    pub fn is_match(&self, id: Option<&IdSegment>) -> bool {
        if self.wildcard {
            return id.is_some();
        }
        if let Some(texts) = &self.text {
            return matches!(id, Some(IdSegment::Name(name)) if texts.contains(name));
        }
        if let Some(ranges) = &self.ranges {
            return matches!(
                id,
                Some(IdSegment::Num(num)) if ranges.iter().any(|(lo, hi)| num >= lo && num < hi)
            );
        }
        id.is_none()
    }
}

/// Pattern over object-reference ARIs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AriPattern {
    /// Organization component pattern.
    pub org: ComponentPattern,
    /// Model component pattern.
    pub model: ComponentPattern,
    /// Object-kind component pattern (by type code).
    pub type_id: ComponentPattern,
    /// Object component pattern.
    pub obj: ComponentPattern,
}

impl AriPattern {
    /// Match a value; only references can match.
    #[must_use]
    pub fn is_match(&self, ari: &Ari) -> bool {
        let Some(re) = ari.as_reference() else {
            return false;
        };
        let ident: &Identity = &re.ident;
        let type_seg = ident.type_id.map(|t| IdSegment::Num(t.code()));
        self.org.is_match(ident.org.as_ref())
            && self.model.is_match(ident.model.as_ref())
            && self.type_id.is_match(type_seg.as_ref())
            && self.obj.is_match(ident.obj.as_ref())
    }

    /// Decode a pattern from its binary form.
    ///
    /// The wire shape is a four-element array `[org, model, type, obj]`;
    /// each element is `true` (wildcard), `null` (absent), an integer or
    /// text (singleton), a run-length integer list, or a text list.
    ///
    /// # Errors
    ///
    /// [`DecodeError`] for malformed input.
    pub fn from_cbor(data: &[u8]) -> Result<Self, DecodeError> {
        let (item, used) = read_one(data)?;
        if used != data.len() {
            return Err(DecodeError::new(DecodeErrorKind::TrailingBytes, used));
        }
        let RawItem::Array(items) = item else {
            return Err(DecodeError::new(DecodeErrorKind::Shape("pattern must be an array"), 0));
        };
        if items.len() != 4 {
            return Err(DecodeError::new(DecodeErrorKind::Shape("pattern arity"), 0));
        }
        Ok(Self {
            org: component(&items[0])?,
            model: component(&items[1])?,
            type_id: component(&items[2])?,
            obj: component(&items[3])?,
        })
    }
}

fn component(item: &RawItem) -> Result<ComponentPattern, DecodeError> {
    let bad = || DecodeError::new(DecodeErrorKind::Shape("pattern component"), 0);
    match item {
        RawItem::Bool(true) => Ok(ComponentPattern::any()),
        RawItem::Null => Ok(ComponentPattern::default()),
        RawItem::Text(name) => Ok(ComponentPattern::label(name)),
        RawItem::Array(subs) if subs.is_empty() => Err(bad()),
        RawItem::Array(subs) => match &subs[0] {
            RawItem::Text(_) => {
                let mut texts = BTreeSet::new();
                for sub in subs {
                    let RawItem::Text(name) = sub else {
                        return Err(bad());
                    };
                    texts.insert(name.clone());
                }
                Ok(ComponentPattern { text: Some(texts), ranges: None, wildcard: false })
            }
            _ => {
                // run-length pairs: (gap, length) from a running cursor
                if subs.len() % 2 != 0 {
                    return Err(bad());
                }
                let mut ranges = Vec::with_capacity(subs.len() / 2);
                let mut cursor = 0i64;
                for pair in subs.chunks_exact(2) {
                    let gap = pair[0]
                        .as_int()
                        .and_then(|n| i64::try_from(n).ok())
                        .ok_or_else(bad)?;
                    let len = pair[1]
                        .as_int()
                        .and_then(|n| i64::try_from(n).ok())
                        .filter(|len| *len > 0)
                        .ok_or_else(bad)?;
                    let start = cursor.checked_add(gap).ok_or_else(bad)?;
                    let end = start.checked_add(len).ok_or_else(bad)?;
                    ranges.push((start, end));
                    cursor = end;
                }
                Ok(ComponentPattern { text: None, ranges: Some(ranges), wildcard: false })
            }
        },
        other => match other.as_int() {
            Some(num) => {
                let num = i64::try_from(num).map_err(|_| bad())?;
                Ok(ComponentPattern::num(num))
            }
            None => Err(bad()),
        },
    }
}

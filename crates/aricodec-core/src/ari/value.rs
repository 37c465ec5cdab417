//! Literal value storage and containers.

use super::time::TimeVal;
use super::type_id::AriType;
use super::{Ari, InvariantError, Literal};

/// Primitive or structured payload of a literal ARI.
///
/// Integers occupy one mathematical domain covering both the 64-bit signed
/// and unsigned ranges; the literal's declared type narrows it. Equality
/// follows the ARI rules: integers by value, reals by IEEE comparison (so
/// NaN never equals NaN), containers componentwise in order.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// The absent-value sentinel.
    Undefined,
    /// The null value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer in `[-2^63, 2^64)`.
    Int(i128),
    /// Real number (binary64 storage; REAL32 restricts the range only).
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// A literal ARI type name.
    TypeRef(AriType),
    /// Timepoint offset from the configured epoch.
    Tp(TimeVal),
    /// Signed timeperiod.
    Td(TimeVal),
    /// ARI collection.
    List(Vec<Ari>),
    /// ARI map.
    Map(AriMap),
    /// ARI table.
    Table(Table),
    /// Execution set.
    ExecSet(ExecSet),
    /// Report set.
    RptSet(RptSet),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            // IEEE comparison: NaN != NaN, and -0.0 == 0.0.
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::TypeRef(a), Self::TypeRef(b)) => a == b,
            (Self::Tp(a), Self::Tp(b)) | (Self::Td(a), Self::Td(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            (Self::ExecSet(a), Self::ExecSet(b)) => a == b,
            (Self::RptSet(a), Self::RptSet(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Check if this is a primitive (non-container) value.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        !matches!(
            self,
            Self::List(_) | Self::Map(_) | Self::Table(_) | Self::ExecSet(_) | Self::RptSet(_)
        )
    }

    /// Visit this value and every ARI nested within it.
    pub fn visit<F: FnMut(&Ari)>(&self, visitor: &mut F) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.visit(visitor);
                }
            }
            Self::Map(map) => {
                for (key, val) in map.iter() {
                    key.visit(visitor);
                    val.visit(visitor);
                }
            }
            Self::Table(table) => {
                for cell in table.cells() {
                    cell.visit(visitor);
                }
            }
            Self::ExecSet(es) => {
                for target in &es.targets {
                    target.visit(visitor);
                }
            }
            Self::RptSet(rs) => {
                for report in &rs.reports {
                    report.source.visit(visitor);
                    for item in &report.items {
                        item.visit(visitor);
                    }
                }
            }
            _ => {}
        }
    }
}

/// An insertion-ordered ARI map with unique keys.
///
/// Keys are restricted to untyped primitive literals (null, bool, integer,
/// text, bytes); duplicates are rejected at insertion.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AriMap {
    entries: Vec<(Ari, Ari)>,
}

impl AriMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair at the end of the map.
    ///
    /// # Errors
    ///
    /// Rejects keys that are not untyped primitive literals, the undefined
    /// value, and keys already present.
    pub fn insert(&mut self, key: Ari, value: Ari) -> Result<(), InvariantError> {
        if !is_map_key(&key) {
            return Err(InvariantError::InvalidMapKey);
        }
        if self.entries.iter().any(|(k, _)| *k == key) {
            return Err(InvariantError::DuplicateMapKey);
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &Ari) -> Option<&Ari> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Ari, Ari)> {
        self.entries.iter()
    }
}

/// Check whether an ARI is usable as a map key.
fn is_map_key(key: &Ari) -> bool {
    let Ari::Literal(lit) = key else {
        return false;
    };
    if lit.type_id.is_some() {
        return false;
    }
    matches!(
        lit.value,
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Text(_) | Value::Bytes(_)
    )
}

/// A row-major grid of ARIs with a declared column count.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    cols: usize,
    cells: Vec<Ari>,
}

impl Table {
    /// Create a table from a declared column count and row-major cells.
    ///
    /// # Errors
    ///
    /// The cell count must be a multiple of the column count, and a table
    /// with zero columns must be empty.
    pub fn new(cols: usize, cells: Vec<Ari>) -> Result<Self, InvariantError> {
        if cols == 0 {
            if !cells.is_empty() {
                return Err(InvariantError::TableShape);
            }
        } else if cells.len() % cols != 0 {
            return Err(InvariantError::TableShape);
        }
        Ok(Self { cols, cells })
    }

    /// Declared column count.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of complete rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.cells.len() / self.cols
        }
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Ari] {
        &self.cells
    }

    /// Iterate over rows as cell slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Ari]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Cell at (row, col).
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Ari> {
        if col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }
}

/// An execution set: a nonce and the target ARIs to execute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecSet {
    /// Correlation nonce: untyped null, unsigned integer, or byte string.
    pub nonce: Box<Literal>,
    /// The execution targets.
    pub targets: Vec<Ari>,
}

impl ExecSet {
    /// Create an execution set, validating the nonce domain.
    ///
    /// # Errors
    ///
    /// The nonce must be an untyped null, a nonnegative integer within the
    /// 64-bit unsigned range, or a byte string.
    pub fn new(nonce: Literal, targets: Vec<Ari>) -> Result<Self, InvariantError> {
        if !is_nonce(&nonce) {
            return Err(InvariantError::InvalidNonce);
        }
        Ok(Self { nonce: Box::new(nonce), targets })
    }
}

/// A report set: a nonce, a reference timepoint, and one or more reports.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RptSet {
    /// Correlation nonce, as for [`ExecSet`].
    pub nonce: Box<Literal>,
    /// Reference timepoint for the contained reports' relative times.
    pub ref_time: TimeVal,
    /// The contained reports.
    pub reports: Vec<Report>,
}

impl RptSet {
    /// Create a report set, validating the nonce domain and report count.
    ///
    /// # Errors
    ///
    /// The nonce domain is as for [`ExecSet::new`]; at least one report is
    /// required.
    pub fn new(
        nonce: Literal,
        ref_time: TimeVal,
        reports: Vec<Report>,
    ) -> Result<Self, InvariantError> {
        if !is_nonce(&nonce) {
            return Err(InvariantError::InvalidNonce);
        }
        if reports.is_empty() {
            return Err(InvariantError::EmptyReportSet);
        }
        Ok(Self { nonce: Box::new(nonce), ref_time, reports })
    }
}

/// A single report: when it was produced, what produced it, and its items.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    /// Time offset relative to the containing set's reference time.
    pub rel_time: TimeVal,
    /// The object reference (or literal) that produced this report.
    pub source: Ari,
    /// The reported values.
    pub items: Vec<Ari>,
}

/// Check the nonce domain shared by execution and report sets.
fn is_nonce(lit: &Literal) -> bool {
    if lit.type_id.is_some() {
        return false;
    }
    match &lit.value {
        Value::Null | Value::Bytes(_) => true,
        Value::Int(n) => (0..=u64::MAX as i128).contains(n),
        _ => false,
    }
}

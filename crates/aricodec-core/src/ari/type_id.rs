//! The ARI type code space.

use core::fmt;

/// Type codes shared by the text and binary forms.
///
/// Nonnegative codes name literal types; negative codes name AMM object
/// kinds, and appear only inside object references. The values are wire
/// values and must not be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i8)]
pub enum AriType {
    /// The null literal type.
    Null = 0,
    /// Boolean literal.
    Bool = 1,
    /// Octet-range unsigned integer.
    Byte = 2,
    /// 32-bit signed integer.
    Int = 4,
    /// 32-bit unsigned integer.
    Uint = 5,
    /// 64-bit signed integer.
    Vast = 6,
    /// 64-bit unsigned integer.
    Uvast = 7,
    /// IEEE-754 binary32 real.
    Real32 = 8,
    /// IEEE-754 binary64 real.
    Real64 = 9,
    /// UTF-8 text string.
    Textstr = 10,
    /// Opaque byte string.
    Bytestr = 11,
    /// Timepoint relative to the configured epoch.
    Tp = 12,
    /// Signed timeperiod.
    Td = 13,
    /// Identifier label (text or integer).
    Label = 14,
    /// Embedded CBOR data item.
    Cbor = 15,
    /// A literal naming an ARI type.
    Aritype = 16,
    /// ARI collection (ordered list).
    Ac = 17,
    /// ARI map (insertion-ordered, key-unique).
    Am = 18,
    /// ARI table (row-major grid).
    Tbl = 19,
    /// Execution set.
    Execset = 20,
    /// Report set.
    Rptset = 21,

    /// Identity object kind.
    Ident = -1,
    /// Constant object kind.
    Const = -2,
    /// Control object kind.
    Ctrl = -3,
    /// Externally defined data object kind.
    Edd = -4,
    /// Operator object kind.
    Oper = -6,
    /// State-based rule object kind.
    Sbr = -8,
    /// Time-based rule object kind.
    Tbr = -10,
    /// Variable object kind.
    Var = -11,
    /// Type definition object kind.
    Typedef = -12,
}

/// All object kinds, in the canonical ordering used by module
/// canonicalization.
pub const OBJECT_KINDS: [AriType; 9] = [
    AriType::Typedef,
    AriType::Ident,
    AriType::Const,
    AriType::Edd,
    AriType::Var,
    AriType::Ctrl,
    AriType::Oper,
    AriType::Sbr,
    AriType::Tbr,
];

impl AriType {
    /// Look up a type by its wire code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        let typ = match code {
            0 => Self::Null,
            1 => Self::Bool,
            2 => Self::Byte,
            4 => Self::Int,
            5 => Self::Uint,
            6 => Self::Vast,
            7 => Self::Uvast,
            8 => Self::Real32,
            9 => Self::Real64,
            10 => Self::Textstr,
            11 => Self::Bytestr,
            12 => Self::Tp,
            13 => Self::Td,
            14 => Self::Label,
            15 => Self::Cbor,
            16 => Self::Aritype,
            17 => Self::Ac,
            18 => Self::Am,
            19 => Self::Tbl,
            20 => Self::Execset,
            21 => Self::Rptset,
            -1 => Self::Ident,
            -2 => Self::Const,
            -3 => Self::Ctrl,
            -4 => Self::Edd,
            -6 => Self::Oper,
            -8 => Self::Sbr,
            -10 => Self::Tbr,
            -11 => Self::Var,
            -12 => Self::Typedef,
            _ => return None,
        };
        Some(typ)
    }

    /// Look up a type by its text-form name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let folded = name.to_ascii_uppercase();
        let typ = match folded.as_str() {
            "NULL" => Self::Null,
            "BOOL" => Self::Bool,
            "BYTE" => Self::Byte,
            "INT" => Self::Int,
            "UINT" => Self::Uint,
            "VAST" => Self::Vast,
            "UVAST" => Self::Uvast,
            "REAL32" => Self::Real32,
            "REAL64" => Self::Real64,
            "TEXTSTR" => Self::Textstr,
            "BYTESTR" => Self::Bytestr,
            "TP" => Self::Tp,
            "TD" => Self::Td,
            "LABEL" => Self::Label,
            "CBOR" => Self::Cbor,
            "ARITYPE" => Self::Aritype,
            "AC" => Self::Ac,
            "AM" => Self::Am,
            "TBL" => Self::Tbl,
            "EXECSET" => Self::Execset,
            "RPTSET" => Self::Rptset,
            "IDENT" => Self::Ident,
            "CONST" => Self::Const,
            "CTRL" => Self::Ctrl,
            "EDD" => Self::Edd,
            "OPER" => Self::Oper,
            "SBR" => Self::Sbr,
            "TBR" => Self::Tbr,
            "VAR" => Self::Var,
            "TYPEDEF" => Self::Typedef,
            _ => return None,
        };
        Some(typ)
    }

    /// The wire code of this type.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i8 as i64
    }

    /// The canonical text-form name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool => "BOOL",
            Self::Byte => "BYTE",
            Self::Int => "INT",
            Self::Uint => "UINT",
            Self::Vast => "VAST",
            Self::Uvast => "UVAST",
            Self::Real32 => "REAL32",
            Self::Real64 => "REAL64",
            Self::Textstr => "TEXTSTR",
            Self::Bytestr => "BYTESTR",
            Self::Tp => "TP",
            Self::Td => "TD",
            Self::Label => "LABEL",
            Self::Cbor => "CBOR",
            Self::Aritype => "ARITYPE",
            Self::Ac => "AC",
            Self::Am => "AM",
            Self::Tbl => "TBL",
            Self::Execset => "EXECSET",
            Self::Rptset => "RPTSET",
            Self::Ident => "IDENT",
            Self::Const => "CONST",
            Self::Ctrl => "CTRL",
            Self::Edd => "EDD",
            Self::Oper => "OPER",
            Self::Sbr => "SBR",
            Self::Tbr => "TBR",
            Self::Var => "VAR",
            Self::Typedef => "TYPEDEF",
        }
    }

    /// Check if this is a literal type (usable in `/TYPE/value` position).
    #[must_use]
    pub const fn is_literal(self) -> bool {
        self.code() >= 0
    }

    /// Check if this is an AMM object kind (usable in references).
    #[must_use]
    pub const fn is_object(self) -> bool {
        self.code() < 0
    }
}

impl fmt::Display for AriType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

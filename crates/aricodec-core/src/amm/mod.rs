//! ADM module records.
//!
//! These are the catalog's input: a digested, source-neutral description
//! of one ADM module and its objects. The external ingestion pipeline
//! produces them (JSON in the filesystem layer); the catalog indexes them;
//! transforms rewrite them.

use crate::ari::AriType;
use crate::types::SemType;

/// Normalize an identifier for name lookup and comparison.
#[must_use]
pub fn normalize_ident(text: &str) -> String {
    text.to_lowercase()
}

/// One ADM module record.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdmModule {
    /// Organization name.
    pub org_name: String,
    /// Organization enumeration, if assigned.
    pub org_enum: Option<u64>,
    /// Module name.
    pub name: String,
    /// Module enumeration, if assigned.
    pub model_enum: Option<u64>,
    /// Revision dates, most recent first.
    pub revisions: Vec<String>,
    /// Free-form metadata pairs.
    pub metadata: Vec<(String, String)>,
    /// Imported module prefixes.
    pub imports: Vec<AdmImport>,
    /// The module's objects, in declaration order.
    pub objects: Vec<AdmObject>,
}

impl AdmModule {
    /// The most recent revision date, if any.
    #[must_use]
    pub fn latest_revision(&self) -> Option<&str> {
        self.revisions.first().map(String::as_str)
    }

    /// Normalized module name.
    #[must_use]
    pub fn norm_name(&self) -> String {
        normalize_ident(&self.name)
    }

    /// Normalized organization name.
    #[must_use]
    pub fn norm_org(&self) -> String {
        normalize_ident(&self.org_name)
    }

    /// Objects of one kind, in declaration order.
    pub fn objects_of(&self, kind: AriType) -> impl Iterator<Item = &AdmObject> {
        self.objects.iter().filter(move |obj| obj.kind == kind)
    }
}

/// One import statement of a module.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdmImport {
    /// Imported module name.
    pub name: String,
    /// Prefix bound within the importing module.
    pub prefix: String,
}

/// One ADM object of any kind.
///
/// The kind decides which optional fields are meaningful: a TYPEDEF
/// carries `typeobj`; a CTRL carries `parameters` and possibly `result`;
/// an OPER adds `operands`; a CONST carries `init_value`; an IDENT
/// carries `bases`; SBR/TBR carry rule fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdmObject {
    /// Object kind.
    pub kind: AriType,
    /// Unique name within the module and kind bucket.
    pub name: String,
    /// Enumeration within the kind bucket, if assigned.
    #[cfg_attr(feature = "serde", serde(rename = "enum", default))]
    pub enum_: Option<u64>,
    /// Description text.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Declared value type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub typeobj: Option<SemType>,
    /// Formal parameters.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: Vec<FormalParam>,
    /// Operands consumed from the expression stack (OPER).
    #[cfg_attr(feature = "serde", serde(default))]
    pub operands: Vec<FormalParam>,
    /// Result type (OPER, CTRL).
    #[cfg_attr(feature = "serde", serde(default))]
    pub result: Option<Box<FormalParam>>,
    /// Initial or constant value, in ARI text form (CONST, VAR).
    #[cfg_attr(feature = "serde", serde(default))]
    pub init_value: Option<String>,
    /// Base identity list (IDENT).
    #[cfg_attr(feature = "serde", serde(default))]
    pub bases: Vec<String>,
    /// Rule condition, in ARI text form (SBR).
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<String>,
    /// Rule action, in ARI text form (SBR, TBR).
    #[cfg_attr(feature = "serde", serde(default))]
    pub action: Option<String>,
    /// Rule period, in timeperiod text form (TBR).
    #[cfg_attr(feature = "serde", serde(default))]
    pub period: Option<String>,
}

impl AdmObject {
    /// A bare object of a kind and name.
    #[must_use]
    pub fn new(kind: AriType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            enum_: None,
            description: None,
            typeobj: None,
            parameters: Vec::new(),
            operands: Vec::new(),
            result: None,
            init_value: None,
            bases: Vec::new(),
            condition: None,
            action: None,
            period: None,
        }
    }

    /// Normalized object name.
    #[must_use]
    pub fn norm_name(&self) -> String {
        normalize_ident(&self.name)
    }
}

/// A named, typed formal parameter (or operand, or result) slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormalParam {
    /// Slot name.
    pub name: String,
    /// Slot type.
    pub typeobj: SemType,
    /// Default value in ARI text form, for trailing omitted actuals.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_ident("Amp-Agent"), "amp-agent");
    }

    #[test]
    fn test_latest_revision() {
        let module = AdmModule {
            revisions: vec!["2024-06-25".into(), "2020-01-01".into()],
            ..AdmModule::default()
        };
        assert_eq!(module.latest_revision(), Some("2024-06-25"));
    }

    #[test]
    fn test_objects_of() {
        let mut module = AdmModule::default();
        module.objects.push(AdmObject::new(AriType::Edd, "a"));
        module.objects.push(AdmObject::new(AriType::Ctrl, "b"));
        module.objects.push(AdmObject::new(AriType::Edd, "c"));
        let names: Vec<_> = module.objects_of(AriType::Edd).map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }
}

//! Symbolic ↔ numeric identifier rewriting.
//!
//! A nickname pass walks an ARI and rewrites every object reference's
//! identity components between symbolic names and numeric enumerations,
//! against a catalog snapshot. Unresolvable references pass through
//! unchanged unless `must_nickname` is set.

use crate::ari::{Ari, IdSegment, Identity, Value};
use crate::catalog::Catalog;
use core::fmt;

/// Conversion direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite symbolic names to numeric enumerations.
    ToEnum,
    /// Rewrite numeric enumerations to symbolic names.
    ToName,
}

/// A strict-mode nickname failure.
#[derive(Clone, Debug, PartialEq)]
pub enum NicknameError {
    /// The module does not exist or has no enumeration assigned.
    Module {
        /// Text form of the failing identity's module component.
        what: String,
    },
    /// The object does not exist or has no enumeration assigned.
    Object {
        /// Text form of the failing identity's object component.
        what: String,
    },
}

impl fmt::Display for NicknameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module { what } => {
                write!(f, "module {what} does not exist or has no enumeration")
            }
            Self::Object { what } => {
                write!(f, "object {what} does not exist or has no enumeration")
            }
        }
    }
}

impl std::error::Error for NicknameError {}

/// Identifier-form converter over ARI trees.
pub struct Converter<'a> {
    mode: Mode,
    catalog: &'a Catalog,
    must: bool,
}

impl<'a> Converter<'a> {
    /// Create a converter.
    ///
    /// With `must_nickname`, any reference that cannot be fully rewritten
    /// is an error; otherwise it passes through unchanged.
    #[must_use]
    pub fn new(mode: Mode, catalog: &'a Catalog, must_nickname: bool) -> Self {
        Self { mode, catalog, must: must_nickname }
    }

    /// Rewrite all references in a value, in place.
    ///
    /// # Errors
    ///
    /// [`NicknameError`] in strict mode only.
    pub fn convert(&self, ari: &mut Ari) -> Result<(), NicknameError> {
        match ari {
            Ari::Reference(re) => {
                self.convert_ident(&mut re.ident)?;
                if let Some(params) = &mut re.params {
                    for param in params {
                        self.convert(param)?;
                    }
                }
            }
            Ari::Literal(lit) => self.convert_value(&mut lit.value)?,
        }
        Ok(())
    }

    fn convert_value(&self, value: &mut Value) -> Result<(), NicknameError> {
        match value {
            Value::List(items) => {
                for item in items {
                    self.convert(item)?;
                }
            }
            Value::Map(map) => {
                // keys are primitives; only values can hold references
                let mut rebuilt = crate::ari::AriMap::new();
                for (key, mut val) in map.iter().cloned().collect::<Vec<_>>() {
                    self.convert(&mut val)?;
                    let _ = rebuilt.insert(key, val);
                }
                *map = rebuilt;
            }
            Value::Table(table) => {
                let cols = table.cols();
                let mut cells = table.cells().to_vec();
                for cell in &mut cells {
                    self.convert(cell)?;
                }
                if let Ok(new_table) = crate::ari::Table::new(cols, cells) {
                    *table = new_table;
                }
            }
            Value::ExecSet(es) => {
                for target in &mut es.targets {
                    self.convert(target)?;
                }
            }
            Value::RptSet(rs) => {
                for report in &mut rs.reports {
                    self.convert(&mut report.source)?;
                    for item in &mut report.items {
                        self.convert(item)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn convert_ident(&self, ident: &mut Identity) -> Result<(), NicknameError> {
        let wants_rewrite = match self.mode {
            Mode::ToEnum => ident_has_name(ident),
            Mode::ToName => ident_has_num(ident),
        };
        if !wants_rewrite {
            return Ok(());
        }

        let module_desc = format!(
            "{}/{}",
            ident.org.as_ref().map(ToString::to_string).unwrap_or_default(),
            ident.model.as_ref().map(ToString::to_string).unwrap_or_default(),
        );
        let Ok((module, obj)) = self.catalog.resolve_ident(ident) else {
            if self.must {
                return Err(NicknameError::Module { what: module_desc });
            }
            tracing::debug!(module = %module_desc, "unresolved reference passes through");
            return Ok(());
        };

        match self.mode {
            Mode::ToEnum => {
                let record = module.record();
                let (Some(org_enum), Some(model_enum)) = (record.org_enum, record.model_enum)
                else {
                    if self.must {
                        return Err(NicknameError::Module { what: module_desc });
                    }
                    return Ok(());
                };
                let Some(obj_enum) = obj.enum_ else {
                    if self.must {
                        return Err(NicknameError::Object { what: obj.name.clone() });
                    }
                    return Ok(());
                };
                let org = i64::try_from(org_enum).unwrap_or_default();
                let model = i64::try_from(model_enum).unwrap_or_default();
                let objn = i64::try_from(obj_enum).unwrap_or_default();
                ident.org = Some(IdSegment::Num(org));
                ident.model = Some(IdSegment::Num(model));
                ident.obj = Some(IdSegment::Num(objn));
            }
            Mode::ToName => {
                let record = module.record();
                ident.org = Some(IdSegment::Name(record.org_name.clone()));
                ident.model = Some(IdSegment::Name(record.name.clone()));
                ident.obj = Some(IdSegment::Name(obj.name.clone()));
            }
        }
        Ok(())
    }
}

fn ident_has_name(ident: &Identity) -> bool {
    let name = |seg: &Option<IdSegment>| matches!(seg, Some(IdSegment::Name(_)));
    name(&ident.org) || name(&ident.model) || name(&ident.obj) || ident.org.is_none()
}

fn ident_has_num(ident: &Identity) -> bool {
    let num = |seg: &Option<IdSegment>| matches!(seg, Some(IdSegment::Num(_)));
    num(&ident.org) || num(&ident.model) || num(&ident.obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::{AdmModule, AdmObject};
    use crate::ari::AriType;
    use crate::text;

    fn catalog() -> Catalog {
        let mut module = AdmModule {
            org_name: "ietf".into(),
            org_enum: Some(1),
            name: "dtnma-agent".into(),
            model_enum: Some(1),
            revisions: vec!["2024-01-01".into()],
            ..AdmModule::default()
        };
        let mut ctrl = AdmObject::new(AriType::Ctrl, "inspect");
        ctrl.enum_ = Some(5);
        module.objects.push(ctrl);
        let mut edd = AdmObject::new(AriType::Edd, "sw-version");
        edd.enum_ = Some(1);
        module.objects.push(edd);
        let mut cat = Catalog::new();
        cat.load_module(module);
        cat
    }

    #[test]
    fn test_to_enum() {
        let cat = catalog();
        let mut ari = text::decode(
            "//ietf/dtnma-agent/CTRL/inspect(//ietf/dtnma-agent/EDD/sw-version)",
        )
        .unwrap();
        Converter::new(Mode::ToEnum, &cat, true).convert(&mut ari).unwrap();
        assert_eq!(ari.to_string(), "ari://1/1/CTRL/5(//1/1/EDD/1)");
    }

    #[test]
    fn test_to_name() {
        let cat = catalog();
        let mut ari = text::decode("//1/1/CTRL/5(//1/1/EDD/1)").unwrap();
        Converter::new(Mode::ToName, &cat, true).convert(&mut ari).unwrap();
        assert_eq!(
            ari.to_string(),
            "ari://ietf/dtnma-agent/CTRL/inspect(//ietf/dtnma-agent/EDD/sw-version)"
        );
    }

    #[test]
    fn test_unresolved_passthrough() {
        let cat = catalog();
        let mut ari = text::decode("//other/module/CTRL/x").unwrap();
        let before = ari.clone();
        Converter::new(Mode::ToEnum, &cat, false).convert(&mut ari).unwrap();
        assert_eq!(ari, before);
    }

    #[test]
    fn test_must_nickname_fails() {
        let cat = catalog();
        let mut ari = text::decode("//other/module/CTRL/x").unwrap();
        let err = Converter::new(Mode::ToEnum, &cat, true).convert(&mut ari);
        assert!(matches!(err, Err(NicknameError::Module { .. })));
    }

    #[test]
    fn test_nested_execset_targets() {
        let cat = catalog();
        let mut ari =
            text::decode("/EXECSET/n=123;(//ietf/dtnma-agent/CTRL/inspect)").unwrap();
        Converter::new(Mode::ToEnum, &cat, true).convert(&mut ari).unwrap();
        assert_eq!(ari.to_string(), "/EXECSET/n=123;(//1/1/CTRL/5)");
    }
}

//! Semantic type checking against a typedef source.

use super::builtin;
use super::semtype::{SemType, TypeRef, TypeUse, TypedefRef};
use super::TypeError;
use crate::ari::{Ari, AriType, Literal, Table, Value};

/// Expansion depth bound; a chain deeper than this is treated as a cycle.
const MAX_DEPTH: usize = 64;

/// Source of typedef expansions.
///
/// Implemented by the catalog; tests use in-memory maps.
pub trait TypedefLookup {
    /// Resolve a typedef reference to its type expression.
    fn typedef(&self, re: &TypedefRef) -> Option<&SemType>;
}

impl TypedefLookup for () {
    fn typedef(&self, _re: &TypedefRef) -> Option<&SemType> {
        None
    }
}

/// Checks ARI values against semantic type expressions.
pub struct TypeChecker<'a, L: TypedefLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: TypedefLookup + ?Sized> TypeChecker<'a, L> {
    /// Create a checker over a typedef source.
    #[must_use]
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Non-coercing check: does the value already inhabit the type?
    ///
    /// The undefined value inhabits no type.
    #[must_use]
    pub fn matches(&self, typ: &SemType, ari: &Ari) -> bool {
        self.matches_at(typ, ari, 0).unwrap_or(false)
    }

    /// Coercing conversion of a value into a type.
    ///
    /// The undefined value passes through unchanged.
    ///
    /// # Errors
    ///
    /// [`TypeError`] when the value cannot be represented.
    pub fn convert(&self, typ: &SemType, ari: &Ari) -> Result<Ari, TypeError> {
        self.convert_at(typ, ari, 0)
    }

    fn matches_at(&self, typ: &SemType, ari: &Ari, depth: usize) -> Result<bool, TypeError> {
        if depth > MAX_DEPTH {
            return Err(TypeError::TypedefCycle { name: String::new() });
        }
        if ari.is_undefined() {
            return Ok(false);
        }
        let ok = match typ {
            SemType::Use(tu) => self.matches_use(tu, ari, depth)?,
            SemType::Union(alts) => {
                let mut any = false;
                for alt in alts {
                    if self.matches_at(alt, ari, depth + 1)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            SemType::UList { item } => match list_value(ari) {
                Some(items) => {
                    let mut all = true;
                    for it in items {
                        if !self.matches_at(item, it, depth + 1)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                None => false,
            },
            SemType::DList { items: types } => match list_value(ari) {
                Some(items) if items.len() == types.len() => {
                    let mut all = true;
                    for (it, ty) in items.iter().zip(types) {
                        if !self.matches_at(ty, it, depth + 1)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                _ => false,
            },
            SemType::UMap { key, value } => match map_value(ari) {
                Some(map) => {
                    let mut all = true;
                    for (k, v) in map.iter() {
                        if !self.matches_at(key, k, depth + 1)?
                            || !self.matches_at(value, v, depth + 1)?
                        {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                None => false,
            },
            SemType::TblTemplate(tmpl) => match table_value(ari) {
                Some(table) if table.cols() == tmpl.columns.len() => {
                    let mut all = true;
                    'rows: for row in table.iter_rows() {
                        for (cell, col) in row.iter().zip(&tmpl.columns) {
                            if !self.matches_at(&col.typeobj, cell, depth + 1)? {
                                all = false;
                                break 'rows;
                            }
                        }
                    }
                    all
                }
                _ => false,
            },
        };
        Ok(ok)
    }

    fn matches_use(&self, tu: &TypeUse, ari: &Ari, depth: usize) -> Result<bool, TypeError> {
        let ok = match &tu.base {
            TypeRef::AnyLit => matches!(ari, Ari::Literal(_)),
            TypeRef::AnyRef => matches!(ari, Ari::Reference(_)),
            TypeRef::BuiltIn(type_id) if type_id.is_object() => match ari {
                Ari::Reference(re) => re.ident.type_id == Some(*type_id),
                Ari::Literal(_) => false,
            },
            TypeRef::BuiltIn(type_id) => match ari {
                Ari::Literal(lit) => {
                    (lit.type_id.is_none() || lit.type_id == Some(*type_id))
                        && builtin::check_value(*type_id, &lit.value)
                }
                Ari::Reference(_) => false,
            },
            TypeRef::Typedef(re) => {
                let expanded = self
                    .lookup
                    .typedef(re)
                    .ok_or_else(|| TypeError::UnresolvedTypedef { name: re.name.clone() })?;
                return Ok(self.matches_at(expanded, ari, depth + 1)?
                    && self.constraints_ok(tu, ari));
            }
        };
        Ok(ok && self.constraints_ok(tu, ari))
    }

    fn constraints_ok(&self, tu: &TypeUse, ari: &Ari) -> bool {
        if tu.constraints.is_empty() {
            return true;
        }
        let Ari::Literal(lit) = ari else {
            return false;
        };
        tu.constraints.iter().all(|con| con.is_valid(&lit.value))
    }

    fn convert_at(&self, typ: &SemType, ari: &Ari, depth: usize) -> Result<Ari, TypeError> {
        if depth > MAX_DEPTH {
            return Err(TypeError::TypedefCycle { name: String::new() });
        }
        if ari.is_undefined() {
            return Ok(ari.clone());
        }
        match typ {
            SemType::Use(tu) => self.convert_use(tu, ari, depth),
            SemType::Union(alts) => {
                for alt in alts {
                    if let Ok(got) = self.convert_at(alt, ari, depth + 1) {
                        return Ok(got);
                    }
                }
                Err(TypeError::UnionNoMatch)
            }
            SemType::UList { item } => {
                let items = list_value(ari)
                    .ok_or(TypeError::Mismatch { type_id: AriType::Ac })?;
                let converted = items
                    .iter()
                    .map(|it| self.convert_at(item, it, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(typed_literal(AriType::Ac, Value::List(converted)))
            }
            SemType::DList { items: types } => {
                let items = list_value(ari)
                    .ok_or(TypeError::Mismatch { type_id: AriType::Ac })?;
                if items.len() != types.len() {
                    return Err(TypeError::Mismatch { type_id: AriType::Ac });
                }
                let converted = items
                    .iter()
                    .zip(types)
                    .map(|(it, ty)| self.convert_at(ty, it, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(typed_literal(AriType::Ac, Value::List(converted)))
            }
            SemType::UMap { key, value } => {
                let map = map_value(ari)
                    .ok_or(TypeError::Mismatch { type_id: AriType::Am })?;
                // Keys are checked without coercion so they stay untyped
                // primitives; only values convert.
                let mut out = crate::ari::AriMap::new();
                for (k, v) in map.iter() {
                    if !self.matches_at(key, k, depth + 1)? {
                        return Err(TypeError::Mismatch { type_id: AriType::Am });
                    }
                    let vc = self.convert_at(value, v, depth + 1)?;
                    out.insert(k.clone(), vc)
                        .map_err(|_| TypeError::Mismatch { type_id: AriType::Am })?;
                }
                Ok(typed_literal(AriType::Am, Value::Map(out)))
            }
            SemType::TblTemplate(tmpl) => {
                let table = table_value(ari)
                    .ok_or(TypeError::Mismatch { type_id: AriType::Tbl })?;
                if table.cols() != tmpl.columns.len() {
                    return Err(TypeError::Mismatch { type_id: AriType::Tbl });
                }
                let mut cells = Vec::with_capacity(table.cells().len());
                for row in table.iter_rows() {
                    for (cell, col) in row.iter().zip(&tmpl.columns) {
                        cells.push(self.convert_at(&col.typeobj, cell, depth + 1)?);
                    }
                }
                let table = Table::new(tmpl.columns.len(), cells)
                    .map_err(|_| TypeError::Mismatch { type_id: AriType::Tbl })?;
                Ok(typed_literal(AriType::Tbl, Value::Table(table)))
            }
        }
    }

    fn convert_use(&self, tu: &TypeUse, ari: &Ari, depth: usize) -> Result<Ari, TypeError> {
        let got = match &tu.base {
            TypeRef::AnyLit => match ari {
                Ari::Literal(_) => ari.clone(),
                Ari::Reference(_) => return Err(TypeError::WrongCategory),
            },
            TypeRef::AnyRef => match ari {
                Ari::Reference(_) => ari.clone(),
                Ari::Literal(_) => return Err(TypeError::WrongCategory),
            },
            TypeRef::BuiltIn(type_id) if type_id.is_object() => match ari {
                Ari::Reference(re) if re.ident.type_id == Some(*type_id) => ari.clone(),
                _ => return Err(TypeError::WrongCategory),
            },
            TypeRef::BuiltIn(type_id) => match ari {
                Ari::Literal(lit) => {
                    if let Some(declared) = lit.type_id {
                        if declared != *type_id {
                            return Err(TypeError::Mismatch { type_id: *type_id });
                        }
                    }
                    let value = builtin::convert_value(*type_id, lit.value.clone())?;
                    typed_literal(*type_id, value)
                }
                Ari::Reference(_) => return Err(TypeError::WrongCategory),
            },
            TypeRef::Typedef(re) => {
                let expanded = self
                    .lookup
                    .typedef(re)
                    .ok_or_else(|| TypeError::UnresolvedTypedef { name: re.name.clone() })?;
                self.convert_at(expanded, ari, depth + 1)?
            }
        };
        if !self.constraints_ok(tu, &got) {
            return Err(TypeError::Constraint { detail: constraint_detail(tu) });
        }
        Ok(got)
    }
}

fn constraint_detail(tu: &TypeUse) -> String {
    format!("{} constraint(s) on type use", tu.constraints.len())
}

fn typed_literal(type_id: AriType, value: Value) -> Ari {
    Ari::Literal(Literal { type_id: Some(type_id), value })
}

fn list_value(ari: &Ari) -> Option<&[Ari]> {
    match ari {
        Ari::Literal(Literal { type_id: Some(AriType::Ac), value: Value::List(items) }) => {
            Some(items.as_slice())
        }
        _ => None,
    }
}

fn map_value(ari: &Ari) -> Option<&crate::ari::AriMap> {
    match ari {
        Ari::Literal(Literal { type_id: Some(AriType::Am), value: Value::Map(map) }) => Some(map),
        _ => None,
    }
}

fn table_value(ari: &Ari) -> Option<&Table> {
    match ari {
        Ari::Literal(Literal { type_id: Some(AriType::Tbl), value: Value::Table(table) }) => {
            Some(table)
        }
        _ => None,
    }
}

//! The loaded ADM catalog.
//!
//! The catalog indexes module records for name and enumeration lookup in
//! both directions. Lookups are deterministic: a missing entry is
//! [`LookupError::NotFound`]; a model name reachable through more than one
//! organization without one being named is [`LookupError::Ambiguous`].
//!
//! Concurrency follows a snapshot-swap discipline: [`CatalogStore`]
//! publishes immutable [`Arc`] snapshots, and loading builds and swaps a
//! new catalog rather than mutating the published one. Codec passes hold
//! one snapshot for their whole operation.

mod resolve;

pub use resolve::ResolveError;

use crate::amm::{normalize_ident, AdmModule, AdmObject};
use crate::ari::{AriType, IdSegment, Identity, TimeBase};
use crate::types::{SemType, TypedefLookup, TypedefRef};
use core::fmt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// A deterministic lookup failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// No entry under the requested keys.
    NotFound,
    /// A model name matches under more than one organization and none was
    /// named.
    Ambiguous,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no such module or object"),
            Self::Ambiguous => write!(f, "model name is ambiguous without an organization"),
        }
    }
}

impl std::error::Error for LookupError {}

/// One indexed module.
#[derive(Clone, Debug)]
pub struct LoadedModule {
    record: AdmModule,
    obj_by_name: BTreeMap<(AriType, String), usize>,
    obj_by_enum: BTreeMap<(AriType, u64), usize>,
}

impl LoadedModule {
    fn new(record: AdmModule) -> Self {
        let mut obj_by_name = BTreeMap::new();
        let mut obj_by_enum = BTreeMap::new();
        for (ix, obj) in record.objects.iter().enumerate() {
            obj_by_name.insert((obj.kind, obj.norm_name()), ix);
            if let Some(enm) = obj.enum_ {
                obj_by_enum.insert((obj.kind, enm), ix);
            }
        }
        Self { record, obj_by_name, obj_by_enum }
    }

    /// The module record.
    #[must_use]
    pub fn record(&self) -> &AdmModule {
        &self.record
    }

    /// Look up an object by kind and identifier segment.
    #[must_use]
    pub fn object(&self, kind: AriType, id: &IdSegment) -> Option<&AdmObject> {
        let ix = match id {
            IdSegment::Name(name) => {
                *self.obj_by_name.get(&(kind, normalize_ident(name)))?
            }
            IdSegment::Num(num) => {
                let enm = u64::try_from(*num).ok()?;
                *self.obj_by_enum.get(&(kind, enm))?
            }
        };
        self.record.objects.get(ix)
    }
}

/// The loaded, indexed catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    modules: Vec<LoadedModule>,
    by_name: BTreeMap<(String, String), Vec<usize>>,
    by_enum: BTreeMap<(u64, u64), Vec<usize>>,
    model_orgs: BTreeMap<String, BTreeSet<String>>,
    time_base: TimeBase,
}

impl Catalog {
    /// An empty catalog with the default time base.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The timepoint epoch this catalog declares.
    #[must_use]
    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    /// Replace the timepoint epoch declaration.
    pub fn set_time_base(&mut self, base: TimeBase) {
        self.time_base = base;
    }

    /// Load one module record.
    ///
    /// Idempotent by (organization, module, latest revision): reloading
    /// the same module replaces the earlier copy.
    pub fn load_module(&mut self, record: AdmModule) {
        tracing::debug!(
            org = %record.org_name,
            module = %record.name,
            revision = record.latest_revision().unwrap_or(""),
            objects = record.objects.len(),
            "loading ADM module"
        );
        let key = (record.norm_org(), record.norm_name());
        let latest = record.latest_revision().map(str::to_string);
        if let Some(entries) = self.by_name.get(&key) {
            for &ix in entries {
                let existing = &self.modules[ix].record;
                if existing.latest_revision().map(str::to_string) == latest {
                    self.modules[ix] = LoadedModule::new(record);
                    return;
                }
            }
        }

        let ix = self.modules.len();
        let loaded = LoadedModule::new(record);
        self.by_name.entry(key.clone()).or_default().push(ix);
        if let (Some(org_enum), Some(model_enum)) =
            (loaded.record.org_enum, loaded.record.model_enum)
        {
            self.by_enum.entry((org_enum, model_enum)).or_default().push(ix);
        }
        self.model_orgs.entry(key.1).or_default().insert(key.0);
        self.modules.push(loaded);
    }

    /// Iterate the loaded module records.
    pub fn modules(&self) -> impl Iterator<Item = &AdmModule> {
        self.modules.iter().map(LoadedModule::record)
    }

    /// Number of loaded modules (revisions counted separately).
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Find a module by organization and model segments.
    ///
    /// An omitted revision selects the latest loaded revision; a present
    /// revision must match exactly. An omitted organization searches all
    /// organizations and fails [`LookupError::Ambiguous`] if more than one
    /// defines the model name.
    ///
    /// # Errors
    ///
    /// [`LookupError`] as above.
    pub fn find_module(
        &self,
        org: Option<&IdSegment>,
        model: &IdSegment,
        rev: Option<&str>,
    ) -> Result<&LoadedModule, LookupError> {
        let candidates: Vec<usize> = match (org, model) {
            (Some(org), model) => self
                .module_indices(org, model)
                .ok_or(LookupError::NotFound)?,
            (None, IdSegment::Name(model_name)) => {
                let orgs = self
                    .model_orgs
                    .get(&normalize_ident(model_name))
                    .ok_or(LookupError::NotFound)?;
                if orgs.len() > 1 {
                    return Err(LookupError::Ambiguous);
                }
                let org = orgs.iter().next().ok_or(LookupError::NotFound)?;
                self.by_name
                    .get(&(org.clone(), normalize_ident(model_name)))
                    .cloned()
                    .ok_or(LookupError::NotFound)?
            }
            (None, IdSegment::Num(_)) => return Err(LookupError::Ambiguous),
        };

        let chosen = match rev {
            Some(rev) => candidates
                .into_iter()
                .find(|&ix| self.modules[ix].record.revisions.iter().any(|r| r == rev)),
            None => candidates.into_iter().max_by(|&a, &b| {
                self.modules[a]
                    .record
                    .latest_revision()
                    .cmp(&self.modules[b].record.latest_revision())
            }),
        };
        chosen.map(|ix| &self.modules[ix]).ok_or(LookupError::NotFound)
    }

    fn module_indices(&self, org: &IdSegment, model: &IdSegment) -> Option<Vec<usize>> {
        match (org, model) {
            (IdSegment::Name(org), IdSegment::Name(model)) => self
                .by_name
                .get(&(normalize_ident(org), normalize_ident(model)))
                .cloned(),
            (IdSegment::Num(org), IdSegment::Num(model)) => {
                let org = u64::try_from(*org).ok()?;
                let model = u64::try_from(*model).ok()?;
                self.by_enum.get(&(org, model)).cloned()
            }
            // mixed forms scan
            _ => {
                let hits: Vec<usize> = self
                    .modules
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| {
                        seg_matches_org(&m.record, org) && seg_matches_model(&m.record, model)
                    })
                    .map(|(ix, _)| ix)
                    .collect();
                (!hits.is_empty()).then_some(hits)
            }
        }
    }

    /// Resolve an object by symbolic names.
    ///
    /// # Errors
    ///
    /// [`LookupError`] when the module or object is missing.
    pub fn resolve_by_name(
        &self,
        org: &str,
        model: &str,
        rev: Option<&str>,
        kind: AriType,
        name: &str,
    ) -> Result<&AdmObject, LookupError> {
        let module = self.find_module(
            Some(&IdSegment::Name(org.into())),
            &IdSegment::Name(model.into()),
            rev,
        )?;
        module
            .object(kind, &IdSegment::Name(name.into()))
            .ok_or(LookupError::NotFound)
    }

    /// Resolve an object by numeric enumerations.
    ///
    /// # Errors
    ///
    /// [`LookupError`] when the module or object is missing.
    pub fn resolve_by_enum(
        &self,
        org_enum: u64,
        model_enum: u64,
        rev: Option<&str>,
        kind: AriType,
        obj_enum: u64,
    ) -> Result<&AdmObject, LookupError> {
        let org = i64::try_from(org_enum).map_err(|_| LookupError::NotFound)?;
        let model = i64::try_from(model_enum).map_err(|_| LookupError::NotFound)?;
        let module = self.find_module(Some(&IdSegment::Num(org)), &IdSegment::Num(model), rev)?;
        let obj = i64::try_from(obj_enum).map_err(|_| LookupError::NotFound)?;
        module.object(kind, &IdSegment::Num(obj)).ok_or(LookupError::NotFound)
    }

    /// Resolve a reference identity, in whatever mix of text and numeric
    /// forms it carries.
    ///
    /// # Errors
    ///
    /// [`LookupError`] when any component fails to resolve.
    pub fn resolve_ident(
        &self,
        ident: &Identity,
    ) -> Result<(&LoadedModule, &AdmObject), LookupError> {
        let model = ident.model.as_ref().ok_or(LookupError::NotFound)?;
        let module = self.find_module(ident.org.as_ref(), model, ident.rev.as_deref())?;
        let kind = ident.type_id.ok_or(LookupError::NotFound)?;
        let obj_id = ident.obj.as_ref().ok_or(LookupError::NotFound)?;
        let obj = module.object(kind, obj_id).ok_or(LookupError::NotFound)?;
        Ok((module, obj))
    }

    /// Look up a typedef's type expression.
    ///
    /// # Errors
    ///
    /// [`LookupError`] when the typedef is missing or carries no type.
    pub fn typedef(&self, org: &str, model: &str, name: &str) -> Result<&SemType, LookupError> {
        let obj = self.resolve_by_name(org, model, None, AriType::Typedef, name)?;
        obj.typeobj.as_ref().ok_or(LookupError::NotFound)
    }
}

fn seg_matches_org(record: &AdmModule, seg: &IdSegment) -> bool {
    match seg {
        IdSegment::Name(name) => record.norm_org() == normalize_ident(name),
        IdSegment::Num(num) => {
            u64::try_from(*num).is_ok_and(|n| record.org_enum == Some(n))
        }
    }
}

fn seg_matches_model(record: &AdmModule, seg: &IdSegment) -> bool {
    match seg {
        IdSegment::Name(name) => record.norm_name() == normalize_ident(name),
        IdSegment::Num(num) => {
            u64::try_from(*num).is_ok_and(|n| record.model_enum == Some(n))
        }
    }
}

impl TypedefLookup for Catalog {
    fn typedef(&self, re: &TypedefRef) -> Option<&SemType> {
        let model = re.model.as_ref()?;
        let module = self.find_module(re.org.as_ref(), model, None).ok()?;
        module
            .object(AriType::Typedef, &IdSegment::Name(re.name.clone()))
            .and_then(|obj| obj.typeobj.as_ref())
    }
}

/// Snapshot-swap wrapper for concurrent use.
///
/// Readers take an [`Arc`] snapshot and never block each other; a load
/// clones the current catalog, applies the new module, and swaps the
/// published pointer.
#[derive(Debug, Default)]
pub struct CatalogStore {
    inner: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over an existing catalog.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self { inner: RwLock::new(Arc::new(catalog)) }
    }

    /// The current immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.inner.read().expect("catalog lock").clone()
    }

    /// Load a module by snapshot replacement.
    pub fn load_module(&self, record: AdmModule) {
        let mut guard = self.inner.write().expect("catalog lock");
        let mut next = (**guard).clone();
        next.load_module(record);
        *guard = Arc::new(next);
    }
}

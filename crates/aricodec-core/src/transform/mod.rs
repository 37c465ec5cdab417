//! Pure ADM module transforms and lint checks.
//!
//! Transforms take an owned module record and return a new one; they are
//! total over well-formed records and idempotent. Lint checks report
//! every finding as a collected issue list instead of stopping at the
//! first.

use crate::amm::{normalize_ident, AdmModule, AdmObject};
use crate::ari::{AriType, OBJECT_KINDS};
use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

/// Assign an enumeration to every object missing one.
///
/// Within each object-kind bucket the smallest unused nonnegative integer
/// wins; unassigned objects are visited in sorted-name order so the
/// result is deterministic. Applying the transform twice is the identity.
#[must_use]
pub fn add_enum(mut module: AdmModule) -> AdmModule {
    for kind in OBJECT_KINDS {
        let used: BTreeSet<u64> = module
            .objects_of(kind)
            .filter_map(|obj| obj.enum_)
            .collect();

        let mut missing: Vec<usize> = module
            .objects
            .iter()
            .enumerate()
            .filter(|(_, obj)| obj.kind == kind && obj.enum_.is_none())
            .map(|(ix, _)| ix)
            .collect();
        missing.sort_by(|&a, &b| module.objects[a].name.cmp(&module.objects[b].name));

        let mut next = 0u64;
        for ix in missing {
            while used.contains(&next) {
                next += 1;
            }
            module.objects[ix].enum_ = Some(next);
            next += 1;
        }
    }
    module
}

/// Reorder a module into the stable canonical ordering.
///
/// Object groups follow the fixed kind order; within a group objects sort
/// by enumeration ascending, with unassigned objects after, by name.
/// Metadata pairs sort by key. Idempotent.
#[must_use]
pub fn canonicalize(mut module: AdmModule) -> AdmModule {
    module.metadata.sort();
    module.imports.sort_by(|a, b| a.name.cmp(&b.name));
    module.objects.sort_by(|a, b| {
        let ka = kind_rank(a.kind);
        let kb = kind_rank(b.kind);
        ka.cmp(&kb)
            .then_with(|| enum_rank(a).cmp(&enum_rank(b)))
            .then_with(|| a.name.cmp(&b.name))
    });
    module
}

fn kind_rank(kind: AriType) -> usize {
    OBJECT_KINDS.iter().position(|&k| k == kind).unwrap_or(OBJECT_KINDS.len())
}

fn enum_rank(obj: &AdmObject) -> (u8, u64) {
    match obj.enum_ {
        Some(enm) => (0, enm),
        None => (1, 0),
    }
}

/// One lint finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    /// The object name the finding is about, or `None` for module-level
    /// findings.
    pub object: Option<String>,
    /// Human-readable detail.
    pub detail: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Some(name) => write!(f, "{name}: {}", self.detail),
            None => f.write_str(&self.detail),
        }
    }
}

/// Lint options.
#[derive(Clone, Copy, Debug, Default)]
pub struct LintOptions {
    /// Require hyphenated (not underscored) identifier style.
    pub ensure_hyphenated_names: bool,
}

/// Run all lint checks over one module, collecting every finding.
#[must_use]
pub fn lint(module: &AdmModule, options: LintOptions) -> Vec<Issue> {
    let mut issues = Vec::new();
    check_metadata(module, &mut issues);
    check_unique_objects(module, &mut issues);
    if options.ensure_hyphenated_names {
        check_hyphenated(module, &mut issues);
    }
    issues
}

/// Required minimum module metadata.
fn check_metadata(module: &AdmModule, issues: &mut Vec<Issue>) {
    if module.name.is_empty() {
        issues.push(Issue { object: None, detail: "module is missing a name".into() });
    }
    if module.org_name.is_empty() {
        issues.push(Issue { object: None, detail: "module is missing an organization".into() });
    }
    if module.model_enum.is_none() {
        issues.push(Issue { object: None, detail: "module is missing an enumeration".into() });
    }
    if module.revisions.is_empty() {
        issues.push(Issue { object: None, detail: "module has no revision".into() });
    }
}

/// Object names and enumerations must be unique per kind bucket.
fn check_unique_objects(module: &AdmModule, issues: &mut Vec<Issue>) {
    let mut names: BTreeMap<(AriType, String), usize> = BTreeMap::new();
    let mut enums: BTreeMap<(AriType, u64), usize> = BTreeMap::new();
    for obj in &module.objects {
        *names.entry((obj.kind, normalize_ident(&obj.name))).or_default() += 1;
        if let Some(enm) = obj.enum_ {
            *enums.entry((obj.kind, enm)).or_default() += 1;
        }
    }
    for ((kind, name), count) in names {
        if count > 1 {
            issues.push(Issue {
                object: Some(name),
                detail: format!("{count} {kind} objects share this name"),
            });
        }
    }
    for ((kind, enm), count) in enums {
        if count > 1 {
            issues.push(Issue {
                object: None,
                detail: format!("{count} {kind} objects share enumeration {enm}"),
            });
        }
    }
}

/// Identifier style: hyphens, not underscores.
fn check_hyphenated(module: &AdmModule, issues: &mut Vec<Issue>) {
    if module.name.contains('_') {
        issues.push(Issue {
            object: None,
            detail: "module name uses underscores".into(),
        });
    }
    for obj in &module.objects {
        if obj.name.contains('_') {
            issues.push(Issue {
                object: Some(obj.name.clone()),
                detail: "object name uses underscores".into(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_with(names: &[(&str, Option<u64>)]) -> AdmModule {
        let mut module = AdmModule {
            org_name: "example".into(),
            name: "test-adm".into(),
            model_enum: Some(7),
            revisions: vec!["2024-01-01".into()],
            ..AdmModule::default()
        };
        for (name, enm) in names {
            let mut obj = AdmObject::new(AriType::Edd, *name);
            obj.enum_ = *enm;
            module.objects.push(obj);
        }
        module
    }

    #[test]
    fn test_add_enum_fills_gaps() {
        let module = module_with(&[("b", None), ("a", None), ("c", Some(1))]);
        let module = add_enum(module);
        let got: BTreeMap<_, _> = module
            .objects
            .iter()
            .map(|o| (o.name.clone(), o.enum_.unwrap()))
            .collect();
        // sorted-name order: a takes 0, b skips the used 1 and takes 2
        assert_eq!(got["a"], 0);
        assert_eq!(got["b"], 2);
        assert_eq!(got["c"], 1);
    }

    #[test]
    fn test_add_enum_idempotent() {
        let module = add_enum(module_with(&[("b", None), ("a", None)]));
        let again = add_enum(module.clone());
        assert_eq!(module, again);
    }

    #[test]
    fn test_add_enum_total() {
        let module = add_enum(module_with(&[("x", None), ("y", Some(3)), ("z", None)]));
        assert!(module.objects.iter().all(|o| o.enum_.is_some()));
    }

    #[test]
    fn test_canonicalize_orders_by_kind_then_enum() {
        let mut module = module_with(&[("late", Some(9)), ("early", Some(0))]);
        let mut td = AdmObject::new(AriType::Typedef, "t");
        td.enum_ = Some(4);
        module.objects.push(td);
        let module = canonicalize(module);
        let order: Vec<_> = module.objects.iter().map(|o| o.name.as_str()).collect();
        // TYPEDEF group sorts before EDD group
        assert_eq!(order, ["t", "early", "late"]);
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let module = canonicalize(module_with(&[("late", Some(9)), ("early", Some(0))]));
        assert_eq!(module, canonicalize(module.clone()));
    }

    #[test]
    fn test_lint_clean_module() {
        let module = module_with(&[("a", Some(0))]);
        assert!(lint(&module, LintOptions::default()).is_empty());
    }

    #[test]
    fn test_lint_collects_all_findings() {
        let mut module = module_with(&[("dup", Some(0)), ("dup", Some(0))]);
        module.model_enum = None;
        let issues = lint(&module, LintOptions::default());
        // missing enum + duplicate name + duplicate enum
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_lint_hyphenated_names() {
        let module = module_with(&[("has_underscore", Some(0))]);
        assert!(lint(&module, LintOptions::default()).is_empty());
        let issues = lint(&module, LintOptions { ensure_hyphenated_names: true });
        assert_eq!(issues.len(), 1);
    }
}

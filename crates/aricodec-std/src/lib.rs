//! aricodec-std: filesystem loading and tool support.
//!
//! This crate layers filesystem concerns over the IO-free core: locating
//! ADM record files through the environment's search paths, loading them
//! into a catalog, and caching the loaded catalog for fast startup.

use aricodec_core::amm::AdmModule;
use aricodec_core::catalog::Catalog;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub mod cache;

pub use aricodec_core;

/// Search-path suffix under XDG data roots.
const DATA_SUFFIX: &str = "aricodec/adms";

/// Cache-path suffix under the XDG cache root.
const CACHE_SUFFIX: &str = "aricodec";

/// An ADM record loading failure.
#[derive(Debug)]
pub enum LoadError {
    /// Filesystem failure.
    Io(std::io::Error),
    /// Record is not valid JSON for the schema.
    Json(serde_json::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::Json(err) => write!(f, "record error: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// ADM search directories, highest priority first.
///
/// `ADM_PATH` leads, then `XDG_DATA_HOME` (default `~/.local/share`), then
/// each entry of `XDG_DATA_DIRS` (default `/usr/local/share:/usr/share`),
/// each with the `aricodec/adms` suffix.
#[must_use]
pub fn adm_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(path) = env::var("ADM_PATH") {
        if !path.is_empty() {
            dirs.push(PathBuf::from(path));
        }
    }
    let data_home = env::var("XDG_DATA_HOME").ok().filter(|v| !v.is_empty()).map_or_else(
        || env::var("HOME").ok().map(|home| PathBuf::from(home).join(".local/share")),
        |v| Some(PathBuf::from(v)),
    );
    if let Some(home) = data_home {
        dirs.push(home.join(DATA_SUFFIX));
    }
    let data_dirs = env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".into());
    for entry in data_dirs.split(':').filter(|e| !e.is_empty()) {
        dirs.push(PathBuf::from(entry).join(DATA_SUFFIX));
    }
    dirs
}

/// The cache directory (`XDG_CACHE_HOME`, default `~/.cache`, with the
/// `aricodec` suffix).
#[must_use]
pub fn cache_dir() -> Option<PathBuf> {
    let root = env::var("XDG_CACHE_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var("HOME").ok().map(|home| PathBuf::from(home).join(".cache")))?;
    Some(root.join(CACHE_SUFFIX))
}

/// Recursively collect ADM record files (`.json`) under a directory.
#[must_use]
pub fn collect_adm_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_recursive(dir, &mut files);
    files.sort();
    files
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files);
        } else if path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"))
        {
            files.push(path);
        }
    }
}

/// Load one ADM record file.
///
/// # Errors
///
/// [`LoadError`] for unreadable files or schema mismatches.
pub fn load_adm_file(path: &Path) -> Result<AdmModule, LoadError> {
    let data = fs::read(path)?;
    serde_json::from_slice(&data).map_err(LoadError::Json)
}

/// Write one ADM record file.
///
/// # Errors
///
/// [`LoadError`] for unwritable paths.
pub fn save_adm_file(path: &Path, module: &AdmModule) -> Result<(), LoadError> {
    let data = serde_json::to_vec_pretty(module).map_err(LoadError::Json)?;
    fs::write(path, data)?;
    Ok(())
}

/// Load every record reachable from the search paths into a catalog.
///
/// Unreadable files are skipped with a warning; the first search path
/// containing a module wins on conflicts, because later loads of the
/// same (org, module, revision) replace earlier ones and iteration here
/// is lowest priority last.
#[must_use]
pub fn load_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    // lowest priority first so higher-priority records replace them
    for dir in adm_search_dirs().iter().rev() {
        for file in collect_adm_files(dir) {
            match load_adm_file(&file) {
                Ok(module) => catalog.load_module(module),
                Err(err) => {
                    tracing::warn!(path = %file.display(), %err, "skipping ADM record");
                }
            }
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let module = AdmModule {
            org_name: "example".into(),
            name: "test-adm".into(),
            model_enum: Some(3),
            revisions: vec!["2024-01-01".into()],
            ..AdmModule::default()
        };
        let json = serde_json::to_string(&module).unwrap();
        let back: AdmModule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, module);
    }
}

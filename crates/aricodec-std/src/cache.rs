//! Catalog caching with fingerprint support.
//!
//! Loading many ADM records is the slow part of startup; this module
//! serializes the record set once and reloads it after verifying a
//! fingerprint over the source files.
//!
//! # File format
//!
//! Cache files use the `.acat` extension by convention:
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (13 or 45 bytes)                │
//! │   magic: [u8; 4]        "ACAT"         │
//! │   version: u32          Schema version │
//! │   has_fingerprint: u8   0 or 1         │
//! │   fingerprint: [u8; 32] (if present)   │
//! ├────────────────────────────────────────┤
//! │ Payload (postcard-encoded records)     │
//! └────────────────────────────────────────┘
//! ```

use aricodec_core::amm::AdmModule;
use aricodec_core::catalog::Catalog;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Current schema version. Bump on any breaking change to the record
/// types.
pub const SCHEMA_VERSION: u32 = 1;

/// Magic bytes identifying a catalog cache file.
const MAGIC: [u8; 4] = *b"ACAT";

/// Cache error.
#[derive(Debug)]
pub enum CacheError {
    /// File does not start with the expected magic bytes.
    InvalidMagic,
    /// Schema version mismatch.
    VersionMismatch {
        /// Expected version.
        expected: u32,
        /// Found version.
        found: u32,
    },
    /// Fingerprint does not match the current sources.
    FingerprintMismatch,
    /// Header is truncated.
    TruncatedHeader,
    /// Payload deserialization failed.
    DeserializationFailed(postcard::Error),
    /// IO error.
    Io(io::Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected ACAT)"),
            Self::VersionMismatch { expected, found } => {
                write!(f, "version mismatch: expected {expected}, found {found}")
            }
            Self::FingerprintMismatch => write!(f, "fingerprint mismatch"),
            Self::TruncatedHeader => write!(f, "truncated header"),
            Self::DeserializationFailed(err) => write!(f, "payload deserialization failed: {err}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DeserializationFailed(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Compute a fingerprint over ADM source files.
///
/// Includes the schema version, so a schema bump invalidates caches.
/// Files are sorted by name for determinism.
#[must_use]
pub fn compute_fingerprint<S: AsRef<str>>(files: &[(S, &[u8])]) -> [u8; 32] {
    let mut sorted: Vec<_> = files.iter().collect();
    sorted.sort_by_key(|(name, _)| name.as_ref());

    let mut hasher = Sha256::new();
    hasher.update(SCHEMA_VERSION.to_le_bytes());
    for (name, content) in sorted {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(content);
    }
    hasher.finalize().into()
}

/// Serialize module records to cache bytes.
///
/// # Errors
///
/// [`CacheError::DeserializationFailed`] if encoding fails.
pub fn serialize_records(
    records: &[AdmModule],
    fingerprint: Option<[u8; 32]>,
) -> Result<Vec<u8>, CacheError> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    match fingerprint {
        Some(fp) => {
            out.push(1);
            out.extend_from_slice(&fp);
        }
        None => out.push(0),
    }
    let payload =
        postcard::to_stdvec(records).map_err(CacheError::DeserializationFailed)?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parse cache bytes back into module records.
///
/// # Errors
///
/// [`CacheError`] on any header or payload mismatch. When
/// `expected_fingerprint` is given, the embedded fingerprint must be
/// present and equal.
pub fn deserialize_records(
    data: &[u8],
    expected_fingerprint: Option<[u8; 32]>,
) -> Result<Vec<AdmModule>, CacheError> {
    if data.len() < 9 {
        return Err(CacheError::TruncatedHeader);
    }
    if data[0..4] != MAGIC {
        return Err(CacheError::InvalidMagic);
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != SCHEMA_VERSION {
        return Err(CacheError::VersionMismatch { expected: SCHEMA_VERSION, found: version });
    }
    let (embedded, payload) = match data[8] {
        0 => (None, &data[9..]),
        1 => {
            if data.len() < 41 {
                return Err(CacheError::TruncatedHeader);
            }
            let mut fp = [0u8; 32];
            fp.copy_from_slice(&data[9..41]);
            (Some(fp), &data[41..])
        }
        _ => return Err(CacheError::TruncatedHeader),
    };
    if let Some(expected) = expected_fingerprint {
        if embedded != Some(expected) {
            return Err(CacheError::FingerprintMismatch);
        }
    }
    postcard::from_bytes(payload).map_err(CacheError::DeserializationFailed)
}

/// Write a catalog's records to a cache file.
///
/// # Errors
///
/// [`CacheError`] on serialization or IO failure.
pub fn save_cache(
    catalog: &Catalog,
    path: &Path,
    fingerprint: Option<[u8; 32]>,
) -> Result<(), CacheError> {
    let records: Vec<AdmModule> = catalog.modules().cloned().collect();
    let bytes = serialize_records(&records, fingerprint)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Load a catalog from a cache file, verifying the fingerprint when
/// given.
///
/// # Errors
///
/// [`CacheError`] on any mismatch; callers regenerate on failure.
pub fn load_cache(
    path: &Path,
    expected_fingerprint: Option<[u8; 32]>,
) -> Result<Catalog, CacheError> {
    let data = fs::read(path)?;
    let records = deserialize_records(&data, expected_fingerprint)?;
    let mut catalog = Catalog::new();
    for record in records {
        catalog.load_module(record);
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AdmModule> {
        vec![AdmModule {
            org_name: "example".into(),
            name: "test-adm".into(),
            model_enum: Some(3),
            revisions: vec!["2024-01-01".into()],
            ..AdmModule::default()
        }]
    }

    #[test]
    fn test_roundtrip_without_fingerprint() {
        let bytes = serialize_records(&sample(), None).unwrap();
        let back = deserialize_records(&bytes, None).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_roundtrip_with_fingerprint() {
        let fp = compute_fingerprint(&[("a.json", b"{}".as_slice())]);
        let bytes = serialize_records(&sample(), Some(fp)).unwrap();
        assert_eq!(deserialize_records(&bytes, Some(fp)).unwrap(), sample());
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let fp = compute_fingerprint(&[("a.json", b"{}".as_slice())]);
        let other = compute_fingerprint(&[("a.json", b"{ }".as_slice())]);
        let bytes = serialize_records(&sample(), Some(fp)).unwrap();
        assert!(matches!(
            deserialize_records(&bytes, Some(other)),
            Err(CacheError::FingerprintMismatch)
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = serialize_records(&sample(), None).unwrap();
        bytes[4] = 0xFF;
        assert!(matches!(
            deserialize_records(&bytes, None),
            Err(CacheError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_magic_check() {
        let err = deserialize_records(b"WRONGMAGICBYTES", None).unwrap_err();
        assert!(matches!(err, CacheError::InvalidMagic));
    }

    #[test]
    fn test_fingerprint_order_independent() {
        let a = compute_fingerprint(&[("a", b"1".as_slice()), ("b", b"2".as_slice())]);
        let b = compute_fingerprint(&[("b", b"2".as_slice()), ("a", b"1".as_slice())]);
        assert_eq!(a, b);
    }
}

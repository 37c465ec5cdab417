//! aricodec-core: ARI codec and ADM catalog
//!
//! This crate implements the value model and bidirectional codec for
//! Application Resource Identifiers (ARIs) of the DTN Management
//! Architecture, together with the catalog of Application Data Model (ADM)
//! modules that gives names and types to the objects ARIs refer to.
//!
//! # Pipeline
//!
//! ```text
//!           text form                      binary form
//!         "ari:/INT/10"                      0x82040A
//!              │                                 │
//!        text::decode ─────► Ari ◄───── cbor::decode
//!        text::encode ◄───── │  ─────► cbor::encode
//!                            │
//!                  catalog::Catalog (name ↔ enum, typedefs)
//!                  types (built-ins, semantic types, checks)
//! ```
//!
//! - **ari** (`ari`): the tagged ARI value universe
//! - **text** (`text`): URI-style text parser and formatter
//! - **cbor** (`cbor`): deterministic CBOR encoder and decoder
//! - **amm** (`amm`): ADM module records (catalog input)
//! - **catalog** (`catalog`): loaded module index and lookups
//! - **types** (`types`): built-in and semantic type checking
//! - **transform** (`transform`): pure module rewriters and lint
//! - **nickname** (`nickname`): symbolic ↔ numeric identifier rewriting
//! - **pattern** (`pattern`): value patterns over object references
//!
//! The codecs are pure: they consult an immutable catalog snapshot and
//! never mutate shared state. Catalog loading is a snapshot-swap behind
//! [`catalog::CatalogStore`].

pub mod amm;
pub mod ari;
pub mod catalog;
pub mod cbor;
pub mod nickname;
pub mod pattern;
pub mod text;
pub mod transform;
pub mod types;

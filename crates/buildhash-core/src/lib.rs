//! Build-artifact fingerprinting
//!
//! Decides whether a build-output tree has meaningfully changed since the
//! last recorded run:
//!
//! - [`policy`]: ordered exclusion rules for volatile paths
//! - [`fingerprint`]: sorted walk folding (path, content) pairs into a digest
//! - [`store`]: per-target comparison against the persisted digest
//! - [`config`]: immutable target registry loaded from `buildhash.toml`

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod marker;
pub mod policy;
pub mod report;
pub mod store;

pub use buildhash_fs::Digest;
pub use config::{Config, FingerprintTarget, Manifest, TargetRegistry};
pub use error::{Error, Result};
pub use fingerprint::{Fingerprinter, Listing, fingerprint};
pub use marker::BuildMarker;
pub use policy::{ExclusionPolicy, ExclusionRule};
pub use report::{FailureKind, Reconciliation, SyncReport, TargetOutcome};
pub use store::FingerprintStore;

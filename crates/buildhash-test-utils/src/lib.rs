//! Shared test utilities for the buildhash workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for build-output trees and workspaces

pub mod tree;

pub use tree::TestTree;

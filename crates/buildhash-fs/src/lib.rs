//! Filesystem primitives for buildhash
//!
//! Provides slash-normalized relative paths, a deterministic sorted tree
//! walker, the SHA-256 digest accumulator and atomic single-file persistence.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;
pub mod walk;

pub use checksum::{Digest, DigestAccumulator, MISSING};
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use walk::{EntryKind, TreeWalker, WalkEntry};

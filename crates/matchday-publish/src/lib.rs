//! Filesystem side of matchday: the published artifacts, the raw fetch
//! cache, and the validation pass run before a deploy.
//!
//! All writes replace whole files atomically.

mod atomic;

pub mod artifacts;
pub mod cache;
pub mod error;
pub mod validate;

pub use artifacts::{Artifact, ArtifactStore, WriteOutcome};
pub use cache::RawCache;
pub use error::{Error, Result};
pub use validate::{Violation, validate};

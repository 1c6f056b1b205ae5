//! Concrete steps wired into the demo scaffolders.
//!
//! The core treats these as opaque units of work; everything it needs from
//! them is the `ScaffoldStep` contract.  Fields are populated by the
//! preparer hooks declared in `app.rs`.

pub mod emit;
pub mod probe;
pub mod summary;

pub use emit::{ArtifactKind, EmitArtifactStep};
pub use probe::ProbeProjectStep;
pub use summary::SummaryStep;

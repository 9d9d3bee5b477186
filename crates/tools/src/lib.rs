//! Developer Tooling: world and player inspector.
//!
//! # Invariants
//! - Tools only read; they never mutate the registry or the body.

mod inspector;

pub use inspector::{BlockInfo, WorldInspector, WorldSummary};

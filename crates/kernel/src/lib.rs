//! Block Kernel: authoritative block registry, render-candidate list, picking.
//!
//! # Invariants
//! - At most one block per coordinate.
//! - The render-candidate list holds exactly one handle per live block.
//! - Every mutation is logged as a [`BlockChange`]; renderers derive from the log.

pub mod pick;
pub mod registry;
pub mod terrain;

pub use pick::{PickHit, pick};
pub use registry::{Block, BlockChange, BlockRegistry, SolidQuery};
pub use terrain::WorldGenConfig;

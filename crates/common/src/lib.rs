//! Shared types: block grid coordinates, materials, render handles.
//!
//! # Invariants
//! - A block at coordinate `c` is a cube centred on `c * block_size`.
//! - Render handles are never reused within a registry.

mod types;

pub use types::{Aabb, BlockCoord, Grid, Material, RenderHandle};

//! Block Mutator: places and breaks blocks from picked faces, undo/redo.
//!
//! # Invariants
//! - Removal resolves the struck handle through the registry, never by geometry.
//! - A placement never overlaps the player body (touching counts as overlap).
//! - Every accepted edit is reversible.

mod editor;

pub use editor::{BlockEditor, EditCommand, EditError, overlaps_body, placement_target};

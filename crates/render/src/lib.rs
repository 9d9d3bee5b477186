//! Rendering Adapter: renderer-agnostic render sync.
//!
//! # Invariants
//! - Renderers never mutate world truth.
//! - Render objects are created and destroyed only from logged block changes.
//!
//! The kernel logs [`BlockChange`](blockyard_kernel::BlockChange)s; [`apply_changes`]
//! replays them onto any [`RenderSync`] backend. [`DebugTextRenderer`] is the
//! headless backend used by the CLI and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderObject, RenderSync, RenderView, Renderer, apply_changes};

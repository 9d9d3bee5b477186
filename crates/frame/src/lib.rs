//! Frame Driver: the session context and the per-frame pipeline.
//!
//! # Invariants
//! - All mutable state lives in a [`Session`]; there is no process-wide state.
//! - Each frame runs input sampling, integration, then render sync, in that order.
//! - Block edits from mouse actions run synchronously, between frames.

mod config;
mod session;

pub use config::{ConfigError, SessionConfig};
pub use session::{FrameReport, MAX_FRAME_DT, Session};

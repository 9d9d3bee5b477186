//! Player Kinematic Integrator: explicit-Euler body with a Grounded/Airborne state machine.
//!
//! # Invariants
//! - Integration is a pure per-frame update; nothing in it can fail.
//! - Jump is honoured only while Grounded.
//! - Ground contact is decided by one query: the cell just under the feet.
//! - Horizontal motion is not resolved against blocks.

mod body;
mod config;

pub use body::{MotionState, PlayerBody, wish_direction};
pub use config::PhysicsConfig;

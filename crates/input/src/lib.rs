//! Input: key flags sampled once per frame, plus discrete actions.
//!
//! # Invariants
//! - Flags start false and are owned by the session, not by globals.
//! - A jump is delivered at most once per key press.
//! - The simulation consumes [`MoveIntent`] and [`Action`], never raw key codes.

pub mod action;
pub mod state;

pub use action::Action;
pub use state::{InputState, Key, MoveIntent};

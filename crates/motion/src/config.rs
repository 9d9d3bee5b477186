use serde::{Deserialize, Serialize};

/// Tunables for the player body. Units are blocks and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Upward velocity set by a jump.
    pub jump_impulse: f32,
    /// Exponential horizontal damping rate.
    pub friction: f32,
    /// Horizontal acceleration from movement input.
    pub acceleration: f32,
    /// How far under the feet the ground probe samples.
    pub ground_probe: f32,
    /// Hard floor plane; the body never falls below it.
    pub floor_y: f32,
    pub height: f32,
    pub radius: f32,
    pub eye_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            jump_impulse: 10.0,
            friction: 10.0,
            acceleration: 60.0,
            ground_probe: 0.05,
            floor_y: -32.0,
            height: 1.8,
            radius: 0.3,
            eye_height: 1.6,
        }
    }
}

impl PhysicsConfig {
    /// Horizontal speed the body settles at under constant input.
    pub fn terminal_speed(&self) -> f32 {
        if self.friction > 0.0 {
            self.acceleration / self.friction
        } else {
            f32::INFINITY
        }
    }

    /// Peak height of a jump from rest.
    pub fn jump_height(&self) -> f32 {
        self.jump_impulse * self.jump_impulse / (2.0 * self.gravity)
    }
}

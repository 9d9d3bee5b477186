use crate::config::PhysicsConfig;
use blockyard_common::{Aabb, Grid};
use blockyard_input::MoveIntent;
use blockyard_kernel::SolidQuery;
use glam::{Vec2, Vec3};

/// Kinematic state of the player body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    Grounded,
    #[default]
    Airborne,
}

/// The single moving body: feet position, velocity, and contact state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    /// Feet position: x/z at the body centre, y at the soles.
    pub position: Vec3,
    pub velocity: Vec3,
    pub state: MotionState,
}

impl PlayerBody {
    /// A body at rest at `feet`, airborne until the first ground check.
    pub fn new(feet: Vec3) -> Self {
        Self {
            position: feet,
            velocity: Vec3::ZERO,
            state: MotionState::Airborne,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.state == MotionState::Grounded
    }

    pub fn eye_position(&self, cfg: &PhysicsConfig) -> Vec3 {
        self.position + Vec3::Y * cfg.eye_height
    }

    /// World-space box from feet to head.
    pub fn bounds(&self, cfg: &PhysicsConfig) -> Aabb {
        let r = cfg.radius;
        Aabb::new(
            self.position - Vec3::new(r, 0.0, r),
            self.position + Vec3::new(r, cfg.height, r),
        )
    }

    /// Advance one frame.
    ///
    /// `yaw` is the view heading in radians; `intent` carries the sampled
    /// movement axes and the jump edge for this frame.
    pub fn step<W: SolidQuery + ?Sized>(
        &mut self,
        intent: &MoveIntent,
        yaw: f32,
        dt: f32,
        world: &W,
        grid: Grid,
        cfg: &PhysicsConfig,
    ) {
        // Exponential friction on the horizontal plane. Capped at 1 so a stiff
        // friction or a long frame stops the body instead of reversing it.
        let damping = (cfg.friction * dt).clamp(0.0, 1.0);
        self.velocity.x -= self.velocity.x * damping;
        self.velocity.z -= self.velocity.z * damping;

        let wish = wish_direction(intent, yaw);
        self.velocity.x += wish.x * cfg.acceleration * dt;
        self.velocity.z += wish.y * cfg.acceleration * dt;

        if intent.jump && self.state == MotionState::Grounded {
            self.velocity.y = cfg.jump_impulse;
            self.state = MotionState::Airborne;
        }

        if self.state == MotionState::Airborne {
            self.velocity.y -= cfg.gravity * dt;
        }

        self.position += self.velocity * dt;

        self.resolve_ground(world, grid, cfg);

        tracing::trace!(
            pos = ?self.position,
            vel = ?self.velocity,
            state = ?self.state,
            "body stepped"
        );
    }

    fn resolve_ground<W: SolidQuery + ?Sized>(&mut self, world: &W, grid: Grid, cfg: &PhysicsConfig) {
        if self.velocity.y > 0.0 {
            self.state = MotionState::Airborne;
            return;
        }

        if self.position.y <= cfg.floor_y {
            self.position.y = cfg.floor_y;
            self.land();
            return;
        }

        let probe = self.position - Vec3::Y * cfg.ground_probe;
        let below = grid.world_to_coord(probe);
        if world.is_solid(below) {
            self.position.y = grid.top(below);
            self.land();
        } else {
            self.state = MotionState::Airborne;
        }
    }

    fn land(&mut self) {
        if self.state == MotionState::Airborne {
            tracing::trace!(y = self.position.y, "landed");
        }
        self.velocity.y = self.velocity.y.max(0.0);
        self.state = MotionState::Grounded;
    }
}

/// Unit-or-zero horizontal wish direction (x, z) for `intent` at heading `yaw`.
///
/// Diagonals are normalised so they are not faster than single-axis input.
pub fn wish_direction(intent: &MoveIntent, yaw: f32) -> Vec2 {
    let forward = Vec2::new(yaw.cos(), yaw.sin());
    // Right-handed, y up: right = forward x up.
    let right = Vec2::new(-forward.y, forward.x);
    (forward * intent.forward + right * intent.strafe).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_common::{BlockCoord, Material};
    use blockyard_kernel::BlockRegistry;
    use std::f32::consts::FRAC_PI_2;

    const DT: f32 = 0.016;

    fn floor_world() -> BlockRegistry {
        let mut reg = BlockRegistry::new();
        for x in -5..=5 {
            for z in -5..=5 {
                reg.put(BlockCoord::new(x, 0, z), Material::Grass);
            }
        }
        reg
    }

    fn grounded_body() -> PlayerBody {
        PlayerBody {
            position: Vec3::new(0.0, 0.5, 0.0),
            velocity: Vec3::ZERO,
            state: MotionState::Grounded,
        }
    }

    fn idle() -> MoveIntent {
        MoveIntent::default()
    }

    #[test]
    fn grounded_body_at_rest_stays_put() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        body.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
        assert!((body.position - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-4);
        assert_eq!(body.state, MotionState::Grounded);
    }

    #[test]
    fn diagonal_speed_matches_axial() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();

        let mut axial = grounded_body();
        let fwd = MoveIntent { forward: 1.0, ..idle() };
        axial.step(&fwd, 0.3, DT, &reg, reg.grid(), &cfg);

        let mut diagonal = grounded_body();
        let fwd_right = MoveIntent {
            forward: 1.0,
            strafe: 1.0,
            ..idle()
        };
        diagonal.step(&fwd_right, 0.3, DT, &reg, reg.grid(), &cfg);

        let a = Vec2::new(axial.velocity.x, axial.velocity.z).length();
        let d = Vec2::new(diagonal.velocity.x, diagonal.velocity.z).length();
        assert!(a > 0.0);
        assert!((a - d).abs() < 1e-5);
    }

    #[test]
    fn wish_direction_follows_yaw() {
        let fwd = MoveIntent { forward: 1.0, ..idle() };
        // yaw -90deg looks down -Z.
        let w = wish_direction(&fwd, -FRAC_PI_2);
        assert!((w - Vec2::new(0.0, -1.0)).length() < 1e-5);
        let right = MoveIntent { strafe: 1.0, ..idle() };
        let w = wish_direction(&right, -FRAC_PI_2);
        assert!((w - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert_eq!(wish_direction(&idle(), 1.0), Vec2::ZERO);
    }

    #[test]
    fn friction_decays_horizontal_velocity() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        body.velocity = Vec3::new(4.0, 0.0, -2.0);
        body.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
        let k = 1.0 - cfg.friction * DT;
        assert!((body.velocity.x - 4.0 * k).abs() < 1e-5);
        assert!((body.velocity.z + 2.0 * k).abs() < 1e-5);
    }

    #[test]
    fn stiff_friction_on_long_frame_never_reverses() {
        let reg = floor_world();
        let cfg = PhysicsConfig {
            friction: 25.0,
            ..PhysicsConfig::default()
        };
        let mut body = grounded_body();
        body.velocity.x = 1.0;
        let mut last = 1.0;
        for _ in 0..6 {
            body.step(&idle(), 0.0, 0.1, &reg, reg.grid(), &cfg);
            assert!(body.velocity.x >= 0.0);
            assert!(body.velocity.x <= last);
            last = body.velocity.x;
        }
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn constant_input_approaches_terminal_speed() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        let fwd = MoveIntent { forward: 1.0, ..idle() };
        for _ in 0..120 {
            body.step(&fwd, 0.0, DT, &reg, reg.grid(), &cfg);
            body.position = Vec3::new(0.0, body.position.y, 0.0);
        }
        let speed = Vec2::new(body.velocity.x, body.velocity.z).length();
        assert!((speed - cfg.terminal_speed()).abs() < 0.1, "speed={speed}");
    }

    #[test]
    fn jump_from_ground_sets_impulse() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        let jump = MoveIntent { jump: true, ..idle() };
        body.step(&jump, 0.0, DT, &reg, reg.grid(), &cfg);
        assert_eq!(body.state, MotionState::Airborne);
        assert!((body.velocity.y - (cfg.jump_impulse - cfg.gravity * DT)).abs() < 1e-5);
        assert!(body.position.y > 0.5);
    }

    #[test]
    fn jump_while_airborne_is_ignored() {
        let reg = BlockRegistry::new();
        let cfg = PhysicsConfig::default();
        let start = PlayerBody {
            position: Vec3::new(0.0, 10.0, 0.0),
            velocity: Vec3::new(0.0, 2.0, 0.0),
            state: MotionState::Airborne,
        };
        let mut with_jump = start;
        with_jump.step(&MoveIntent { jump: true, ..idle() }, 0.0, DT, &reg, reg.grid(), &cfg);
        let mut without = start;
        without.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
        assert_eq!(with_jump.velocity.y, without.velocity.y);
        assert_eq!(with_jump.position, without.position);
    }

    #[test]
    fn falling_body_lands_on_block() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();
        let mut body = PlayerBody::new(Vec3::new(0.0, 3.0, 0.0));
        for _ in 0..200 {
            body.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
        }
        assert_eq!(body.state, MotionState::Grounded);
        assert!((body.position.y - 0.5).abs() < 1e-5);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn jump_rises_and_lands() {
        let reg = floor_world();
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        body.step(&MoveIntent { jump: true, ..idle() }, 0.0, DT, &reg, reg.grid(), &cfg);
        let mut peak: f32 = body.position.y;
        for _ in 0..120 {
            body.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
            peak = peak.max(body.position.y);
        }
        assert!(peak > 1.5, "peak={peak}");
        assert_eq!(body.state, MotionState::Grounded);
        assert!((body.position.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn walking_off_an_edge_becomes_airborne() {
        let mut reg = BlockRegistry::new();
        reg.put(BlockCoord::new(0, 0, 0), Material::Stone);
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        body.position.x = 0.6;
        body.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
        assert_eq!(body.state, MotionState::Airborne);
    }

    #[test]
    fn floor_plane_catches_the_body() {
        let reg = BlockRegistry::new();
        let cfg = PhysicsConfig::default();
        let mut body = PlayerBody::new(Vec3::new(0.0, cfg.floor_y + 0.5, 0.0));
        for _ in 0..60 {
            body.step(&idle(), 0.0, DT, &reg, reg.grid(), &cfg);
        }
        assert_eq!(body.state, MotionState::Grounded);
        assert_eq!(body.position.y, cfg.floor_y);
    }

    #[test]
    fn horizontal_motion_passes_through_blocks() {
        let mut reg = floor_world();
        reg.put(BlockCoord::new(1, 1, 0), Material::Stone);
        let cfg = PhysicsConfig::default();
        let mut body = grounded_body();
        body.velocity.x = 5.0;
        for _ in 0..30 {
            body.step(&MoveIntent { forward: 1.0, ..idle() }, 0.0, DT, &reg, reg.grid(), &cfg);
        }
        assert!(body.position.x > 1.5);
    }

    #[test]
    fn bounds_span_feet_to_head() {
        let cfg = PhysicsConfig::default();
        let b = grounded_body().bounds(&cfg);
        assert_eq!(b.min, Vec3::new(-0.3, 0.5, -0.3));
        assert!((b.max.y - 2.3).abs() < 1e-6);
        assert!((grounded_body().eye_position(&cfg).y - 2.1).abs() < 1e-6);
    }
}

use crate::config::{ConfigError, SessionConfig};
use blockyard_author::{BlockEditor, EditError};
use blockyard_common::{BlockCoord, Grid, Material, RenderHandle};
use blockyard_input::{Action, InputState};
use blockyard_kernel::{BlockRegistry, PickHit, pick, terrain};
use blockyard_motion::{MotionState, PlayerBody};
use blockyard_render::{RenderSync, RenderView, apply_changes};
use glam::Vec3;

/// Longest step the integrator is ever given, in seconds.
pub const MAX_FRAME_DT: f32 = 0.1;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// What one call to [`Session::frame`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Index of this frame, starting at 0.
    pub frame: u64,
    /// The step actually integrated, after clamping.
    pub dt: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub state: MotionState,
    /// Number of block changes pushed to the render backend.
    pub changes_applied: usize,
}

/// The explicit context object: one block world, one player, one view.
pub struct Session {
    config: SessionConfig,
    registry: BlockRegistry,
    editor: BlockEditor,
    body: PlayerBody,
    input: InputState,
    yaw: f32,
    pitch: f32,
    selected: Material,
    frame: u64,
}

impl Session {
    /// Generate the world from `config.world` and spawn the player on it.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.block_size)
            .ok_or(ConfigError::InvalidBlockSize(config.block_size))?;
        let mut registry = BlockRegistry::with_grid(grid);
        terrain::generate(&mut registry, &config.world);
        let spawn = terrain::spawn_point(&registry, &config.world);
        tracing::info!(
            blocks = registry.len(),
            seed = config.world.seed,
            spawn = ?spawn,
            "session started"
        );
        Ok(Self::assemble(config, registry, spawn))
    }

    /// Wrap an existing registry, with the player's feet at `feet`.
    pub fn from_registry(
        config: SessionConfig,
        registry: BlockRegistry,
        feet: Vec3,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, registry, feet))
    }

    fn assemble(config: SessionConfig, registry: BlockRegistry, feet: Vec3) -> Self {
        Self {
            config,
            registry,
            editor: BlockEditor::new(),
            body: PlayerBody::new(feet),
            input: InputState::new(),
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            selected: Material::Grass,
            frame: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn editor(&self) -> &BlockEditor {
        &self.editor
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut PlayerBody {
        &mut self.body
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn selected_material(&self) -> Material {
        self.selected
    }

    pub fn select_material(&mut self, material: Material) {
        if self.selected != material {
            tracing::debug!(%material, "material selected");
        }
        self.selected = material;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Rotate the view by a mouse delta. Positive `dy` looks down.
    pub fn look(&mut self, dx: f32, dy: f32) {
        let s = self.config.mouse_sensitivity;
        self.set_view(self.yaw + dx * s, self.pitch - dy * s);
    }

    /// Set absolute view angles in radians. Pitch is clamped to +-89 degrees.
    pub fn set_view(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw.rem_euclid(std::f32::consts::TAU);
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Turn the view towards a world-space point.
    pub fn look_at(&mut self, target: Vec3) {
        let d = target - self.eye();
        let flat = (d.x * d.x + d.z * d.z).sqrt();
        if flat == 0.0 && d.y == 0.0 {
            return;
        }
        let yaw = if flat > 0.0 { d.z.atan2(d.x) } else { self.yaw };
        self.set_view(yaw, d.y.atan2(flat));
    }

    /// Unit view vector.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cy * cp, sp, sy * cp)
    }

    pub fn eye(&self) -> Vec3 {
        self.body.eye_position(&self.config.physics)
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            forward: self.forward(),
            ..RenderView::default()
        }
    }

    /// Block under the crosshair, within reach.
    pub fn target(&self) -> Option<PickHit> {
        pick(&self.registry, self.eye(), self.forward(), self.config.reach)
    }

    /// Break the block under the crosshair.
    pub fn break_block(&mut self) -> Result<BlockCoord, EditError> {
        let hit = self.target().ok_or(EditError::NoTarget)?;
        self.break_handle(hit.handle)
    }

    /// Break the block owning `handle`, wherever it is.
    pub fn break_handle(&mut self, handle: RenderHandle) -> Result<BlockCoord, EditError> {
        self.editor.break_block(&mut self.registry, handle)
    }

    /// Place the selected material against the face under the crosshair.
    pub fn place_block(&mut self) -> Result<BlockCoord, EditError> {
        let hit = self.target().ok_or(EditError::NoTarget)?;
        let body = self.body.bounds(&self.config.physics);
        self.editor.place_block(
            &mut self.registry,
            hit.point,
            hit.normal,
            self.selected,
            body,
        )
    }

    /// Place the selected material at an explicit cell.
    pub fn place_at(&mut self, coord: BlockCoord) -> Result<(), EditError> {
        let body = self.body.bounds(&self.config.physics);
        self.editor
            .place_at(&mut self.registry, coord, self.selected, body)
    }

    /// Undo the last edit. A restored block may not overlap the player.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let body = self.body.bounds(&self.config.physics);
        self.editor.undo(&mut self.registry, body)
    }

    /// Redo the last undone edit, under the same overlap check.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let body = self.body.bounds(&self.config.physics);
        self.editor.redo(&mut self.registry, body)
    }

    /// Run a discrete command. Returns true if the world changed.
    ///
    /// Policy rejections are logged and otherwise ignored.
    pub fn apply(&mut self, action: Action) -> bool {
        let result = match action {
            Action::BreakBlock => self.break_block().map(|_| true),
            Action::PlaceBlock => self.place_block().map(|_| true),
            Action::SelectMaterial(material) => {
                self.select_material(material);
                Ok(false)
            }
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
        };
        match result {
            Ok(changed) => changed,
            Err(e) => {
                tracing::debug!(?action, "action rejected: {e}");
                false
            }
        }
    }

    /// Advance one frame and push pending block changes to `backend`.
    pub fn frame<R: RenderSync + ?Sized>(&mut self, dt: f32, backend: &mut R) -> FrameReport {
        let _span = tracing::info_span!("frame", n = self.frame).entered();
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        let intent = self.input.sample();
        let grid = self.registry.grid();
        self.body.step(
            &intent,
            self.yaw,
            dt,
            &self.registry,
            grid,
            &self.config.physics,
        );

        let changes = self.registry.drain_changes();
        apply_changes(backend, &changes, grid);

        let report = FrameReport {
            frame: self.frame,
            dt,
            position: self.body.position,
            velocity: self.body.velocity,
            state: self.body.state,
            changes_applied: changes.len(),
        };
        self.frame += 1;
        report
    }

    /// Re-add every live block to a fresh backend without touching the log.
    pub fn resync<R: RenderSync + ?Sized>(&self, backend: &mut R) {
        let grid = self.registry.grid();
        for (handle, coord) in self.registry.candidates() {
            if let Some(material) = self.registry.material(coord) {
                backend.add_object(handle, grid.center(coord), material);
            }
        }
        tracing::debug!(count = self.registry.candidate_count(), "backend resynced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_render::DebugTextRenderer;

    fn empty_session() -> Session {
        Session::from_registry(SessionConfig::default(), BlockRegistry::new(), Vec3::ZERO).unwrap()
    }

    #[test]
    fn default_view_looks_down_negative_z() {
        let s = empty_session();
        assert!((s.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut s = empty_session();
        s.look(0.0, -1.0e6);
        assert!((s.pitch() - PITCH_LIMIT).abs() < 1e-6);
        s.look(0.0, 1.0e6);
        assert!((s.pitch() + PITCH_LIMIT).abs() < 1e-6);
        assert!(s.forward().y > -1.0);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut s = empty_session();
        let target = s.eye() + Vec3::new(3.0, -1.0, 2.0);
        s.look_at(target);
        let expected = (target - s.eye()).normalize();
        assert!((s.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn large_dt_is_clamped() {
        let mut s = empty_session();
        let mut backend = DebugTextRenderer::new();
        assert_eq!(s.frame(5.0, &mut backend).dt, MAX_FRAME_DT);
        assert_eq!(s.frame(-1.0, &mut backend).dt, 0.0);
        assert_eq!(s.frame(f32::NAN, &mut backend).dt, 0.0);
        assert_eq!(s.frame_count(), 3);
    }

    #[test]
    fn invalid_block_size_is_rejected() {
        let cfg = SessionConfig {
            block_size: -1.0,
            ..SessionConfig::default()
        };
        assert!(Session::new(cfg).is_err());
    }

    #[test]
    fn select_material_action() {
        let mut s = empty_session();
        assert!(!s.apply(Action::SelectMaterial(Material::Wood)));
        assert_eq!(s.selected_material(), Material::Wood);
    }

    #[test]
    fn break_with_nothing_in_reach() {
        let mut s = empty_session();
        assert_eq!(s.break_block(), Err(EditError::NoTarget));
        assert!(!s.apply(Action::PlaceBlock));
    }
}

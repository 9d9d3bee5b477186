use blockyard_common::{Grid, Material, RenderHandle};
use blockyard_kernel::BlockChange;
use glam::Vec3;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Eye position in world space.
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.1, 0.0),
            forward: Vec3::NEG_Z,
            fov_degrees: 75.0,
        }
    }
}

/// Backend side of the render sync: owns one render object per block.
pub trait RenderSync {
    /// Create the object for `handle` at `position` with `material`.
    fn add_object(&mut self, handle: RenderHandle, position: Vec3, material: Material);

    /// Destroy the object for `handle`. Unknown handles are ignored.
    fn remove_object(&mut self, handle: RenderHandle);
}

/// Apply a batch of block changes to a backend, in log order.
pub fn apply_changes<R: RenderSync + ?Sized>(backend: &mut R, changes: &[BlockChange], grid: Grid) {
    for change in changes {
        match *change {
            BlockChange::Added {
                handle,
                coord,
                material,
            } => backend.add_object(handle, grid.center(coord), material),
            BlockChange::Removed { handle, .. } => backend.remove_object(handle),
        }
    }
    if !changes.is_empty() {
        tracing::debug!(count = changes.len(), "render sync applied");
    }
}

/// Frame renderer. Reads its own synced objects and a view.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the synced objects and view.
    fn render(&self, view: &RenderView) -> Self::Output;
}

/// A render object as the backend holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderObject {
    pub position: Vec3,
    pub material: Material,
}

/// Debug text renderer.
///
/// Mirrors the scene as a handle-ordered map and prints it as text. Used for
/// CLI output and for checking render sync in tests.
#[derive(Debug)]
pub struct DebugTextRenderer {
    objects: BTreeMap<RenderHandle, RenderObject>,
    /// Maximum number of objects listed per frame.
    pub list_limit: usize,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            list_limit: 16,
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object(&self, handle: RenderHandle) -> Option<&RenderObject> {
        self.objects.get(&handle)
    }

    pub fn objects(&self) -> &BTreeMap<RenderHandle, RenderObject> {
        &self.objects
    }
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSync for DebugTextRenderer {
    fn add_object(&mut self, handle: RenderHandle, position: Vec3, material: Material) {
        self.objects
            .insert(handle, RenderObject { position, material });
    }

    fn remove_object(&mut self, handle: RenderHandle) {
        self.objects.remove(&handle);
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} objects) ===", self.objects.len());
        let _ = writeln!(
            out,
            "Eye: ({:.2}, {:.2}, {:.2}) forward=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.forward.x,
            view.forward.y,
            view.forward.z,
            view.fov_degrees
        );

        let mut by_distance: Vec<(&RenderHandle, &RenderObject, f32)> = self
            .objects
            .iter()
            .map(|(h, o)| (h, o, o.position.distance_squared(view.eye)))
            .collect();
        by_distance.sort_by(|a, b| a.2.total_cmp(&b.2));

        for (handle, obj, _) in by_distance.into_iter().take(self.list_limit) {
            let p = obj.position;
            let _ = writeln!(
                out,
                "  [{handle}] {:<5} pos=({:.1}, {:.1}, {:.1})",
                obj.material.name(),
                p.x,
                p.y,
                p.z
            );
        }
        if self.objects.len() > self.list_limit {
            let _ = writeln!(out, "  ... {} more", self.objects.len() - self.list_limit);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_common::BlockCoord;
    use blockyard_kernel::BlockRegistry;

    #[test]
    fn debug_renderer_empty_scene() {
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&RenderView::default());
        assert!(output.contains("0 objects"));
        assert!(output.contains("fov=75"));
    }

    #[test]
    fn apply_changes_mirrors_registry() {
        let mut reg = BlockRegistry::new();
        let mut renderer = DebugTextRenderer::new();
        let a = reg.put(BlockCoord::new(0, 0, 0), Material::Stone);
        let b = reg.put(BlockCoord::new(2, 1, 0), Material::Wood);
        reg.remove(BlockCoord::new(0, 0, 0));
        apply_changes(&mut renderer, &reg.drain_changes(), reg.grid());

        assert_eq!(renderer.object_count(), reg.candidate_count());
        assert!(renderer.object(a).is_none());
        let obj = renderer.object(b).unwrap();
        assert_eq!(obj.position, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(obj.material, Material::Wood);
    }

    #[test]
    fn overwrite_replaces_render_object() {
        let mut reg = BlockRegistry::new();
        let mut renderer = DebugTextRenderer::new();
        let old = reg.put(BlockCoord::new(0, 0, 0), Material::Grass);
        let new = reg.put(BlockCoord::new(0, 0, 0), Material::Stone);
        apply_changes(&mut renderer, &reg.drain_changes(), reg.grid());
        assert_eq!(renderer.object_count(), 1);
        assert!(renderer.object(old).is_none());
        assert_eq!(renderer.object(new).unwrap().material, Material::Stone);
    }

    #[test]
    fn render_lists_nearest_first_and_truncates() {
        let mut renderer = DebugTextRenderer::new();
        renderer.list_limit = 2;
        renderer.add_object(RenderHandle(0), Vec3::new(0.0, 0.0, -9.0), Material::Stone);
        renderer.add_object(RenderHandle(1), Vec3::new(0.0, 2.0, -1.0), Material::Grass);
        renderer.add_object(RenderHandle(2), Vec3::new(0.0, 0.0, -5.0), Material::Dirt);
        let output = renderer.render(&RenderView::default());
        let grass = output.find("grass").unwrap();
        let dirt = output.find("dirt").unwrap();
        assert!(grass < dirt);
        assert!(!output.contains("stone"));
        assert!(output.contains("1 more"));
    }

    #[test]
    fn remove_unknown_handle_is_ignored() {
        let mut renderer = DebugTextRenderer::new();
        renderer.remove_object(RenderHandle(3));
        assert_eq!(renderer.object_count(), 0);
    }
}

use blockyard_common::{Material, RenderHandle};
use blockyard_render::RenderSync;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;

const HIGHLIGHT_TINT: f32 = 0.35;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
}

impl InstanceData {
    fn new(position: Vec3, block_size: f32, color: [f32; 4]) -> Self {
        let cols = Mat4::from_scale_rotation_translation(
            Vec3::splat(block_size),
            glam::Quat::IDENTITY,
            position,
        )
        .to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

/// CPU side of the wgpu backend: one cube instance per render handle.
///
/// Render-sync calls land here and mark the set dirty; the GPU side packs it
/// into the instance buffer on the next frame.
#[derive(Debug)]
pub struct SceneInstances {
    objects: BTreeMap<RenderHandle, (Vec3, Material)>,
    block_size: f32,
    highlight: Option<RenderHandle>,
    dirty: bool,
}

impl SceneInstances {
    pub fn new(block_size: f32) -> Self {
        Self {
            objects: BTreeMap::new(),
            block_size,
            highlight: None,
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Tint the object under the crosshair. `None` clears it.
    pub fn set_highlight(&mut self, handle: Option<RenderHandle>) {
        if self.highlight != handle {
            self.highlight = handle;
            self.dirty = true;
        }
    }

    /// Pack instances in handle order and clear the dirty flag.
    pub(crate) fn pack(&mut self) -> Vec<InstanceData> {
        self.dirty = false;
        self.objects
            .iter()
            .map(|(&handle, &(position, material))| {
                let mut color = material.color();
                if self.highlight == Some(handle) {
                    for c in &mut color[..3] {
                        *c += (1.0 - *c) * HIGHLIGHT_TINT;
                    }
                }
                InstanceData::new(position, self.block_size, color)
            })
            .collect()
    }
}

impl RenderSync for SceneInstances {
    fn add_object(&mut self, handle: RenderHandle, position: Vec3, material: Material) {
        self.objects.insert(handle, (position, material));
        self.dirty = true;
    }

    fn remove_object(&mut self, handle: RenderHandle) {
        if self.objects.remove(&handle).is_some() {
            self.dirty = true;
        }
    }
}

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Integer coordinate of a block on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for BlockCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl std::fmt::Display for BlockCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Block material tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Grass,
    Dirt,
    Stone,
    Wood,
}

impl Material {
    /// All materials in hotbar order.
    pub const ALL: [Material; 4] = [
        Material::Grass,
        Material::Dirt,
        Material::Stone,
        Material::Wood,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Material::Grass => "grass",
            Material::Dirt => "dirt",
            Material::Stone => "stone",
            Material::Wood => "wood",
        }
    }

    /// Linear RGBA base colour used by the renderers.
    pub fn color(self) -> [f32; 4] {
        match self {
            Material::Grass => [0.30, 0.69, 0.31, 1.0],
            Material::Dirt => [0.47, 0.33, 0.28, 1.0],
            Material::Stone => [0.62, 0.62, 0.62, 1.0],
            Material::Wood => [0.55, 0.43, 0.39, 1.0],
        }
    }

    /// Material for a 1-based hotbar slot.
    pub fn from_slot(slot: usize) -> Option<Material> {
        slot.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle of a render object owned by a block entry.
///
/// Allocated monotonically, so ordering handles gives insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

impl std::fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fixed grid pitch mapping between block coordinates and world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub block_size: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self { block_size: 1.0 }
    }
}

impl Grid {
    /// A grid with the given pitch, or `None` unless it is finite and positive.
    pub fn new(block_size: f32) -> Option<Self> {
        (block_size.is_finite() && block_size > 0.0).then_some(Self { block_size })
    }

    pub fn half(&self) -> f32 {
        self.block_size * 0.5
    }

    /// World-space centre of a block.
    pub fn center(&self, coord: BlockCoord) -> Vec3 {
        coord.as_ivec3().as_vec3() * self.block_size
    }

    /// Nearest grid cell containing a world-space point.
    pub fn world_to_coord(&self, p: Vec3) -> BlockCoord {
        let c = (p / self.block_size + Vec3::splat(0.5)).floor();
        BlockCoord::new(c.x as i32, c.y as i32, c.z as i32)
    }

    /// Axis-aligned bounds `(min, max)` of a block.
    pub fn bounds(&self, coord: BlockCoord) -> (Vec3, Vec3) {
        let c = self.center(coord);
        let h = Vec3::splat(self.half());
        (c - h, c + h)
    }

    /// World-space y of the top face of a block.
    pub fn top(&self, coord: BlockCoord) -> f32 {
        coord.y as f32 * self.block_size + self.half()
    }
}

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_coord_rounds_to_nearest_cell() {
        let g = Grid::default();
        assert_eq!(g.world_to_coord(Vec3::new(0.4, -0.4, 0.0)), BlockCoord::new(0, 0, 0));
        assert_eq!(g.world_to_coord(Vec3::new(0.6, -0.6, 2.49)), BlockCoord::new(1, -1, 2));
    }

    #[test]
    fn grid_rejects_degenerate_pitch() {
        assert!(Grid::new(0.0).is_none());
        assert!(Grid::new(-1.0).is_none());
        assert!(Grid::new(f32::NAN).is_none());
        assert!(Grid::new(f32::INFINITY).is_none());
        assert_eq!(Grid::new(0.5).map(|g| g.half()), Some(0.25));
    }

    #[test]
    fn world_to_coord_respects_block_size() {
        let g = Grid::new(2.0).unwrap();
        assert_eq!(g.world_to_coord(Vec3::new(2.9, 0.0, -3.1)), BlockCoord::new(1, 0, -2));
        assert_eq!(g.center(BlockCoord::new(1, 0, -2)), Vec3::new(2.0, 0.0, -4.0));
    }

    #[test]
    fn bounds_and_top() {
        let g = Grid::default();
        let (min, max) = g.bounds(BlockCoord::new(0, 2, 0));
        assert_eq!(min, Vec3::new(-0.5, 1.5, -0.5));
        assert_eq!(max, Vec3::new(0.5, 2.5, 0.5));
        assert_eq!(g.top(BlockCoord::new(0, 2, 0)), 2.5);
    }

    #[test]
    fn material_slots() {
        assert_eq!(Material::from_slot(1), Some(Material::Grass));
        assert_eq!(Material::from_slot(4), Some(Material::Wood));
        assert_eq!(Material::from_slot(0), None);
        assert_eq!(Material::from_slot(5), None);
    }

    #[test]
    fn aabb_center_and_extents() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(b.center(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(b.half_extents(), Vec3::ONE);
    }

    #[test]
    fn handles_order_by_allocation() {
        assert!(RenderHandle(1) < RenderHandle(2));
    }
}

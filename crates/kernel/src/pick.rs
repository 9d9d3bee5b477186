use crate::registry::BlockRegistry;
use blockyard_common::{BlockCoord, RenderHandle};
use glam::Vec3;

/// Nearest block struck by a pick ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub handle: RenderHandle,
    pub coord: BlockCoord,
    /// World-space point where the ray enters the block.
    pub point: Vec3,
    /// Outward unit normal of the struck face.
    pub normal: Vec3,
    pub distance: f32,
}

/// Cast a ray against every render candidate and return the nearest hit.
///
/// Linear scan, no acceleration structure. Ties in distance keep the
/// candidate that was inserted first. Blocks containing `origin` are skipped.
pub fn pick(
    registry: &BlockRegistry,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<PickHit> {
    let dir = direction.try_normalize()?;
    let grid = registry.grid();
    let mut best: Option<PickHit> = None;

    for (handle, coord) in registry.candidates() {
        let (min, max) = grid.bounds(coord);
        let Some((t, normal)) = ray_aabb_enter(origin, dir, min, max) else {
            continue;
        };
        if t > max_distance {
            continue;
        }
        if best.is_some_and(|b| t >= b.distance) {
            continue;
        }
        best = Some(PickHit {
            handle,
            coord,
            point: origin + dir * t,
            normal,
            distance: t,
        });
    }

    best
}

/// Slab test. Returns the entry distance and the entered face normal, or
/// `None` when the ray misses or starts inside the box.
pub fn ray_aabb_enter(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0usize;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 || !t_enter.is_finite() {
        return None;
    }

    let mut normal = Vec3::ZERO;
    normal[enter_axis] = -dir[enter_axis].signum();
    Some((t_enter, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_common::Material;

    fn c(x: i32, y: i32, z: i32) -> BlockCoord {
        BlockCoord::new(x, y, z)
    }

    #[test]
    fn empty_registry_has_no_hit() {
        let reg = BlockRegistry::new();
        assert!(pick(&reg, Vec3::ZERO, Vec3::NEG_Z, 100.0).is_none());
    }

    #[test]
    fn hits_nearest_block_along_ray() {
        let mut reg = BlockRegistry::new();
        reg.put(c(0, 0, -5), Material::Stone);
        let near = reg.put(c(0, 0, -2), Material::Dirt);

        let hit = pick(&reg, Vec3::ZERO, Vec3::NEG_Z, 100.0).unwrap();
        assert_eq!(hit.handle, near);
        assert_eq!(hit.coord, c(0, 0, -2));
        assert!((hit.distance - 1.5).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Z);
        assert!((hit.point - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-5);
    }

    #[test]
    fn face_normal_points_back_at_viewer() {
        let mut reg = BlockRegistry::new();
        reg.put(c(0, 0, 0), Material::Stone);
        let from_above = pick(&reg, Vec3::new(0.1, 3.0, 0.1), Vec3::NEG_Y, 10.0).unwrap();
        assert_eq!(from_above.normal, Vec3::Y);
        let from_side = pick(&reg, Vec3::new(-3.0, 0.2, 0.0), Vec3::X, 10.0).unwrap();
        assert_eq!(from_side.normal, Vec3::NEG_X);
    }

    #[test]
    fn respects_max_distance() {
        let mut reg = BlockRegistry::new();
        reg.put(c(0, 0, -10), Material::Stone);
        assert!(pick(&reg, Vec3::ZERO, Vec3::NEG_Z, 8.0).is_none());
        assert!(pick(&reg, Vec3::ZERO, Vec3::NEG_Z, 10.0).is_some());
    }

    #[test]
    fn zero_direction_has_no_hit() {
        let mut reg = BlockRegistry::new();
        reg.put(c(0, 0, 0), Material::Stone);
        assert!(pick(&reg, Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, 10.0).is_none());
    }

    #[test]
    fn origin_inside_block_is_not_hit() {
        let mut reg = BlockRegistry::new();
        reg.put(c(0, 0, 0), Material::Stone);
        let far = reg.put(c(0, 0, -3), Material::Stone);
        let hit = pick(&reg, Vec3::ZERO, Vec3::NEG_Z, 10.0).unwrap();
        assert_eq!(hit.handle, far);
    }

    #[test]
    fn equal_distance_tie_keeps_first_inserted() {
        let mut reg = BlockRegistry::new();
        // Ray runs exactly along the shared edge of two blocks at x=0 and x=1.
        let first = reg.put(c(1, 0, -3), Material::Stone);
        reg.put(c(0, 0, -3), Material::Dirt);
        let hit = pick(&reg, Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_Z, 10.0).unwrap();
        assert_eq!(hit.handle, first);
    }

    #[test]
    fn repeated_picks_are_identical() {
        let mut reg = BlockRegistry::new();
        for x in -4..4 {
            for z in -4..4 {
                reg.put(c(x, 0, z), Material::Grass);
            }
        }
        let origin = Vec3::new(0.3, 2.6, 0.7);
        let dir = Vec3::new(0.4, -1.0, -0.3);
        let a = pick(&reg, origin, dir, 8.0);
        for _ in 0..10 {
            assert_eq!(pick(&reg, origin, dir, 8.0), a);
        }
        assert!(a.is_some());
    }

    #[test]
    fn ray_aabb_miss() {
        let min = Vec3::splat(-1.0);
        let max = Vec3::splat(1.0);
        assert!(ray_aabb_enter(Vec3::new(-3.0, 2.0, 0.0), Vec3::X, min, max).is_none());
        assert!(ray_aabb_enter(Vec3::new(-3.0, 0.0, 0.0), Vec3::NEG_X, min, max).is_none());
    }
}

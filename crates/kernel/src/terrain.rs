use crate::registry::BlockRegistry;
use blockyard_common::{BlockCoord, Material};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parameters of the fixed-size generated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Side length of the square world, in blocks.
    pub size: i32,
    /// Number of block layers below the surface (inclusive of the surface).
    pub depth: i32,
    /// Seed for the deterministic height bumps and tree placement.
    pub seed: u64,
    /// Maximum surface bump above y = 0.
    pub max_bump: i32,
    pub trees: usize,
    pub trunk_height: i32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            size: 32,
            depth: 4,
            seed: 42,
            max_bump: 1,
            trees: 6,
            trunk_height: 3,
        }
    }
}

impl WorldGenConfig {
    /// Inclusive x/z range covered by the world, centred on the origin.
    pub fn extent(&self) -> std::ops::RangeInclusive<i32> {
        let half = self.size / 2;
        -half..=(self.size - half - 1)
    }
}

/// Fill `registry` with a layered world: grass over two dirt layers over stone,
/// with seeded one-block bumps and wood trunks.
///
/// The spawn column at the origin is kept flat and tree-free.
pub fn generate(registry: &mut BlockRegistry, config: &WorldGenConfig) {
    let _span = tracing::info_span!("terrain_generate", seed = config.seed).entered();

    for x in config.extent() {
        for z in config.extent() {
            let top = surface_height(config, x, z);
            let bottom = -config.depth.max(1) + 1;
            for y in bottom..=top {
                let material = if y == top {
                    Material::Grass
                } else if y >= top - 2 {
                    Material::Dirt
                } else {
                    Material::Stone
                };
                registry.put(BlockCoord::new(x, y, z), material);
            }
        }
    }

    let mut state = config.seed ^ 0x7472_6565; // "tree"
    let span = config.size.max(1) as u64;
    // At most one trunk per column.
    let wanted = config.trees.min((span * span) as usize);
    let mut planted = 0;
    let mut attempts = 0usize;
    while planted < wanted && attempts < wanted.saturating_mul(16) {
        attempts += 1;
        state = splitmix64(state);
        let x = *config.extent().start() + (state % span) as i32;
        state = splitmix64(state);
        let z = *config.extent().start() + (state % span) as i32;
        if x.abs() <= 2 && z.abs() <= 2 {
            continue;
        }
        let base = surface_height(config, x, z) + 1;
        if registry.get(BlockCoord::new(x, base, z)).is_some() {
            continue;
        }
        for dy in 0..config.trunk_height {
            registry.put(BlockCoord::new(x, base + dy, z), Material::Wood);
        }
        planted += 1;
    }

    tracing::info!(
        blocks = registry.len(),
        trees = planted,
        size = config.size,
        "world generated"
    );
}

/// Surface y of the column at `(x, z)`.
pub fn surface_height(config: &WorldGenConfig, x: i32, z: i32) -> i32 {
    if config.max_bump <= 0 || (x.abs() <= 2 && z.abs() <= 2) {
        return 0;
    }
    let key = config.seed ^ ((x as u32 as u64) << 32) ^ (z as u32 as u64);
    let roll = splitmix64(key) % 8;
    // One column in eight is raised.
    if roll == 0 {
        1 + (splitmix64(key.rotate_left(17)) % config.max_bump as u64) as i32
    } else {
        0
    }
}

/// Feet position on top of the spawn column.
pub fn spawn_point(registry: &BlockRegistry, config: &WorldGenConfig) -> Vec3 {
    let grid = registry.grid();
    let top = surface_height(config, 0, 0);
    Vec3::new(0.0, grid.top(BlockCoord::new(0, top, 0)), 0.0)
}

/// Splitmix64 step. Deterministic across platforms.
pub fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(size: i32, depth: i32) -> WorldGenConfig {
        WorldGenConfig {
            size,
            depth,
            max_bump: 0,
            trees: 0,
            ..Default::default()
        }
    }

    #[test]
    fn flat_world_block_count() {
        let mut reg = BlockRegistry::new();
        generate(&mut reg, &flat(8, 3));
        assert_eq!(reg.len(), 8 * 8 * 3);
        assert_eq!(reg.candidate_count(), reg.len());
    }

    #[test]
    fn layers_are_grass_dirt_stone() {
        let mut reg = BlockRegistry::new();
        generate(&mut reg, &flat(4, 5));
        assert_eq!(reg.material(BlockCoord::new(0, 0, 0)), Some(Material::Grass));
        assert_eq!(reg.material(BlockCoord::new(0, -1, 0)), Some(Material::Dirt));
        assert_eq!(reg.material(BlockCoord::new(0, -2, 0)), Some(Material::Dirt));
        assert_eq!(reg.material(BlockCoord::new(0, -3, 0)), Some(Material::Stone));
        assert_eq!(reg.material(BlockCoord::new(0, -4, 0)), Some(Material::Stone));
        assert!(reg.get(BlockCoord::new(0, -5, 0)).is_none());
    }

    #[test]
    fn extent_covers_size() {
        let cfg = flat(5, 1);
        assert_eq!(cfg.extent().count(), 5);
        let cfg = flat(32, 1);
        assert_eq!(cfg.extent(), -16..=15);
    }

    #[test]
    fn same_seed_same_world() {
        let cfg = WorldGenConfig::default();
        let mut a = BlockRegistry::new();
        let mut b = BlockRegistry::new();
        generate(&mut a, &cfg);
        generate(&mut b, &cfg);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = BlockRegistry::new();
        let mut b = BlockRegistry::new();
        generate(&mut a, &WorldGenConfig { seed: 1, ..Default::default() });
        generate(&mut b, &WorldGenConfig { seed: 2, ..Default::default() });
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn trees_are_wood_and_avoid_spawn() {
        let cfg = WorldGenConfig::default();
        let mut reg = BlockRegistry::new();
        generate(&mut reg, &cfg);
        let wood = reg.material_counts().get(&Material::Wood).copied().unwrap_or(0);
        assert!(wood > 0);
        assert_eq!(wood % cfg.trunk_height as usize, 0);
        for y in 1..=cfg.trunk_height {
            assert!(reg.get(BlockCoord::new(0, y, 0)).is_none());
        }
    }

    #[test]
    fn huge_tree_count_is_bounded_by_columns() {
        let cfg = WorldGenConfig {
            size: 6,
            max_bump: 0,
            trees: usize::MAX,
            ..Default::default()
        };
        let mut reg = BlockRegistry::new();
        generate(&mut reg, &cfg);
        let wood = reg.material_counts().get(&Material::Wood).copied().unwrap_or(0);
        assert!(wood <= 6 * 6 * cfg.trunk_height as usize);
        assert_eq!(wood % cfg.trunk_height as usize, 0);
    }

    #[test]
    fn spawn_point_sits_on_surface() {
        let cfg = WorldGenConfig::default();
        let mut reg = BlockRegistry::new();
        generate(&mut reg, &cfg);
        let spawn = spawn_point(&reg, &cfg);
        assert_eq!(spawn, Vec3::new(0.0, 0.5, 0.0));
    }
}

use blockyard_common::{BlockCoord, Material, RenderHandle};
use blockyard_kernel::BlockRegistry;
use blockyard_motion::{MotionState, PlayerBody};
use glam::Vec3;
use std::collections::BTreeMap;

/// World inspector for developer tooling.
///
/// Read-only queries against the registry and the player body for HUDs,
/// CLI output, and debugging.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world and player.
    pub fn summary(registry: &BlockRegistry, body: &PlayerBody) -> WorldSummary {
        WorldSummary {
            block_count: registry.len(),
            candidate_count: registry.candidate_count(),
            pending_changes: registry.changes().len(),
            materials: registry.material_counts(),
            position: body.position,
            velocity: body.velocity,
            state: body.state,
            state_hash: registry.state_hash(),
        }
    }

    /// Details of the block at `coord`, if any.
    pub fn inspect_block(registry: &BlockRegistry, coord: BlockCoord) -> Option<BlockInfo> {
        registry.get(coord).map(|block| BlockInfo {
            coord,
            material: block.material,
            handle: block.handle,
            center: registry.grid().center(coord),
        })
    }

    /// Coordinates in a vertical column, top to bottom.
    pub fn column(registry: &BlockRegistry, x: i32, z: i32) -> Vec<(i32, Material)> {
        let mut col: Vec<(i32, Material)> = registry
            .candidates()
            .filter(|(_, c)| c.x == x && c.z == z)
            .filter_map(|(_, c)| registry.material(c).map(|m| (c.y, m)))
            .collect();
        col.sort_by(|a, b| b.0.cmp(&a.0));
        col
    }
}

/// Summary of world and player state.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub block_count: usize,
    pub candidate_count: usize,
    pub pending_changes: usize,
    pub materials: BTreeMap<Material, usize>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub state: MotionState,
    pub state_hash: u64,
}

impl WorldSummary {
    /// Registry and candidate list agree.
    pub fn is_consistent(&self) -> bool {
        self.block_count == self.candidate_count
    }
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: blocks={} candidates={} pending={} hash={:#x} | Player: pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2}) {:?}",
            self.block_count,
            self.candidate_count,
            self.pending_changes,
            self.state_hash,
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
            self.state,
        )
    }
}

/// Detailed info about a single block.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub coord: BlockCoord,
    pub material: Material,
    pub handle: RenderHandle,
    pub center: Vec3,
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block {} {} handle={} center=({:.2}, {:.2}, {:.2})",
            self.coord, self.material, self.handle, self.center.x, self.center.y, self.center.z,
        )
    }
}

use blockyard_common::{BlockCoord, Grid, Material, RenderHandle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A change record produced by every mutation of the registry.
///
/// The change log is what the render-sync step consumes; it is also enough to
/// rebuild the registry from scratch via [`BlockRegistry::replay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockChange {
    /// A block entry (and its render object) came into existence.
    Added {
        handle: RenderHandle,
        coord: BlockCoord,
        material: Material,
    },
    /// A block entry was removed or overwritten; its render object is gone.
    Removed {
        handle: RenderHandle,
        coord: BlockCoord,
        material: Material,
    },
}

/// A live block entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub material: Material,
    pub handle: RenderHandle,
}

/// Collision query used by the kinematic integrator.
pub trait SolidQuery {
    /// Whether the cell at `coord` blocks movement.
    fn is_solid(&self, coord: BlockCoord) -> bool;
}

/// Coordinate-keyed block store plus the flat render-candidate list.
///
/// `candidates` is keyed by render handle; handles are allocated
/// monotonically, so its iteration order is insertion order. It doubles as
/// the handle→coordinate lookup used when removing a picked block.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    grid: Grid,
    blocks: HashMap<BlockCoord, Block>,
    candidates: BTreeMap<RenderHandle, BlockCoord>,
    next_handle: u64,
    /// Append-only log of mutations since the last drain.
    changes: Vec<BlockChange>,
}

impl BlockRegistry {
    /// Empty registry on a unit grid.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            ..Default::default()
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Number of occupied coordinates.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Insert or overwrite the block at `coord`. Returns the new render handle.
    pub fn put(&mut self, coord: BlockCoord, material: Material) -> RenderHandle {
        self.remove(coord);
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.blocks.insert(coord, Block { material, handle });
        self.candidates.insert(handle, coord);
        self.changes.push(BlockChange::Added {
            handle,
            coord,
            material,
        });
        handle
    }

    pub fn get(&self, coord: BlockCoord) -> Option<&Block> {
        self.blocks.get(&coord)
    }

    /// Material at `coord`, if occupied.
    pub fn material(&self, coord: BlockCoord) -> Option<Material> {
        self.blocks.get(&coord).map(|b| b.material)
    }

    /// Delete the block at `coord`. No-op (returns `None`) when unoccupied.
    pub fn remove(&mut self, coord: BlockCoord) -> Option<Block> {
        let block = self.blocks.remove(&coord)?;
        self.candidates.remove(&block.handle);
        self.changes.push(BlockChange::Removed {
            handle: block.handle,
            coord,
            material: block.material,
        });
        Some(block)
    }

    /// Resolve a render handle back to the coordinate that owns it.
    pub fn coord_of(&self, handle: RenderHandle) -> Option<BlockCoord> {
        self.candidates.get(&handle).copied()
    }

    /// Render candidates in insertion order, with their owning coordinates.
    pub fn candidates(&self) -> impl Iterator<Item = (RenderHandle, BlockCoord)> + '_ {
        self.candidates.iter().map(|(h, c)| (*h, *c))
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Read-only access to pending changes.
    pub fn changes(&self) -> &[BlockChange] {
        &self.changes
    }

    /// Drain and return pending changes. Used by the render-sync step.
    pub fn drain_changes(&mut self) -> Vec<BlockChange> {
        std::mem::take(&mut self.changes)
    }

    /// Count of live blocks per material, in material order.
    pub fn material_counts(&self) -> BTreeMap<Material, usize> {
        let mut counts = BTreeMap::new();
        for block in self.blocks.values() {
            *counts.entry(block.material).or_insert(0) += 1;
        }
        counts
    }

    /// Rebuild a registry from a change log.
    ///
    /// Handles are taken from the log, so a replayed registry hashes equal to
    /// the one that produced it.
    pub fn replay(grid: Grid, changes: &[BlockChange]) -> Self {
        let mut reg = Self::with_grid(grid);
        for change in changes {
            match *change {
                BlockChange::Added {
                    handle,
                    coord,
                    material,
                } => {
                    if let Some(old) = reg.blocks.insert(coord, Block { material, handle }) {
                        reg.candidates.remove(&old.handle);
                    }
                    reg.candidates.insert(handle, coord);
                    reg.next_handle = reg.next_handle.max(handle.0 + 1);
                }
                BlockChange::Removed { handle, coord, .. } => {
                    if reg.blocks.get(&coord).is_some_and(|b| b.handle == handle) {
                        reg.blocks.remove(&coord);
                    }
                    reg.candidates.remove(&handle);
                }
            }
        }
        reg
    }

    /// Deterministic hash of the live blocks, walked in candidate order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (handle, coord) in &self.candidates {
            mix(&mut h, &handle.0.to_le_bytes());
            mix(&mut h, &coord.x.to_le_bytes());
            mix(&mut h, &coord.y.to_le_bytes());
            mix(&mut h, &coord.z.to_le_bytes());
            if let Some(block) = self.blocks.get(coord) {
                mix(&mut h, &[block.material as u8]);
            }
        }
        h
    }
}

impl SolidQuery for BlockRegistry {
    fn is_solid(&self, coord: BlockCoord) -> bool {
        self.blocks.contains_key(&coord)
    }
}

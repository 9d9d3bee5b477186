use blockyard_common::{Aabb, BlockCoord, Grid, Material, RenderHandle};
use blockyard_kernel::BlockRegistry;
use glam::Vec3;

/// A block edit that can be applied to the registry and reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// A block was placed on an empty cell. Undo = remove it.
    Place { coord: BlockCoord, material: Material },
    /// A block was broken. Undo = put it back.
    Break { coord: BlockCoord, material: Material },
}

impl EditCommand {
    /// Produce the inverse command (for undo).
    pub fn inverse(&self) -> Self {
        match *self {
            Self::Place { coord, material } => Self::Break { coord, material },
            Self::Break { coord, material } => Self::Place { coord, material },
        }
    }
}

/// Rejections from the placement/removal policy.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EditError {
    #[error("render handle {0} does not belong to a block")]
    UnknownHandle(RenderHandle),
    #[error("cell {0} would overlap the player")]
    OverlapsPlayer(BlockCoord),
    #[error("cell {0} is already occupied")]
    Occupied(BlockCoord),
    #[error("no block within reach")]
    NoTarget,
}

/// Grid cell a block lands in when placed against a struck face.
///
/// The hit point is pushed half a block out along the face normal, then
/// snapped to the nearest cell.
pub fn placement_target(grid: Grid, point: Vec3, normal: Vec3) -> BlockCoord {
    grid.world_to_coord(point + normal * grid.half())
}

/// Whether the cell at `coord` overlaps `body`.
///
/// Per-axis centre distance against the summed half extents. Touching counts
/// as overlapping.
pub fn overlaps_body(grid: Grid, coord: BlockCoord, body: Aabb) -> bool {
    let delta = (grid.center(coord) - body.center()).abs();
    let reach = body.half_extents() + Vec3::splat(grid.half());
    delta.cmple(reach).all()
}

/// Block mutator with undo/redo.
///
/// Translates picked faces into target cells, applies the placement policy,
/// and records every accepted edit.
#[derive(Debug, Default)]
pub struct BlockEditor {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
}

impl BlockEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the block owning `handle`.
    pub fn break_block(
        &mut self,
        registry: &mut BlockRegistry,
        handle: RenderHandle,
    ) -> Result<BlockCoord, EditError> {
        let coord = registry
            .coord_of(handle)
            .ok_or(EditError::UnknownHandle(handle))?;
        let block = registry
            .remove(coord)
            .ok_or(EditError::UnknownHandle(handle))?;
        tracing::debug!(%coord, material = %block.material, "block broken");
        self.record(EditCommand::Break {
            coord,
            material: block.material,
        });
        Ok(coord)
    }

    /// Place `material` against the face at `point` with outward `normal`.
    pub fn place_block(
        &mut self,
        registry: &mut BlockRegistry,
        point: Vec3,
        normal: Vec3,
        material: Material,
        body: Aabb,
    ) -> Result<BlockCoord, EditError> {
        let coord = placement_target(registry.grid(), point, normal);
        self.place_at(registry, coord, material, body)?;
        Ok(coord)
    }

    /// Place `material` at an explicit cell, subject to the same policy.
    pub fn place_at(
        &mut self,
        registry: &mut BlockRegistry,
        coord: BlockCoord,
        material: Material,
        body: Aabb,
    ) -> Result<(), EditError> {
        if registry.get(coord).is_some() {
            return Err(EditError::Occupied(coord));
        }
        if overlaps_body(registry.grid(), coord, body) {
            tracing::debug!(%coord, "placement rejected: overlaps player");
            return Err(EditError::OverlapsPlayer(coord));
        }
        registry.put(coord, material);
        tracing::debug!(%coord, %material, "block placed");
        self.record(EditCommand::Place { coord, material });
        Ok(())
    }

    /// Undo the last edit. Returns `Ok(false)` if there is nothing to undo.
    ///
    /// Undoing a break re-places the block, so it is subject to the same
    /// overlap check as a fresh placement. A rejected undo stays on the stack.
    pub fn undo(&mut self, registry: &mut BlockRegistry, body: Aabb) -> Result<bool, EditError> {
        let Some(cmd) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = apply_command(registry, &cmd.inverse(), body) {
            self.undo_stack.push(cmd);
            return Err(e);
        }
        self.redo_stack.push(cmd);
        Ok(true)
    }

    /// Redo the last undone edit. Returns `Ok(false)` if there is nothing to redo.
    ///
    /// A rejected redo stays on the stack.
    pub fn redo(&mut self, registry: &mut BlockRegistry, body: Aabb) -> Result<bool, EditError> {
        let Some(cmd) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = apply_command(registry, &cmd, body) {
            self.redo_stack.push(cmd);
            return Err(e);
        }
        self.undo_stack.push(cmd);
        Ok(true)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn record(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }
}

fn apply_command(
    registry: &mut BlockRegistry,
    cmd: &EditCommand,
    body: Aabb,
) -> Result<(), EditError> {
    match *cmd {
        EditCommand::Place { coord, material } => {
            if registry.get(coord).is_some() {
                return Err(EditError::Occupied(coord));
            }
            if overlaps_body(registry.grid(), coord, body) {
                tracing::debug!(%coord, "restore rejected: overlaps player");
                return Err(EditError::OverlapsPlayer(coord));
            }
            registry.put(coord, material);
        }
        EditCommand::Break { coord, .. } => {
            registry.remove(coord);
        }
    }
    Ok(())
}

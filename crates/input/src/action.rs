use blockyard_common::Material;

/// A discrete command produced by a mouse or key event.
///
/// Actions are applied synchronously by the frame driver as they arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Break the block under the crosshair.
    BreakBlock,
    /// Place the selected material against the face under the crosshair.
    PlaceBlock,
    /// Change the material used for placement.
    SelectMaterial(Material),
    /// Undo the last block edit.
    Undo,
    /// Redo the last undone block edit.
    Redo,
}

impl Action {
    /// Hotbar key `1..=4` to material selection.
    pub fn from_hotbar_slot(slot: usize) -> Option<Action> {
        Material::from_slot(slot).map(Action::SelectMaterial)
    }
}

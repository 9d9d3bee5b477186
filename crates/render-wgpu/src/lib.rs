//! wgpu render backend for the block world.
//!
//! Draws one instanced cube per render object, coloured by material, seen
//! through a first-person camera.
//!
//! # Invariants
//! - The backend never reads the block registry; it only sees render-sync calls.
//! - Instance data is re-uploaded only when the object set or highlight changes.

mod camera;
mod gpu;
mod scene;
mod shaders;

pub use camera::FirstPersonCamera;
pub use gpu::WgpuRenderer;
pub use scene::SceneInstances;

pub mod memory;
pub mod registry;
pub mod subscription;
pub mod traits;

#[cfg(not(target_arch = "wasm32"))]
pub mod firebase;

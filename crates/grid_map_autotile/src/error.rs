use grid_map_core::MeshRef;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the autotile engine and its host seams
#[derive(Debug, Error)]
pub enum AutotileError {
    /// The caller named a tile set that is not in the library
    #[error("Unknown tile set: {0}")]
    UnknownTileSet(Uuid),
    /// The host could not load a mesh asset
    #[error("Failed to load mesh '{mesh}': {reason}")]
    MeshLoad { mesh: MeshRef, reason: String },
}

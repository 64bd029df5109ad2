//! Core data structures for grid_map
//!
//! This crate provides the plain types shared by the autotile engine and its hosts:
//! - `AdjacencyBit` / `AdjacencyMask` - Neighbor directions and occupancy bitmasks
//! - `NeighborMode` - Whether four or eight neighbors are probed
//! - `GameplayTag` / `TagContainer` / `TagRequirements` - Tile set identity and adjacency predicates
//! - `PlacedTile` / `TileHandle` - Tiles as the host world reports them
//! - `MeshRef` / `Rotator` - The appearance assigned to a placed tile

mod adjacency;
mod placement;
mod tags;

pub use adjacency::{AdjacencyBit, AdjacencyMask, NeighborMode};
pub use placement::{MeshRef, PlacedTile, Rotator, TileHandle};
pub use tags::{GameplayTag, TagContainer, TagRequirements};

// Re-export the math types used in the public API
pub use glam::{Quat, Vec3};

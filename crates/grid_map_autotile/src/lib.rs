//! Adjacency-bitmask autotiling for 3D grid maps
//!
//! This crate picks a mesh and rotation for each placed tile from the set of
//! neighbor cells around it, and keeps neighbors consistent as tiles are painted
//! and erased.
//!
//! # Features
//! - Four- and eight-neighbor bitmasks with corner filtering
//! - Orthogonal fallback when no diagonal-aware variant exists
//! - Tag-based neighbor acceptance and empty-cell matching
//! - Breadth-first propagation to a fixpoint
//! - Host-agnostic world and mesh-loading seams
//!
//! # Example
//!
//! ```rust,ignore
//! use grid_map_autotile::{
//!     AdjacencyEngine, GridWorld, TileSet, TileSetLibrary, TileVariant,
//!     grid_map_core::{AdjacencyBit, AdjacencyMask, Rotator, Vec3},
//! };
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let mut library = TileSetLibrary::new();
//! let walls = library.add_tile_set(
//!     TileSet::new("Walls")
//!         .with_variant(TileVariant::new(AdjacencyMask::EMPTY, Rotator::ZERO).with_mesh("wall/isolated"))
//!         .with_variant(TileVariant::new(AdjacencyBit::Left, Rotator::ZERO).with_mesh("wall/end")),
//! );
//!
//! let engine = AdjacencyEngine::new(&library);
//! let mut world = GridWorld::new(100.0);
//! let mut rng = SmallRng::seed_from_u64(0);
//!
//! engine.paint(&mut world, &mut rng, Vec3::ZERO, walls)?;
//! engine.paint(&mut world, &mut rng, Vec3::new(100.0, 0.0, 0.0), walls)?;
//! ```

pub mod brush;
pub mod config;
pub mod engine;
pub mod error;
pub mod tileset;
pub mod world;

// Re-export main types at crate root
pub use brush::{brush_trace, snap_location, BrushResult, GridBrush, PaintMode};
pub use config::{EngineSettings, TileSetLibrary, DEFAULT_GRID_SNAP, DEFAULT_PROBE_RADIUS_FACTOR};
pub use engine::{AdjacencyEngine, AdjacentTile, EraseOutcome, PaintOutcome, PropagationReport};
pub use error::AutotileError;
pub use tileset::{MatchPass, TileSet, TileVariant};
pub use world::{GridWorld, MeshLoader, TileWorld};

// Re-export grid_map_core
pub use grid_map_core;

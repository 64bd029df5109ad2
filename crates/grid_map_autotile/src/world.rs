//! Host world seams and an in-memory reference world
//!
//! The engine never owns tiles. It asks a [`TileWorld`] what is where, and tells it
//! what to spawn, destroy, or restyle. Meshes are made resident through a
//! [`MeshLoader`] before they are assigned.

use crate::error::AutotileError;
use glam::Vec3;
use grid_map_core::{MeshRef, PlacedTile, Rotator, TileHandle};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Spatial storage for placed tiles, owned by the host
pub trait TileWorld {
    /// Every tile whose placement volume overlaps the axis-aligned box centered at
    /// `center` with the given horizontal and vertical half-extents.
    ///
    /// Overlap, not containment: a zero-sized query at a tile's center must return it.
    fn query_tiles_in_region(&self, center: Vec3, half_extent: f32, half_height: f32)
        -> Vec<TileHandle>;

    /// Snapshot of a tile, or `None` if the handle is stale
    fn tile(&self, handle: TileHandle) -> Option<PlacedTile>;

    fn spawn_tile(
        &mut self,
        position: Vec3,
        mesh: &MeshRef,
        rotation: Rotator,
        tile_set: Uuid,
    ) -> TileHandle;

    /// Returns false if the handle was already gone
    fn destroy_tile(&mut self, handle: TileHandle) -> bool;

    fn set_tile_appearance(&mut self, handle: TileHandle, mesh: &MeshRef, rotation: Rotator);

    /// The editor's grid snap size; used when a tile set has no cell size of its own
    fn current_grid_snap_size(&self) -> f32;

    /// Every placed tile, in a stable order
    fn placed_tiles(&self) -> Vec<TileHandle>;
}

/// Synchronous mesh asset resolution
pub trait MeshLoader {
    fn load_mesh(&mut self, mesh: &MeshRef) -> Result<(), AutotileError>;
}

/// In-memory [`TileWorld`] backed by a uniform bucket grid.
///
/// Tiles are stored by handle in creation order. Each tile occupies a cube of
/// `tile_half_extent` around its position (zero by default, i.e. a point).
#[derive(Debug, Clone)]
pub struct GridWorld {
    grid_snap: f32,
    bucket_size: f32,
    tile_half_extent: f32,
    next_handle: u64,
    tiles: BTreeMap<TileHandle, PlacedTile>,
    buckets: HashMap<(i64, i64), Vec<TileHandle>>,
    loaded_meshes: HashSet<MeshRef>,
    missing_meshes: HashSet<MeshRef>,
    appearance_changes: usize,
}

impl GridWorld {
    pub fn new(grid_snap: f32) -> Self {
        Self {
            grid_snap,
            bucket_size: if grid_snap > 0.0 { grid_snap } else { 1.0 },
            tile_half_extent: 0.0,
            next_handle: 1,
            tiles: BTreeMap::new(),
            buckets: HashMap::new(),
            loaded_meshes: HashSet::new(),
            missing_meshes: HashSet::new(),
            appearance_changes: 0,
        }
    }

    /// Give every tile a cubic volume instead of a point
    pub fn with_tile_extent(mut self, half_extent: f32) -> Self {
        self.tile_half_extent = half_extent.max(0.0);
        self
    }

    /// Make `load_mesh` fail for this reference
    pub fn mark_mesh_missing(&mut self, mesh: impl Into<MeshRef>) {
        self.missing_meshes.insert(mesh.into());
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, handle: TileHandle) -> Option<&PlacedTile> {
        self.tiles.get(&handle)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.tiles.values()
    }

    /// Tiles overlapping a single point
    pub fn tiles_at(&self, position: Vec3) -> Vec<TileHandle> {
        self.query_tiles_in_region(position, 0.0, 0.0)
    }

    pub fn is_mesh_loaded(&self, mesh: &MeshRef) -> bool {
        self.loaded_meshes.contains(mesh)
    }

    /// Number of `set_tile_appearance` calls so far
    pub fn appearance_changes(&self) -> usize {
        self.appearance_changes
    }

    fn bucket_of(&self, x: f32, y: f32) -> (i64, i64) {
        (
            (x / self.bucket_size).floor() as i64,
            (y / self.bucket_size).floor() as i64,
        )
    }

    fn overlaps(&self, tile: &PlacedTile, center: Vec3, half_extent: f32, half_height: f32) -> bool {
        let reach = half_extent.max(0.0) + self.tile_half_extent;
        let vertical_reach = half_height.max(0.0) + self.tile_half_extent;
        let delta = (tile.position - center).abs();
        delta.x <= reach && delta.y <= reach && delta.z <= vertical_reach
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_GRID_SNAP)
    }
}

impl TileWorld for GridWorld {
    fn query_tiles_in_region(
        &self,
        center: Vec3,
        half_extent: f32,
        half_height: f32,
    ) -> Vec<TileHandle> {
        let reach = half_extent.max(0.0) + self.tile_half_extent;
        let (min_x, min_y) = self.bucket_of(center.x - reach, center.y - reach);
        let (max_x, max_y) = self.bucket_of(center.x + reach, center.y + reach);

        let span = (max_x.saturating_sub(min_x) as u128 + 1)
            .saturating_mul(max_y.saturating_sub(min_y) as u128 + 1);

        let mut found = Vec::new();
        let mut scan = |bucket: &Vec<TileHandle>| {
            for handle in bucket {
                if let Some(tile) = self.tiles.get(handle) {
                    if self.overlaps(tile, center, half_extent, half_height) {
                        found.push(*handle);
                    }
                }
            }
        };

        // Regions wider than the occupied set walk the occupied buckets instead
        if span > self.buckets.len() as u128 {
            for (&(bx, by), bucket) in &self.buckets {
                if (min_x..=max_x).contains(&bx) && (min_y..=max_y).contains(&by) {
                    scan(bucket);
                }
            }
        } else {
            for bx in min_x..=max_x {
                for by in min_y..=max_y {
                    if let Some(bucket) = self.buckets.get(&(bx, by)) {
                        scan(bucket);
                    }
                }
            }
        }
        found.sort();
        found
    }

    fn tile(&self, handle: TileHandle) -> Option<PlacedTile> {
        self.tiles.get(&handle).cloned()
    }

    fn spawn_tile(
        &mut self,
        position: Vec3,
        mesh: &MeshRef,
        rotation: Rotator,
        tile_set: Uuid,
    ) -> TileHandle {
        let handle = TileHandle(self.next_handle);
        self.next_handle += 1;

        // Volumes wider than a bucket are not indexed in every bucket they touch,
        // so index by center and widen the query instead (see query_tiles_in_region).
        let bucket = self.bucket_of(position.x, position.y);
        self.buckets.entry(bucket).or_default().push(handle);
        self.tiles.insert(
            handle,
            PlacedTile {
                handle,
                position,
                tile_set,
                mesh: mesh.clone(),
                rotation,
            },
        );
        handle
    }

    fn destroy_tile(&mut self, handle: TileHandle) -> bool {
        let Some(tile) = self.tiles.remove(&handle) else {
            return false;
        };
        let bucket = self.bucket_of(tile.position.x, tile.position.y);
        if let Some(handles) = self.buckets.get_mut(&bucket) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.buckets.remove(&bucket);
            }
        }
        true
    }

    fn set_tile_appearance(&mut self, handle: TileHandle, mesh: &MeshRef, rotation: Rotator) {
        if let Some(tile) = self.tiles.get_mut(&handle) {
            tile.mesh = mesh.clone();
            tile.rotation = rotation;
            self.appearance_changes += 1;
        }
    }

    fn current_grid_snap_size(&self) -> f32 {
        self.grid_snap
    }

    fn placed_tiles(&self) -> Vec<TileHandle> {
        self.tiles.keys().copied().collect()
    }
}

impl MeshLoader for GridWorld {
    fn load_mesh(&mut self, mesh: &MeshRef) -> Result<(), AutotileError> {
        if mesh.is_empty() {
            return Err(AutotileError::MeshLoad {
                mesh: mesh.clone(),
                reason: "empty asset path".to_string(),
            });
        }
        if self.missing_meshes.contains(mesh) {
            return Err(AutotileError::MeshLoad {
                mesh: mesh.clone(),
                reason: "asset not found".to_string(),
            });
        }
        self.loaded_meshes.insert(mesh.clone());
        Ok(())
    }
}

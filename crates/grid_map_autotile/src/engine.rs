//! Grid adjacency engine
//!
//! Computes neighbor bitmasks against a [`TileWorld`], places and erases tiles, and
//! propagates appearance changes breadth-first until the grid reaches a fixpoint.
//!
//! All traversal state lives on the stack of a single call. The engine itself is a
//! pair of shared references and can be kept around between edits, but calls must
//! not be nested: the world is mutated while a propagation pass is running.

use crate::config::{EngineSettings, TileSetLibrary};
use crate::error::AutotileError;
use crate::tileset::{MatchPass, TileSet};
use crate::world::{MeshLoader, TileWorld};
use glam::Vec3;
use grid_map_core::{AdjacencyBit, AdjacencyMask, MeshRef, NeighborMode, PlacedTile, TileHandle};
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A tile found in one of the neighbor cells of some origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacentTile {
    pub handle: TileHandle,
    /// Direction from the origin to this tile
    pub bit: AdjacencyBit,
}

/// Summary of one propagation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Tile evaluations performed (a tile left unchanged may be evaluated again later)
    pub evaluated: usize,
    /// Tiles whose mesh or rotation was replaced
    pub updated: usize,
    /// Tiles left with their previous appearance because nothing could be resolved
    pub unresolved: Vec<TileHandle>,
}

impl PropagationReport {
    /// True when the pass changed nothing and reported nothing
    pub fn is_quiet(&self) -> bool {
        self.updated == 0 && self.unresolved.is_empty()
    }
}

/// Result of [`AdjacencyEngine::paint`]
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOutcome {
    /// The cell already holds a tile of an equivalent tile set
    AlreadyPainted(TileHandle),
    /// A new tile was spawned
    Placed {
        handle: TileHandle,
        mask: AdjacencyMask,
        propagation: PropagationReport,
    },
    /// No variant is designed for this neighborhood; nothing was placed.
    /// A replaced tile's neighbors are still refreshed.
    NoVariant {
        mask: AdjacencyMask,
        propagation: PropagationReport,
    },
    /// The resolved mesh could not be loaded; nothing was placed
    MeshUnavailable {
        mesh: MeshRef,
        propagation: PropagationReport,
    },
}

impl PaintOutcome {
    /// The handle of the tile now occupying the cell, if any
    pub fn handle(&self) -> Option<TileHandle> {
        match self {
            PaintOutcome::AlreadyPainted(handle) | PaintOutcome::Placed { handle, .. } => {
                Some(*handle)
            }
            _ => None,
        }
    }

    pub fn propagation(&self) -> Option<&PropagationReport> {
        match self {
            PaintOutcome::AlreadyPainted(_) => None,
            PaintOutcome::Placed { propagation, .. }
            | PaintOutcome::NoVariant { propagation, .. }
            | PaintOutcome::MeshUnavailable { propagation, .. } => Some(propagation),
        }
    }
}

/// Result of [`AdjacencyEngine::erase`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EraseOutcome {
    /// False if the handle no longer referred to a tile
    pub removed: bool,
    pub propagation: PropagationReport,
}

/// Horizontal and vertical pitch of one grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
struct CellDimensions {
    size: f32,
    height: f32,
}

/// Auto-tiling over a host world, driven by a tile-set library
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyEngine<'a> {
    library: &'a TileSetLibrary,
    settings: EngineSettings,
}

impl<'a> AdjacencyEngine<'a> {
    pub fn new(library: &'a TileSetLibrary) -> Self {
        Self {
            library,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn library(&self) -> &'a TileSetLibrary {
        self.library
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Look up a tile set, failing on ids the library doesn't know
    pub fn tile_set(&self, id: Uuid) -> Result<&'a TileSet, AutotileError> {
        self.library.get(id).ok_or(AutotileError::UnknownTileSet(id))
    }

    /// Grid pitch for `tile_set`, falling back to the host's snap size
    pub fn cell_size<W: TileWorld + ?Sized>(&self, world: &W, tile_set: &TileSet) -> f32 {
        self.dimensions(world, Some(tile_set)).size
    }

    fn dimensions<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        tile_set: Option<&TileSet>,
    ) -> CellDimensions {
        let fallback = self
            .settings
            .grid_snap_or_default(world.current_grid_snap_size());
        match tile_set {
            Some(tile_set) => CellDimensions {
                size: tile_set.effective_cell_size(fallback),
                height: tile_set.effective_cell_height(fallback),
            },
            None => CellDimensions {
                size: fallback,
                height: fallback * 2.0,
            },
        }
    }

    fn probe<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        position: Vec3,
        cell: CellDimensions,
    ) -> Vec<PlacedTile> {
        let factor = self.settings.probe_radius_factor;
        world
            .query_tiles_in_region(position, cell.size * factor, cell.height * factor)
            .into_iter()
            .filter_map(|handle| world.tile(handle))
            .collect()
    }

    fn neighbor_position(origin: Vec3, dir: AdjacencyBit, cell_size: f32) -> Vec3 {
        let (dx, dy) = dir.offset();
        origin + Vec3::new(dx as f32 * cell_size, dy as f32 * cell_size, 0.0)
    }

    /// Tiles occupying the cell at `position`, probed with `tile_set`'s dimensions
    pub fn tiles_at<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        position: Vec3,
        tile_set: &TileSet,
    ) -> Vec<PlacedTile> {
        self.probe(world, position, self.dimensions(world, Some(tile_set)))
    }

    /// First tile in the cell at `position`. Without a tile set the host's grid pitch is used.
    pub fn tile_at<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        position: Vec3,
        tile_set: Option<&TileSet>,
    ) -> Option<PlacedTile> {
        self.probe(world, position, self.dimensions(world, tile_set))
            .into_iter()
            .next()
    }

    /// Every tile in the neighbor cells of `origin` that `tile_set` probes, whatever
    /// tile set owns it
    pub fn adjacent_tiles<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        origin: Vec3,
        tile_set: &TileSet,
    ) -> Vec<AdjacentTile> {
        self.collect_adjacent(
            world,
            origin,
            self.dimensions(world, Some(tile_set)),
            tile_set.neighbor_mode,
        )
    }

    fn collect_adjacent<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        origin: Vec3,
        cell: CellDimensions,
        mode: NeighborMode,
    ) -> Vec<AdjacentTile> {
        let mut adjacent = Vec::new();
        for &dir in mode.directions() {
            let position = Self::neighbor_position(origin, dir, cell.size);
            for tile in self.probe(world, position, cell) {
                adjacent.push(AdjacentTile {
                    handle: tile.handle,
                    bit: dir,
                });
            }
        }
        adjacent
    }

    /// Tiles whose mask may depend on the cell at `origin`.
    ///
    /// All eight directions are probed regardless of the tile set's mode, since a
    /// diagonal neighbor may belong to an eight-neighbor tile set.
    fn affected_by<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        origin: Vec3,
        tile_set: Option<&TileSet>,
    ) -> Vec<TileHandle> {
        self.collect_adjacent(
            world,
            origin,
            self.dimensions(world, tile_set),
            NeighborMode::Eight,
        )
        .into_iter()
        .map(|adjacent| adjacent.handle)
        .collect()
    }

    /// The neighbor bitmask `tile_set` observes from `origin`.
    ///
    /// A direction is set when its cell holds at least one tile whose tile set
    /// satisfies `tile_set`'s adjacency requirement, or when the cell is empty and
    /// `tile_set` matches empty neighbors. Tiles owned by unknown tile sets never count.
    pub fn compute_adjacency_bitmask<W: TileWorld + ?Sized>(
        &self,
        world: &W,
        origin: Vec3,
        tile_set: &TileSet,
    ) -> AdjacencyMask {
        let cell = self.dimensions(world, Some(tile_set));
        let mut mask = AdjacencyMask::EMPTY;

        for &dir in tile_set.neighbor_mode.directions() {
            let position = Self::neighbor_position(origin, dir, cell.size);
            let occupants = self.probe(world, position, cell);

            let present = if occupants.is_empty() {
                tile_set.matches_empty_neighbors
            } else {
                occupants.iter().any(|tile| {
                    self.library
                        .get(tile.tile_set)
                        .is_some_and(|owner| tile_set.accepts_neighbor(&owner.tags))
                })
            };

            if present {
                mask |= dir;
            }
        }
        mask
    }

    /// Whether `tile` already stands for `tile_set`, making a repaint pointless
    fn is_equivalent(&self, tile: &PlacedTile, tile_set: &TileSet) -> bool {
        if tile.tile_set == tile_set.id {
            return true;
        }
        self.library.get(tile.tile_set).is_some_and(|owner| {
            owner.tags == tile_set.tags && tile_set.accepts_neighbor(&owner.tags)
        })
    }

    /// Place a tile of `tile_set_id` at `origin` and bring its neighborhood up to date.
    ///
    /// A tile of a different tile set in the same cell is replaced. Its neighbors and
    /// the new tile's neighbors are refreshed together in one propagation pass.
    pub fn paint<W, R>(
        &self,
        world: &mut W,
        rng: &mut R,
        origin: Vec3,
        tile_set_id: Uuid,
    ) -> Result<PaintOutcome, AutotileError>
    where
        W: TileWorld + MeshLoader + ?Sized,
        R: Rng + ?Sized,
    {
        let tile_set = self.tile_set(tile_set_id)?;

        let existing = self.tiles_at(world, origin, tile_set);
        if let Some(tile) = existing.iter().find(|tile| self.is_equivalent(tile, tile_set)) {
            debug!(tile = %tile.handle, tile_set = %tile_set.name, "Cell already painted");
            return Ok(PaintOutcome::AlreadyPainted(tile.handle));
        }

        let mut seeds = Vec::new();
        for tile in &existing {
            let owner = self.library.get(tile.tile_set);
            seeds.extend(self.affected_by(world, tile.position, owner));
            world.destroy_tile(tile.handle);
            debug!(tile = %tile.handle, "Replaced tile");
        }
        let replaced: HashSet<TileHandle> = existing.iter().map(|tile| tile.handle).collect();
        seeds.retain(|handle| !replaced.contains(handle));

        let mask = self.compute_adjacency_bitmask(world, origin, tile_set);
        let Some(variant) = tile_set.find_variant(mask) else {
            warn!(
                tile_set = %tile_set.name,
                %mask,
                "No tile variant matches this neighborhood, nothing placed"
            );
            let propagation = self.propagate(world, rng, seeds);
            return Ok(PaintOutcome::NoVariant { mask, propagation });
        };

        let Some(mesh) = variant.select_random_mesh(rng) else {
            // find_variant only returns variants with meshes
            let propagation = self.propagate(world, rng, seeds);
            return Ok(PaintOutcome::NoVariant { mask, propagation });
        };

        if let Err(err) = world.load_mesh(mesh) {
            warn!(tile_set = %tile_set.name, %mesh, error = %err, "Mesh unavailable, nothing placed");
            let propagation = self.propagate(world, rng, seeds);
            return Ok(PaintOutcome::MeshUnavailable {
                mesh: mesh.clone(),
                propagation,
            });
        }

        let handle = world.spawn_tile(origin, mesh, variant.rotation, tile_set.id);
        debug!(tile = %handle, tile_set = %tile_set.name, %mask, %mesh, "Placed tile");

        seeds.extend(self.affected_by(world, origin, Some(tile_set)));
        // The new tile was resolved against the current neighborhood already
        let settled = HashSet::from([handle]);
        let propagation = self.run_propagation(world, rng, seeds, settled);

        Ok(PaintOutcome::Placed {
            handle,
            mask,
            propagation,
        })
    }

    /// Remove a tile and refresh the tiles that were around it
    pub fn erase<W, R>(&self, world: &mut W, rng: &mut R, handle: TileHandle) -> EraseOutcome
    where
        W: TileWorld + MeshLoader + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(tile) = world.tile(handle) else {
            debug!(tile = %handle, "Erase of missing tile ignored");
            return EraseOutcome::default();
        };

        let owner = self.library.get(tile.tile_set);
        let mut seeds = self.affected_by(world, tile.position, owner);
        seeds.retain(|neighbor| *neighbor != handle);

        let removed = world.destroy_tile(handle);
        debug!(tile = %handle, neighbors = seeds.len(), "Erased tile");

        EraseOutcome {
            removed,
            propagation: self.propagate(world, rng, seeds),
        }
    }

    /// Breadth-first re-evaluation starting from `seeds`.
    ///
    /// A tile whose resolved variant already matches its appearance stops the
    /// traversal there. A tile that changes is updated once per pass and its
    /// neighbors are queued. Tiles that cannot be resolved keep their appearance and
    /// are reported in [`PropagationReport::unresolved`].
    pub fn propagate<W, R, I>(&self, world: &mut W, rng: &mut R, seeds: I) -> PropagationReport
    where
        W: TileWorld + MeshLoader + ?Sized,
        R: Rng + ?Sized,
        I: IntoIterator<Item = TileHandle>,
    {
        self.run_propagation(world, rng, seeds, HashSet::new())
    }

    fn run_propagation<W, R, I>(
        &self,
        world: &mut W,
        rng: &mut R,
        seeds: I,
        mut processed: HashSet<TileHandle>,
    ) -> PropagationReport
    where
        W: TileWorld + MeshLoader + ?Sized,
        R: Rng + ?Sized,
        I: IntoIterator<Item = TileHandle>,
    {
        let mut report = PropagationReport::default();
        let mut queue = VecDeque::new();
        let mut pending = HashSet::new();
        let mut failed = HashSet::new();

        for seed in seeds {
            if pending.insert(seed) {
                queue.push_back(seed);
            }
        }

        while let Some(handle) = queue.pop_front() {
            pending.remove(&handle);
            if processed.contains(&handle) || failed.contains(&handle) {
                continue;
            }
            let Some(tile) = world.tile(handle) else {
                continue;
            };

            let Some(tile_set) = self.library.get(tile.tile_set) else {
                warn!(tile = %handle, tile_set = %tile.tile_set, "Tile belongs to an unknown tile set");
                failed.insert(handle);
                report.unresolved.push(handle);
                continue;
            };

            report.evaluated += 1;
            let mask = self.compute_adjacency_bitmask(world, tile.position, tile_set);
            let Some((index, pass)) = tile_set.find_variant_match(mask) else {
                warn!(tile = %handle, tile_set = %tile_set.name, %mask, "Failed to find tile variant");
                failed.insert(handle);
                report.unresolved.push(handle);
                continue;
            };
            let variant = &tile_set.variants[index];

            if variant.rotation == tile.rotation && variant.contains_mesh(&tile.mesh) {
                continue;
            }

            let Some(mesh) = variant.select_random_mesh(rng) else {
                failed.insert(handle);
                report.unresolved.push(handle);
                continue;
            };
            if let Err(err) = world.load_mesh(mesh) {
                warn!(tile = %handle, %mesh, error = %err, "Mesh unavailable, keeping previous appearance");
                failed.insert(handle);
                report.unresolved.push(handle);
                continue;
            }

            world.set_tile_appearance(handle, mesh, variant.rotation);
            processed.insert(handle);
            report.updated += 1;
            debug!(
                tile = %handle,
                %mask,
                variant = index,
                fallback = (pass == MatchPass::Orthogonal),
                %mesh,
                "Updated tile"
            );

            for neighbor in self.affected_by(world, tile.position, Some(tile_set)) {
                if !processed.contains(&neighbor)
                    && !failed.contains(&neighbor)
                    && pending.insert(neighbor)
                {
                    queue.push_back(neighbor);
                }
            }
        }

        report
    }

    /// Re-resolve every placed tile owned by `tile_set_id`
    pub fn rebuild_all<W, R>(
        &self,
        world: &mut W,
        rng: &mut R,
        tile_set_id: Uuid,
    ) -> Result<PropagationReport, AutotileError>
    where
        W: TileWorld + MeshLoader + ?Sized,
        R: Rng + ?Sized,
    {
        let tile_set = self.tile_set(tile_set_id)?;
        let seeds: Vec<TileHandle> = world
            .placed_tiles()
            .into_iter()
            .filter(|handle| {
                world
                    .tile(*handle)
                    .is_some_and(|tile| tile.tile_set == tile_set_id)
            })
            .collect();

        let seed_count = seeds.len();
        let report = self.propagate(world, rng, seeds);
        info!(
            tile_set = %tile_set.name,
            tiles = seed_count,
            updated = report.updated,
            unresolved = report.unresolved.len(),
            "Rebuilt tile set"
        );
        Ok(report)
    }
}

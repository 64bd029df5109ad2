//! Tile set library and engine settings
//!
//! Both are plain serde data, loaded by the host (see `grid_map_schema`) and handed
//! to the engine by reference.

use crate::tileset::TileSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Probe radius as a fraction of the cell size
pub const DEFAULT_PROBE_RADIUS_FACTOR: f32 = 1.0 / 3.0;

/// Grid pitch used when neither the tile set nor the host supplies one
pub const DEFAULT_GRID_SNAP: f32 = 100.0;

/// All tile sets available to a map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileSetLibrary {
    #[serde(default)]
    pub tile_sets: Vec<TileSet>,
}

impl TileSetLibrary {
    pub fn new() -> Self {
        Self {
            tile_sets: Vec::new(),
        }
    }

    /// Add a tile set, returning its id
    pub fn add_tile_set(&mut self, tile_set: TileSet) -> Uuid {
        let id = tile_set.id;
        self.tile_sets.push(tile_set);
        id
    }

    /// Get tile set by ID
    pub fn get(&self, id: Uuid) -> Option<&TileSet> {
        self.tile_sets.iter().find(|ts| ts.id == id)
    }

    /// Get mutable tile set by ID
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut TileSet> {
        self.tile_sets.iter_mut().find(|ts| ts.id == id)
    }

    /// Get tile set by display name (first match)
    pub fn get_by_name(&self, name: &str) -> Option<&TileSet> {
        self.tile_sets.iter().find(|ts| ts.name == name)
    }

    /// Remove tile set by ID
    pub fn remove_tile_set(&mut self, id: Uuid) -> Option<TileSet> {
        if let Some(pos) = self.tile_sets.iter().position(|ts| ts.id == id) {
            Some(self.tile_sets.remove(pos))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileSet> {
        self.tile_sets.iter()
    }

    pub fn len(&self) -> usize {
        self.tile_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tile_sets.is_empty()
    }
}

/// Tuning for the adjacency engine's spatial probes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Half-extent of a neighbor probe, as a fraction of cell size (horizontal)
    /// and cell height (vertical)
    pub probe_radius_factor: f32,
    /// Used when the host reports a non-positive grid snap size
    pub default_grid_snap: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            probe_radius_factor: DEFAULT_PROBE_RADIUS_FACTOR,
            default_grid_snap: DEFAULT_GRID_SNAP,
        }
    }
}

impl EngineSettings {
    /// Resolve the grid pitch to use given what the host reports
    pub fn grid_snap_or_default(&self, host_snap: f32) -> f32 {
        if host_snap > 0.0 {
            host_snap
        } else {
            self.default_grid_snap
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_lookup() {
        let mut library = TileSetLibrary::new();
        let walls = library.add_tile_set(TileSet::new("Walls"));
        let floors = library.add_tile_set(TileSet::new("Floors"));

        assert_eq!(library.len(), 2);
        assert_eq!(library.get(walls).map(|ts| ts.name.as_str()), Some("Walls"));
        assert_eq!(library.get_by_name("Floors").map(|ts| ts.id), Some(floors));
        assert!(library.get(Uuid::new_v4()).is_none());

        let removed = library.remove_tile_set(walls);
        assert!(removed.is_some());
        assert!(library.get(walls).is_none());
        assert!(library.remove_tile_set(walls).is_none());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = EngineSettings::default();
        assert!((settings.probe_radius_factor - 1.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(settings.grid_snap_or_default(0.0), DEFAULT_GRID_SNAP);
        assert_eq!(settings.grid_snap_or_default(-5.0), DEFAULT_GRID_SNAP);
        assert_eq!(settings.grid_snap_or_default(32.0), 32.0);
    }

    #[test]
    fn test_settings_partial_deserialize() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{ "default_grid_snap": 50.0 }"#).unwrap();
        assert_eq!(settings.default_grid_snap, 50.0);
        assert_eq!(settings.probe_radius_factor, DEFAULT_PROBE_RADIUS_FACTOR);
    }
}

//! Tile-set library files for grid_map
//!
//! This crate loads, saves and validates the data the autotile engine runs on:
//! tile-set libraries (JSON or TOML) and engine settings (TOML or JSON). Files are
//! validated at load time so that configuration mistakes surface before painting.
//!
//! # Example
//!
//! ```rust,ignore
//! use grid_map_schema::{load_library, load_settings};
//! use grid_map_autotile::AdjacencyEngine;
//!
//! let library = load_library(Path::new("tilesets.json"))?;
//! let settings = load_settings(Path::new("grid_map.toml"))?;
//! let engine = AdjacencyEngine::new(&library).with_settings(settings);
//! ```

mod validate;

pub use validate::*;

use grid_map_autotile::{EngineSettings, TileSetLibrary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading or validating library files
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("TOML parse error: {0}")]
    TomlError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::JsonError(err.to_string())
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(err: toml::de::Error) -> Self {
        SchemaError::TomlError(err.to_string())
    }
}

/// How strictly a library is checked on load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Reject tile sets where several variants share a pattern instead of warning
    pub deny_duplicate_patterns: bool,
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Load a tile-set library from a `.json` or `.toml` file
pub fn load_library(path: &Path) -> Result<TileSetLibrary, SchemaError> {
    load_library_with(path, LoadOptions::default())
}

pub fn load_library_with(path: &Path, options: LoadOptions) -> Result<TileSetLibrary, SchemaError> {
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "Loading tile-set library");

    if is_toml(path) {
        let library: TileSetLibrary = toml::from_str(&content)?;
        check_library(library, options)
    } else {
        parse_library_with(&content, options)
    }
}

/// Parse a tile-set library from a JSON string
pub fn parse_library(json: &str) -> Result<TileSetLibrary, SchemaError> {
    parse_library_with(json, LoadOptions::default())
}

pub fn parse_library_with(json: &str, options: LoadOptions) -> Result<TileSetLibrary, SchemaError> {
    let library: TileSetLibrary = serde_json::from_str(json)?;
    check_library(library, options)
}

/// Parse a tile-set library from a TOML string
pub fn parse_library_toml(source: &str) -> Result<TileSetLibrary, SchemaError> {
    let library: TileSetLibrary = toml::from_str(source)?;
    check_library(library, LoadOptions::default())
}

/// Load a tile-set library from JSON bytes
pub fn load_library_from_bytes(bytes: &[u8]) -> Result<TileSetLibrary, SchemaError> {
    let library: TileSetLibrary = serde_json::from_slice(bytes)?;
    check_library(library, LoadOptions::default())
}

fn check_library(
    library: TileSetLibrary,
    options: LoadOptions,
) -> Result<TileSetLibrary, SchemaError> {
    validate_library(&library)?;

    for warning in lint_library(&library) {
        if options.deny_duplicate_patterns
            && matches!(warning, LibraryWarning::DuplicatePattern { .. })
        {
            return Err(SchemaError::ValidationError(warning.to_string()));
        }
        warn!(%warning, "Tile-set library lint");
    }

    Ok(library)
}

/// Save a tile-set library to a JSON file
pub fn save_library(library: &TileSetLibrary, path: &Path) -> Result<(), SchemaError> {
    let content = serde_json::to_string_pretty(library)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load engine settings from a `.toml` or `.json` file
pub fn load_settings(path: &Path) -> Result<EngineSettings, SchemaError> {
    let content = std::fs::read_to_string(path)?;

    let settings: EngineSettings = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_settings(&settings)?;
    Ok(settings)
}

/// Parse engine settings from a TOML string. Missing keys take their defaults.
pub fn parse_settings_toml(source: &str) -> Result<EngineSettings, SchemaError> {
    let settings: EngineSettings = toml::from_str(source)?;
    validate_settings(&settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_map_autotile::{TileSet, TileVariant};
    use grid_map_core::{AdjacencyBit, AdjacencyMask, NeighborMode, Rotator};
    use serde_json::json;
    use uuid::Uuid;

    fn sample_library() -> TileSetLibrary {
        let mut library = TileSetLibrary::new();
        library.add_tile_set(
            TileSet::new("Walls")
                .with_tag("Wall.Stone")
                .with_cell_size(200.0)
                .with_variant(
                    TileVariant::new(AdjacencyMask::EMPTY, Rotator::ZERO).with_mesh("walls/pillar"),
                )
                .with_variant(
                    TileVariant::new(AdjacencyBit::Left, Rotator::from_yaw(90.0))
                        .with_mesh("walls/end_a")
                        .with_mesh("walls/end_b"),
                ),
        );
        library
    }

    #[test]
    fn test_parse_minimal_library() {
        let library = parse_library(r#"{ "tile_sets": [] }"#).unwrap();
        assert!(library.is_empty());

        let library = parse_library("{}").unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn test_parse_library_with_defaults() {
        let id = Uuid::new_v4();
        let source = json!({
            "tile_sets": [{
                "id": id,
                "name": "Floor",
                "tags": ["Floor.Wood"],
                "adjacency_requirement": { "require_tags": ["Floor"] },
                "variants": [
                    { "adjacency": 0, "mesh_options": ["floor/single"] },
                    { "adjacency": 15, "rotation": { "yaw": 180.0 }, "mesh_options": ["floor/inner"] }
                ]
            }]
        })
        .to_string();

        let library = parse_library(&source).unwrap();
        let floor = library.get(id).unwrap();
        assert_eq!(floor.name, "Floor");
        assert!(!floor.matches_empty_neighbors);
        assert_eq!(floor.neighbor_mode, NeighborMode::Four);
        assert!(floor.cell_size.is_none());
        assert!(floor.adjacency_requirement.ignore_tags.is_empty());
        assert_eq!(floor.variants.len(), 2);
        assert_eq!(floor.variants[1].rotation.yaw, 180.0);
        assert_eq!(floor.variants[1].rotation.pitch, 0.0);
        assert_eq!(
            floor.find_variant_index(AdjacencyMask::from_bits(0x0F)),
            Some(1)
        );
    }

    #[test]
    fn test_parse_rejects_invalid_library() {
        let source = json!({
            "tile_sets": [{
                "id": Uuid::new_v4(),
                "name": "Broken",
                "variants": [{ "adjacency": 1, "mesh_options": [] }]
            }]
        })
        .to_string();

        let result = parse_library(&source);
        assert!(matches!(result, Err(SchemaError::ValidationError(msg)) if msg.contains("Broken")));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(
            parse_library("{ not json"),
            Err(SchemaError::JsonError(_))
        ));
    }

    #[test]
    fn test_deny_duplicate_patterns() {
        let source = json!({
            "tile_sets": [{
                "id": Uuid::new_v4(),
                "name": "Dupes",
                "variants": [
                    { "adjacency": 2, "mesh_options": ["a"] },
                    { "adjacency": 2, "mesh_options": ["b"] }
                ]
            }]
        })
        .to_string();

        // Warning only by default; the first variant wins at runtime
        let library = parse_library(&source).unwrap();
        assert_eq!(library.tile_sets[0].duplicate_patterns().len(), 1);

        let strict = LoadOptions {
            deny_duplicate_patterns: true,
        };
        let result = parse_library_with(&source, strict);
        assert!(matches!(result, Err(SchemaError::ValidationError(msg)) if msg.contains("Dupes")));
    }

    #[test]
    fn test_save_and_load_library() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tilesets.json");
        let library = sample_library();

        save_library(&library, &path).unwrap();
        let loaded = load_library(&path).unwrap();

        assert_eq!(loaded.len(), 1);
        let walls = &loaded.tile_sets[0];
        assert_eq!(walls.id, library.tile_sets[0].id);
        assert_eq!(walls.cell_size, Some(200.0));
        assert_eq!(walls.variants, library.tile_sets[0].variants);
        assert_eq!(walls.tags, library.tile_sets[0].tags);
    }

    #[test]
    fn test_load_library_from_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tilesets.toml");
        let id = Uuid::new_v4();
        std::fs::write(
            &path,
            format!(
                r#"
[[tile_sets]]
id = "{id}"
name = "Cliffs"
tags = ["Terrain.Cliff"]
matches_empty_neighbors = true
neighbor_mode = "Eight"

[tile_sets.adjacency_requirement]
require_tags = ["Terrain.Cliff"]

[[tile_sets.variants]]
adjacency = 15
mesh_options = ["cliff/plateau"]

[[tile_sets.variants]]
adjacency = 11
rotation = {{ yaw = 90.0 }}
mesh_options = ["cliff/edge"]
"#
            ),
        )
        .unwrap();

        let library = load_library(&path).unwrap();
        let cliffs = library.get(id).unwrap();
        assert!(cliffs.matches_empty_neighbors);
        assert_eq!(cliffs.neighbor_mode, NeighborMode::Eight);
        assert_eq!(cliffs.variants.len(), 2);
        assert_eq!(cliffs.variants[1].rotation.yaw, 90.0);
    }

    #[test]
    fn test_parse_toml_rejects_nan_rotation() {
        let source = r#"
[[tile_sets]]
id = "6f1c2a52-3c1e-4b8e-9d7a-0f1e2d3c4b5a"
name = "Spinning"

[[tile_sets.variants]]
adjacency = 0
rotation = { yaw = nan }
mesh_options = ["spin/single"]
"#;
        let result = parse_library_toml(source);
        assert!(matches!(result, Err(SchemaError::ValidationError(msg)) if msg.contains("Spinning")));

        let fixed = parse_library_toml(&source.replace("nan", "90.0")).unwrap();
        assert_eq!(fixed.tile_sets[0].variants[0].rotation, Rotator::from_yaw(90.0));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load_library(&tmp.path().join("missing.json"));
        assert!(matches!(result, Err(SchemaError::IoError(_))));
    }

    #[test]
    fn test_load_library_from_bytes() {
        let library = sample_library();
        let bytes = serde_json::to_vec(&library).unwrap();
        let loaded = load_library_from_bytes(&bytes).unwrap();
        assert_eq!(loaded.tile_sets[0].name, "Walls");
    }

    #[test]
    fn test_parse_settings_toml() {
        let settings = parse_settings_toml("default_grid_snap = 50.0\n").unwrap();
        assert_eq!(settings.default_grid_snap, 50.0);
        assert_eq!(
            settings.probe_radius_factor,
            EngineSettings::default().probe_radius_factor
        );

        let settings = parse_settings_toml("").unwrap();
        assert_eq!(settings, EngineSettings::default());

        assert!(matches!(
            parse_settings_toml("probe_radius_factor = 2.0"),
            Err(SchemaError::ValidationError(_))
        ));
        assert!(matches!(
            parse_settings_toml("probe_radius_factor = "),
            Err(SchemaError::TomlError(_))
        ));
    }

    #[test]
    fn test_load_settings_by_extension() {
        let tmp = tempfile::tempdir().unwrap();

        let toml_path = tmp.path().join("grid_map.toml");
        std::fs::write(&toml_path, "probe_radius_factor = 0.25\n").unwrap();
        assert_eq!(load_settings(&toml_path).unwrap().probe_radius_factor, 0.25);

        let json_path = tmp.path().join("grid_map.json");
        std::fs::write(&json_path, json!({ "default_grid_snap": 32.0 }).to_string()).unwrap();
        assert_eq!(load_settings(&json_path).unwrap().default_grid_snap, 32.0);
    }
}

//! Library validation and lints

use crate::SchemaError;
use grid_map_autotile::{EngineSettings, TileSetLibrary};
use grid_map_core::{AdjacencyMask, NeighborMode};
use std::collections::HashSet;
use std::fmt;

/// Validate that the library can be used by the engine
pub fn validate_library(library: &TileSetLibrary) -> Result<(), SchemaError> {
    let mut seen_ids = HashSet::new();

    for tile_set in library.iter() {
        if !seen_ids.insert(tile_set.id) {
            return Err(SchemaError::ValidationError(format!(
                "Tile set '{}' reuses id {}",
                tile_set.name, tile_set.id
            )));
        }

        for (label, value) in [
            ("cell_size", tile_set.cell_size),
            ("cell_height", tile_set.cell_height),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(SchemaError::ValidationError(format!(
                        "Tile set '{}' has invalid {}: {}",
                        tile_set.name, label, value
                    )));
                }
            }
        }

        for (index, variant) in tile_set.variants.iter().enumerate() {
            if variant.mesh_options.is_empty() {
                return Err(SchemaError::ValidationError(format!(
                    "Tile set '{}' variant {} ({}) has no mesh options",
                    tile_set.name, index, variant.adjacency
                )));
            }
            if variant.mesh_options.iter().any(|mesh| mesh.is_empty()) {
                return Err(SchemaError::ValidationError(format!(
                    "Tile set '{}' variant {} has an empty mesh reference",
                    tile_set.name, index
                )));
            }
            if !variant.rotation.is_finite() {
                return Err(SchemaError::ValidationError(format!(
                    "Tile set '{}' variant {} has a non-finite rotation {:?}",
                    tile_set.name, index, variant.rotation
                )));
            }
        }
    }

    Ok(())
}

/// Validate engine settings
pub fn validate_settings(settings: &EngineSettings) -> Result<(), SchemaError> {
    let factor = settings.probe_radius_factor;
    if !factor.is_finite() || factor <= 0.0 || factor > 0.5 {
        return Err(SchemaError::ValidationError(format!(
            "probe_radius_factor must be in (0, 0.5], got {}",
            factor
        )));
    }
    if !settings.default_grid_snap.is_finite() || settings.default_grid_snap <= 0.0 {
        return Err(SchemaError::ValidationError(format!(
            "default_grid_snap must be positive, got {}",
            settings.default_grid_snap
        )));
    }
    Ok(())
}

/// A suspicious but loadable library configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryWarning {
    /// Several variants compare equal; only the first is ever chosen
    DuplicatePattern {
        tile_set: String,
        pattern: AdjacencyMask,
        variants: Vec<usize>,
    },
    /// Diagonal bits on a variant of a four-neighbor tile set are never observed
    DiagonalInFourMode {
        tile_set: String,
        variant: usize,
        corners: AdjacencyMask,
    },
    /// Diagonal bits whose flanking orthogonals aren't both required are never compared
    UnreachableCorner {
        tile_set: String,
        variant: usize,
        corners: AdjacencyMask,
    },
}

impl fmt::Display for LibraryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryWarning::DuplicatePattern {
                tile_set,
                pattern,
                variants,
            } => write!(
                f,
                "Tile set '{}': variants {:?} share pattern {}, only variant {} is used",
                tile_set,
                variants,
                pattern,
                variants.first().copied().unwrap_or_default()
            ),
            LibraryWarning::DiagonalInFourMode {
                tile_set,
                variant,
                corners,
            } => write!(
                f,
                "Tile set '{}': variant {} requires diagonals {} but only four neighbors are probed",
                tile_set, variant, corners
            ),
            LibraryWarning::UnreachableCorner {
                tile_set,
                variant,
                corners,
            } => write!(
                f,
                "Tile set '{}': variant {} sets corners {} without both flanking edges",
                tile_set, variant, corners
            ),
        }
    }
}

/// Collect configuration smells that don't prevent loading
pub fn lint_library(library: &TileSetLibrary) -> Vec<LibraryWarning> {
    let mut warnings = Vec::new();

    for tile_set in library.iter() {
        for (pattern, variants) in tile_set.duplicate_patterns() {
            warnings.push(LibraryWarning::DuplicatePattern {
                tile_set: tile_set.name.clone(),
                pattern,
                variants,
            });
        }

        for (index, variant) in tile_set.variants.iter().enumerate() {
            let corners = variant.adjacency.corners();
            if corners.is_empty() {
                continue;
            }

            if tile_set.neighbor_mode == NeighborMode::Four {
                warnings.push(LibraryWarning::DiagonalInFourMode {
                    tile_set: tile_set.name.clone(),
                    variant: index,
                    corners,
                });
                continue;
            }

            let unreachable = variant.adjacency.unreachable_corners();
            if !unreachable.is_empty() {
                warnings.push(LibraryWarning::UnreachableCorner {
                    tile_set: tile_set.name.clone(),
                    variant: index,
                    corners: unreachable,
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_map_autotile::{TileSet, TileVariant};
    use grid_map_core::{AdjacencyBit::*, MeshRef, Rotator};

    fn variant(mask: impl Into<AdjacencyMask>) -> TileVariant {
        TileVariant::new(mask, Rotator::ZERO).with_mesh("mesh")
    }

    fn library_of(tile_sets: Vec<TileSet>) -> TileSetLibrary {
        TileSetLibrary { tile_sets }
    }

    #[test]
    fn test_valid_library() {
        let library = library_of(vec![
            TileSet::new("A").with_variant(variant(AdjacencyMask::EMPTY)),
            TileSet::new("B").with_cell_size(50.0).with_cell_height(25.0),
        ]);
        assert!(validate_library(&library).is_ok());
        assert!(lint_library(&library).is_empty());
    }

    #[test]
    fn test_duplicate_ids() {
        let a = TileSet::new("A");
        let mut b = TileSet::new("B");
        b.id = a.id;
        let result = validate_library(&library_of(vec![a, b]));
        assert!(matches!(result, Err(SchemaError::ValidationError(msg)) if msg.contains("'B'")));
    }

    #[test]
    fn test_invalid_cell_dimensions() {
        for bad in [0.0, -100.0, f32::NAN, f32::INFINITY] {
            let library = library_of(vec![TileSet::new("A").with_cell_size(bad)]);
            assert!(validate_library(&library).is_err(), "cell_size {bad}");

            let library = library_of(vec![TileSet::new("A").with_cell_height(bad)]);
            assert!(validate_library(&library).is_err(), "cell_height {bad}");
        }
    }

    #[test]
    fn test_empty_mesh_options() {
        let library = library_of(vec![
            TileSet::new("A").with_variant(TileVariant::new(Left, Rotator::ZERO))
        ]);
        let result = validate_library(&library);
        assert!(matches!(result, Err(SchemaError::ValidationError(msg)) if msg.contains("no mesh options")));

        let mut blank = variant(Left);
        blank.mesh_options.push(MeshRef::new(""));
        let library = library_of(vec![TileSet::new("A").with_variant(blank)]);
        assert!(validate_library(&library).is_err());
    }

    #[test]
    fn test_non_finite_rotation() {
        for rotation in [
            Rotator::new(f32::NAN, 0.0, 0.0),
            Rotator::from_yaw(f32::NAN),
            Rotator::new(0.0, 0.0, f32::NEG_INFINITY),
        ] {
            let library = library_of(vec![TileSet::new("Spin")
                .with_variant(TileVariant::new(Left, rotation).with_mesh("mesh"))]);
            let result = validate_library(&library);
            assert!(
                matches!(&result, Err(SchemaError::ValidationError(msg)) if msg.contains("non-finite rotation")),
                "{rotation:?}"
            );
        }
    }

    #[test]
    fn test_validate_settings() {
        assert!(validate_settings(&EngineSettings::default()).is_ok());

        let mut settings = EngineSettings::default();
        settings.probe_radius_factor = 0.0;
        assert!(validate_settings(&settings).is_err());
        settings.probe_radius_factor = 0.5;
        assert!(validate_settings(&settings).is_ok());

        settings.default_grid_snap = -1.0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_lint_duplicate_patterns() {
        let library = library_of(vec![TileSet::new("Dupes")
            .with_variant(variant(Left))
            .with_variant(variant(Right))
            .with_variant(variant(Left))]);

        let warnings = lint_library(&library);
        assert_eq!(
            warnings,
            vec![LibraryWarning::DuplicatePattern {
                tile_set: "Dupes".to_string(),
                pattern: Left.into(),
                variants: vec![0, 2],
            }]
        );
        assert!(warnings[0].to_string().contains("only variant 0 is used"));
    }

    #[test]
    fn test_lint_diagonals_in_four_mode() {
        let library = library_of(vec![
            TileSet::new("Four").with_variant(variant((Top | Left) | TopLeft))
        ]);
        let warnings = lint_library(&library);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            LibraryWarning::DiagonalInFourMode { variant: 0, corners, .. } if *corners == TopLeft.into()
        ));
    }

    #[test]
    fn test_lint_unreachable_corner() {
        let library = library_of(vec![TileSet::new("Eight")
            .with_neighbor_mode(NeighborMode::Eight)
            .with_variant(variant((Top | Left) | TopLeft))
            .with_variant(variant((Top | TopLeft) | TopRight))]);

        let warnings = lint_library(&library);
        assert_eq!(
            warnings,
            vec![LibraryWarning::UnreachableCorner {
                tile_set: "Eight".to_string(),
                variant: 1,
                corners: TopLeft | TopRight,
            }]
        );
    }
}

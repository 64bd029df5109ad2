//! Placed tile records and the appearance values they carry

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reference to a mesh asset (an asset path, resolved by the host)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshRef(String);

impl MeshRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MeshRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for MeshRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Orientation in degrees (pitch about Y, yaw about Z, roll about X; Z up)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    #[serde(default)]
    pub pitch: f32,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotation about the vertical axis only, the common case for floor tiles
    pub const fn from_yaw(yaw: f32) -> Self {
        Self::new(0.0, yaw, 0.0)
    }

    pub fn is_finite(self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }

    /// Yaw, then pitch, then roll
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }
}

/// Opaque identifier of a tile owned by the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileHandle(pub u64);

impl fmt::Display for TileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile#{}", self.0)
    }
}

/// A single occupied grid cell as the host reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub handle: TileHandle,
    /// Cell center in world space
    pub position: Vec3,
    /// Owning tile set
    pub tile_set: Uuid,
    pub mesh: MeshRef,
    pub rotation: Rotator,
}

impl PlacedTile {
    /// True if the tile already shows exactly this mesh and rotation
    pub fn has_appearance(&self, mesh: &MeshRef, rotation: Rotator) -> bool {
        &self.mesh == mesh && self.rotation == rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_rotates_about_up_axis() {
        let q = Rotator::from_yaw(90.0).to_quat();
        let rotated = q * Vec3::X;
        assert!((rotated - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_zero_rotator_is_identity() {
        assert!(Rotator::ZERO.to_quat().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_rotator_is_finite() {
        assert!(Rotator::from_yaw(270.0).is_finite());
        assert!(!Rotator::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Rotator::new(0.0, 0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_rotator_partial_fields_deserialize() {
        let rot: Rotator = serde_json::from_str(r#"{ "yaw": 180.0 }"#).unwrap();
        assert_eq!(rot, Rotator::from_yaw(180.0));
    }

    #[test]
    fn test_has_appearance() {
        let tile = PlacedTile {
            handle: TileHandle(1),
            position: Vec3::ZERO,
            tile_set: Uuid::nil(),
            mesh: MeshRef::from("/Game/Tiles/Floor"),
            rotation: Rotator::from_yaw(90.0),
        };
        assert!(tile.has_appearance(&"/Game/Tiles/Floor".into(), Rotator::from_yaw(90.0)));
        assert!(!tile.has_appearance(&"/Game/Tiles/Floor".into(), Rotator::ZERO));
        assert!(!tile.has_appearance(&"/Game/Tiles/Wall".into(), Rotator::from_yaw(90.0)));
    }
}

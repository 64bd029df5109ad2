//! Brush helpers for interactive painting
//!
//! Turns viewport input (a pick ray and modifier state) into snapped grid cells and
//! dispatches them to the engine. The brush is a plain value owned by the host.

use crate::engine::{AdjacencyEngine, EraseOutcome, PaintOutcome};
use crate::error::AutotileError;
use crate::world::{MeshLoader, TileWorld};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a brush stroke does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaintMode {
    #[default]
    Paint,
    Erase,
}

impl PaintMode {
    /// Holding the erase modifier (Ctrl in the editor) switches to erasing
    pub fn from_modifiers(erase_held: bool) -> Self {
        if erase_held {
            PaintMode::Erase
        } else {
            PaintMode::Paint
        }
    }
}

/// Round each axis to the nearest multiple of `snap`. Non-positive `snap` disables snapping.
pub fn snap_location(point: Vec3, snap: f32) -> Vec3 {
    if snap <= 0.0 {
        return point;
    }
    ((point / snap) + Vec3::splat(0.5)).floor() * snap
}

/// Intersect a pick ray with the horizontal plane `z = paint_height` and snap the hit.
///
/// Returns `None` for rays parallel to the plane or pointing away from it.
pub fn brush_trace(
    ray_origin: Vec3,
    ray_direction: Vec3,
    paint_height: f32,
    snap: f32,
) -> Option<Vec3> {
    if ray_direction.z.abs() <= f32::EPSILON {
        return None;
    }
    let t = (paint_height - ray_origin.z) / ray_direction.z;
    if t < 0.0 {
        return None;
    }
    Some(snap_location(ray_origin + ray_direction * t, snap))
}

/// What [`GridBrush::apply`] did
#[derive(Debug, Clone, PartialEq)]
pub enum BrushResult {
    Painted(PaintOutcome),
    Erased(EraseOutcome),
    /// Nothing selected to paint, or nothing under the brush to erase
    Nothing,
}

/// Brush state for painting tile sets onto the grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridBrush {
    pub mode: PaintMode,
    /// Height of the plane the brush traces against
    #[serde(default)]
    pub paint_height: f32,
    /// Currently selected tile set
    #[serde(default)]
    pub tile_set: Option<Uuid>,
}

impl GridBrush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paint_height(mut self, paint_height: f32) -> Self {
        self.paint_height = paint_height;
        self
    }

    pub fn select(&mut self, tile_set_id: Uuid) {
        self.tile_set = Some(tile_set_id);
    }

    pub fn deselect(&mut self) {
        self.tile_set = None;
    }

    pub fn set_modifiers(&mut self, erase_held: bool) {
        self.mode = PaintMode::from_modifiers(erase_held);
    }

    /// Snapped cell under a pick ray, traced against this brush's paint height
    pub fn trace(&self, ray_origin: Vec3, ray_direction: Vec3, snap: f32) -> Option<Vec3> {
        brush_trace(ray_origin, ray_direction, self.paint_height, snap)
    }

    /// Paint the selected tile set at `location`, or erase the tile there
    pub fn apply<W, R>(
        &self,
        engine: &AdjacencyEngine<'_>,
        world: &mut W,
        rng: &mut R,
        location: Vec3,
    ) -> Result<BrushResult, AutotileError>
    where
        W: TileWorld + MeshLoader + ?Sized,
        R: Rng + ?Sized,
    {
        match self.mode {
            PaintMode::Paint => {
                let Some(tile_set_id) = self.tile_set else {
                    return Ok(BrushResult::Nothing);
                };
                let outcome = engine.paint(world, rng, location, tile_set_id)?;
                Ok(BrushResult::Painted(outcome))
            }
            PaintMode::Erase => {
                let selected = match self.tile_set {
                    Some(id) => Some(engine.tile_set(id)?),
                    None => None,
                };
                match engine.tile_at(world, location, selected) {
                    Some(tile) => Ok(BrushResult::Erased(engine.erase(world, rng, tile.handle))),
                    None => Ok(BrushResult::Nothing),
                }
            }
        }
    }
}

//! Adjacency directions and neighbor bitmasks
//!
//! Bit layout (one bit per neighbor cell, center not stored):
//!
//! ```text
//!   4|0|5      TopLeft   |Top   |TopRight
//!   1|X|2      Left      |X     |Right
//!   6|3|7      BottomLeft|Bottom|BottomRight
//! ```
//!
//! The four orthogonal directions occupy the lowest four bits so that a mask
//! can be reduced to its orthogonal subset with a single `& 0x0F`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A neighbor direction on the grid plane. The discriminant is the bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AdjacencyBit {
    Top = 0,
    Left = 1,
    Right = 2,
    Bottom = 3,
    TopLeft = 4,
    TopRight = 5,
    BottomLeft = 6,
    BottomRight = 7,
}

impl AdjacencyBit {
    /// Orthogonal directions in probe order
    pub const ORTHOGONAL: [AdjacencyBit; 4] = [
        AdjacencyBit::Top,
        AdjacencyBit::Left,
        AdjacencyBit::Right,
        AdjacencyBit::Bottom,
    ];

    /// Diagonal directions in probe order
    pub const CORNERS: [AdjacencyBit; 4] = [
        AdjacencyBit::TopLeft,
        AdjacencyBit::TopRight,
        AdjacencyBit::BottomLeft,
        AdjacencyBit::BottomRight,
    ];

    /// All eight directions, orthogonals first
    pub const ALL: [AdjacencyBit; 8] = [
        AdjacencyBit::Top,
        AdjacencyBit::Left,
        AdjacencyBit::Right,
        AdjacencyBit::Bottom,
        AdjacencyBit::TopLeft,
        AdjacencyBit::TopRight,
        AdjacencyBit::BottomLeft,
        AdjacencyBit::BottomRight,
    ];

    /// Create from a bit index (0-7)
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// The single-bit mask value for this direction
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    #[inline]
    pub fn is_corner(self) -> bool {
        (self as u8) >= 4
    }

    /// Unit cell offset on the grid plane as `(dx, dy)`.
    ///
    /// "Top" is -Y, matching the editor's top-down view of the world X/Y plane.
    pub fn offset(self) -> (i32, i32) {
        match self {
            AdjacencyBit::Top => (0, -1),
            AdjacencyBit::Left => (-1, 0),
            AdjacencyBit::Right => (1, 0),
            AdjacencyBit::Bottom => (0, 1),
            AdjacencyBit::TopLeft => (-1, -1),
            AdjacencyBit::TopRight => (1, -1),
            AdjacencyBit::BottomLeft => (-1, 1),
            AdjacencyBit::BottomRight => (1, 1),
        }
    }

    /// The direction pointing back from the neighbor to us
    pub fn opposite(self) -> Self {
        match self {
            AdjacencyBit::Top => AdjacencyBit::Bottom,
            AdjacencyBit::Left => AdjacencyBit::Right,
            AdjacencyBit::Right => AdjacencyBit::Left,
            AdjacencyBit::Bottom => AdjacencyBit::Top,
            AdjacencyBit::TopLeft => AdjacencyBit::BottomRight,
            AdjacencyBit::TopRight => AdjacencyBit::BottomLeft,
            AdjacencyBit::BottomLeft => AdjacencyBit::TopRight,
            AdjacencyBit::BottomRight => AdjacencyBit::TopLeft,
        }
    }

    /// For a corner, the two orthogonal directions that flank it
    pub fn flanking(self) -> Option<(AdjacencyBit, AdjacencyBit)> {
        match self {
            AdjacencyBit::TopLeft => Some((AdjacencyBit::Top, AdjacencyBit::Left)),
            AdjacencyBit::TopRight => Some((AdjacencyBit::Top, AdjacencyBit::Right)),
            AdjacencyBit::BottomLeft => Some((AdjacencyBit::Bottom, AdjacencyBit::Left)),
            AdjacencyBit::BottomRight => Some((AdjacencyBit::Bottom, AdjacencyBit::Right)),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AdjacencyBit::Top => "Top",
            AdjacencyBit::Left => "Left",
            AdjacencyBit::Right => "Right",
            AdjacencyBit::Bottom => "Bottom",
            AdjacencyBit::TopLeft => "Top-Left",
            AdjacencyBit::TopRight => "Top-Right",
            AdjacencyBit::BottomLeft => "Bottom-Left",
            AdjacencyBit::BottomRight => "Bottom-Right",
        }
    }
}

/// How many neighbors are probed when building a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NeighborMode {
    /// Top, Left, Right, Bottom
    #[default]
    Four,
    /// Orthogonals plus the four diagonals
    Eight,
}

impl NeighborMode {
    pub fn directions(self) -> &'static [AdjacencyBit] {
        match self {
            NeighborMode::Four => &AdjacencyBit::ORTHOGONAL,
            NeighborMode::Eight => &AdjacencyBit::ALL,
        }
    }

    pub fn direction_count(self) -> usize {
        self.directions().len()
    }
}

/// Set of neighbor directions packed into one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyMask(pub u8);

impl AdjacencyMask {
    pub const EMPTY: Self = AdjacencyMask(0);
    pub const ORTHOGONAL_BITS: u8 = 0x0F;
    pub const CORNER_BITS: u8 = 0xF0;

    pub const fn from_bits(bits: u8) -> Self {
        AdjacencyMask(bits)
    }

    pub fn from_directions(directions: &[AdjacencyBit]) -> Self {
        directions
            .iter()
            .fold(Self::EMPTY, |mask, &dir| mask.with(dir))
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, dir: AdjacencyBit) -> bool {
        self.0 & dir.bit() != 0
    }

    /// True if every direction in `other` is also set here
    #[inline]
    pub fn contains_all(self, other: AdjacencyMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, dir: AdjacencyBit) {
        self.0 |= dir.bit();
    }

    pub fn remove(&mut self, dir: AdjacencyBit) {
        self.0 &= !dir.bit();
    }

    pub fn with(mut self, dir: AdjacencyBit) -> Self {
        self.insert(dir);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// The lowest four bits only (diagonal information dropped)
    pub fn orthogonal(self) -> Self {
        AdjacencyMask(self.0 & Self::ORTHOGONAL_BITS)
    }

    pub fn corners(self) -> Self {
        AdjacencyMask(self.0 & Self::CORNER_BITS)
    }

    pub fn has_corners(self) -> bool {
        self.0 & Self::CORNER_BITS != 0
    }

    /// Clear every corner bit whose two flanking orthogonals are not both set in `required`.
    ///
    /// A corner only carries information when the tile has a real corner there, i.e. when
    /// it requires both edges meeting at it. `required` is normally a variant's pattern and
    /// `self` either the same pattern or an observed neighbor mask.
    pub fn filter_corners(self, required: AdjacencyMask) -> Self {
        let mut result = self;
        for corner in AdjacencyBit::CORNERS {
            if let Some((a, b)) = corner.flanking() {
                if !(required.contains(a) && required.contains(b)) {
                    result.remove(corner);
                }
            }
        }
        result
    }

    /// Corner bits set here that `filter_corners(self)` would discard
    pub fn unreachable_corners(self) -> Self {
        AdjacencyMask(self.0 & !self.filter_corners(self).0)
    }

    /// Iterate over the set directions in bit order
    pub fn iter(self) -> impl Iterator<Item = AdjacencyBit> {
        AdjacencyBit::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl From<AdjacencyBit> for AdjacencyMask {
    fn from(dir: AdjacencyBit) -> Self {
        AdjacencyMask(dir.bit())
    }
}

impl std::ops::BitOr for AdjacencyMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        AdjacencyMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<AdjacencyBit> for AdjacencyMask {
    type Output = Self;

    fn bitor(self, rhs: AdjacencyBit) -> Self {
        self.with(rhs)
    }
}

impl std::ops::BitOrAssign<AdjacencyBit> for AdjacencyMask {
    fn bitor_assign(&mut self, rhs: AdjacencyBit) {
        self.insert(rhs);
    }
}

impl std::ops::BitOr for AdjacencyBit {
    type Output = AdjacencyMask;

    fn bitor(self, rhs: Self) -> AdjacencyMask {
        AdjacencyMask::from(self).with(rhs)
    }
}

/// Renders the mask as a 3x3 block (`#` set, `.` clear, `X` center) on one line,
/// rows separated by `/`. Used in diagnostics.
impl fmt::Display for AdjacencyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AdjacencyBit::*;
        let cell = |dir: AdjacencyBit| if self.contains(dir) { '#' } else { '.' };
        write!(
            f,
            "{}{}{}/{}X{}/{}{}{} ({:#04x})",
            cell(TopLeft),
            cell(Top),
            cell(TopRight),
            cell(Left),
            cell(Right),
            cell(BottomLeft),
            cell(Bottom),
            cell(BottomRight),
            self.0
        )
    }
}

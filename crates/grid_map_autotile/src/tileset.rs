//! Tile sets and the variant catalog
//!
//! A [`TileSet`] maps adjacency masks to [`TileVariant`]s. Lookup is a linear scan in
//! stored order, so when several variants share a pattern the first one wins.

use grid_map_core::{
    AdjacencyMask, GameplayTag, MeshRef, NeighborMode, Rotator, TagContainer, TagRequirements,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One candidate appearance for a grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileVariant {
    /// Neighbors that must be present for this variant to apply
    pub adjacency: AdjacencyMask,
    #[serde(default)]
    pub rotation: Rotator,
    /// Interchangeable meshes; one is picked at random on placement
    #[serde(default)]
    pub mesh_options: Vec<MeshRef>,
}

impl TileVariant {
    pub fn new(adjacency: impl Into<AdjacencyMask>, rotation: Rotator) -> Self {
        Self {
            adjacency: adjacency.into(),
            rotation,
            mesh_options: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: impl Into<MeshRef>) -> Self {
        self.mesh_options.push(mesh.into());
        self
    }

    /// A variant with no meshes can never be placed
    pub fn is_usable(&self) -> bool {
        !self.mesh_options.is_empty()
    }

    /// The pattern with meaningless corner bits removed; this is what gets compared
    pub fn match_key(&self) -> AdjacencyMask {
        self.adjacency.filter_corners(self.adjacency)
    }

    /// Whether an observed neighbor mask satisfies this variant exactly
    pub fn matches(&self, mask: AdjacencyMask) -> bool {
        self.match_key() == mask.filter_corners(self.adjacency)
    }

    pub fn contains_mesh(&self, mesh: &MeshRef) -> bool {
        self.mesh_options.contains(mesh)
    }

    /// Uniform random pick among the mesh options
    pub fn select_random_mesh<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&MeshRef> {
        self.mesh_options.choose(rng)
    }
}

/// Which lookup pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    /// Corner-filtered exact match
    Exact,
    /// Matched after dropping all diagonal bits from the observed mask
    Orthogonal,
}

/// A named catalog of tile variants plus the rules for how it sees its neighbors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSet {
    pub id: Uuid,
    pub name: String,
    /// Tags this tile set presents to its neighbors
    #[serde(default)]
    pub tags: TagContainer,
    /// What a neighbor's tags must satisfy to count as present
    #[serde(default)]
    pub adjacency_requirement: TagRequirements,
    /// Treat empty neighbor cells as present
    #[serde(default)]
    pub matches_empty_neighbors: bool,
    #[serde(default)]
    pub neighbor_mode: NeighborMode,
    /// Grid pitch; `None` uses the host's grid snap size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_size: Option<f32>,
    /// Vertical snap; `None` uses twice the cell size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_height: Option<f32>,
    #[serde(default)]
    pub variants: Vec<TileVariant>,
}

impl TileSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tags: TagContainer::new(),
            adjacency_requirement: TagRequirements::new(),
            matches_empty_neighbors: false,
            neighbor_mode: NeighborMode::default(),
            cell_size: None,
            cell_height: None,
            variants: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.tags.add(tag);
        self
    }

    pub fn with_requirement(mut self, requirement: TagRequirements) -> Self {
        self.adjacency_requirement = requirement;
        self
    }

    pub fn with_matches_empty(mut self, matches_empty: bool) -> Self {
        self.matches_empty_neighbors = matches_empty;
        self
    }

    pub fn with_neighbor_mode(mut self, mode: NeighborMode) -> Self {
        self.neighbor_mode = mode;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    pub fn with_cell_height(mut self, cell_height: f32) -> Self {
        self.cell_height = Some(cell_height);
        self
    }

    pub fn with_variant(mut self, variant: TileVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Append a variant, returning its index
    pub fn add_variant(&mut self, variant: TileVariant) -> usize {
        self.variants.push(variant);
        self.variants.len() - 1
    }

    pub fn remove_variant(&mut self, index: usize) -> Option<TileVariant> {
        if index < self.variants.len() {
            Some(self.variants.remove(index))
        } else {
            None
        }
    }

    pub fn effective_cell_size(&self, fallback: f32) -> f32 {
        self.cell_size.unwrap_or(fallback)
    }

    pub fn effective_cell_height(&self, fallback: f32) -> f32 {
        self.cell_height
            .unwrap_or_else(|| self.effective_cell_size(fallback) * 2.0)
    }

    /// Whether a neighbor presenting `tags` counts toward our adjacency mask
    pub fn accepts_neighbor(&self, tags: &TagContainer) -> bool {
        self.adjacency_requirement.requirements_met(tags)
    }

    /// Find the variant for an observed neighbor mask.
    ///
    /// Returns `None` when this neighborhood has no designed tile; that is an
    /// expected outcome, not an error.
    pub fn find_variant(&self, mask: AdjacencyMask) -> Option<&TileVariant> {
        self.find_variant_match(mask)
            .map(|(index, _)| &self.variants[index])
    }

    pub fn find_variant_index(&self, mask: AdjacencyMask) -> Option<usize> {
        self.find_variant_match(mask).map(|(index, _)| index)
    }

    /// Two passes over the variants in stored order: first a corner-filtered exact
    /// match, then a match against the orthogonal bits only. Variants without mesh
    /// options are skipped in both.
    pub fn find_variant_match(&self, mask: AdjacencyMask) -> Option<(usize, MatchPass)> {
        let usable = || {
            self.variants
                .iter()
                .enumerate()
                .filter(|(_, variant)| variant.is_usable())
        };

        if let Some((index, _)) = usable().find(|(_, variant)| variant.matches(mask)) {
            return Some((index, MatchPass::Exact));
        }

        // Without diagonal bits the second pass would repeat the first
        if !mask.has_corners() {
            return None;
        }

        let orthogonal = mask.orthogonal();
        usable()
            .find(|(_, variant)| variant.match_key() == orthogonal)
            .map(|(index, _)| (index, MatchPass::Orthogonal))
    }

    /// Match keys shared by more than one variant, with the indices sharing each.
    ///
    /// Only the first index of each group is reachable through [`find_variant`](Self::find_variant).
    pub fn duplicate_patterns(&self) -> Vec<(AdjacencyMask, Vec<usize>)> {
        let mut groups: Vec<(AdjacencyMask, Vec<usize>)> = Vec::new();
        for (index, variant) in self.variants.iter().enumerate() {
            let key = variant.match_key();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, indices)) => indices.push(index),
                None => groups.push((key, vec![index])),
            }
        }
        groups.retain(|(_, indices)| indices.len() > 1);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_map_core::AdjacencyBit::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn variant(mask: impl Into<AdjacencyMask>, mesh: &str) -> TileVariant {
        TileVariant::new(mask, Rotator::ZERO).with_mesh(mesh)
    }

    #[test]
    fn test_exact_match_first_in_order() {
        let set = TileSet::new("Walls")
            .with_variant(variant(AdjacencyMask::EMPTY, "isolated"))
            .with_variant(variant(Left, "end-cap"))
            .with_variant(variant(Left, "end-cap-alt"));

        assert_eq!(set.find_variant_index(AdjacencyMask::EMPTY), Some(0));
        // Duplicate patterns resolve to the first stored variant
        assert_eq!(set.find_variant_index(Left.into()), Some(1));
        assert_eq!(set.find_variant_index(Right.into()), None);
    }

    #[test]
    fn test_corner_ignored_without_both_flanks() {
        let set = TileSet::new("Walls").with_variant(variant(Top | Right, "corner"));

        assert!(set.find_variant(Top | Right).is_some());
        // TopLeft is irrelevant: the variant does not require both Top and Left
        let mask = (Top | Right) | TopLeft;
        assert_eq!(
            set.find_variant_match(mask),
            Some((0, MatchPass::Exact))
        );
        let mask = ((Top | Right) | BottomLeft) | BottomRight;
        assert_eq!(set.find_variant_match(mask), Some((0, MatchPass::Exact)));
    }

    #[test]
    fn test_meaningful_corner_must_match() {
        let set = TileSet::new("Floor")
            .with_variant(variant(Top | Right, "outer-corner"))
            .with_variant(variant((Top | Right) | TopRight, "inner-fill"));

        // TopRight observed and meaningful: only the second variant matches exactly
        let filled = (Top | Right) | TopRight;
        assert_eq!(set.find_variant_match(filled), Some((1, MatchPass::Exact)));
        // TopRight absent: first variant
        assert_eq!(set.find_variant_match(Top | Right), Some((0, MatchPass::Exact)));
    }

    #[test]
    fn test_orthogonal_fallback() {
        // Only orthogonal patterns are defined
        let mut set = TileSet::new("Paths");
        for bits in 0u8..16 {
            set.add_variant(variant(AdjacencyMask::from_bits(bits), "path"));
        }

        let mask = AdjacencyMask::from_bits(0xFF);
        let (index, pass) = set.find_variant_match(mask).unwrap();
        // The full cross keeps every corner, so the exact pass fails and the fallback hits 0x0F
        assert_eq!(pass, MatchPass::Orthogonal);
        assert_eq!(index, 0x0F);

        for bits in 0u16..=255 {
            let mask = AdjacencyMask::from_bits(bits as u8);
            let found = set.find_variant(mask).unwrap();
            assert_eq!(found.match_key(), mask.orthogonal());
        }
    }

    #[test]
    fn test_exact_match_agrees_with_filtered_mask() {
        let set = TileSet::new("Mixed")
            .with_variant(variant(AdjacencyMask::EMPTY, "a"))
            .with_variant(variant(Top | Left, "b"))
            .with_variant(variant((Top | Left) | TopLeft, "c"))
            .with_variant(variant(((Top | Left) | Right) | Bottom, "d"))
            .with_variant(variant(AdjacencyMask::from_bits(0xFF), "e"));

        for bits in 0u16..=255 {
            let mask = AdjacencyMask::from_bits(bits as u8);
            if let Some((index, MatchPass::Exact)) = set.find_variant_match(mask) {
                let v = &set.variants[index];
                assert_eq!(v.match_key(), mask.filter_corners(v.adjacency));
            }
        }
    }

    #[test]
    fn test_empty_mesh_options_never_match() {
        let set = TileSet::new("Broken")
            .with_variant(TileVariant::new(Left, Rotator::ZERO))
            .with_variant(variant(Left, "fallback"));

        assert_eq!(set.find_variant_index(Left.into()), Some(1));

        let only_broken = TileSet::new("Broken").with_variant(TileVariant::new(Left, Rotator::ZERO));
        assert!(only_broken.find_variant(Left.into()).is_none());
    }

    #[test]
    fn test_select_random_mesh_is_uniform_over_options() {
        let v = TileVariant::new(AdjacencyMask::EMPTY, Rotator::ZERO)
            .with_mesh("a")
            .with_mesh("b")
            .with_mesh("c");
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let mesh = v.select_random_mesh(&mut rng).unwrap();
            assert!(v.contains_mesh(mesh));
            seen.insert(mesh.clone());
        }
        assert_eq!(seen.len(), 3);

        let empty = TileVariant::new(AdjacencyMask::EMPTY, Rotator::ZERO);
        assert!(empty.select_random_mesh(&mut rng).is_none());
    }

    #[test]
    fn test_duplicate_patterns() {
        let set = TileSet::new("Dupes")
            .with_variant(variant(Left, "a"))
            .with_variant(variant(Right, "b"))
            .with_variant(variant(Left, "c"))
            // TopLeft without Top is never compared, so this is also just "Left"
            .with_variant(variant(Left | TopLeft, "d"));

        let dupes = set.duplicate_patterns();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].0, Left.into());
        assert_eq!(dupes[0].1, vec![0, 2, 3]);
    }

    #[test]
    fn test_effective_cell_dimensions() {
        let set = TileSet::new("Default");
        assert_eq!(set.effective_cell_size(50.0), 50.0);
        assert_eq!(set.effective_cell_height(50.0), 100.0);

        let set = TileSet::new("Sized").with_cell_size(200.0).with_cell_height(300.0);
        assert_eq!(set.effective_cell_size(50.0), 200.0);
        assert_eq!(set.effective_cell_height(50.0), 300.0);
    }

    #[test]
    fn test_accepts_neighbor() {
        let set = TileSet::new("Road")
            .with_tag("Road")
            .with_requirement(TagRequirements::new().require("Road").ignore("Road.Closed"));

        let road: TagContainer = ["Road.Asphalt"].into_iter().collect();
        let closed: TagContainer = ["Road.Closed"].into_iter().collect();
        assert!(set.accepts_neighbor(&road));
        assert!(!set.accepts_neighbor(&closed));
    }
}

//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries in 3D for:
//! - Nearest neighbor
//! - Point-in-radius
//!
//! The interaction layer uses this to resolve a pointer sample in world
//! space to the nearest particle before pinning it for a drag.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A point in the spatial index with the dense particle slot it mirrors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPoint {
    /// Dense particle slot.
    pub slot: usize,
    /// Position in graph space.
    pub position: [f32; 3],
}

impl SlotPoint {
    /// Create a new SlotPoint.
    pub fn new(slot: usize, position: [f32; 3]) -> Self {
        Self { slot, position }
    }
}

impl RTreeObject for SlotPoint {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for SlotPoint {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }

    fn contains_point(&self, point: &[f32; 3]) -> bool {
        (self.position[0] - point[0]).abs() < f32::EPSILON
            && (self.position[1] - point[1]).abs() < f32::EPSILON
            && (self.position[2] - point[2]).abs() < f32::EPSILON
    }
}

/// Spatial index over particle positions.
///
/// Uses an R*-tree for efficient spatial queries. Positions move every
/// step, so the owner rebuilds the index on demand rather than keeping
/// it synchronized continuously.
pub struct SpatialIndex {
    tree: RTree<SlotPoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Insert a particle slot into the index.
    pub fn insert(&mut self, slot: usize, position: [f32; 3]) {
        self.tree.insert(SlotPoint::new(slot, position));
    }

    /// Find the particle slot nearest to a point.
    pub fn nearest(&self, point: [f32; 3]) -> Option<usize> {
        self.tree.nearest_neighbor(&point).map(|p| p.slot)
    }

    /// Find the nearest particle slot within a maximum distance.
    pub fn nearest_within(&self, point: [f32; 3], max_distance: f32) -> Option<usize> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&point)
            .filter(|p| p.distance_2(&point) <= max_distance_sq)
            .map(|p| p.slot)
    }

    /// Find all particle slots within a radius of a point.
    pub fn in_radius(&self, point: [f32; 3], radius: f32) -> Vec<usize> {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance(point, radius_sq)
            .map(|p| p.slot)
            .collect()
    }

    /// Rebuild the index from (slot, position) pairs.
    ///
    /// Bulk loading is more efficient than incremental inserts after a
    /// step has moved every particle.
    pub fn rebuild(&mut self, points: &[(usize, [f32; 3])]) {
        let slot_points: Vec<_> = points
            .iter()
            .map(|&(slot, position)| SlotPoint::new(slot, position))
            .collect();

        self.tree = RTree::bulk_load(slot_points);
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Number of indexed slots.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

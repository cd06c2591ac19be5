//! Spatial indexing for O(log n) nearest-node picking.
//!
//! This module provides an R-tree based spatial index over particle
//! positions in 3D, used by the interaction layer to resolve a pointer
//! sample to a node before pinning it for a drag.

mod rtree;

pub use rtree::SpatialIndex;

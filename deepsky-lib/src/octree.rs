//! A magnitude-aware octree for point-like objects.
//!
//! Every node admits objects that are brighter than its limiting magnitude. Fainter objects are
//! pushed down into the octant child, whose limiting magnitude is a quarter luminosity fainter.
//! Bright objects therefore end up close to the root while faint ones are only found in small
//! cells, which lets traversals skip whole subtrees that are too faint to be seen from afar.
//!
//! Octrees are built in two steps:
//!
//! - [`DynamicOctree`] accepts objects one at a time.
//! - [`DynamicOctree::rebuild_and_sort`] compacts it into a [`StaticOctree`], which owns the
//!   objects in traversal order and answers queries.

pub mod builder;
pub mod node;
pub mod visit;

#[cfg(test)]
pub(crate) mod testing;

use glam::DVec3;

pub use builder::DynamicOctree;
pub use node::{NodeRef, StaticOctree};
pub use visit::{ObjectHandler, OctreeProcStats};

use crate::{
    astro::{abs_mag_to_lum, app_to_abs_mag, lum_to_abs_mag},
    math::bounds::CellBounds,
};

/// An object that can be stored in an octree.
pub trait OctreeObject {
    /// The position of the object in light years.
    fn position(&self) -> DVec3;

    /// The absolute magnitude of the object.
    fn absolute_magnitude(&self) -> f32;
}

/// Shape of the root cell and how deep the octree is allowed to grow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeParams {
    root: CellBounds,
    root_limiting_magnitude: f32,
    max_depth: u8,
}

impl OctreeParams {
    pub const fn new(root: CellBounds, root_limiting_magnitude: f32, max_depth: u8) -> Self {
        Self {
            root,
            root_limiting_magnitude,
            max_depth,
        }
    }

    /// Derives the root limiting magnitude from an apparent magnitude.
    ///
    /// An object at the root limit appears with `apparent_magnitude` when seen from as far away as
    /// the bounding radius of the root cell.
    pub fn from_apparent_magnitude(root: CellBounds, apparent_magnitude: f32, max_depth: u8) -> Self {
        Self::new(
            root,
            app_to_abs_mag(apparent_magnitude, root.bounding_radius()),
            max_depth,
        )
    }

    pub const fn root(self) -> CellBounds {
        self.root
    }

    pub const fn root_limiting_magnitude(self) -> f32 {
        self.root_limiting_magnitude
    }

    /// Nodes at this depth store every object routed to them instead of subdividing further.
    pub const fn max_depth(self) -> u8 {
        self.max_depth
    }
}

/// The limiting magnitude of a child node; a quarter of the luminosity of its parent's limit.
pub fn child_limiting_magnitude(parent: f32) -> f32 {
    lum_to_abs_mag(abs_mag_to_lum(parent) / 4.0)
}

/// Identifies a node within the arena of an octree.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node, which always exists.
    pub const ROOT: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0
    }
}

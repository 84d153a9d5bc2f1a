use std::ops::Range;

use derive_where::derive_where;
use enum_map::EnumMap;

use super::NodeId;
use crate::{math::bounds::CellBounds, math_enums::Corner3};

/// A node within the arena of a [`StaticOctree`].
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Node {
    pub(super) bounds: CellBounds,
    pub(super) limiting_magnitude: f32,
    pub(super) depth: u8,
    /// The objects of this node as a range within [`StaticOctree::objects`].
    pub(super) objects: Range<usize>,
    pub(super) children: EnumMap<Corner3, Option<NodeId>>,
}

/// A compacted, read-only octree that owns its objects.
///
/// Nodes are stored in depth-first order, visiting children in octant order. The objects of every
/// node are stored contiguously in the same order and sorted by ascending absolute magnitude,
/// so the brightest object of a node always comes first.
///
/// Created by [`DynamicOctree::rebuild_and_sort`](super::DynamicOctree::rebuild_and_sort).
#[derive(Clone, Debug)]
pub struct StaticOctree<T> {
    pub(super) nodes: Vec<Node>,
    pub(super) objects: Vec<T>,
}

impl<T> StaticOctree<T> {
    /// The root node, which exists even if the octree is empty.
    pub fn root(&self) -> NodeRef<T> {
        self.node(NodeId::ROOT)
            .expect("octree should always have a root node")
    }

    /// Returns the node with the given `id` or [`None`] if it does not exist.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<T>> {
        (id.index() < self.nodes.len()).then(|| NodeRef {
            id,
            nodes: &self.nodes,
            objects: &self.objects,
        })
    }

    /// Iterates all nodes in depth-first order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeRef<T>> {
        (0..self.nodes.len()).map(|index| NodeRef {
            id: NodeId(index),
            nodes: &self.nodes,
            objects: &self.objects,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All objects in storage order.
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.objects.get(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn into_objects(self) -> Vec<T> {
        self.objects
    }
}

/// An immutable reference to a node within a [`StaticOctree`].
#[derive(Debug)]
#[derive_where(Clone, Copy)]
pub struct NodeRef<'a, T> {
    id: NodeId,
    /// The whole arena, so that children can be reached.
    nodes: &'a [Node],
    /// All objects of the octree, not just the ones of this node.
    objects: &'a [T],
}

impl<'a, T> NodeRef<'a, T> {
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The cube covered by this node.
    pub fn bounds(self) -> CellBounds {
        self.node().bounds
    }

    /// Objects of this node must be brighter than this, unless the node is at maximum depth.
    pub fn limiting_magnitude(self) -> f32 {
        self.node().limiting_magnitude
    }

    /// The depth of this node, starting at `0` for the root.
    pub fn depth(self) -> u8 {
        self.node().depth
    }

    /// The range of this node's objects within [`StaticOctree::objects`].
    pub fn object_range(self) -> Range<usize> {
        self.node().objects.clone()
    }

    /// The objects stored directly in this node, sorted from brightest to faintest.
    pub fn objects(self) -> &'a [T] {
        &self.objects[self.object_range()]
    }

    /// The child node at the given `corner`, if it exists.
    pub fn child(self, corner: Corner3) -> Option<NodeRef<'a, T>> {
        self.node().children[corner].map(|id| self.with_id(id))
    }

    /// Iterates all existing children in octant order.
    pub fn children(self) -> impl Iterator<Item = (Corner3, NodeRef<'a, T>)> {
        self.node()
            .children
            .iter()
            .filter_map(move |(corner, &id)| Some((corner, self.with_id(id?))))
    }

    pub fn is_leaf(self) -> bool {
        self.node().children.values().all(Option::is_none)
    }

    fn node(self) -> &'a Node {
        &self.nodes[self.id.index()]
    }

    fn with_id(self, id: NodeId) -> Self {
        Self { id, ..self }
    }
}

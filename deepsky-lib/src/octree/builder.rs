use std::mem::take;

use enum_map::EnumMap;
use log::debug;

use super::{
    child_limiting_magnitude,
    node::{Node, StaticOctree},
    NodeId, OctreeObject, OctreeParams,
};
use crate::{math::bounds::CellBounds, math_enums::Corner3};

/// A node of a [`DynamicOctree`], referring to objects by their index.
#[derive(Clone, Debug)]
struct DynamicNode {
    bounds: CellBounds,
    limiting_magnitude: f32,
    depth: u8,
    objects: Vec<usize>,
    children: EnumMap<Corner3, Option<NodeId>>,
}

impl DynamicNode {
    fn new(bounds: CellBounds, limiting_magnitude: f32, depth: u8) -> Self {
        Self {
            bounds,
            limiting_magnitude,
            depth,
            objects: Vec::new(),
            children: EnumMap::default(),
        }
    }
}

/// Allows building a [`StaticOctree`] one object at a time.
///
/// Objects are referred to by their index within the list that is later passed to
/// [`DynamicOctree::rebuild_and_sort`].
#[derive(Clone, Debug)]
pub struct DynamicOctree {
    params: OctreeParams,
    nodes: Vec<DynamicNode>,
    object_count: usize,
    objects_outside_root: usize,
}

impl DynamicOctree {
    /// Constructs an empty [`DynamicOctree`] that consists of only the root node.
    pub fn new(params: OctreeParams) -> Self {
        Self {
            params,
            nodes: vec![DynamicNode::new(
                params.root(),
                params.root_limiting_magnitude(),
                0,
            )],
            object_count: 0,
            objects_outside_root: 0,
        }
    }

    pub fn params(&self) -> OctreeParams {
        self.params
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of inserted objects.
    pub fn len(&self) -> usize {
        self.object_count
    }

    pub fn is_empty(&self) -> bool {
        self.object_count == 0
    }

    /// The number of inserted objects that lie outside of the root cell.
    ///
    /// Such objects are still stored, but traversals can miss them, since pruning assumes that
    /// objects lie within the cell of their node.
    pub fn objects_outside_root(&self) -> usize {
        self.objects_outside_root
    }

    /// Inserts the object at `index`.
    ///
    /// The object is stored in the first node along its path that it is brighter than. Fainter
    /// objects descend into the octant that contains their position, creating it if necessary.
    /// Positions on the center plane of a node go to the positive side.
    ///
    /// Nodes at [`OctreeParams::max_depth`] take any object, which also covers magnitudes like
    /// `NaN` that no limiting magnitude would ever admit.
    pub fn insert(&mut self, index: usize, object: &impl OctreeObject) {
        let position = object.position();
        let magnitude = object.absolute_magnitude();

        if !self.params.root().contains(position) {
            self.objects_outside_root += 1;
        }
        self.object_count += 1;

        let mut id = NodeId::ROOT;
        loop {
            let node = &self.nodes[id.index()];
            if magnitude < node.limiting_magnitude || node.depth >= self.params.max_depth() {
                self.nodes[id.index()].objects.push(index);
                break;
            }

            let corner = node.bounds.corner_of(position);
            let child = node.children[corner];
            id = match child {
                Some(child) => child,
                None => self.push_child(id, corner),
            };
        }
    }

    fn push_child(&mut self, parent_id: NodeId, corner: Corner3) -> NodeId {
        let parent = &self.nodes[parent_id.index()];
        let child = DynamicNode::new(
            parent.bounds.child(corner),
            child_limiting_magnitude(parent.limiting_magnitude),
            parent.depth + 1,
        );

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(child);
        self.nodes[parent_id.index()].children[corner] = Some(child_id);
        child_id
    }

    /// Compacts the octree into a [`StaticOctree`] that takes ownership of `objects`.
    ///
    /// Nodes are laid out depth-first, visiting children in octant order. The objects of each node
    /// are stably sorted by ascending absolute magnitude and moved into a single list in the same
    /// order.
    ///
    /// # Panics
    ///
    /// Panics unless every index of `objects` was inserted exactly once.
    pub fn rebuild_and_sort<T: OctreeObject>(mut self, objects: Vec<T>) -> StaticOctree<T> {
        let mut nodes: Vec<Node> = Vec::with_capacity(self.nodes.len());
        let mut order = Vec::with_capacity(objects.len());

        let mut stack: Vec<(NodeId, Option<(NodeId, Corner3)>)> = vec![(NodeId::ROOT, None)];
        while let Some((id, parent)) = stack.pop() {
            let new_id = NodeId(nodes.len());
            if let Some((parent_id, corner)) = parent {
                nodes[parent_id.index()].children[corner] = Some(new_id);
            }

            let node = &mut self.nodes[id.index()];
            let mut indices = take(&mut node.objects);
            indices.sort_by(|&lhs, &rhs| {
                objects[lhs]
                    .absolute_magnitude()
                    .total_cmp(&objects[rhs].absolute_magnitude())
            });

            let first = order.len();
            order.extend(indices);
            nodes.push(Node {
                bounds: node.bounds,
                limiting_magnitude: node.limiting_magnitude,
                depth: node.depth,
                objects: first..order.len(),
                children: EnumMap::default(),
            });

            let children = node
                .children
                .iter()
                .filter_map(|(corner, &child)| Some((child?, Some((new_id, corner)))))
                .collect::<Vec<_>>();
            stack.extend(children.into_iter().rev());
        }

        debug!(
            "rebuilt octree with {} nodes and {} objects",
            nodes.len(),
            order.len()
        );

        StaticOctree {
            nodes,
            objects: permute(objects, &order),
        }
    }
}

impl<T: OctreeObject> StaticOctree<T> {
    /// Builds a [`StaticOctree`] by inserting all `objects` and rebuilding right away.
    pub fn build(params: OctreeParams, objects: Vec<T>) -> Self {
        let mut octree = DynamicOctree::new(params);
        for (index, object) in objects.iter().enumerate() {
            octree.insert(index, object);
        }
        octree.rebuild_and_sort(objects)
    }
}

/// Reorders `objects` so that the object at `order[i]` ends up at index `i`.
///
/// # Panics
///
/// Panics if `order` is not a permutation of the indices of `objects`.
fn permute<T>(objects: Vec<T>, order: &[usize]) -> Vec<T> {
    assert_eq!(
        order.len(),
        objects.len(),
        "every object should be inserted exactly once"
    );

    let mut rank = vec![None; objects.len()];
    for (new_index, &old_index) in order.iter().enumerate() {
        let slot = rank
            .get_mut(old_index)
            .expect("inserted index should be within objects");
        assert!(
            slot.replace(new_index).is_none(),
            "object {old_index} should not be inserted twice"
        );
    }

    let mut ranked = objects
        .into_iter()
        .zip(rank)
        .map(|(object, rank)| (rank.expect("rank should be assigned"), object))
        .collect::<Vec<_>>();
    ranked.sort_unstable_by_key(|&(rank, _)| rank);
    ranked.into_iter().map(|(_, object)| object).collect()
}

use enum_map::EnumMap;
use glam::DVec3;

use super::{node::StaticOctree, NodeId, OctreeObject};
use crate::{
    astro::{abs_to_app_mag, app_to_abs_mag, apparent_magnitude},
    math::frustum::Frustum,
    math_enums::Corner3,
};

/// Receives the objects found by an octree traversal.
///
/// Implemented for every `FnMut(&T)`, which ignores the distance.
pub trait ObjectHandler<T> {
    /// Called once for every object that matches the query, with its distance to the observer.
    fn process(&mut self, object: &T, distance: f64);
}

impl<T, F: FnMut(&T)> ObjectHandler<T> for F {
    fn process(&mut self, object: &T, _distance: f64) {
        self(object)
    }
}

/// Counters collected during [`StaticOctree::process_visible_objects`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeProcStats {
    /// Nodes that were not culled by the frustum.
    pub nodes: usize,
    /// Objects whose apparent magnitude had to be computed.
    pub objects: usize,
    /// The deepest node depth that was visited.
    pub height: u8,
}

impl<T: OctreeObject> StaticOctree<T> {
    /// Reports all objects that might be visible from `observer` and appear brighter than
    /// `limiting_magnitude`.
    ///
    /// Nodes whose bounding sphere lies outside of the `frustum` are skipped along with their
    /// subtree. Within a node, objects are reported in storage order (brightest first), followed by
    /// the children in octant order.
    ///
    /// Every reported object is brighter than `limiting_magnitude`, and no object within the
    /// `frustum` that is bright enough is ever missed. Objects in nodes that straddle the frustum
    /// may be reported even if they lie outside of it.
    pub fn process_visible_objects(
        &self,
        handler: &mut impl ObjectHandler<T>,
        observer: DVec3,
        frustum: &Frustum,
        limiting_magnitude: f32,
        mut stats: Option<&mut OctreeProcStats>,
    ) {
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if frustum.excludes_sphere(node.bounds.center(), node.bounds.bounding_radius()) {
                continue;
            }

            if let Some(stats) = stats.as_deref_mut() {
                stats.nodes += 1;
                stats.height = stats.height.max(node.depth);
            }

            // nothing in this node is closer than `min_distance`
            let min_distance = node.bounds.min_distance(observer);
            let dimmest = if min_distance > 0.0 {
                app_to_abs_mag(limiting_magnitude, min_distance)
            } else {
                f32::INFINITY
            };

            for object in &self.objects[node.objects.clone()] {
                let abs_mag = object.absolute_magnitude();
                if abs_mag < dimmest {
                    let distance = observer.distance(object.position());
                    if apparent_magnitude(abs_mag, distance) < limiting_magnitude {
                        handler.process(object, distance);
                    }
                    if let Some(stats) = stats.as_deref_mut() {
                        stats.objects += 1;
                    }
                }
            }

            if min_distance <= 0.0
                || abs_to_app_mag(node.limiting_magnitude, min_distance) <= limiting_magnitude
            {
                push_children(&mut stack, &node.children);
            }
        }
    }

    /// Reports all objects within `radius` of `observer`, regardless of their brightness.
    ///
    /// A negative or `NaN` radius reports nothing.
    pub fn process_close_objects(
        &self,
        handler: &mut impl ObjectHandler<T>,
        observer: DVec3,
        radius: f64,
    ) {
        if !(radius >= 0.0) {
            return;
        }
        let radius_squared = radius * radius;

        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if node.bounds.min_distance(observer) > radius {
                continue;
            }

            for object in &self.objects[node.objects.clone()] {
                let distance_squared = observer.distance_squared(object.position());
                if distance_squared <= radius_squared {
                    handler.process(object, distance_squared.sqrt());
                }
            }

            push_children(&mut stack, &node.children);
        }
    }
}

/// Pushes children in reverse, so that they are popped in octant order.
fn push_children(stack: &mut Vec<NodeId>, children: &EnumMap<Corner3, Option<NodeId>>) {
    stack.extend(children.as_slice().iter().rev().flatten());
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, f32::consts::FRAC_PI_3};

    use glam::Quat;
    use itertools::Itertools;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::{
        math::bounds::CellBounds,
        octree::{
            testing::{clustered_objects, uniform_objects, TestObject},
            OctreeParams,
        },
    };

    const EXTENT: f64 = 1.0e4;

    fn build(objects: Vec<TestObject>) -> StaticOctree<TestObject> {
        let root = CellBounds::new(DVec3::ZERO, EXTENT);
        StaticOctree::build(OctreeParams::from_apparent_magnitude(root, 8.0, 48), objects)
    }

    fn dataset(clustered: bool, count: usize) -> Vec<TestObject> {
        if clustered {
            clustered_objects(count as u64, count, EXTENT)
        } else {
            uniform_objects(count as u64, count, EXTENT)
        }
    }

    #[derive(Default)]
    struct Collect {
        ids: Vec<usize>,
        distances: Vec<f64>,
    }

    impl ObjectHandler<TestObject> for Collect {
        fn process(&mut self, object: &TestObject, distance: f64) {
            self.ids.push(object.id);
            self.distances.push(distance);
        }
    }

    #[test]
    fn empty_tree_reports_nothing() {
        let octree = build(Vec::new());
        let mut count = 0;
        let mut stats = OctreeProcStats::default();
        octree.process_visible_objects(
            &mut |_: &TestObject| count += 1,
            DVec3::ZERO,
            &Frustum::UNBOUNDED,
            f32::INFINITY,
            Some(&mut stats),
        );
        octree.process_close_objects(&mut |_: &TestObject| count += 1, DVec3::ZERO, 1.0e9);
        assert_eq!(count, 0);
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.objects, 0);
        assert_eq!(stats.height, 0);
    }

    #[rstest]
    fn unbounded_query_visits_everything_once(
        #[values(false, true)] clustered: bool,
        #[values(0, 1, 1000, 100_000)] count: usize,
    ) {
        let octree = build(dataset(clustered, count));
        let mut handler = Collect::default();
        let mut stats = OctreeProcStats::default();
        octree.process_visible_objects(
            &mut handler,
            DVec3::new(EXTENT * 3.0, 0.0, 0.0),
            &Frustum::UNBOUNDED,
            f32::INFINITY,
            Some(&mut stats),
        );

        handler.ids.sort_unstable();
        assert_eq!(handler.ids, (0..count).collect_vec());
        assert_eq!(stats.nodes, octree.node_count());
        assert_eq!(stats.objects, count);
    }

    #[rstest]
    fn close_query_matches_brute_force(
        #[values(false, true)] clustered: bool,
        #[values(0, 1, 1000, 100_000)] count: usize,
    ) {
        let objects = dataset(clustered, count);
        let octree = build(objects.clone());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let observer = if objects.is_empty() || rng.random_bool(0.5) {
                DVec3::new(
                    rng.random_range(-EXTENT..EXTENT),
                    rng.random_range(-EXTENT..EXTENT),
                    rng.random_range(-EXTENT..EXTENT),
                )
            } else {
                objects[rng.random_range(0..objects.len())].position
            };
            let radius = rng.random_range(0.0..EXTENT / 4.0);

            let mut handler = Collect::default();
            octree.process_close_objects(&mut handler, observer, radius);

            let expected = objects
                .iter()
                .filter(|object| observer.distance_squared(object.position) <= radius * radius)
                .map(|object| object.id)
                .sorted_unstable()
                .collect_vec();
            handler.ids.sort_unstable();
            assert_eq!(handler.ids, expected);
        }
    }

    #[test]
    fn close_query_includes_boundary_and_reports_distance() {
        let objects = vec![
            TestObject::new(0, DVec3::new(3.0, 0.0, 0.0), 5.0),
            TestObject::new(1, DVec3::new(0.0, -4.0, 0.0), -20.0),
            TestObject::new(2, DVec3::new(0.0, 0.0, 4.5), 0.0),
        ];
        let octree = build(objects);

        let mut handler = Collect::default();
        octree.process_close_objects(&mut handler, DVec3::ZERO, 4.0);
        let found = handler
            .ids
            .iter()
            .copied()
            .zip(handler.distances.iter().copied())
            .sorted_by_key(|&(id, _)| id)
            .collect_vec();
        assert_eq!(found, [(0, 3.0), (1, 4.0)]);
    }

    #[test]
    fn negative_radius_reports_nothing() {
        let octree = build(vec![TestObject::new(0, DVec3::ZERO, 0.0)]);
        let mut count = 0;
        octree.process_close_objects(&mut |_: &TestObject| count += 1, DVec3::ZERO, -1.0);
        octree.process_close_objects(&mut |_: &TestObject| count += 1, DVec3::ZERO, f64::NAN);
        assert_eq!(count, 0);
        octree.process_close_objects(&mut |_: &TestObject| count += 1, DVec3::ZERO, 0.0);
        assert_eq!(count, 1);
    }

    #[rstest]
    fn visible_query_has_no_false_negatives(
        #[values(false, true)] clustered: bool,
        #[values(1000, 100_000)] count: usize,
        #[values(6.0, 12.0)] limiting_magnitude: f32,
    ) {
        let objects = dataset(clustered, count);
        let octree = build(objects.clone());
        let observer = DVec3::new(100.0, -200.0, EXTENT / 2.0);
        let orientation = Quat::from_rotation_y(0.4) * Quat::from_rotation_x(-0.3);
        let frustum = Frustum::from_view(observer, orientation, FRAC_PI_3, 1.5);

        let mut handler = Collect::default();
        octree.process_visible_objects(&mut handler, observer, &frustum, limiting_magnitude, None);

        let reported = handler.ids.iter().copied().collect::<HashSet<_>>();
        assert_eq!(reported.len(), handler.ids.len(), "objects reported twice");

        for object in &objects {
            let distance = observer.distance(object.position);
            let visible = apparent_magnitude(object.magnitude, distance) < limiting_magnitude;
            if visible && frustum.contains_point(object.position) {
                assert!(reported.contains(&object.id), "missed {object:?}");
            }
            if reported.contains(&object.id) {
                assert!(visible, "reported faint {object:?}");
            }
        }
    }

    #[test]
    fn visible_query_reports_distance_and_order() {
        let objects = vec![
            TestObject::new(0, DVec3::new(0.0, 0.0, -100.0), -20.0),
            TestObject::new(1, DVec3::new(0.0, 0.0, -200.0), -25.0),
            TestObject::new(2, DVec3::new(0.0, 0.0, 100.0), -25.0),
        ];
        let octree = build(objects);
        let frustum = Frustum::from_view(DVec3::ZERO, Quat::IDENTITY, FRAC_PI_3, 1.0);

        let mut handler = Collect::default();
        octree.process_visible_objects(&mut handler, DVec3::ZERO, &frustum, 6.0, None);
        // all three share the root; brightest first, the one behind is kept by the root
        assert_eq!(handler.ids, [1, 2, 0]);
        assert_eq!(handler.distances, [200.0, 100.0, 100.0]);
    }

    #[test]
    fn faint_limit_skips_subtrees() {
        let objects = uniform_objects(3, 10_000, EXTENT);
        let octree = build(objects);

        let mut bright = OctreeProcStats::default();
        octree.process_visible_objects(
            &mut |_: &TestObject| {},
            DVec3::splat(EXTENT * 10.0),
            &Frustum::UNBOUNDED,
            -5.0,
            Some(&mut bright),
        );
        let mut faint = OctreeProcStats::default();
        octree.process_visible_objects(
            &mut |_: &TestObject| {},
            DVec3::splat(EXTENT * 10.0),
            &Frustum::UNBOUNDED,
            40.0,
            Some(&mut faint),
        );

        assert!(bright.nodes < faint.nodes);
        assert!(bright.height < faint.height);
        assert_eq!(faint.nodes, octree.node_count());
    }
}

use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::OctreeObject;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestObject {
    pub(crate) id: usize,
    pub(crate) position: DVec3,
    pub(crate) magnitude: f32,
}

impl TestObject {
    pub(crate) fn new(id: usize, position: DVec3, magnitude: f32) -> Self {
        Self {
            id,
            position,
            magnitude,
        }
    }
}

impl OctreeObject for TestObject {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn absolute_magnitude(&self) -> f32 {
        self.magnitude
    }
}

fn random_point(rng: &mut StdRng, extent: f64) -> DVec3 {
    DVec3::new(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

fn random_magnitude(rng: &mut StdRng) -> f32 {
    rng.random_range(-15.0..10.0)
}

/// Objects spread uniformly within `[-extent, extent)` on every axis.
pub(crate) fn uniform_objects(seed: u64, count: usize, extent: f64) -> Vec<TestObject> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|id| {
            let position = random_point(&mut rng, extent);
            TestObject::new(id, position, random_magnitude(&mut rng))
        })
        .collect()
}

/// Objects grouped into a few tight clusters within `[-extent, extent)` on every axis.
pub(crate) fn clustered_objects(seed: u64, count: usize, extent: f64) -> Vec<TestObject> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = extent / 100.0;
    let centers = (0..8)
        .map(|_| random_point(&mut rng, extent - spread))
        .collect::<Vec<_>>();
    (0..count)
        .map(|id| {
            let center = centers[rng.random_range(0..centers.len())];
            let position = center + random_point(&mut rng, spread);
            TestObject::new(id, position, random_magnitude(&mut rng))
        })
        .collect()
}

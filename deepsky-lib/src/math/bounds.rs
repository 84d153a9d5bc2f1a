use glam::DVec3;

use crate::math_enums::Corner3;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// The cube covered by a single octree node.
///
/// Stored as a center and half the edge length, since that is what both subdivision and the
/// distance tests need.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellBounds {
    /// The center of the cube.
    center: DVec3,
    /// Half the edge length of the cube.
    half_size: f64,
}

impl CellBounds {
    /// Constructs [`CellBounds`] from the given `center` and `half_size`.
    ///
    /// # Panics
    ///
    /// Panics if `half_size` is negative or `NaN`.
    pub fn new(center: DVec3, half_size: f64) -> Self {
        assert!(half_size >= 0.0, "half size must not be negative");
        Self { center, half_size }
    }

    /// The center of the cube.
    pub const fn center(self) -> DVec3 {
        self.center
    }

    /// Half the edge length of the cube.
    pub const fn half_size(self) -> f64 {
        self.half_size
    }

    /// The full edge length of the cube.
    pub fn size(self) -> f64 {
        self.half_size * 2.0
    }

    /// The radius of the smallest sphere around [`Self::center`] that encloses the cube.
    pub fn bounding_radius(self) -> f64 {
        self.half_size * SQRT_3
    }

    /// The inclusive lower corner.
    pub fn min(self) -> DVec3 {
        self.center - DVec3::splat(self.half_size)
    }

    /// The inclusive upper corner.
    pub fn max(self) -> DVec3 {
        self.center + DVec3::splat(self.half_size)
    }

    /// Whether `point` lies within the cube, including its surface.
    pub fn contains(self, point: DVec3) -> bool {
        let (min, max) = (self.min(), self.max());
        (min.x <= point.x && point.x <= max.x)
            && (min.y <= point.y && point.y <= max.y)
            && (min.z <= point.z && point.z <= max.z)
    }

    /// The child octant that `point` is routed to.
    ///
    /// See [`Corner3::from_point`] for how ties on the center planes are broken.
    pub fn corner_of(self, point: DVec3) -> Corner3 {
        Corner3::from_point(self.center, point)
    }

    /// The bounds of the child octant at the given `corner`.
    ///
    /// The child center is offset by a quarter of the edge length along each axis and its size is
    /// halved.
    pub fn child(self, corner: Corner3) -> Self {
        let half_size = self.half_size * 0.5;
        Self {
            center: self.center + corner.signum() * half_size,
            half_size,
        }
    }

    /// The distance from `point` to the bounding sphere of the cube.
    ///
    /// Negative if the point lies within the bounding sphere. No point of the cube is closer to
    /// `point` than this, which makes it safe for pruning.
    pub fn min_distance(self, point: DVec3) -> f64 {
        point.distance(self.center) - self.bounding_radius()
    }
}

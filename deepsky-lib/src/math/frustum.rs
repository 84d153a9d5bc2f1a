use glam::{DVec3, Quat};

/// A plane splitting space into an inside (positive) and an outside (negative) half-space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Points towards the inside half-space; unit length for any finite plane.
    normal: DVec3,
    /// Signed distance of the origin to the plane.
    offset: f64,
}

impl Plane {
    /// A plane that has everything on its inside.
    pub const EVERYTHING: Self = Self {
        normal: DVec3::Z,
        offset: f64::INFINITY,
    };

    /// Constructs a [`Plane`] from a unit `normal` and the signed distance of the origin.
    pub const fn new(normal: DVec3, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Constructs the [`Plane`] with the given unit `normal` passing through `point`.
    pub fn through_point(normal: DVec3, point: DVec3) -> Self {
        Self {
            normal,
            offset: -normal.dot(point),
        }
    }

    pub const fn normal(self) -> DVec3 {
        self.normal
    }

    pub const fn offset(self) -> f64 {
        self.offset
    }

    /// Positive for points on the inside, negative for points on the outside.
    pub fn signed_distance(self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// Whether the sphere lies entirely in the outside half-space.
    pub fn excludes_sphere(self, center: DVec3, radius: f64) -> bool {
        self.signed_distance(center) < -radius
    }
}

/// An infinite view frustum made up of 5 half-spaces.
///
/// There is no near or far plane. Four planes bound the sides of the view and the fifth one cuts
/// off everything behind the observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    planes: [Plane; Self::PLANE_COUNT],
}

impl Frustum {
    pub const PLANE_COUNT: usize = 5;

    /// A [`Frustum`] that contains all of space.
    pub const UNBOUNDED: Self = Self {
        planes: [Plane::EVERYTHING; Self::PLANE_COUNT],
    };

    pub const fn new(planes: [Plane; Self::PLANE_COUNT]) -> Self {
        Self { planes }
    }

    /// Computes the frustum of an observer at `position`.
    ///
    /// `orientation` rotates world space into camera space and the camera looks down its negative
    /// Z axis. `fov_y` is the vertical field of view in radians and `aspect_ratio` is width over
    /// height.
    pub fn from_view(position: DVec3, orientation: Quat, fov_y: f32, aspect_ratio: f32) -> Self {
        let camera_to_world = orientation.as_dquat().inverse();
        let h = (f64::from(fov_y) / 2.0).tan();
        let w = h * f64::from(aspect_ratio);

        let normals = [
            DVec3::new(0.0, 1.0, -h),
            DVec3::new(0.0, -1.0, -h),
            DVec3::new(1.0, 0.0, -w),
            DVec3::new(-1.0, 0.0, -w),
            DVec3::new(0.0, 0.0, -1.0),
        ];

        Self {
            planes: normals
                .map(|normal| Plane::through_point(camera_to_world * normal.normalize(), position)),
        }
    }

    pub const fn planes(&self) -> &[Plane; Self::PLANE_COUNT] {
        &self.planes
    }

    /// Whether the sphere lies entirely outside of at least one of the half-spaces.
    ///
    /// This is conservative: a sphere straddling the corner of two planes might not be excluded
    /// even though it is not visible.
    pub fn excludes_sphere(&self, center: DVec3, radius: f64) -> bool {
        self.planes
            .iter()
            .any(|plane| plane.excludes_sphere(center, radius))
    }

    /// Whether `point` lies inside all half-spaces.
    pub fn contains_point(&self, point: DVec3) -> bool {
        !self.excludes_sphere(point, 0.0)
    }
}

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use crate::math::{Axis, FreeCoordinate, FreePoint, FreeVector};

/// A ray; a half-infinite line segment with a unit-length direction.
///
/// The direction supplied to [`Ray::new`] is normalized on construction, so
/// the ray parameter `t` measures Euclidean distance from the origin. The
/// reciprocal of each direction component and the first axis on which the
/// direction is non-zero are precomputed, because the traversal's hit kernels
/// convert between points and `t` values many times per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: FreePoint,
    direction: FreeVector,
    inverse_direction: FreeVector,
    nonzero_axis: Axis,
}

impl Ray {
    /// Constructs a [`Ray`] from convertible types (e.g. tuples or 3-element
    /// arrays), normalizing `direction` to unit length.
    ///
    /// `direction` must not be the zero vector.
    ///
    /// ```
    /// use spherical_raycast::euclid::{point3, vec3};
    /// use spherical_raycast::Ray;
    ///
    /// let ray = Ray::new(point3(1.0, 2.0, 3.0), vec3(0.0, 0.0, 10.0));
    /// assert_eq!(ray.point_at(2.0), point3(1.0, 2.0, 5.0));
    /// ```
    pub fn new(origin: impl Into<FreePoint>, direction: impl Into<FreeVector>) -> Self {
        let origin = origin.into();
        let direction: FreeVector = direction.into();
        debug_assert!(
            direction.square_length() > 0.0,
            "ray direction must be non-zero"
        );
        let direction = direction / direction.length();
        let inverse_direction =
            FreeVector::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let nonzero_axis = if direction.x != 0.0 {
            Axis::X
        } else if direction.y != 0.0 {
            Axis::Y
        } else {
            Axis::Z
        };
        Self {
            origin,
            direction,
            inverse_direction,
            nonzero_axis,
        }
    }

    /// The endpoint of the ray.
    #[inline]
    pub fn origin(&self) -> FreePoint {
        self.origin
    }

    /// The unit direction in which the ray extends.
    #[inline]
    pub fn direction(&self) -> FreeVector {
        self.direction
    }

    /// The componentwise reciprocal of [`Self::direction`]. Components
    /// perpendicular to the ray are infinite.
    #[inline]
    pub fn inverse_direction(&self) -> FreeVector {
        self.inverse_direction
    }

    /// The first axis (in x, y, z order) on which the direction is non-zero.
    #[inline]
    pub fn nonzero_direction_axis(&self) -> Axis {
        self.nonzero_axis
    }

    /// The function `p(t) = origin + t · direction`.
    #[inline]
    pub fn point_at(&self, t: FreeCoordinate) -> FreePoint {
        self.origin + self.direction * t
    }

    /// The ray parameter of the point `origin + direction · offset`.
    ///
    /// The hit kernels derive candidate intersections as offsets `v ± d` along
    /// the direction vector; this converts such an offset back to `t` with a
    /// single axis rather than full vector arithmetic:
    /// `t = (p(offset).a − origin.a) / direction.a` for the first non-zero
    /// direction axis `a`, which avoids dividing by a zero component.
    #[inline]
    pub fn time_at(&self, offset: FreeCoordinate) -> FreeCoordinate {
        let i = self.nonzero_axis.index();
        self.direction.to_array()[i] * offset * self.inverse_direction.to_array()[i]
    }

    /// The ray parameter at which the ray's carrier line passes through `p`.
    ///
    /// Meaningful only for points on (or projected onto) the line.
    #[inline]
    pub fn time_at_point(&self, p: FreePoint) -> FreeCoordinate {
        let i = self.nonzero_axis.index();
        (p.to_array()[i] - self.origin.to_array()[i]) * self.inverse_direction.to_array()[i]
    }
}

/// The portion of a ray between the traversal's current time `t` and its
/// termination bound `max_t`, cached as endpoints for the 2-D segment-segment
/// intersection tests of the angular hit kernels.
///
/// The far endpoint is fixed for the whole walk; [`RaySegment::update_at`]
/// moves the near endpoint forward each iteration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RaySegment {
    /// The fixed far endpoint, at the traversal's `max_t`.
    p2: FreePoint,
    nonzero_axis: Axis,
    /// The near endpoint, at the traversal's current `t`.
    p1: FreePoint,
    /// `p2 - p1`.
    vector: FreeVector,
}

impl RaySegment {
    pub fn new(max_t: FreeCoordinate, ray: &Ray) -> Self {
        let p2 = ray.point_at(max_t);
        let p1 = ray.origin();
        Self {
            p2,
            nonzero_axis: ray.nonzero_direction_axis(),
            p1,
            vector: p2 - p1,
        }
    }

    /// Moves the near endpoint to time `t` and recomputes the segment vector.
    pub fn update_at(&mut self, t: FreeCoordinate, ray: &Ray) {
        self.p1 = ray.point_at(t);
        self.vector = self.p2 - self.p1;
    }

    /// Converts an intersection parameter in `[0, 1]` along this segment back
    /// to a ray parameter.
    pub fn intersection_time_at(&self, intersect_parameter: FreeCoordinate, ray: &Ray) -> FreeCoordinate {
        let i = self.nonzero_axis.index();
        (self.p1.to_array()[i] + self.vector.to_array()[i] * intersect_parameter
            - ray.origin().to_array()[i])
            * ray.inverse_direction().to_array()[i]
    }

    pub fn p1(&self) -> FreePoint {
        self.p1
    }

    pub fn vector(&self) -> FreeVector {
        self.vector
    }
}

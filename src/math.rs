//! Numeric types used for coordinates, and the tolerant floating-point
//! comparisons the traversal relies on.

use euclid::{Point3D, Vector3D};

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

/// Coordinate unit of the Euclidean space the voxel grid is embedded in.
///
/// This is a [`euclid`] unit type; it has no values of its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum World {}

/// Scalar type for all continuous coordinates and ray parameters.
pub type FreeCoordinate = f64;

/// Positions in the grid's Euclidean space.
pub type FreePoint = Point3D<FreeCoordinate, World>;

/// Vectors in the grid's Euclidean space.
pub type FreeVector = Vector3D<FreeCoordinate, World>;

/// Enumeration of the axes of three-dimensional space.
///
/// Can be used to infallibly index 3-component arrays obtained from points and
/// vectors via `to_array()`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in the standard order, [X, Y, Z].
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Convert the axis to a number for indexing 3-element arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Absolute epsilon for [`is_equal`]. Catches comparisons near zero, where the
/// relative test degenerates.
const ABS_EPSILON: FreeCoordinate = 1e-12;

/// Relative epsilon for [`is_equal`], scaled by the larger operand.
const REL_EPSILON: FreeCoordinate = 1e-8;

/// Tolerant equality of two floats, using a combined absolute and relative
/// epsilon.
///
/// This is the comparison of Knuth, *The Art of Computer Programming* vol. 2,
/// §4.2.2 Eq. 36–37: values within [`ABS_EPSILON`] of each other are equal
/// outright; otherwise they are equal if their difference is within
/// [`REL_EPSILON`] of the larger magnitude.
///
/// Note that this relation is not transitive; the traversal's tie resolver is
/// ordered with that in mind.
#[inline]
#[must_use]
pub fn is_equal(a: FreeCoordinate, b: FreeCoordinate) -> bool {
    let diff = (a - b).abs();
    if diff <= ABS_EPSILON {
        true
    } else {
        diff <= a.abs().max(b.abs()) * REL_EPSILON
    }
}

/// Tolerant strict ordering: `a` is less than `b` and not [`is_equal`] to it.
#[inline]
#[must_use]
pub fn less_than(a: FreeCoordinate, b: FreeCoordinate) -> bool {
    a < b && !is_equal(a, b)
}

/// Componentwise [`is_equal`] on two vectors.
#[inline]
#[must_use]
pub fn vectors_equal(a: FreeVector, b: FreeVector) -> bool {
    let diff_x = (a.x - b.x).abs();
    let diff_y = (a.y - b.y).abs();
    let diff_z = (a.z - b.z).abs();
    if diff_x <= ABS_EPSILON && diff_y <= ABS_EPSILON && diff_z <= ABS_EPSILON {
        return true;
    }
    diff_x <= a.x.abs().max(b.x.abs()) * REL_EPSILON
        && diff_y <= a.y.abs().max(b.y.abs()) * REL_EPSILON
        && diff_z <= a.z.abs().max(b.z.abs()) * REL_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::vec3;

    #[test]
    fn equality_near_zero_is_absolute() {
        assert!(is_equal(0.0, 1e-13));
        assert!(is_equal(-5e-13, 5e-13));
        assert!(!is_equal(0.0, 1e-11));
    }

    #[test]
    fn equality_at_magnitude_is_relative() {
        assert!(is_equal(1e6, 1e6 + 1e-3));
        assert!(!is_equal(1e6, 1e6 + 100.0));
        assert!(!is_equal(1.0, 1.0 + 1e-7));
    }

    #[test]
    fn less_than_excludes_near_equality() {
        assert!(less_than(1.0, 2.0));
        assert!(!less_than(2.0, 1.0));
        assert!(!less_than(1.0, 1.0 + 1e-13));
    }

    #[test]
    fn vector_equality_is_componentwise() {
        let a = vec3(1.0, 2.0, 3.0);
        assert!(vectors_equal(a, vec3(1.0 + 1e-13, 2.0, 3.0 - 1e-13)));
        assert!(!vectors_equal(a, vec3(1.0, 2.0, 3.1)));
    }
}

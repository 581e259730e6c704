use alloc::boxed::Box;

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use crate::math::{FreeCoordinate, FreePoint, FreeVector};

/// A boundary of the sphere in spherical coordinates: a radius, a polar angle,
/// and an azimuthal angle.
///
/// A grid is delimited by a minimum and a maximum `SphereBound`; the grid's
/// section sizes are `(max − min) / count` per coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereBound {
    /// Radius, in the same length unit as the grid's Euclidean space.
    pub radial: FreeCoordinate,
    /// Polar angle in radians, measured in the XY plane counterclockwise from +X.
    pub polar: FreeCoordinate,
    /// Azimuthal angle in radians, measured in the XZ plane counterclockwise from +X.
    pub azimuthal: FreeCoordinate,
}

/// One endpoint of an angular voxel boundary, as a coordinate pair in the
/// boundary's 2-D plane (XY for polar boundaries, XZ for azimuthal ones).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    /// First in-plane coordinate (always x).
    pub p1: FreeCoordinate,
    /// Second in-plane coordinate (y for polar boundaries, z for azimuthal).
    pub p2: FreeCoordinate,
}

/// The cosine and sine of one angular boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrigonometricValues {
    #[allow(missing_docs)]
    pub cosine: FreeCoordinate,
    #[allow(missing_docs)]
    pub sine: FreeCoordinate,
}

/// The delta radii squared. These are used for radial hit calculations in the
/// traversal. The table has `num_radial_sections + 1` entries; entry 0 is the
/// outermost (largest) squared radius and each following entry shrinks by
/// `delta_radius` before squaring.
///
/// For example, given `num_radial_sections = 3`, `max_radius = 6`,
/// `delta_radius = 2`, the table is `{ 36, 16, 4, 0 }`.
fn delta_radii_squared_table(
    num_radial_sections: usize,
    max_radius: FreeCoordinate,
    delta_radius: FreeCoordinate,
) -> Box<[FreeCoordinate]> {
    let mut current_radius = max_radius;
    (0..=num_radial_sections)
        .map(|_| {
            let old_radius = current_radius;
            current_radius -= delta_radius;
            old_radius * old_radius
        })
        .collect()
}

/// Trigonometric values of the `num_sections + 1` boundary angles starting at
/// `min_bound` and spaced `delta` apart.
fn trigonometric_table(
    num_sections: usize,
    min_bound: FreeCoordinate,
    delta: FreeCoordinate,
) -> Box<[TrigonometricValues]> {
    let mut radians = min_bound;
    (0..=num_sections)
        .map(|_| {
            let tv = TrigonometricValues {
                cosine: radians.cos(),
                sine: radians.sin(),
            };
            radians += delta;
            tv
        })
        .collect()
}

/// The in-plane points where each angular boundary meets the sphere of
/// `max_radius`, offset by the sphere center's in-plane coordinates:
/// `p1 = max_radius · cos + center_1`, `p2 = max_radius · sin + center_2`.
fn max_radius_line_segments(
    trig_values: &[TrigonometricValues],
    max_radius: FreeCoordinate,
    center_1: FreeCoordinate,
    center_2: FreeCoordinate,
) -> Box<[LineSegment]> {
    trig_values
        .iter()
        .map(|tv| LineSegment {
            p1: max_radius * tv.cosine + center_1,
            p2: max_radius * tv.sine + center_2,
        })
        .collect()
}

/// In-plane vectors from each boundary's max-radius endpoint back to the
/// sphere center; the boundary segment for intersection testing runs from the
/// endpoint along this vector to the center.
fn center_to_bound_vectors(
    segments: &[LineSegment],
    center_1: FreeCoordinate,
    center_2: FreeCoordinate,
    polar: bool,
) -> Box<[FreeVector]> {
    segments
        .iter()
        .map(|s| {
            if polar {
                FreeVector::new(center_1 - s.p1, center_2 - s.p2, 0.0)
            } else {
                FreeVector::new(center_1 - s.p1, 0.0, center_2 - s.p2)
            }
        })
        .collect()
}

/// A spherical voxel grid: a ball partitioned by `num_radial_sections`
/// concentric spheres, `num_polar_sections` half-planes through the polar axis
/// and `num_azimuthal_sections` half-planes through the azimuthal axis.
///
/// The bounds of the grid are given by a minimum and maximum [`SphereBound`];
/// each family's section size is `(max − min) / count`. The tables a ray
/// traversal consults on every step — squared shell radii, boundary
/// trigonometric values, boundary endpoints at maximum radius, and
/// center-to-boundary vectors — are computed once here, so the grid can be
/// built once and shared (it is immutable and [`Sync`]) across any number of
/// [`walk()`](crate::walk) calls.
#[derive(Clone, Debug)]
pub struct SphericalVoxelGrid {
    num_radial_sections: usize,
    num_polar_sections: usize,
    num_azimuthal_sections: usize,
    sphere_center: FreePoint,
    sphere_max_bound_polar: FreeCoordinate,
    sphere_min_bound_polar: FreeCoordinate,
    sphere_max_bound_azimuthal: FreeCoordinate,
    sphere_min_bound_azimuthal: FreeCoordinate,
    sphere_max_radius: FreeCoordinate,
    sphere_max_diameter: FreeCoordinate,
    delta_radius: FreeCoordinate,
    delta_theta: FreeCoordinate,
    delta_phi: FreeCoordinate,
    delta_radii_squared: Box<[FreeCoordinate]>,
    polar_trig_values: Box<[TrigonometricValues]>,
    azimuthal_trig_values: Box<[TrigonometricValues]>,
    p_max_polar: Box<[LineSegment]>,
    p_max_azimuthal: Box<[LineSegment]>,
    center_to_polar_bound: Box<[FreeVector]>,
    center_to_azimuthal_bound: Box<[FreeVector]>,
}

impl SphericalVoxelGrid {
    /// Precomputes a grid from its bounds, section counts, and center.
    ///
    /// All three section counts must be at least 1.
    pub fn new(
        min_bound: SphereBound,
        max_bound: SphereBound,
        num_radial_sections: usize,
        num_polar_sections: usize,
        num_azimuthal_sections: usize,
        sphere_center: FreePoint,
    ) -> Self {
        debug_assert!(
            num_radial_sections > 0 && num_polar_sections > 0 && num_azimuthal_sections > 0,
            "section counts must be at least 1"
        );
        let sphere_max_radius = max_bound.radial;
        let delta_radius = (max_bound.radial - min_bound.radial) / num_radial_sections as FreeCoordinate;
        let delta_theta = (max_bound.polar - min_bound.polar) / num_polar_sections as FreeCoordinate;
        let delta_phi =
            (max_bound.azimuthal - min_bound.azimuthal) / num_azimuthal_sections as FreeCoordinate;
        let delta_radii_squared = delta_radii_squared_table(
            num_radial_sections,
            max_bound.radial - min_bound.radial,
            delta_radius,
        );
        let polar_trig_values = trigonometric_table(num_polar_sections, min_bound.polar, delta_theta);
        let azimuthal_trig_values =
            trigonometric_table(num_azimuthal_sections, min_bound.azimuthal, delta_phi);
        let p_max_polar = max_radius_line_segments(
            &polar_trig_values,
            sphere_max_radius,
            sphere_center.x,
            sphere_center.y,
        );
        let p_max_azimuthal = max_radius_line_segments(
            &azimuthal_trig_values,
            sphere_max_radius,
            sphere_center.x,
            sphere_center.z,
        );
        let center_to_polar_bound =
            center_to_bound_vectors(&p_max_polar, sphere_center.x, sphere_center.y, true);
        let center_to_azimuthal_bound =
            center_to_bound_vectors(&p_max_azimuthal, sphere_center.x, sphere_center.z, false);
        Self {
            num_radial_sections,
            num_polar_sections,
            num_azimuthal_sections,
            sphere_center,
            sphere_max_bound_polar: max_bound.polar,
            sphere_min_bound_polar: min_bound.polar,
            sphere_max_bound_azimuthal: max_bound.azimuthal,
            sphere_min_bound_azimuthal: min_bound.azimuthal,
            sphere_max_radius,
            sphere_max_diameter: sphere_max_radius * 2.0,
            delta_radius,
            delta_theta,
            delta_phi,
            delta_radii_squared,
            polar_trig_values,
            azimuthal_trig_values,
            p_max_polar,
            p_max_azimuthal,
            center_to_polar_bound,
            center_to_azimuthal_bound,
        }
    }

    /// The number of radial sections, `N_r`.
    #[inline]
    pub fn num_radial_sections(&self) -> usize {
        self.num_radial_sections
    }

    /// The number of polar sections, `N_θ`.
    #[inline]
    pub fn num_polar_sections(&self) -> usize {
        self.num_polar_sections
    }

    /// The number of azimuthal sections, `N_φ`.
    #[inline]
    pub fn num_azimuthal_sections(&self) -> usize {
        self.num_azimuthal_sections
    }

    /// The maximum polar bound of the grid, in radians.
    #[inline]
    pub fn sphere_max_bound_polar(&self) -> FreeCoordinate {
        self.sphere_max_bound_polar
    }

    /// The minimum polar bound of the grid, in radians.
    #[inline]
    pub fn sphere_min_bound_polar(&self) -> FreeCoordinate {
        self.sphere_min_bound_polar
    }

    /// The maximum azimuthal bound of the grid, in radians.
    #[inline]
    pub fn sphere_max_bound_azimuthal(&self) -> FreeCoordinate {
        self.sphere_max_bound_azimuthal
    }

    /// The minimum azimuthal bound of the grid, in radians.
    #[inline]
    pub fn sphere_min_bound_azimuthal(&self) -> FreeCoordinate {
        self.sphere_min_bound_azimuthal
    }

    /// The radius of the outermost sphere.
    #[inline]
    pub fn sphere_max_radius(&self) -> FreeCoordinate {
        self.sphere_max_radius
    }

    /// Twice [`Self::sphere_max_radius`]; the scale of the traversal's
    /// unitized time bound.
    #[inline]
    pub fn sphere_max_diameter(&self) -> FreeCoordinate {
        self.sphere_max_diameter
    }

    /// The center of the sphere.
    #[inline]
    pub fn sphere_center(&self) -> FreePoint {
        self.sphere_center
    }

    /// The radial section size.
    #[inline]
    pub fn delta_radius(&self) -> FreeCoordinate {
        self.delta_radius
    }

    /// The polar section size, in radians.
    #[inline]
    pub fn delta_theta(&self) -> FreeCoordinate {
        self.delta_theta
    }

    /// The azimuthal section size, in radians.
    #[inline]
    pub fn delta_phi(&self) -> FreeCoordinate {
        self.delta_phi
    }

    /// The squared radius of shell boundary `i`, for `i ∈ [0, N_r]`.
    /// Index 0 is the outermost boundary; indices increase inward.
    #[inline]
    pub fn delta_radii_squared(&self, i: usize) -> FreeCoordinate {
        self.delta_radii_squared[i]
    }

    /// The max-radius endpoint of polar boundary `i`, for `i ∈ [0, N_θ]`,
    /// as an (x, y) pair.
    #[inline]
    pub fn p_max_polar(&self, i: usize) -> LineSegment {
        self.p_max_polar[i]
    }

    /// All polar boundary endpoints at maximum radius.
    #[inline]
    pub fn p_max_polar_all(&self) -> &[LineSegment] {
        &self.p_max_polar
    }

    /// The in-plane vector from polar boundary `i`'s max-radius endpoint to
    /// the sphere center.
    #[inline]
    pub fn center_to_polar_bound(&self, i: usize) -> FreeVector {
        self.center_to_polar_bound[i]
    }

    /// The max-radius endpoint of azimuthal boundary `i`, for `i ∈ [0, N_φ]`,
    /// as an (x, z) pair.
    #[inline]
    pub fn p_max_azimuthal(&self, i: usize) -> LineSegment {
        self.p_max_azimuthal[i]
    }

    /// All azimuthal boundary endpoints at maximum radius.
    #[inline]
    pub fn p_max_azimuthal_all(&self) -> &[LineSegment] {
        &self.p_max_azimuthal
    }

    /// The in-plane vector from azimuthal boundary `i`'s max-radius endpoint
    /// to the sphere center.
    #[inline]
    pub fn center_to_azimuthal_bound(&self, i: usize) -> FreeVector {
        self.center_to_azimuthal_bound[i]
    }

    /// Cosine and sine of each polar boundary angle.
    #[inline]
    pub fn polar_trig_values(&self) -> &[TrigonometricValues] {
        &self.polar_trig_values
    }

    /// Cosine and sine of each azimuthal boundary angle.
    #[inline]
    pub fn azimuthal_trig_values(&self) -> &[TrigonometricValues] {
        &self.azimuthal_trig_values
    }
}

//! Per-family boundary hit kernels and the tie resolver that arbitrates
//! between them.

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use crate::math::{is_equal, less_than, FreeCoordinate};
use crate::raycast::grid::{LineSegment, SphericalVoxelGrid};
use crate::raycast::ray::{Ray, RaySegment};

/// Sentinel time meaning "no boundary of this family is hit in `(t, max_t)`".
///
/// Chosen so the tie resolver's plain `<` comparisons treat a missing hit as
/// later than any real one.
pub(super) const NO_HIT: FreeCoordinate = FreeCoordinate::MAX;

/// The outcome of one hit kernel: the time of the next boundary crossing for
/// that family, and the signed voxel increment to apply when crossing it.
///
/// `t_step` is ±1 for ordinary crossings, 0 for a tangential touch, and may be
/// a larger magnitude when an angular crossing passes through a boundary
/// vertex and spans several sections at once.
#[derive(Clone, Copy, Debug)]
pub(super) struct HitParameters {
    pub t_max: FreeCoordinate,
    pub t_step: i64,
}

impl HitParameters {
    const NONE: Self = Self {
        t_max: NO_HIT,
        t_step: 0,
    };
}

/// The voxel family (or families, on a tie) whose boundary the ray crosses
/// next.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum VoxelIntersection {
    Radial,
    Polar,
    Azimuthal,
    RadialPolar,
    RadialAzimuthal,
    PolarAzimuthal,
    RadialPolarAzimuthal,
}

/// Non-negative remainder of `x` modulo `sections`, for wrapping angular voxel
/// indices after a signed step.
#[inline]
pub(super) fn wrap_angular(x: i64, sections: usize) -> usize {
    x.rem_euclid(sections as i64) as usize
}

/// Locates the angular voxel containing the in-plane point `(p1, p2)`.
///
/// A point lies between two angular boundaries iff the angle it subtends with
/// the two boundary endpoints on the max-radius circle is obtuse (equality
/// meaning the point lies on a boundary), so each candidate section is tested
/// by comparing the summed squared endpoint distances against the squared
/// distance between the endpoints. Returns `boundaries.len() + 1` when the
/// point lies in none of the sections, which callers treat as out of range.
pub(super) fn angular_voxel_id_from_points(
    boundaries: &[LineSegment],
    p1: FreeCoordinate,
    p2: FreeCoordinate,
) -> usize {
    for (i, pair) in boundaries.windows(2).enumerate() {
        let (near, far) = (pair[0], pair[1]);
        let x_diff = near.p1 - far.p1;
        let y_diff = near.p2 - far.p2;
        let x_p1_diff = near.p1 - p1;
        let x_p2_diff = near.p2 - p2;
        let y_p1_diff = far.p1 - p1;
        let y_p2_diff = far.p2 - p2;
        let d1d2 = (x_p1_diff * x_p1_diff)
            + (x_p2_diff * x_p2_diff)
            + (y_p1_diff * y_p1_diff)
            + (y_p2_diff * y_p2_diff);
        let d3 = (x_diff * x_diff) + (y_diff * y_diff);
        if d1d2 < d3 || is_equal(d1d2, d3) {
            return i;
        }
    }
    boundaries.len() + 1
}

/// Initializes an angular voxel ID for one family. `ray_sphere_2` is the
/// second in-plane component of the center-to-ray vector (y for the polar
/// family, z for the azimuthal family) and `grid_sphere_2` the matching
/// component of the sphere center.
///
/// The ID is 0 when the family has a single section or the in-plane
/// center-to-ray distance is zero; otherwise the center-to-ray vector is
/// projected out to the circle of `entry_radius` and the resulting point
/// classified against `boundaries`.
#[allow(clippy::too_many_arguments)]
pub(super) fn initialize_angular_voxel_id(
    grid: &SphericalVoxelGrid,
    number_of_sections: usize,
    ray_sphere_1: FreeCoordinate,
    ray_sphere_2: FreeCoordinate,
    boundaries: &[LineSegment],
    grid_sphere_2: FreeCoordinate,
    entry_radius: FreeCoordinate,
) -> usize {
    if number_of_sections == 1 {
        return 0;
    }
    let squared_distance = ray_sphere_1 * ray_sphere_1 + ray_sphere_2 * ray_sphere_2;
    if squared_distance == 0.0 {
        return 0;
    }
    let r = entry_radius / squared_distance.sqrt();
    let p1 = grid.sphere_center().x - ray_sphere_1 * r;
    let p2 = grid_sphere_2 - ray_sphere_2 * r;
    angular_voxel_id_from_points(boundaries, p1, p2)
}

/// Returns whether a polar step of `step` sections from `polar_voxel` remains
/// within the grid's polar bounds. Only meaningful when the grid's polar
/// extent is a strict subset of the full circle.
pub(super) fn in_bounds_polar(grid: &SphericalVoxelGrid, step: i64, polar_voxel: usize) -> bool {
    let radian = (polar_voxel + 1) as FreeCoordinate * grid.delta_theta();
    let angle = radian - (step as FreeCoordinate * grid.delta_theta()).abs();
    angle <= grid.sphere_max_bound_polar() && angle >= grid.sphere_min_bound_polar()
}

/// Azimuthal counterpart of [`in_bounds_polar`].
pub(super) fn in_bounds_azimuthal(
    grid: &SphericalVoxelGrid,
    step: i64,
    azimuthal_voxel: usize,
) -> bool {
    let radian = (azimuthal_voxel + 1) as FreeCoordinate * grid.delta_phi();
    let angle = radian - (step as FreeCoordinate * grid.delta_phi()).abs();
    angle <= grid.sphere_max_bound_azimuthal() && angle >= grid.sphere_min_bound_azimuthal()
}

/// Determines the next radial boundary crossing.
///
/// Line-sphere intersection follows Heckbert (ed.), *Graphics Gems IV*: for a
/// shell of squared radius `R²`, the crossings sit at offsets `v ± d` along
/// the direction, `d = √(R² − rsvd_minus_v_squared)`, where `v` is the
/// center-to-origin vector projected on the direction and
/// `rsvd_minus_v_squared` the squared distance of closest approach.
///
/// Radial voxel numbers run `1..N..1` over a full pass through the sphere, so
/// the stepping sign flips exactly once, at the shell nearest the closest
/// approach; `radial_step_has_transitioned` is the one-way latch recording
/// that flip. A tangential touch (both crossings coincide) sets the latch and
/// steps nowhere.
#[allow(clippy::too_many_arguments)]
pub(super) fn radial_hit(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    radial_step_has_transitioned: &mut bool,
    current_radial_voxel: usize,
    v: FreeCoordinate,
    rsvd_minus_v_squared: FreeCoordinate,
    t: FreeCoordinate,
    max_t: FreeCoordinate,
) -> HitParameters {
    if *radial_step_has_transitioned {
        // Moving outward: the only crossing ahead is the far side of the
        // current voxel's outer shell.
        let d_b = (grid.delta_radii_squared(current_radial_voxel - 1) - rsvd_minus_v_squared).sqrt();
        let intersection_t = ray.time_at(v + d_b);
        if intersection_t < max_t {
            return HitParameters {
                t_max: intersection_t,
                t_step: -1,
            };
        }
    } else {
        // Moving inward: consider the shell just inside the current voxel,
        // falling back to the current voxel's outer shell when the ray's
        // closest approach cannot reach the inner one.
        let previous_idx = current_radial_voxel.min(grid.num_radial_sections() - 1);
        let r_a = grid.delta_radii_squared(
            previous_idx - usize::from(grid.delta_radii_squared(previous_idx) < rsvd_minus_v_squared),
        );
        let d_a = (r_a - rsvd_minus_v_squared).sqrt();
        let t_entrance = ray.time_at(v - d_a);
        let t_exit = ray.time_at(v + d_a);

        let t_entrance_gt_t = t_entrance > t;
        if t_entrance_gt_t && t_entrance == t_exit {
            // Tangential hit.
            *radial_step_has_transitioned = true;
            return HitParameters {
                t_max: t_entrance,
                t_step: 0,
            };
        }
        if t_entrance_gt_t && t_entrance < max_t {
            return HitParameters {
                t_max: t_entrance,
                t_step: 1,
            };
        }
        if t_exit < max_t {
            // The entrance is behind us, so the next crossing is the far side
            // of the current shell and the stepping direction reverses here.
            *radial_step_has_transitioned = true;
            return HitParameters {
                t_max: t_exit,
                t_step: -1,
            };
        }
    }
    // There is no intersection time X with t < X < max_t.
    HitParameters::NONE
}

/// The shared tail of the polar and azimuthal hit kernels. The two differ only
/// in which 2-D plane they live in, so the callers project onto that plane and
/// hand over the six perp-product determinants of the segment-segment
/// intersection test (`perp(a, b) = a.1 · b.2 − a.2 · b.1` over the in-plane
/// components).
///
/// Segment-segment intersection follows the 2-D method of [Foley et al, 1996]
/// and [O'Rourke, 1998]; see
/// <http://geomalgorithms.com/a05-_intersect-1.html#intersect2D_2Segments()>.
#[allow(clippy::too_many_arguments)]
fn angular_hit(
    grid: &SphericalVoxelGrid,
    ray: &Ray,
    perp_uv_min: FreeCoordinate,
    perp_uv_max: FreeCoordinate,
    perp_uw_min: FreeCoordinate,
    perp_uw_max: FreeCoordinate,
    perp_vw_min: FreeCoordinate,
    perp_vw_max: FreeCoordinate,
    ray_segment: &RaySegment,
    collinear_times: &[FreeCoordinate; 2],
    t: FreeCoordinate,
    max_t: FreeCoordinate,
    ray_direction_2: FreeCoordinate,
    sphere_center_2: FreeCoordinate,
    p_max: &[LineSegment],
    current_voxel: usize,
) -> HitParameters {
    let is_parallel_min = is_equal(perp_uv_min, 0.0);
    let is_collinear_min =
        is_parallel_min && is_equal(perp_uw_min, 0.0) && is_equal(perp_vw_min, 0.0);
    let is_parallel_max = is_equal(perp_uv_max, 0.0);
    let is_collinear_max =
        is_parallel_max && is_equal(perp_uw_max, 0.0) && is_equal(perp_vw_max, 0.0);

    let mut t_min = collinear_times[usize::from(is_collinear_min)];
    let mut is_intersect_min = false;
    if !is_parallel_min {
        let inv_perp_uv_min = 1.0 / perp_uv_min;
        let a = perp_vw_min * inv_perp_uv_min;
        let b = perp_uw_min * inv_perp_uv_min;
        if !(less_than(a, 0.0) || less_than(1.0, a) || less_than(b, 0.0) || less_than(1.0, b)) {
            is_intersect_min = true;
            t_min = ray_segment.intersection_time_at(b, ray);
        }
    }
    let mut t_max = collinear_times[usize::from(is_collinear_max)];
    let mut is_intersect_max = false;
    if !is_parallel_max {
        let inv_perp_uv_max = 1.0 / perp_uv_max;
        let a = perp_vw_max * inv_perp_uv_max;
        let b = perp_uw_max * inv_perp_uv_max;
        if !(less_than(a, 0.0) || less_than(1.0, a) || less_than(b, 0.0) || less_than(1.0, b)) {
            is_intersect_max = true;
            t_max = ray_segment.intersection_time_at(b, ray);
        }
    }

    let t_t_max_eq = is_equal(t, t_max);
    let t_max_within_bounds = t < t_max && !t_t_max_eq && t_max < max_t;
    let t_t_min_eq = is_equal(t, t_min);
    let t_min_within_bounds = t < t_min && !t_t_min_eq && t_min < max_t;
    if !t_max_within_bounds && !t_min_within_bounds {
        return HitParameters::NONE;
    }
    if is_intersect_max && !is_intersect_min && !is_collinear_min && t_max_within_bounds {
        return HitParameters {
            t_max,
            t_step: 1,
        };
    }
    if is_intersect_min && !is_intersect_max && !is_collinear_max && t_min_within_bounds {
        return HitParameters {
            t_max: t_min,
            t_step: -1,
        };
    }
    if (is_intersect_min && is_intersect_max)
        || (is_intersect_min && is_collinear_max)
        || (is_intersect_max && is_collinear_min)
    {
        let min_max_eq = is_equal(t_min, t_max);
        if min_max_eq && t_min_within_bounds {
            // The ray leaves through both boundaries at once, i.e. through a
            // boundary vertex, so the step may span several sections. Nudge
            // the direction by a fixed scalar (smaller than any section, but
            // far from vanishing), project the nudged direction out to the
            // max-radius circle, and look up which voxel that lands in.
            let perturbed_t = 0.1;
            let a = -ray.direction().x * perturbed_t;
            let b = -ray_direction_2 * perturbed_t;
            let max_radius_over_plane_length = grid.sphere_max_radius() / (a * a + b * b).sqrt();
            let p1 = grid.sphere_center().x - max_radius_over_plane_length * a;
            let p2 = sphere_center_2 - max_radius_over_plane_length * b;
            let next_step =
                (current_voxel as i64 - angular_voxel_id_from_points(p_max, p1, p2) as i64).abs();
            return HitParameters {
                t_max,
                t_step: if ray.direction().x < 0.0 || ray_direction_2 < 0.0 {
                    next_step
                } else {
                    -next_step
                },
            };
        }
        if t_min_within_bounds && ((t_min < t_max && !min_max_eq) || t_t_max_eq) {
            return HitParameters {
                t_max: t_min,
                t_step: -1,
            };
        }
        if t_max_within_bounds && ((t_max < t_min && !min_max_eq) || t_t_min_eq) {
            return HitParameters {
                t_max,
                t_step: 1,
            };
        }
    }
    HitParameters::NONE
}

/// Determines the next polar boundary crossing. Polar boundaries live in the
/// XY plane; the boundary segments run from their max-radius endpoints to the
/// sphere center.
pub(super) fn polar_hit(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    ray_segment: &RaySegment,
    collinear_times: &[FreeCoordinate; 2],
    current_polar_voxel: usize,
    t: FreeCoordinate,
    max_t: FreeCoordinate,
) -> HitParameters {
    let p_one = grid.p_max_polar(current_polar_voxel);
    let p_two = grid.p_max_polar(current_polar_voxel + 1);
    let u_min = grid.center_to_polar_bound(current_polar_voxel);
    let u_max = grid.center_to_polar_bound(current_polar_voxel + 1);
    let seg = ray_segment.vector();
    let w_min_x = p_one.p1 - ray_segment.p1().x;
    let w_min_y = p_one.p2 - ray_segment.p1().y;
    let w_max_x = p_two.p1 - ray_segment.p1().x;
    let w_max_y = p_two.p2 - ray_segment.p1().y;
    let perp_uv_min = u_min.x * seg.y - u_min.y * seg.x;
    let perp_uv_max = u_max.x * seg.y - u_max.y * seg.x;
    let perp_uw_min = u_min.x * w_min_y - u_min.y * w_min_x;
    let perp_uw_max = u_max.x * w_max_y - u_max.y * w_max_x;
    let perp_vw_min = seg.x * w_min_y - seg.y * w_min_x;
    let perp_vw_max = seg.x * w_max_y - seg.y * w_max_x;
    angular_hit(
        grid,
        ray,
        perp_uv_min,
        perp_uv_max,
        perp_uw_min,
        perp_uw_max,
        perp_vw_min,
        perp_vw_max,
        ray_segment,
        collinear_times,
        t,
        max_t,
        ray.direction().y,
        grid.sphere_center().y,
        grid.p_max_polar_all(),
        current_polar_voxel,
    )
}

/// Determines the next azimuthal boundary crossing. Azimuthal boundaries live
/// in the XZ plane.
pub(super) fn azimuthal_hit(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    ray_segment: &RaySegment,
    collinear_times: &[FreeCoordinate; 2],
    current_azimuthal_voxel: usize,
    t: FreeCoordinate,
    max_t: FreeCoordinate,
) -> HitParameters {
    let p_one = grid.p_max_azimuthal(current_azimuthal_voxel);
    let p_two = grid.p_max_azimuthal(current_azimuthal_voxel + 1);
    let u_min = grid.center_to_azimuthal_bound(current_azimuthal_voxel);
    let u_max = grid.center_to_azimuthal_bound(current_azimuthal_voxel + 1);
    let seg = ray_segment.vector();
    let w_min_x = p_one.p1 - ray_segment.p1().x;
    let w_min_z = p_one.p2 - ray_segment.p1().z;
    let w_max_x = p_two.p1 - ray_segment.p1().x;
    let w_max_z = p_two.p2 - ray_segment.p1().z;
    let perp_uv_min = u_min.x * seg.z - u_min.z * seg.x;
    let perp_uv_max = u_max.x * seg.z - u_max.z * seg.x;
    let perp_uw_min = u_min.x * w_min_z - u_min.z * w_min_x;
    let perp_uw_max = u_max.x * w_max_z - u_max.z * w_max_x;
    let perp_vw_min = seg.x * w_min_z - seg.z * w_min_x;
    let perp_vw_max = seg.x * w_max_z - seg.z * w_max_x;
    angular_hit(
        grid,
        ray,
        perp_uv_min,
        perp_uv_max,
        perp_uw_min,
        perp_uw_max,
        perp_vw_min,
        perp_vw_max,
        ray_segment,
        collinear_times,
        t,
        max_t,
        ray.direction().z,
        grid.sphere_center().z,
        grid.p_max_azimuthal_all(),
        current_azimuthal_voxel,
    )
}

/// Classifies which family (or tied families) the ray crosses next, given the
/// three per-family hit results.
///
/// Tolerant equality is not transitive, so the order of the checks matters:
/// single-family results are only returned when their time is strictly
/// smallest under the tolerant ordering, the triple tie is checked before the
/// pairs, and radial ties fold into the combined cases so a true corner
/// crossing is taken in one step instead of two micro-steps.
pub(super) fn minimum_intersection(
    radial: &HitParameters,
    polar: &HitParameters,
    azimuthal: &HitParameters,
) -> VoxelIntersection {
    let rp_eq = is_equal(radial.t_max, polar.t_max);
    let ra_eq = is_equal(radial.t_max, azimuthal.t_max);
    let rp_lt = radial.t_max < polar.t_max;
    let ra_lt = radial.t_max < azimuthal.t_max;
    if rp_lt && !rp_eq && ra_lt && !ra_eq {
        return VoxelIntersection::Radial;
    }

    let pa_eq = is_equal(polar.t_max, azimuthal.t_max);
    let pa_lt = polar.t_max < azimuthal.t_max;
    if !rp_lt && !rp_eq && pa_lt && !pa_eq {
        return VoxelIntersection::Polar;
    }
    if !pa_lt && !pa_eq && !ra_lt && !ra_eq {
        return VoxelIntersection::Azimuthal;
    }
    if rp_eq && ra_eq {
        return VoxelIntersection::RadialPolarAzimuthal;
    }
    if pa_eq {
        return VoxelIntersection::PolarAzimuthal;
    }
    if rp_eq {
        return VoxelIntersection::RadialPolar;
    }
    VoxelIntersection::RadialAzimuthal
}

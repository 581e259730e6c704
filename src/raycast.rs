//! The spherical voxel traversal: types and entry points for walking a ray
//! through a [`SphericalVoxelGrid`].

use alloc::vec::Vec;

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use crate::math::{FreeCoordinate, FreePoint, FreeVector};

mod ray;
pub use ray::Ray;
pub(crate) use ray::RaySegment;

mod grid;
pub use grid::{LineSegment, SphereBound, SphericalVoxelGrid, TrigonometricValues};

mod hit;
use hit::{
    azimuthal_hit, in_bounds_azimuthal, in_bounds_polar, initialize_angular_voxel_id,
    minimum_intersection, polar_hit, radial_hit, wrap_angular, VoxelIntersection, NO_HIT,
};


// -------------------------------------------------------------------------------------------------

/// One voxel of a traversal's output: the voxel's coordinates and the ray
/// parameters at which the ray entered and left it.
///
/// `radial` is 1 at the outermost shell and increases inward to the grid's
/// radial section count; `polar` and `azimuthal` count sections from the
/// grid's minimum angular bound. Consecutive voxels of one traversal share
/// their boundary time: `enter_t` of each voxel equals `exit_t` of the voxel
/// before it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalVoxel {
    /// Radial shell index, in `[1, N_r]`, outermost first.
    pub radial: usize,
    /// Polar section index, in `[0, N_θ)`.
    pub polar: usize,
    /// Azimuthal section index, in `[0, N_φ)`.
    pub azimuthal: usize,
    /// Ray parameter at which the ray entered this voxel.
    pub enter_t: FreeCoordinate,
    /// Ray parameter at which the ray left this voxel.
    pub exit_t: FreeCoordinate,
}

impl Ray {
    /// Walks this ray through `grid`; equivalent to [`walk(self, grid, max_t)`](walk).
    pub fn walk(&self, grid: &SphericalVoxelGrid, max_t: FreeCoordinate) -> Vec<SphericalVoxel> {
        walk(self, grid, max_t)
    }
}

// -------------------------------------------------------------------------------------------------

/// Per-family tables of angular boundary endpoints at the entry radius, used
/// to seed the angular voxel IDs. From outside the grid the entry radius is
/// the maximum radius, so the grid's precomputed tables serve directly;
/// otherwise each endpoint is placed on the entry-radius circle from the
/// boundary's trigonometric values.
fn voxel_boundary_segments(
    ray_origin_is_outside_grid: bool,
    grid: &SphericalVoxelGrid,
    current_radius: FreeCoordinate,
) -> (Vec<LineSegment>, Vec<LineSegment>) {
    if ray_origin_is_outside_grid {
        return (
            grid.p_max_polar_all().to_vec(),
            grid.p_max_azimuthal_all().to_vec(),
        );
    }
    let center = grid.sphere_center();
    let p_polar = grid
        .polar_trig_values()
        .iter()
        .map(|tv| LineSegment {
            p1: current_radius * tv.cosine + center.x,
            p2: current_radius * tv.sine + center.y,
        })
        .collect();
    let p_azimuthal = grid
        .azimuthal_trig_values()
        .iter()
        .map(|tv| LineSegment {
            p1: current_radius * tv.cosine + center.x,
            p2: current_radius * tv.sine + center.z,
        })
        .collect();
    (p_polar, p_azimuthal)
}

/// Walks `ray` through `grid`, producing the ordered sequence of voxels the
/// ray passes through with the parametric entry and exit time of each.
///
/// `max_t` bounds the traversal in units of the sphere's maximum diameter,
/// measured from the point where the ray enters the grid; `max_t = 1.0` is
/// always enough to cross the whole sphere. Degenerate inputs — a
/// non-positive `max_t`, a ray that misses or only grazes the outermost
/// sphere, a ray pointing away from the sphere, or a ray entering outside the
/// grid's angular extent — produce an empty sequence; this function cannot
/// fail.
///
/// The sequence is ordered by increasing `enter_t`, adjacent voxels are never
/// equal, and each voxel's `enter_t` equals the previous voxel's `exit_t`.
/// The grid is only read, so one grid may serve concurrent walks.
pub fn walk(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    max_t: FreeCoordinate,
) -> Vec<SphericalVoxel> {
    if max_t <= 0.0 {
        return Vec::new();
    }

    // Find the shell containing the ray origin by scanning the squared-radius
    // table from the outermost boundary inward.
    let rsv: FreeVector = grid.sphere_center() - ray.origin(); // Ray Sphere Vector.
    let squared_distance_from_center = rsv.square_length();
    let mut radial_entrance_voxel = 0;
    while radial_entrance_voxel < grid.num_radial_sections()
        && squared_distance_from_center < grid.delta_radii_squared(radial_entrance_voxel)
    {
        radial_entrance_voxel += 1;
    }
    let ray_origin_is_outside_grid = radial_entrance_voxel == 0;

    let vector_index = radial_entrance_voxel - usize::from(!ray_origin_is_outside_grid);
    let entry_radius_squared = grid.delta_radii_squared(vector_index);
    let entry_radius = grid.delta_radius()
        * (grid.num_radial_sections() - vector_index) as FreeCoordinate;
    let rsvd = rsv.dot(rsv);
    let v = rsv.dot(ray.direction());
    let rsvd_minus_v_squared = rsvd - v * v;

    // The entry sphere is missed when the squared distance of closest
    // approach reaches its squared radius (equality being a grazing touch).
    if entry_radius_squared <= rsvd_minus_v_squared {
        return Vec::new();
    }
    let d = (entry_radius_squared - rsvd_minus_v_squared).sqrt();
    let t_ray_exit = ray.time_at(v + d);
    if t_ray_exit < 0.0 {
        // The sphere is entirely behind the ray.
        return Vec::new();
    }
    let t_ray_entrance = ray.time_at(v - d);
    let mut current_radial_voxel = radial_entrance_voxel + usize::from(ray_origin_is_outside_grid);

    let (p_polar, p_azimuthal) =
        voxel_boundary_segments(ray_origin_is_outside_grid, grid, entry_radius);

    // Angular IDs are seeded from the entry point when outside the grid, and
    // from the origin when inside. A ray starting exactly at the center has
    // no usable center-to-origin vector; shift it one direction-length back
    // so it classifies as the sector the ray departs into.
    let ray_sphere: FreeVector = if ray_origin_is_outside_grid {
        grid.sphere_center() - ray.point_at(t_ray_entrance)
    } else if squared_distance_from_center == 0.0 {
        rsv - ray.direction()
    } else {
        rsv
    };

    let mut current_polar_voxel = initialize_angular_voxel_id(
        grid,
        grid.num_polar_sections(),
        ray_sphere.x,
        ray_sphere.y,
        &p_polar,
        grid.sphere_center().y,
        entry_radius,
    );
    if current_polar_voxel >= grid.num_polar_sections() {
        return Vec::new();
    }

    let mut current_azimuthal_voxel = initialize_angular_voxel_id(
        grid,
        grid.num_azimuthal_sections(),
        ray_sphere.x,
        ray_sphere.z,
        &p_azimuthal,
        grid.sphere_center().z,
        entry_radius,
    );
    if current_azimuthal_voxel >= grid.num_azimuthal_sections() {
        return Vec::new();
    }

    // A ray crosses each shell at most twice and each angular half-plane at
    // most once per traversal segment, so this capacity covers typical rays.
    let mut voxels: Vec<SphericalVoxel> = Vec::with_capacity(
        grid.num_radial_sections() + grid.num_polar_sections() + grid.num_azimuthal_sections(),
    );

    let mut t = if ray_origin_is_outside_grid {
        t_ray_entrance
    } else {
        0.0
    };
    voxels.push(SphericalVoxel {
        radial: current_radial_voxel,
        polar: current_polar_voxel,
        azimuthal: current_azimuthal_voxel,
        enter_t: t,
        exit_t: t,
    });

    // `max_t` is in units of the max diameter, measured from the grid entry;
    // convert it to an absolute ray-parameter bound. From outside the grid the
    // sphere exit also bounds the walk.
    let unitized_ray_time = max_t * grid.sphere_max_diameter()
        + if ray_origin_is_outside_grid {
            t_ray_entrance
        } else {
            0.0
        };
    let max_t = if ray_origin_is_outside_grid {
        t_ray_exit.min(unitized_ray_time)
    } else {
        unitized_ray_time
    };

    // Times used when an angular boundary is collinear with the ray; index 1
    // holds the time at the sphere center, through which every angular
    // boundary passes. Index 0 is for the non-collinear case.
    let collinear_times = [0.0, ray.time_at_point(grid.sphere_center())];

    let mut ray_segment = RaySegment::new(max_t, ray);
    let mut radial_step_has_transitioned = false;
    loop {
        let radial = radial_hit(
            ray,
            grid,
            &mut radial_step_has_transitioned,
            current_radial_voxel,
            v,
            rsvd_minus_v_squared,
            t,
            max_t,
        );
        ray_segment.update_at(t, ray);
        let polar = polar_hit(
            ray,
            grid,
            &ray_segment,
            &collinear_times,
            current_polar_voxel,
            t,
            max_t,
        );
        let azimuthal = azimuthal_hit(
            ray,
            grid,
            &ray_segment,
            &collinear_times,
            current_azimuthal_voxel,
            t,
            max_t,
        );

        // The walk ends when the ray would exit through the center, or no
        // family has a crossing left before the time bound.
        if current_radial_voxel as i64 + radial.t_step == 0
            || (radial.t_max == NO_HIT && polar.t_max == NO_HIT && azimuthal.t_max == NO_HIT)
        {
            return seal(voxels, t_ray_exit);
        }

        match minimum_intersection(&radial, &polar, &azimuthal) {
            VoxelIntersection::Radial => {
                t = radial.t_max;
                current_radial_voxel = (current_radial_voxel as i64 + radial.t_step) as usize;
            }
            VoxelIntersection::Polar => {
                t = polar.t_max;
                if !in_bounds_polar(grid, polar.t_step, current_polar_voxel) {
                    return seal(voxels, t_ray_exit);
                }
                current_polar_voxel = wrap_angular(
                    current_polar_voxel as i64 + polar.t_step,
                    grid.num_polar_sections(),
                );
            }
            VoxelIntersection::Azimuthal => {
                if !in_bounds_azimuthal(grid, azimuthal.t_step, current_azimuthal_voxel) {
                    return seal(voxels, t_ray_exit);
                }
                t = azimuthal.t_max;
                current_azimuthal_voxel = wrap_angular(
                    current_azimuthal_voxel as i64 + azimuthal.t_step,
                    grid.num_azimuthal_sections(),
                );
            }
            VoxelIntersection::RadialPolar => {
                t = radial.t_max;
                if !in_bounds_polar(grid, polar.t_step, current_polar_voxel) {
                    return seal(voxels, t_ray_exit);
                }
                current_radial_voxel = (current_radial_voxel as i64 + radial.t_step) as usize;
                current_polar_voxel = wrap_angular(
                    current_polar_voxel as i64 + polar.t_step,
                    grid.num_polar_sections(),
                );
            }
            VoxelIntersection::RadialAzimuthal => {
                t = radial.t_max;
                if !in_bounds_azimuthal(grid, azimuthal.t_step, current_azimuthal_voxel) {
                    return seal(voxels, t_ray_exit);
                }
                current_radial_voxel = (current_radial_voxel as i64 + radial.t_step) as usize;
                current_azimuthal_voxel = wrap_angular(
                    current_azimuthal_voxel as i64 + azimuthal.t_step,
                    grid.num_azimuthal_sections(),
                );
            }
            VoxelIntersection::PolarAzimuthal => {
                t = polar.t_max;
                if !in_bounds_azimuthal(grid, azimuthal.t_step, current_azimuthal_voxel)
                    || !in_bounds_polar(grid, polar.t_step, current_polar_voxel)
                {
                    return seal(voxels, t_ray_exit);
                }
                current_polar_voxel = wrap_angular(
                    current_polar_voxel as i64 + polar.t_step,
                    grid.num_polar_sections(),
                );
                current_azimuthal_voxel = wrap_angular(
                    current_azimuthal_voxel as i64 + azimuthal.t_step,
                    grid.num_azimuthal_sections(),
                );
            }
            VoxelIntersection::RadialPolarAzimuthal => {
                t = radial.t_max;
                if !in_bounds_azimuthal(grid, azimuthal.t_step, current_azimuthal_voxel)
                    || !in_bounds_polar(grid, polar.t_step, current_polar_voxel)
                {
                    return seal(voxels, t_ray_exit);
                }
                current_radial_voxel = (current_radial_voxel as i64 + radial.t_step) as usize;
                current_polar_voxel = wrap_angular(
                    current_polar_voxel as i64 + polar.t_step,
                    grid.num_polar_sections(),
                );
                current_azimuthal_voxel = wrap_angular(
                    current_azimuthal_voxel as i64 + azimuthal.t_step,
                    grid.num_azimuthal_sections(),
                );
            }
        }

        // At an exact multi-plane equality the combined step can land back on
        // the same voxel triple; skip it rather than record a duplicate.
        let same = voxels.last().is_some_and(|last| {
            last.radial == current_radial_voxel
                && last.polar == current_polar_voxel
                && last.azimuthal == current_azimuthal_voxel
        });
        if same {
            continue;
        }
        if let Some(last) = voxels.last_mut() {
            last.exit_t = t;
        }
        voxels.push(SphericalVoxel {
            radial: current_radial_voxel,
            polar: current_polar_voxel,
            azimuthal: current_azimuthal_voxel,
            enter_t: t,
            exit_t: t,
        });
    }
}

/// Records the full-sphere exit time on the last voxel and hands the sequence
/// back. The exit of the final voxel is always the time at which the ray
/// leaves the outermost sphere, even when the walk stopped early at the
/// grid's angular bounds.
fn seal(mut voxels: Vec<SphericalVoxel>, t_ray_exit: FreeCoordinate) -> Vec<SphericalVoxel> {
    if let Some(last) = voxels.last_mut() {
        last.exit_t = t_ray_exit;
    }
    voxels
}

/// [`walk()`] over raw scalars, for callers (such as language bindings) that
/// do not hold [`Ray`] or [`SphericalVoxelGrid`] values.
///
/// `min_bound` and `max_bound` are `(radius, polar, azimuthal)` triples;
/// `ray_direction` need not be unit length.
#[allow(clippy::too_many_arguments)]
pub fn walk_raw(
    ray_origin: [FreeCoordinate; 3],
    ray_direction: [FreeCoordinate; 3],
    min_bound: [FreeCoordinate; 3],
    max_bound: [FreeCoordinate; 3],
    num_radial_sections: usize,
    num_polar_sections: usize,
    num_azimuthal_sections: usize,
    sphere_center: [FreeCoordinate; 3],
    max_t: FreeCoordinate,
) -> Vec<SphericalVoxel> {
    walk(
        &Ray::new(FreePoint::from(ray_origin), FreeVector::from(ray_direction)),
        &SphericalVoxelGrid::new(
            SphereBound {
                radial: min_bound[0],
                polar: min_bound[1],
                azimuthal: min_bound[2],
            },
            SphereBound {
                radial: max_bound[0],
                polar: max_bound[1],
                azimuthal: max_bound[2],
            },
            num_radial_sections,
            num_polar_sections,
            num_azimuthal_sections,
            FreePoint::from(sphere_center),
        ),
        max_t,
    )
}

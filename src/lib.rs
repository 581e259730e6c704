//! Ray traversal over spherically-partitioned voxel grids.
//!
//! A ball in 3-D Euclidean space is partitioned into voxels by three boundary
//! families: concentric spheres (radial sections), half-planes through the
//! polar axis (polar sections, in the XY plane), and half-planes through the
//! azimuthal axis (azimuthal sections, in the XZ plane). Given a [`Ray`] and a
//! [`SphericalVoxelGrid`], [`walk()`] produces the ordered sequence of voxels
//! the ray passes through, together with the parametric entry and exit time of
//! each.
//!
//! This is the spherical-coordinate analog of the uniform-grid traversal of
//! Amanatides & Woo, “A Fast Voxel Traversal Algorithm for Ray Tracing” (1987):
//! the ray is advanced incrementally from boundary crossing to boundary
//! crossing, choosing at each step the axis family whose next crossing is
//! nearest. Unlike the rectilinear case, the boundary families here are curved
//! or radial, so each family gets its own hit kernel and the radial coordinate
//! runs `1..=N` from the outermost shell inward and back out again.
//!
//! # Example
//!
//! ```
//! use spherical_raycast::euclid::{point3, vec3};
//! use spherical_raycast::{walk, Ray, SphereBound, SphericalVoxelGrid};
//! use core::f64::consts::TAU;
//!
//! let grid = SphericalVoxelGrid::new(
//!     SphereBound { radial: 0.0, polar: 0.0, azimuthal: 0.0 },
//!     SphereBound { radial: 10.0, polar: TAU, azimuthal: TAU },
//!     4, 4, 4,
//!     point3(0.0, 0.0, 0.0),
//! );
//!
//! // A ray starting at the sphere center steps outward through all
//! // four shells, innermost first.
//! let ray = Ray::new(point3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0));
//! let voxels = walk(&ray, &grid, 10.0);
//! let radial: Vec<usize> = voxels.iter().map(|v| v.radial).collect();
//! assert_eq!(radial, vec![4, 3, 2, 1]);
//! ```

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(
    not(any(test, feature = "std")),
    warn(clippy::std_instead_of_core, clippy::std_instead_of_alloc)
)]

#[cfg(any(feature = "std", test))]
extern crate std;
extern crate alloc;

pub mod math;
pub mod raycast;

pub use raycast::{walk, walk_raw, Ray, SphereBound, SphericalVoxel, SphericalVoxelGrid};

// Re-exported because it appears in this crate's public API.
pub use euclid;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use spherical_raycast::euclid::{point3, vec3};
use spherical_raycast::{walk, Ray, SphereBound, SphericalVoxelGrid};

const TAU: f64 = std::f64::consts::TAU;

fn grid(num_radial: usize, num_polar: usize, num_azimuthal: usize) -> SphericalVoxelGrid {
    SphericalVoxelGrid::new(
        SphereBound {
            radial: 0.0,
            polar: 0.0,
            azimuthal: 0.0,
        },
        SphereBound {
            radial: 10.0,
            polar: TAU,
            azimuthal: TAU,
        },
        num_radial,
        num_polar,
        num_azimuthal,
        point3(0.0, 0.0, 0.0),
    )
}

pub fn traversal_bench(c: &mut Criterion) {
    c.bench_function("grid: construction 64x64x64", |b| {
        b.iter(|| grid(black_box(64), black_box(64), black_box(64)))
    });

    let coarse = grid(4, 8, 4);
    c.bench_function("walk: diagonal from outside", |b| {
        let ray = Ray::new(point3(-13.0, -13.0, -13.0), vec3(1.0, 1.0, 1.0));
        b.iter(|| walk(black_box(&ray), &coarse, 1.0))
    });

    c.bench_function("walk: from the center", |b| {
        let ray = Ray::new(point3(0.0, 0.0, 0.0), vec3(1.0, 0.3, 0.7));
        b.iter(|| walk(black_box(&ray), &coarse, 1.0))
    });

    let fine = grid(64, 64, 64);
    c.bench_function("walk: diagonal through fine grid", |b| {
        let ray = Ray::new(point3(-13.0, -11.0, -12.0), vec3(1.0, 0.9, 1.1));
        b.iter(|| walk(black_box(&ray), &fine, 1.0))
    });
}

criterion_group!(benches, traversal_bench);
criterion_main!(benches);

//! utils for cdt tests and fuzzing
#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

use rand::{SeedableRng, distr::Uniform, prelude::Distribution, rngs::StdRng};
use rand_distr::Normal;
use std::ops::RangeInclusive;

pub type Vertex2 = [f64; 2];

/// Samples `n` vertices in 2D space from the [Uniform] distribution.
///
/// If no range is specified, the unit-square centered around the origin is used, `[-0.5, 0.5]`.
pub fn sample_vertices_2d(n: usize, range: Option<RangeInclusive<f64>>) -> Vec<Vertex2> {
    let mut rng = rand::rng();
    sample_uniform(&mut rng, n, range)
}

/// Same as [sample_vertices_2d], but reproducible for a given `seed`.
pub fn sample_vertices_2d_seeded(
    n: usize,
    range: Option<RangeInclusive<f64>>,
    seed: u64,
) -> Vec<Vertex2> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample_uniform(&mut rng, n, range)
}

fn sample_uniform<R: rand::Rng>(
    rng: &mut R,
    n: usize,
    range: Option<RangeInclusive<f64>>,
) -> Vec<Vertex2> {
    let range = range.unwrap_or(-0.5..=0.5);
    let uniform = Uniform::try_from(range).expect("Expected range with a greater start then end");

    let mut vertices: Vec<[f64; 2]> = Vec::with_capacity(n);
    for _ in 0..n {
        let x = uniform.sample(rng);
        let y = uniform.sample(rng);
        vertices.push([x, y]);
    }

    vertices
}

/// Samples `n` vertices clustered around `center` from a [Normal] distribution.
///
/// The default standard deviation is `σ = 0.1`.
pub fn sample_clustered_vertices_2d(n: usize, center: Vertex2, std_dev: Option<f64>) -> Vec<Vertex2> {
    let mut rng = rand::rng();
    let std_dev = std_dev.unwrap_or(0.1);
    let normal_x = Normal::new(center[0], std_dev).unwrap();
    let normal_y = Normal::new(center[1], std_dev).unwrap();

    let mut vertices: Vec<[f64; 2]> = Vec::with_capacity(n);
    for _ in 0..n {
        vertices.push([normal_x.sample(&mut rng), normal_y.sample(&mut rng)]);
    }

    vertices
}

/// A regular `n`-gon of the given `radius` around `center`, counter-clockwise.
pub fn regular_polygon(n: usize, center: Vertex2, radius: f64) -> Vec<Vertex2> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            [
                center[0] + radius * angle.cos(),
                center[1] + radius * angle.sin(),
            ]
        })
        .collect()
}

/// Closed loop of edges `(offset, offset + 1), ..., (offset + n - 1, offset)`.
pub fn loop_edges(n: usize, offset: usize) -> Vec<[usize; 2]> {
    (0..n).map(|i| [offset + i, offset + (i + 1) % n]).collect()
}

/// A `n x n` grid of points with the given spacing, starting at the origin.
pub fn grid_2d(n: usize, spacing: f64) -> Vec<Vertex2> {
    let mut vertices = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            vertices.push([i as f64 * spacing, j as f64 * spacing]);
        }
    }
    vertices
}

//! Squared Euclidean distance and nearest-center search.

use ndarray::{ArrayView1, ArrayView2};
use wide::f64x4;

/// Sum of squared per-dimension differences. No square root is taken;
/// the ordering of distances is all callers need.
#[inline]
pub fn squared_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    match (a.as_slice(), b.as_slice()) {
        (Some(a), Some(b)) => squared_euclidean_slice(a, b),
        _ => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum(),
    }
}

/// Slice variant with a 4-lane SIMD body and scalar tail.
#[inline]
pub fn squared_euclidean_slice(a: &[f64], b: &[f64]) -> f64 {
    let dim = a.len().min(b.len());
    let mut acc = f64x4::splat(0.0);
    let mut j = 0;

    while j + 4 <= dim {
        let p = f64x4::from([a[j], a[j + 1], a[j + 2], a[j + 3]]);
        let c = f64x4::from([b[j], b[j + 1], b[j + 2], b[j + 3]]);
        let diff = p - c;
        acc += diff * diff;
        j += 4;
    }

    let mut tail = 0.0;
    while j < dim {
        let diff = a[j] - b[j];
        tail += diff * diff;
        j += 1;
    }

    acc.reduce_add() + tail
}

/// Index of the center closest to `point`.
///
/// Only a strictly smaller distance displaces the current best, so on ties
/// the lowest index wins. `centers` must hold at least one row.
#[inline]
pub fn nearest_center(point: ArrayView1<f64>, centers: ArrayView2<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;

    for (i, center) in centers.rows().into_iter().enumerate() {
        let dist = squared_euclidean(point, center);
        if i == 0 || dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }

    best
}

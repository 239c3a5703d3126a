use crate::distance::squared_euclidean;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Well-separated clusters of points scattered uniformly within ±`spread`
/// around centers placed `separation` apart along every axis. Points are
/// emitted cluster by cluster. Returns `(points, true_labels)`.
pub fn generate_blobs(
    num_clusters: usize,
    points_per_cluster: usize,
    dim: usize,
    separation: f64,
    spread: f64,
    seed: u64,
) -> (Array2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let total = num_clusters * points_per_cluster;
    let mut points = Array2::<f64>::zeros((total, dim));
    let mut labels = Vec::with_capacity(total);

    for cluster in 0..num_clusters {
        for p in 0..points_per_cluster {
            let idx = cluster * points_per_cluster + p;
            labels.push(cluster);
            for d in 0..dim {
                let center = cluster as f64 * separation + d as f64 * 0.1;
                points[(idx, d)] = center + rng.gen_range(-spread..=spread);
            }
        }
    }

    (points, labels)
}

/// Uniform random points in `[-10, 10)`, reproducible from `seed`.
pub fn random_points(n: usize, dim: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_simple_fn((n, dim), || rng.gen_range(-10.0..10.0))
}

/// Within-cluster sum of squared distances.
pub fn inertia(points: ArrayView2<f64>, centers: ArrayView2<f64>, labels: ArrayView1<usize>) -> f64 {
    points
        .rows()
        .into_iter()
        .zip(labels.iter())
        .map(|(point, &label)| squared_euclidean(point, centers.row(label)))
        .sum()
}

use lloyd_kmeans::distance::{nearest_center, squared_euclidean, squared_euclidean_slice};
use lloyd_kmeans::utils::random_points;
use ndarray::{array, Array2, ShapeBuilder};

#[test]
fn test_squared_distance_has_no_square_root() {
    let a = array![0.0, 0.0];
    let b = array![3.0, 4.0];
    assert_eq!(squared_euclidean(a.view(), b.view()), 25.0);
}

#[test]
fn test_simd_and_scalar_tail_agree() {
    // Lengths exercise the 4-lane body, the tail, and both together.
    for dim in [1, 3, 4, 5, 8, 11, 784] {
        let data = random_points(2, dim, dim as u64);
        let expected: f64 = data
            .row(0)
            .iter()
            .zip(data.row(1).iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        let got = squared_euclidean(data.row(0), data.row(1));
        assert!(
            (got - expected).abs() <= 1e-9 * expected.max(1.0),
            "dim {}: {} vs {}",
            dim,
            got,
            expected
        );
    }
}

#[test]
fn test_strided_views_use_scalar_path() {
    // Column-major storage makes rows non-contiguous.
    let data = Array2::from_shape_vec((2, 5).f(), (0..10).map(|x| x as f64).collect()).unwrap();
    let contiguous = data.as_standard_layout().into_owned();

    assert!(data.row(0).as_slice().is_none());
    assert_eq!(
        squared_euclidean(data.row(0), data.row(1)),
        squared_euclidean_slice(
            contiguous.row(0).as_slice().unwrap(),
            contiguous.row(1).as_slice().unwrap()
        )
    );
}

#[test]
fn test_identical_vectors_have_zero_distance() {
    let a = array![1.5, -2.25, 1e9, 7.0, 0.125];
    assert_eq!(squared_euclidean(a.view(), a.view()), 0.0);
}

#[test]
fn test_nearest_center_picks_minimum() {
    let centers = array![[0.0, 0.0], [10.0, 10.0], [4.0, 4.0]];
    assert_eq!(nearest_center(array![5.0, 5.0].view(), centers.view()), 2);
    assert_eq!(nearest_center(array![9.0, 12.0].view(), centers.view()), 1);
    assert_eq!(nearest_center(array![-1.0, 0.0].view(), centers.view()), 0);
}

#[test]
fn test_nearest_center_tie_keeps_first() {
    let centers = array![[0.0, 0.0], [2.0, 0.0], [1.0, 1.0], [1.0, -1.0]];
    // (1,0) is at squared distance 1 from every center.
    assert_eq!(nearest_center(array![1.0, 0.0].view(), centers.view()), 0);

    let later_tie = array![[5.0, 5.0], [0.0, 2.0], [2.0, 0.0]];
    assert_eq!(nearest_center(array![1.0, 1.0].view(), later_tie.view()), 1);
}

#[test]
fn test_single_center_always_wins() {
    let centers = array![[100.0, -100.0]];
    assert_eq!(nearest_center(array![0.0, 0.0].view(), centers.view()), 0);
}

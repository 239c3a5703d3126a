mod test_utils;

use lloyd_kmeans::{Classifier, ClusterLabeler, HostDevice, KMeans, KMeansConfig, KMeansError};
use ndarray::{array, Array1};
use test_utils::*;

fn labeler() -> ClusterLabeler {
    ClusterLabeler::new(KMeans::sequential(KMeansConfig::new(2)).unwrap())
}

/// Train and predict through the trait only.
fn train_and_label<C: Classifier<Label = usize>>(classifier: &mut C) -> Vec<usize> {
    let data = four_points_interleaved();
    let ignored = Array1::<f64>::zeros(data.nrows());
    classifier.fit(data.view(), ignored.view()).unwrap();

    let mut out = vec![0; data.nrows()];
    classifier.predict_multiple(data.view(), &mut out).unwrap();
    out
}

#[test]
fn test_labeler_predicts_cluster_indices() {
    let mut classifier = labeler();
    assert_eq!(train_and_label(&mut classifier), vec![0, 1, 0, 1]);
    assert_eq!(classifier.predict(array![9.0, 9.0].view()).unwrap(), 1);
    assert!(classifier.engine().is_fitted());
}

#[test]
fn test_labeler_over_accelerated_engine() {
    let engine = KMeans::with_accelerator(KMeansConfig::new(2), HostDevice::new()).unwrap();
    let mut classifier = ClusterLabeler::new(engine);
    assert_eq!(train_and_label(&mut classifier), vec![0, 1, 0, 1]);
}

#[test]
fn test_label_values_do_not_influence_clusters() {
    let data = four_points_interleaved();
    let mut a = labeler();
    let mut b = labeler();
    a.fit(data.view(), array![1.0, 1.0, 1.0, 1.0].view()).unwrap();
    b.fit(data.view(), array![7.0, -3.0, 0.5, 2.0].view()).unwrap();

    let a = a.into_inner();
    let b = b.into_inner();
    assert_eq!(a.centers().unwrap(), b.centers().unwrap());
}

#[test]
fn test_label_count_must_match_points() {
    let mut classifier = labeler();
    let err = classifier
        .fit(four_points().view(), array![0.0, 1.0].view())
        .unwrap_err();
    assert!(matches!(
        err,
        KMeansError::LabelCount {
            expected: 4,
            actual: 2
        }
    ));
    assert!(!classifier.engine().is_fitted());
}

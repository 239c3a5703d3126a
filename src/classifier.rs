//! The train/predict contract shared with the other classifiers
//! (nearest-neighbor, naive Bayes, SVM), and an adapter that lets the
//! clustering engine stand in as an unsupervised labeling step.

use crate::device::{Accelerator, PlatformAccelerator};
use crate::error::{KMeansError, Result};
use crate::kmeans::KMeans;
use ndarray::{ArrayView1, ArrayView2};

pub trait Classifier {
    type Label;

    /// Train on `points` (shape `(n, dim)`) with one label per row.
    fn fit(&mut self, points: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<()>;

    fn predict(&self, point: ArrayView1<f64>) -> Result<Self::Label>;

    fn predict_multiple(&self, points: ArrayView2<f64>, labels: &mut [Self::Label]) -> Result<()>;
}

/// Presents a [`KMeans`] engine through [`Classifier`]. Training labels are
/// only checked for count; predicted labels are cluster indices.
pub struct ClusterLabeler<A: Accelerator = PlatformAccelerator> {
    engine: KMeans<A>,
}

impl<A: Accelerator> ClusterLabeler<A> {
    pub fn new(engine: KMeans<A>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &KMeans<A> {
        &self.engine
    }

    pub fn into_inner(self) -> KMeans<A> {
        self.engine
    }
}

impl<A: Accelerator> Classifier for ClusterLabeler<A> {
    type Label = usize;

    fn fit(&mut self, points: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<()> {
        if labels.len() != points.nrows() {
            return Err(KMeansError::LabelCount {
                expected: points.nrows(),
                actual: labels.len(),
            });
        }
        self.engine.fit(points).map(|_| ())
    }

    fn predict(&self, point: ArrayView1<f64>) -> Result<usize> {
        self.engine.predict(point)
    }

    fn predict_multiple(&self, points: ArrayView2<f64>, labels: &mut [usize]) -> Result<()> {
        self.engine.predict_multiple(points, labels)
    }
}

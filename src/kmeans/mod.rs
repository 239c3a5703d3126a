//! Lloyd's-algorithm k-means engine.
//!
//! The engine owns one generation of cluster centers and the membership of
//! every training point. Whether passes run on the host or offload the
//! assignment step to a device is decided once, when the engine is built.

mod accelerated;
mod lloyd;
mod sequential;

use crate::config::KMeansConfig;
use crate::device::{Accelerator, KernelLaunch, PlatformAccelerator};
use crate::distance::nearest_center;
use crate::error::{KMeansError, Result};
use lloyd::{LoopControl, UNASSIGNED};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use std::fmt;
use tracing::{debug, info, warn};

/// Which execution path an engine uses for its passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Sequential,
    Accelerated,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Sequential => write!(f, "sequential"),
            StrategyKind::Accelerated => write!(f, "accelerated"),
        }
    }
}

enum Strategy<A> {
    Sequential,
    Accelerated(A),
}

impl<A> Strategy<A> {
    fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Sequential => StrategyKind::Sequential,
            Strategy::Accelerated(_) => StrategyKind::Accelerated,
        }
    }
}

/// Outcome of one `fit` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitReport {
    /// Number of Lloyd passes executed.
    pub passes: usize,
    /// Fraction of points that changed cluster in the last pass.
    pub delta: f64,
    /// False when the iteration cap ended the loop.
    pub converged: bool,
    pub strategy: StrategyKind,
}

struct Model {
    centers: Array2<f64>,
    membership: Array1<usize>,
    report: FitReport,
}

/// k-means clustering engine.
///
/// ```
/// use lloyd_kmeans::KMeans;
/// use ndarray::array;
///
/// let points = array![[0.0, 0.0], [10.0, 0.0], [0.0, 1.0], [10.0, 1.0]];
/// let mut kmeans = KMeans::sequential(lloyd_kmeans::KMeansConfig::new(2)).unwrap();
/// kmeans.fit(points.view()).unwrap();
/// assert_eq!(kmeans.predict(array![9.0, 0.5].view()).unwrap(), 1);
/// ```
pub struct KMeans<A: Accelerator = PlatformAccelerator> {
    config: KMeansConfig,
    strategy: Strategy<A>,
    model: Option<Model>,
}

impl KMeans<PlatformAccelerator> {
    /// Engine with default settings and `k` clusters, probing the platform
    /// device compiled into this build.
    pub fn new(k: usize) -> Result<Self> {
        Self::with_config(KMeansConfig::new(k))
    }

    pub fn with_config(config: KMeansConfig) -> Result<Self> {
        Self::with_accelerator(config, PlatformAccelerator::default())
    }

    /// Engine that always runs on the host, regardless of available devices.
    pub fn sequential(config: KMeansConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            strategy: Strategy::Sequential,
            model: None,
        })
    }
}

impl<A: Accelerator> KMeans<A> {
    /// Build an engine around `accelerator`. The device is probed here and
    /// only here; if it reports no device the engine runs sequentially for
    /// its whole lifetime.
    pub fn with_accelerator(config: KMeansConfig, accelerator: A) -> Result<Self> {
        config.validate()?;
        let available = accelerator.probe();
        debug!(device = %accelerator.name(), available, "capability probe");

        let strategy = if available {
            Strategy::Accelerated(accelerator)
        } else {
            Strategy::Sequential
        };
        Ok(Self {
            config,
            strategy,
            model: None,
        })
    }

    /// Cluster `points` (shape `(n, dim)`), seeding the centers with the
    /// first `k` points in dataset order.
    ///
    /// Any previous fit is discarded. On an accelerator failure nothing is
    /// committed and the engine is left unfitted.
    pub fn fit(&mut self, points: ArrayView2<f64>) -> Result<FitReport> {
        self.validate_dataset(points)?;
        let k = self.config.n_clusters;
        let centers = points.slice(s![..k, ..]).to_owned();
        self.run(points, centers)
    }

    /// Like [`fit`](Self::fit), but starting from caller-supplied centers of
    /// shape `(k, dim)`.
    pub fn fit_with_centers(
        &mut self,
        points: ArrayView2<f64>,
        centers: ArrayView2<f64>,
    ) -> Result<FitReport> {
        self.validate_dataset(points)?;
        let expected = (self.config.n_clusters, points.ncols());
        if centers.dim() != expected {
            return Err(KMeansError::CenterShape {
                expected,
                actual: centers.dim(),
            });
        }
        self.run(points, centers.to_owned())
    }

    fn validate_dataset(&self, points: ArrayView2<f64>) -> Result<()> {
        let (n, dim) = points.dim();
        if n == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        if dim == 0 {
            return Err(KMeansError::ZeroDimension);
        }
        if self.config.n_clusters > n {
            return Err(KMeansError::TooFewPoints {
                k: self.config.n_clusters,
                n,
            });
        }
        Ok(())
    }

    fn run(&mut self, points: ArrayView2<f64>, centers: Array2<f64>) -> Result<FitReport> {
        self.model = None;

        let (n, dim) = points.dim();
        let k = self.config.n_clusters;
        let mut centers = centers.as_standard_layout().into_owned();
        let mut membership = vec![UNASSIGNED; n];
        let mut control = LoopControl::new(&self.config);
        let strategy = self.strategy.kind();
        info!(n, dim, k, %strategy, "fitting k-means");

        let delta = match &self.strategy {
            Strategy::Sequential => {
                sequential::run(points, &mut centers, &mut membership, &mut control)
            }
            Strategy::Accelerated(accelerator) => {
                let launch = KernelLaunch::new(&self.config.accelerator, k, dim, n);
                accelerated::run(
                    accelerator,
                    &launch,
                    points,
                    &mut centers,
                    &mut membership,
                    &mut control,
                )?
            }
        };

        let report = FitReport {
            passes: control.passes(),
            delta,
            converged: control.converged(delta),
            strategy,
        };
        if report.converged {
            info!(passes = report.passes, delta, "k-means converged");
        } else {
            warn!(
                passes = report.passes,
                delta, "k-means stopped at the iteration cap before converging"
            );
        }

        self.model = Some(Model {
            centers,
            membership: Array1::from_vec(membership),
            report,
        });
        Ok(report)
    }

    fn model(&self) -> Result<&Model> {
        self.model.as_ref().ok_or(KMeansError::NotFitted)
    }

    /// Index of the learned center nearest to `point`.
    pub fn predict(&self, point: ArrayView1<f64>) -> Result<usize> {
        let model = self.model()?;
        let expected = model.centers.ncols();
        if point.len() != expected {
            return Err(KMeansError::DimensionMismatch {
                expected,
                actual: point.len(),
            });
        }
        Ok(nearest_center(point, model.centers.view()))
    }

    /// Predict every row of `points` into `labels`, which must hold one slot per row.
    pub fn predict_multiple(&self, points: ArrayView2<f64>, labels: &mut [usize]) -> Result<()> {
        let model = self.model()?;
        let expected = model.centers.ncols();
        if points.ncols() != expected {
            return Err(KMeansError::DimensionMismatch {
                expected,
                actual: points.ncols(),
            });
        }
        if labels.len() != points.nrows() {
            return Err(KMeansError::OutputLength {
                expected: points.nrows(),
                actual: labels.len(),
            });
        }

        let centers = model.centers.view();
        for (point, label) in points.rows().into_iter().zip(labels.iter_mut()) {
            *label = nearest_center(point, centers);
        }
        Ok(())
    }

    /// Cluster of training point `i` from the most recent fit.
    pub fn get_label(&self, i: usize) -> Result<usize> {
        let model = self.model()?;
        model
            .membership
            .get(i)
            .copied()
            .ok_or(KMeansError::LabelOutOfRange {
                index: i,
                len: model.membership.len(),
            })
    }

    pub fn centers(&self) -> Option<ArrayView2<'_, f64>> {
        self.model.as_ref().map(|m| m.centers.view())
    }

    pub fn labels(&self) -> Option<ArrayView1<'_, usize>> {
        self.model.as_ref().map(|m| m.membership.view())
    }

    pub fn report(&self) -> Option<FitReport> {
        self.model.as_ref().map(|m| m.report)
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn n_clusters(&self) -> usize {
        self.config.n_clusters
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}

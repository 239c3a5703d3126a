use lloyd_kmeans::device::{
    Accelerator, AcceleratorError, DeviceSession, HostDevice, HostSession, KernelLaunch,
};
use ndarray::{array, Array2, ArrayView1, ArrayView2};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Two tight pairs ten units apart, listed left pair first.
#[allow(dead_code)]
pub fn four_points() -> Array2<f64> {
    array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]
}

/// Same points, ordered so the first two seeds fall in different groups.
#[allow(dead_code)]
pub fn four_points_interleaved() -> Array2<f64> {
    array![[0.0, 0.0], [10.0, 0.0], [0.0, 1.0], [10.0, 1.0]]
}

/// Calculate squared Euclidean distance
#[allow(dead_code)]
pub fn euclidean_distance_squared(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Verify that each point is assigned to its nearest centroid
#[allow(dead_code)]
pub fn verify_optimal_assignment(
    data: ArrayView2<f64>,
    centers: ArrayView2<f64>,
    labels: ArrayView1<usize>,
) -> bool {
    for (i, &assigned) in labels.iter().enumerate() {
        let point = data.row(i);
        let assigned_dist = euclidean_distance_squared(point, centers.row(assigned));
        for c in 0..centers.nrows() {
            if euclidean_distance_squared(point, centers.row(c)) < assigned_dist - 1e-9 {
                return false;
            }
        }
    }
    true
}

#[allow(dead_code)]
pub fn assert_centers_close(a: ArrayView2<f64>, b: ArrayView2<f64>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!(
            (x - y).abs() <= tol,
            "center value {:?} differs: {} vs {}",
            idx,
            x,
            y
        );
    }
}

/// Call counters shared between a test and the device it hands to the engine.
#[allow(dead_code)]
#[derive(Clone, Debug, Default)]
pub struct DeviceCounters {
    pub probes: Arc<AtomicUsize>,
    pub opened: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    pub point_uploads: Arc<AtomicUsize>,
    pub center_uploads: Arc<AtomicUsize>,
    pub dispatches: Arc<AtomicUsize>,
    pub readbacks: Arc<AtomicUsize>,
}

#[allow(dead_code)]
pub fn load(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Where a [`ScriptedDevice`] should break.
#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fault {
    None,
    /// Report no device from the probe.
    Absent,
    /// Fail the kernel build while opening a session.
    Build,
    /// Fail the dispatch once this many dispatches have succeeded in total.
    DispatchAfter(usize),
    /// Read back a membership value equal to the cluster count.
    BadLabel,
}

/// Wraps [`HostDevice`] with counters and injectable faults.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct ScriptedDevice {
    pub counters: DeviceCounters,
    pub fault: Fault,
}

#[allow(dead_code)]
impl ScriptedDevice {
    pub fn new(fault: Fault) -> Self {
        Self {
            counters: DeviceCounters::default(),
            fault,
        }
    }
}

#[allow(dead_code)]
pub struct ScriptedSession {
    inner: HostSession,
    counters: DeviceCounters,
    fault: Fault,
    clusters: usize,
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Accelerator for ScriptedDevice {
    type Session = ScriptedSession;

    fn probe(&self) -> bool {
        self.counters.probes.fetch_add(1, Ordering::SeqCst);
        self.fault != Fault::Absent
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }

    fn open(&self, launch: &KernelLaunch) -> Result<Self::Session, AcceleratorError> {
        if self.fault == Fault::Build {
            return Err(AcceleratorError::Build {
                kernel: launch.kernel_name.clone(),
                log: "error: unexpected token".to_string(),
            });
        }
        let inner = HostDevice::new().open(launch)?;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSession {
            inner,
            counters: self.counters.clone(),
            fault: self.fault,
            clusters: launch.clusters,
        })
    }
}

impl DeviceSession for ScriptedSession {
    fn upload_points(&mut self, points: &[f64]) -> Result<(), AcceleratorError> {
        self.counters.point_uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload_points(points)
    }

    fn upload_centers(&mut self, centers: &[f64]) -> Result<(), AcceleratorError> {
        self.counters.center_uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload_centers(centers)
    }

    fn dispatch(&mut self) -> Result<(), AcceleratorError> {
        if let Fault::DispatchAfter(limit) = self.fault {
            if self.counters.dispatches.load(Ordering::SeqCst) >= limit {
                return Err(AcceleratorError::Dispatch("device lost".to_string()));
            }
        }
        self.counters.dispatches.fetch_add(1, Ordering::SeqCst);
        self.inner.dispatch()
    }

    fn read_membership(&mut self, out: &mut [i32]) -> Result<(), AcceleratorError> {
        self.counters.readbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.read_membership(out)?;
        if self.fault == Fault::BadLabel {
            if let Some(last) = out.last_mut() {
                *last = self.clusters as i32;
            }
        }
        Ok(())
    }
}

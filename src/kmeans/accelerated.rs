use super::lloyd::{Accumulator, LoopControl};
use crate::device::{Accelerator, AcceleratorError, DeviceSession, KernelLaunch};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

/// Run Lloyd passes with the assignment step on `accelerator`.
///
/// A device session is opened for this call only and dropped before
/// returning, whether the loop finished or a device call failed. Points are
/// uploaded once; centers go up and membership comes back every pass. Sums
/// are recomputed on the host from the read-back membership.
pub(crate) fn run<A: Accelerator>(
    accelerator: &A,
    launch: &KernelLaunch,
    points: ArrayView2<f64>,
    centers: &mut Array2<f64>,
    membership: &mut [usize],
    control: &mut LoopControl,
) -> Result<f64, AcceleratorError> {
    let (n, dim) = points.dim();
    let k = centers.nrows();

    let mut session = accelerator.open(launch)?;
    debug!(device = %accelerator.name(), "device session opened");

    let host_points = points.as_standard_layout();
    let flat_points = host_points
        .as_slice()
        .ok_or_else(|| AcceleratorError::Transfer("points are not contiguous".to_string()))?;
    session.upload_points(flat_points)?;

    let mut readback = vec![0i32; n];
    let mut acc = Accumulator::new(k, dim);

    loop {
        let flat_centers = centers
            .as_slice()
            .ok_or_else(|| AcceleratorError::Transfer("centers are not contiguous".to_string()))?;
        session.upload_centers(flat_centers)?;
        session.dispatch()?;
        session.read_membership(&mut readback)?;

        for (i, (&label, point)) in readback.iter().zip(points.rows()).enumerate() {
            let cluster = usize::try_from(label)
                .ok()
                .filter(|&c| c < k)
                .ok_or(AcceleratorError::InvalidMembership {
                    index: i,
                    value: label,
                    clusters: k,
                })?;
            acc.assign(membership, i, cluster, point);
        }

        let delta = acc.finish_pass(centers, n);
        if !control.next(delta) {
            return Ok(delta);
        }
    }
}

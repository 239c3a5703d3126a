use super::{Accelerator, AcceleratorError, DeviceSession, KernelLaunch};
use crate::distance::nearest_center;
use ndarray::ArrayView2;
use rayon::prelude::*;

/// In-process device that runs the `find_nearest_cluster` contract on the
/// rayon pool. Always available; holds its buffers in host memory.
#[derive(Clone, Debug, Default)]
pub struct HostDevice;

impl HostDevice {
    pub fn new() -> Self {
        HostDevice
    }
}

/// Buffers for one fit on a [`HostDevice`].
#[derive(Debug)]
pub struct HostSession {
    clusters: usize,
    dim: usize,
    points: Vec<f64>,
    centers: Vec<f64>,
    membership: Vec<i32>,
    scratch: Vec<f64>,
}

impl Accelerator for HostDevice {
    type Session = HostSession;

    fn probe(&self) -> bool {
        true
    }

    fn name(&self) -> String {
        format!("host ({} threads)", rayon::current_num_threads())
    }

    fn open(&self, launch: &KernelLaunch) -> Result<Self::Session, AcceleratorError> {
        if launch.clusters == 0 || launch.dim == 0 {
            return Err(AcceleratorError::Buffer(format!(
                "cannot allocate buffers for {} clusters of dimension {}",
                launch.clusters, launch.dim
            )));
        }
        Ok(HostSession {
            clusters: launch.clusters,
            dim: launch.dim,
            points: vec![0.0; launch.points * launch.dim],
            centers: vec![0.0; launch.scratch_len()],
            membership: vec![0; launch.points],
            scratch: vec![0.0; launch.scratch_len()],
        })
    }
}

fn copy_into(dst: &mut [f64], src: &[f64], what: &str) -> Result<(), AcceleratorError> {
    if dst.len() != src.len() {
        return Err(AcceleratorError::Transfer(format!(
            "{} buffer holds {} values, got {}",
            what,
            dst.len(),
            src.len()
        )));
    }
    dst.copy_from_slice(src);
    Ok(())
}

impl DeviceSession for HostSession {
    fn upload_points(&mut self, points: &[f64]) -> Result<(), AcceleratorError> {
        copy_into(&mut self.points, points, "point")
    }

    fn upload_centers(&mut self, centers: &[f64]) -> Result<(), AcceleratorError> {
        copy_into(&mut self.centers, centers, "center")
    }

    fn dispatch(&mut self) -> Result<(), AcceleratorError> {
        // Stage centers in scratch, as the kernel does with local memory.
        self.scratch.copy_from_slice(&self.centers);
        let centers = ArrayView2::from_shape((self.clusters, self.dim), &self.scratch)
            .map_err(|e| AcceleratorError::Dispatch(e.to_string()))?;
        let points = ArrayView2::from_shape((self.membership.len(), self.dim), &self.points)
            .map_err(|e| AcceleratorError::Dispatch(e.to_string()))?;

        self.membership
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, label)| {
                *label = nearest_center(points.row(i), centers) as i32;
            });
        Ok(())
    }

    fn read_membership(&mut self, out: &mut [i32]) -> Result<(), AcceleratorError> {
        if out.len() != self.membership.len() {
            return Err(AcceleratorError::Transfer(format!(
                "membership buffer holds {} values, got {}",
                self.membership.len(),
                out.len()
            )));
        }
        out.copy_from_slice(&self.membership);
        Ok(())
    }
}

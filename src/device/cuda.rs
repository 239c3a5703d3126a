//! CUDA backend. The kernel is loaded from a precompiled PTX artifact;
//! the scratch region is passed as dynamic shared memory.

use super::{Accelerator, AcceleratorError, DeviceSession, KernelLaunch};
use cudarc::driver::{
    CudaDevice, CudaFunction, CudaSlice, CudaStream, LaunchAsync, LaunchConfig,
};
use cudarc::nvrtc::Ptx;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

const MODULE_NAME: &str = "kmeans";

// load_ptx wants 'static function names; keep one copy per distinct name.
static KERNEL_NAMES: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

fn intern(name: &str) -> &'static str {
    let mut names = KERNEL_NAMES.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = names.iter().copied().find(|n| *n == name) {
        return existing;
    }
    let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
    names.push(leaked);
    leaked
}

fn as_i32(value: usize, what: &str) -> Result<i32, AcceleratorError> {
    i32::try_from(value)
        .map_err(|_| AcceleratorError::Buffer(format!("{} {} exceeds kernel limits", what, value)))
}

/// A CUDA device selected by ordinal.
#[derive(Clone, Debug, Default)]
pub struct CudaAccelerator {
    ordinal: usize,
}

impl CudaAccelerator {
    pub fn with_ordinal(ordinal: usize) -> Self {
        Self { ordinal }
    }
}

/// Context, stream, kernel and buffers for one fit.
pub struct CudaSession {
    device: Arc<CudaDevice>,
    queue: CudaStream,
    kernel: CudaFunction,
    points: CudaSlice<f64>,
    centers: CudaSlice<f64>,
    membership: CudaSlice<i32>,
    config: LaunchConfig,
    clusters: i32,
    dim: i32,
    count: i32,
}

impl Accelerator for CudaAccelerator {
    type Session = CudaSession;

    fn probe(&self) -> bool {
        match CudaDevice::count() {
            Ok(count) => count as usize > self.ordinal,
            Err(e) => {
                debug!("CUDA probe failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.ordinal)
    }

    fn open(&self, launch: &KernelLaunch) -> Result<Self::Session, AcceleratorError> {
        let clusters = as_i32(launch.clusters, "cluster count")?;
        let dim = as_i32(launch.dim, "dimension")?;
        let count = as_i32(launch.points, "point count")?;
        let block = u32::try_from(launch.work_group_size)
            .map_err(|_| AcceleratorError::Dispatch("work group size too large".to_string()))?;
        let grid = u32::try_from(launch.work_groups())
            .map_err(|_| AcceleratorError::Dispatch("too many work groups".to_string()))?;
        let shared = u32::try_from(launch.scratch_len() * std::mem::size_of::<f64>())
            .map_err(|_| AcceleratorError::Buffer("scratch region too large".to_string()))?;

        let device = CudaDevice::new(self.ordinal)
            .map_err(|e| AcceleratorError::Context(e.to_string()))?;
        let queue = device
            .fork_default_stream()
            .map_err(|e| AcceleratorError::Queue(e.to_string()))?;

        if !launch.kernel_path.is_file() {
            return Err(AcceleratorError::ProgramLoad {
                path: launch.kernel_path.clone(),
                reason: "file not found".to_string(),
            });
        }
        let ptx = Ptx::from_file(&launch.kernel_path);
        let kernel_name = intern(&launch.kernel_name);
        if let Err(e) = device.load_ptx(ptx, MODULE_NAME, &[kernel_name]) {
            let log = e.to_string();
            error!(kernel = kernel_name, "kernel build failed:\n{}", log);
            return Err(AcceleratorError::Build {
                kernel: launch.kernel_name.clone(),
                log,
            });
        }
        let kernel = device
            .get_func(MODULE_NAME, kernel_name)
            .ok_or_else(|| AcceleratorError::KernelMissing(launch.kernel_name.clone()))?;

        let points = device
            .alloc_zeros::<f64>(launch.points * launch.dim)
            .map_err(|e| AcceleratorError::Buffer(e.to_string()))?;
        let centers = device
            .alloc_zeros::<f64>(launch.scratch_len())
            .map_err(|e| AcceleratorError::Buffer(e.to_string()))?;
        let membership = device
            .alloc_zeros::<i32>(launch.points)
            .map_err(|e| AcceleratorError::Buffer(e.to_string()))?;

        Ok(CudaSession {
            device,
            queue,
            kernel,
            points,
            centers,
            membership,
            config: LaunchConfig {
                grid_dim: (grid, 1, 1),
                block_dim: (block, 1, 1),
                shared_mem_bytes: shared,
            },
            clusters,
            dim,
            count,
        })
    }
}

impl DeviceSession for CudaSession {
    fn upload_points(&mut self, points: &[f64]) -> Result<(), AcceleratorError> {
        self.device
            .htod_sync_copy_into(points, &mut self.points)
            .map_err(|e| AcceleratorError::Transfer(e.to_string()))
    }

    fn upload_centers(&mut self, centers: &[f64]) -> Result<(), AcceleratorError> {
        self.device
            .htod_sync_copy_into(centers, &mut self.centers)
            .map_err(|e| AcceleratorError::Transfer(e.to_string()))
    }

    fn dispatch(&mut self) -> Result<(), AcceleratorError> {
        let params = (
            self.clusters,
            self.dim,
            self.count,
            &self.points,
            &self.centers,
            &mut self.membership,
        );
        // SAFETY: parameter order and types match the find_nearest_cluster
        // signature, and every buffer was sized from the same launch shape.
        unsafe {
            self.kernel
                .clone()
                .launch_on_stream(&self.queue, self.config, params)
        }
        .map_err(|e| AcceleratorError::Dispatch(e.to_string()))?;
        self.device
            .synchronize()
            .map_err(|e| AcceleratorError::Dispatch(e.to_string()))
    }

    fn read_membership(&mut self, out: &mut [i32]) -> Result<(), AcceleratorError> {
        self.device
            .dtoh_sync_copy_into(&self.membership, out)
            .map_err(|e| AcceleratorError::Transfer(e.to_string()))
    }
}

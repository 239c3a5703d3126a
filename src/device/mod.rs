//! Accelerator plumbing for the offloaded assignment step.
//!
//! An [`Accelerator`] is probed once when the engine is built. Each fit that
//! uses it opens a fresh [`DeviceSession`], which owns every device resource
//! (context, queue, program, kernel, buffers) and releases them on drop.
//!
//! The kernel is a black box with a fixed parameter order:
//!
//! 1. cluster count
//! 2. feature dimensionality
//! 3. point count
//! 4. read-only point buffer (`n × dim`, uploaded once per fit)
//! 5. read-only center buffer (`k × dim`, uploaded every pass)
//! 6. write-only membership buffer (`n` indices, read back every pass)
//! 7. local scratch region of `k × dim` values

mod host;

#[cfg(feature = "cuda")]
mod cuda;

pub use host::{HostDevice, HostSession};

#[cfg(feature = "cuda")]
pub use cuda::{CudaAccelerator, CudaSession};

use crate::config::AcceleratorConfig;
use std::path::PathBuf;
use thiserror::Error;

/// Failures in the device layer. All of them are fatal for the fit in progress.
#[derive(Debug, Error)]
pub enum AcceleratorError {
    #[error("no compute device available")]
    NoDevice,

    #[error("failed to create device context: {0}")]
    Context(String),

    #[error("failed to create command queue: {0}")]
    Queue(String),

    #[error("failed to load kernel program {path:?}: {reason}")]
    ProgramLoad { path: PathBuf, reason: String },

    #[error("failed to build kernel `{kernel}`:\n{log}")]
    Build { kernel: String, log: String },

    #[error("kernel `{0}` not found in program")]
    KernelMissing(String),

    #[error("failed to allocate device buffer: {0}")]
    Buffer(String),

    #[error("kernel dispatch failed: {0}")]
    Dispatch(String),

    #[error("device transfer failed: {0}")]
    Transfer(String),

    #[error("device assigned point {index} to cluster {value}, but only {clusters} clusters exist")]
    InvalidMembership {
        index: usize,
        value: i32,
        clusters: usize,
    },
}

/// Shape and location of one assignment-kernel launch.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelLaunch {
    pub kernel_path: PathBuf,
    pub kernel_name: String,
    pub clusters: usize,
    pub dim: usize,
    pub points: usize,
    pub work_group_size: usize,
}

impl KernelLaunch {
    pub fn new(config: &AcceleratorConfig, clusters: usize, dim: usize, points: usize) -> Self {
        Self {
            kernel_path: config.kernel_path.clone(),
            kernel_name: config.kernel_name.clone(),
            clusters,
            dim,
            points,
            work_group_size: config.work_group_size,
        }
    }

    /// Length of the kernel-local scratch region, in values.
    pub fn scratch_len(&self) -> usize {
        self.clusters * self.dim
    }

    /// Point count rounded up to a whole number of work groups.
    pub fn global_size(&self) -> usize {
        self.work_groups() * self.work_group_size
    }

    pub fn work_groups(&self) -> usize {
        self.points.div_ceil(self.work_group_size)
    }
}

/// A compute device that can run the assignment kernel.
pub trait Accelerator {
    type Session: DeviceSession;

    /// Whether at least one usable device is present. Must not fail.
    fn probe(&self) -> bool;

    /// Human-readable device description for logs.
    fn name(&self) -> String;

    /// Acquire context, queue, program, kernel and buffers for one fit.
    fn open(&self, launch: &KernelLaunch) -> Result<Self::Session, AcceleratorError>;
}

/// Resources for a single fit. Dropping the session releases them.
pub trait DeviceSession {
    fn upload_points(&mut self, points: &[f64]) -> Result<(), AcceleratorError>;

    fn upload_centers(&mut self, centers: &[f64]) -> Result<(), AcceleratorError>;

    /// Run the kernel over every point and block until it finishes.
    fn dispatch(&mut self) -> Result<(), AcceleratorError>;

    fn read_membership(&mut self, out: &mut [i32]) -> Result<(), AcceleratorError>;
}

/// Stand-in used when the crate is built without any device backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAccelerator;

/// Never constructed; exists so [`NoAccelerator`] can name a session type.
#[derive(Debug)]
pub enum NoSession {}

impl Accelerator for NoAccelerator {
    type Session = NoSession;

    fn probe(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        "none".to_string()
    }

    fn open(&self, _launch: &KernelLaunch) -> Result<Self::Session, AcceleratorError> {
        Err(AcceleratorError::NoDevice)
    }
}

impl DeviceSession for NoSession {
    fn upload_points(&mut self, _points: &[f64]) -> Result<(), AcceleratorError> {
        match *self {}
    }

    fn upload_centers(&mut self, _centers: &[f64]) -> Result<(), AcceleratorError> {
        match *self {}
    }

    fn dispatch(&mut self) -> Result<(), AcceleratorError> {
        match *self {}
    }

    fn read_membership(&mut self, _out: &mut [i32]) -> Result<(), AcceleratorError> {
        match *self {}
    }
}

/// The device backend compiled into this build.
#[cfg(feature = "cuda")]
pub type PlatformAccelerator = CudaAccelerator;

/// The device backend compiled into this build.
#[cfg(not(feature = "cuda"))]
pub type PlatformAccelerator = NoAccelerator;

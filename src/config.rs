use crate::error::{KMeansError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CLUSTERS: usize = 8;
pub const DEFAULT_THRESHOLD: f64 = 0.0001;
pub const DEFAULT_MAX_ITERATIONS: usize = 500;
pub const DEFAULT_KERNEL_NAME: &str = "find_nearest_cluster";
pub const DEFAULT_KERNEL_PATH: &str = "kmeans_kernel.ptx";
pub const DEFAULT_WORK_GROUP_SIZE: usize = 256;

/// Configuration for the clustering engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters (`k`).
    pub n_clusters: usize,

    /// Fraction of points allowed to change cluster before the loop stops.
    /// A negative value disables early stopping.
    pub threshold: f64,

    /// Iteration cap. The loop runs at most `max_iterations + 1` passes.
    pub max_iterations: usize,

    /// Device-side settings, used only when an accelerator was detected.
    pub accelerator: AcceleratorConfig,
}

/// Where to find the assignment kernel and how to launch it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorConfig {
    /// Path of the separately compiled kernel artifact.
    pub kernel_path: PathBuf,

    /// Entry point inside the artifact.
    pub kernel_name: String,

    /// Threads per work group; the global size is rounded up to a multiple of it.
    pub work_group_size: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: DEFAULT_CLUSTERS,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            accelerator: AcceleratorConfig::default(),
        }
    }
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            kernel_path: PathBuf::from(DEFAULT_KERNEL_PATH),
            kernel_name: DEFAULT_KERNEL_NAME.to_string(),
            work_group_size: DEFAULT_WORK_GROUP_SIZE,
        }
    }
}

impl KMeansConfig {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_accelerator(mut self, accelerator: AcceleratorConfig) -> Self {
        self.accelerator = accelerator;
        self
    }

    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: KMeansConfig =
            serde_yaml::from_str(content).map_err(|e| KMeansError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| KMeansError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| KMeansError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(KMeansError::InvalidClusterCount);
        }
        if !self.threshold.is_finite() {
            return Err(KMeansError::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        self.accelerator.validate()
    }
}

impl AcceleratorConfig {
    pub fn with_kernel_path(mut self, kernel_path: impl Into<PathBuf>) -> Self {
        self.kernel_path = kernel_path.into();
        self
    }

    pub fn with_kernel_name(mut self, kernel_name: impl Into<String>) -> Self {
        self.kernel_name = kernel_name.into();
        self
    }

    pub fn with_work_group_size(mut self, work_group_size: usize) -> Self {
        self.work_group_size = work_group_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.kernel_name.trim().is_empty() {
            return Err(KMeansError::InvalidConfig(
                "kernel name must not be empty".to_string(),
            ));
        }
        if self.work_group_size == 0 {
            return Err(KMeansError::InvalidConfig(
                "work group size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

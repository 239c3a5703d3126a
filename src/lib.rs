pub mod classifier;
pub mod config;
pub mod device;
pub mod distance;
pub mod error;
pub mod kmeans;
pub mod utils;

pub use classifier::{Classifier, ClusterLabeler};
pub use config::{AcceleratorConfig, KMeansConfig};
pub use device::{Accelerator, AcceleratorError, DeviceSession, HostDevice, PlatformAccelerator};
pub use error::{KMeansError, Result};
pub use kmeans::{FitReport, KMeans, StrategyKind};

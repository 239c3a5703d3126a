use lloyd_kmeans::utils::{generate_blobs, inertia};
use lloyd_kmeans::{KMeans, KMeansConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional first argument: path to a YAML config file.
    let config = match std::env::args().nth(1) {
        Some(path) => match KMeansConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                std::process::exit(2);
            }
        },
        None => KMeansConfig::new(4),
    };

    let k = config.n_clusters;
    let (points, _) = generate_blobs(k, 2_500, 16, 12.0, 2.0, 42);
    info!(
        "Generated {} points of dimension {} in {} blobs",
        points.nrows(),
        points.ncols(),
        k
    );

    let mut kmeans = match KMeans::with_config(config) {
        Ok(kmeans) => kmeans,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    info!("Using {} strategy", kmeans.strategy());

    match kmeans.fit(points.view()) {
        Ok(report) => info!(
            "Finished after {} passes (delta {:.6}, converged: {})",
            report.passes, report.delta, report.converged
        ),
        Err(e) => {
            error!("Fit failed: {}", e);
            std::process::exit(1);
        }
    }

    if let (Some(centers), Some(labels)) = (kmeans.centers(), kmeans.labels()) {
        info!("Inertia: {:.3}", inertia(points.view(), centers, labels));
        for (i, center) in centers.rows().into_iter().enumerate() {
            let size = labels.iter().filter(|&&l| l == i).count();
            let head: Vec<f64> = center.iter().take(2).copied().collect();
            info!("  cluster {}: {} points, starts at {:?}", i, size, head);
        }
    }
}

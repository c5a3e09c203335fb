//! K-Means segmentation model over linfa-clustering

use linfa::prelude::*;
use linfa::Dataset;
use linfa_clustering::{KMeans, KMeansInit};
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// K-Means hyperparameters shared by the elbow sweep and the final fit
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Maximum iterations per run
    pub max_iters: u64,
    /// Number of restarts; the run with the lowest WCSS is kept
    pub n_init: usize,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Seed for centroid initialization
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iters: 300,
            n_init: 10,
            tolerance: 1e-4,
            seed: 0,
        }
    }
}

/// Fitted segmentation model
pub struct SegmentModel {
    /// Fitted K-Means model from linfa
    pub model: KMeans<f64, L2Dist>,
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster assignments for the training points
    pub labels: Array1<usize>,
    /// Cluster centroids in feature space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares
    pub wcss: f64,
}

impl SegmentModel {
    /// Get cluster sizes
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Fit a K-Means segmentation model
///
/// Uses k-means++ initialization with a seeded generator and `n_init`
/// restarts, so the assignment is reproducible for a fixed configuration.
///
/// # Arguments
/// * `points` - Feature matrix (n_records, n_features)
/// * `n_clusters` - Number of clusters K
/// * `config` - Iteration, restart and seeding parameters
///
/// # Returns
/// * Fitted `SegmentModel` with assignments and WCSS
pub fn fit_segments(
    points: ArrayView2<f64>,
    n_clusters: usize,
    config: &KMeansConfig,
) -> crate::Result<SegmentModel> {
    if n_clusters == 0 {
        anyhow::bail!("number of clusters must be at least 1");
    }
    if points.nrows() < n_clusters {
        anyhow::bail!(
            "number of data points ({}) must be at least the number of clusters ({})",
            points.nrows(),
            n_clusters
        );
    }
    let distinct = count_distinct_rows(points);
    if distinct < n_clusters {
        anyhow::bail!(
            "only {} distinct points for {} clusters; reduce the cluster count",
            distinct,
            n_clusters
        );
    }

    let dataset = Dataset::from(points.to_owned());
    let rng = StdRng::seed_from_u64(config.seed);
    let model = KMeans::params_with(n_clusters, rng, L2Dist)
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(config.n_init)
        .max_n_iterations(config.max_iters)
        .tolerance(config.tolerance)
        .fit(&dataset)?;

    let labels = model.predict(&dataset);
    let centroids = model.centroids().clone();
    let wcss = compute_wcss(points, &labels, &centroids);

    Ok(SegmentModel {
        model,
        n_clusters,
        labels,
        centroids,
        wcss,
    })
}

/// Record the WCSS for K = 1..=k_max so a cluster count can be picked off
/// the elbow plot
pub fn elbow_sweep(
    points: ArrayView2<f64>,
    k_max: usize,
    config: &KMeansConfig,
) -> crate::Result<Vec<(usize, f64)>> {
    if k_max == 0 {
        anyhow::bail!("elbow sweep needs at least one candidate K");
    }

    let mut curve = Vec::with_capacity(k_max);
    for k in 1..=k_max {
        let model = fit_segments(points, k, config)?;
        curve.push((k, model.wcss));
    }
    Ok(curve)
}

/// Compute within-cluster sum of squares
fn compute_wcss(points: ArrayView2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut wcss = 0.0;
    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = points.row(i);
            let centroid = centroids.row(cluster);
            let distance_sq: f64 = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            wcss += distance_sq;
        }
    }
    wcss
}

fn count_distinct_rows(points: ArrayView2<f64>) -> usize {
    let mut seen = HashSet::new();
    for row in points.outer_iter() {
        let key: Vec<u64> = row.iter().map(|v| v.to_bits()).collect();
        seen.insert(key);
    }
    seen.len()
}

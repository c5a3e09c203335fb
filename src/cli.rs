//! Command-line interface definitions and argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::kmeans::KMeansConfig;
use crate::som::SomConfig;

/// Customer analytics CLI: SOM fraud mapping and K-Means segmentation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train a self-organizing map over credit applications and flag outlier cells
    Fraud(FraudArgs),

    /// Segment mall customers by income and spending score with K-Means
    Segment(SegmentArgs),
}

#[derive(ClapArgs, Debug)]
pub struct FraudArgs {
    /// Path to the credit applications CSV (15 feature columns + approval label)
    #[arg(short, long, default_value = "Credit_Card_Applications.csv")]
    pub input: String,

    /// Output path for the distance-map plot
    #[arg(short, long, default_value = "som_map.png")]
    pub output: String,

    /// Optional CSV export path for the flagged-customer table
    #[arg(long)]
    pub flagged_output: Option<String>,

    /// Map width in cells
    #[arg(long, default_value = "10")]
    pub grid_width: usize,

    /// Map height in cells
    #[arg(long, default_value = "10")]
    pub grid_height: usize,

    /// Neighborhood radius at the start of training
    #[arg(long, default_value = "1.0")]
    pub sigma: f64,

    /// Weight update step size at the start of training
    #[arg(long, default_value = "0.5")]
    pub learning_rate: f64,

    /// Number of training iterations
    #[arg(long, default_value = "100")]
    pub iterations: usize,

    /// Normalized mean interneuron distance above which a cell is flagged
    #[arg(long, default_value = "0.95")]
    pub threshold: f64,

    /// Random seed for weight initialization and sample draws
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl FraudArgs {
    /// Build the map configuration for `input_len` feature columns
    pub fn som_config(&self, input_len: usize) -> SomConfig {
        SomConfig {
            width: self.grid_width,
            height: self.grid_height,
            input_len,
            sigma: self.sigma,
            learning_rate: self.learning_rate,
            iterations: self.iterations,
            seed: self.seed,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct SegmentArgs {
    /// Path to the mall customers CSV
    #[arg(short, long, default_value = "Mall_Customers.csv")]
    pub input: String,

    /// Output path for the cluster scatter plot
    #[arg(short, long, default_value = "cluster_plot.png")]
    pub output: String,

    /// Output path for the elbow-method plot
    #[arg(long, default_value = "elbow.png")]
    pub elbow_output: String,

    /// Number of clusters for the final fit
    #[arg(short = 'k', long, default_value = "5")]
    pub clusters: usize,

    /// Largest K tried by the elbow sweep (K = 1..=k_max)
    #[arg(long, default_value = "10")]
    pub k_max: usize,

    /// Maximum iterations per K-Means run
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Number of restarts; the run with the lowest WCSS is kept
    #[arg(long, default_value = "10")]
    pub n_init: usize,

    /// Convergence tolerance for K-Means
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Random seed for centroid initialization
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl SegmentArgs {
    pub fn kmeans_config(&self) -> KMeansConfig {
        KMeansConfig {
            max_iters: self.max_iters,
            n_init: self.n_init,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_defaults() {
        let cli = Cli::parse_from(["clustermap", "fraud"]);
        match cli.command {
            Command::Fraud(args) => {
                assert_eq!(args.grid_width, 10);
                assert_eq!(args.grid_height, 10);
                assert_eq!(args.sigma, 1.0);
                assert_eq!(args.learning_rate, 0.5);
                assert_eq!(args.iterations, 100);
                assert_eq!(args.threshold, 0.95);
                assert_eq!(args.seed, 0);

                let config = args.som_config(15);
                assert_eq!(config.input_len, 15);
                assert_eq!(config.width, 10);
            }
            _ => panic!("expected fraud subcommand"),
        }
    }

    #[test]
    fn test_segment_defaults() {
        let cli = Cli::parse_from(["clustermap", "segment"]);
        match cli.command {
            Command::Segment(args) => {
                assert_eq!(args.clusters, 5);
                assert_eq!(args.k_max, 10);
                assert_eq!(args.max_iters, 300);
                assert_eq!(args.n_init, 10);
                assert_eq!(args.tolerance, 1e-4);
                assert_eq!(args.seed, 0);
            }
            _ => panic!("expected segment subcommand"),
        }
    }

    #[test]
    fn test_overridden_threshold() {
        let cli = Cli::parse_from(["clustermap", "fraud", "--threshold", "0.9", "-i", "apps.csv"]);
        match cli.command {
            Command::Fraud(args) => {
                assert_eq!(args.threshold, 0.9);
                assert_eq!(args.input, "apps.csv");
            }
            _ => panic!("expected fraud subcommand"),
        }
    }
}

//! ClusterMap: customer analytics CLI combining SOM-based fraud mapping
//! and K-Means customer segmentation
//!
//! This library provides two independent batch pipelines: training a
//! self-organizing map over credit-card applications to surface outlier
//! customers, and K-Means clustering of mall customers by annual income
//! and spending score.

pub mod cli;
pub mod data;
pub mod fraud;
pub mod kmeans;
pub mod scaling;
pub mod som;
pub mod viz;

// Re-export public items for easier access
pub use cli::{Cli, Command, FraudArgs, SegmentArgs};
pub use data::{load_credit_applications, load_mall_customers, CreditDataset, MallDataset};
pub use fraud::{flag_customers, FlaggedCustomers};
pub use kmeans::{elbow_sweep, fit_segments, KMeansConfig, SegmentModel};
pub use scaling::MinMaxScaler;
pub use som::{train_som, SomConfig, TrainedSom};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;

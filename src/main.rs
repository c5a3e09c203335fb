//! ClusterMap entrypoint: dispatches the fraud-mapping and segmentation
//! pipelines

use anyhow::Result;
use clap::Parser;
use clustermap::{
    elbow_sweep, fit_segments, flag_customers, fraud, load_credit_applications,
    load_mall_customers, train_som, viz, Cli, Command, FraudArgs, MinMaxScaler, SegmentArgs,
};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fraud(args) => run_fraud_pipeline(&args),
        Command::Segment(args) => run_segment_pipeline(&args),
    }
}

/// Run the SOM fraud-mapping pipeline
fn run_fraud_pipeline(args: &FraudArgs) -> Result<()> {
    println!("=== Fraud Mapping Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load the credit applications table
    if args.verbose {
        println!("Step 1: Loading credit applications");
        println!("  Input file: {}", args.input);
    }
    let dataset = load_credit_applications(&args.input)?;
    println!("✓ Data loaded: {} applications", dataset.labels.len());

    // Step 2: Scale features to [0, 1]
    let (scaler, scaled) = MinMaxScaler::fit_transform(dataset.features.view(), 0.0, 1.0)?;
    if args.verbose {
        println!("  Features scaled: {:?}", scaled.shape());
    }

    // Step 3: Train the map
    let config = args.som_config(scaler.n_features());
    if args.verbose {
        println!("\nStep 2: Training the self-organizing map");
        println!("  Grid: {}x{}", config.width, config.height);
        println!("  Sigma: {}", config.sigma);
        println!("  Learning rate: {}", config.learning_rate);
        println!("  Iterations: {}", config.iterations);
    }

    let train_start = Instant::now();
    let som = train_som(&config, scaled.view())?;
    println!("✓ Map trained");
    if args.verbose {
        println!("  Training time: {:.2}s", train_start.elapsed().as_secs_f64());
    }

    // Step 4: Flag customers on outlier cells
    let flagged = flag_customers(&som, scaled.view(), &scaler, args.threshold)?;
    println!(
        "✓ {} customers flagged across {} cells (threshold {})",
        flagged.len(),
        flagged.cells.len(),
        args.threshold
    );

    fraud::print_flagged_table(&flagged);
    if let Some(path) = &args.flagged_output {
        fraud::export_flagged_csv(&flagged, &dataset.headers, path)?;
        println!("Flagged table saved to: {}", path);
    }

    // Step 5: Render the distance map
    if args.verbose {
        println!("\nStep 3: Generating the distance-map plot");
        println!("  Output file: {}", args.output);
    }
    viz::render_distance_map(&som, scaled.view(), &dataset.labels, &args.output)?;

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Run the K-Means segmentation pipeline
fn run_segment_pipeline(args: &SegmentArgs) -> Result<()> {
    println!("=== Customer Segmentation Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load the mall customers table
    if args.verbose {
        println!("Step 1: Loading mall customers");
        println!("  Input file: {}", args.input);
    }
    let dataset = load_mall_customers(&args.input)?;
    println!("✓ Data loaded: {} customers", dataset.customer_ids.len());

    let config = args.kmeans_config();

    // Step 2: Elbow sweep over candidate cluster counts
    if args.verbose {
        println!("\nStep 2: Elbow sweep for K = 1..={}", args.k_max);
    }
    let sweep_start = Instant::now();
    let curve = elbow_sweep(dataset.points.view(), args.k_max, &config)?;
    println!("✓ Elbow sweep complete");
    if args.verbose {
        for &(k, wcss) in &curve {
            println!("  K = {:2}: WCSS = {:.2}", k, wcss);
        }
        println!("  Sweep time: {:.2}s", sweep_start.elapsed().as_secs_f64());
    }
    viz::render_elbow(&curve, &args.elbow_output)?;

    // Step 3: Final fit with the chosen cluster count
    if args.verbose {
        println!("\nStep 3: Fitting final model");
        println!("  Number of clusters: {}", args.clusters);
        println!("  Max iterations: {}", args.max_iters);
        println!("  Restarts: {}", args.n_init);
    }
    let model = fit_segments(dataset.points.view(), args.clusters, &config)?;
    println!("✓ Model fitted (WCSS: {:.2})", model.wcss);

    viz::print_segment_statistics(&dataset, &model);

    // Step 4: Render the cluster scatter plot
    if args.verbose {
        println!("\nStep 4: Generating the cluster plot");
        println!("  Output file: {}", args.output);
    }
    viz::render_segments(dataset.points.view(), &model, &args.output)?;

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

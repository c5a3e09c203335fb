//! Visualization functions using Plotters for both pipelines

use crate::data::MallDataset;
use crate::kmeans::SegmentModel;
use crate::som::TrainedSom;
use ndarray::ArrayView2;
use plotters::prelude::*;

/// Color palette for different clusters
const CLUSTER_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, CYAN, MAGENTA];

/// Render the distance map as a grayscale heat-map with one marker per
/// customer on its winning cell
///
/// Lighter cells carry a larger mean interneuron distance. Markers encode
/// the approval label: hollow red circle = rejected application, hollow
/// green square = approved.
///
/// # Arguments
/// * `som` - Trained map
/// * `scaled` - The scaled feature matrix the map was trained on
/// * `labels` - Approval label per record (1 = approved)
/// * `output_path` - Path to save the PNG plot
pub fn render_distance_map(
    som: &TrainedSom,
    scaled: ArrayView2<f64>,
    labels: &[u8],
    output_path: &str,
) -> crate::Result<()> {
    if labels.len() != scaled.nrows() {
        anyhow::bail!(
            "{} labels for {} records",
            labels.len(),
            scaled.nrows()
        );
    }

    let dist = som.distance_map();

    let root = BitMapBackend::new(output_path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("SOM Mean Interneuron Distance", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0f64..som.width as f64, 0f64..som.height as f64)?;

    chart
        .configure_mesh()
        .x_desc("Grid Column")
        .y_desc("Grid Row")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // Heat-map cells
    for r in 0..som.height {
        for c in 0..som.width {
            let shade = (dist[[r, c]] * 255.0).round() as u8;
            let color = RGBColor(shade, shade, shade);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(c as f64, r as f64), (c as f64 + 1.0, r as f64 + 1.0)],
                color.filled(),
            )))?;
        }
    }

    // Marker per customer at the center of its winning cell
    let mut approved_in_legend = false;
    let mut rejected_in_legend = false;
    for (i, record) in scaled.outer_iter().enumerate() {
        let (r, c) = som.winner(record);
        let (x, y) = (c as f64 + 0.5, r as f64 + 0.5);

        if labels[i] == 1 {
            let series = chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.18, y - 0.18), (x + 0.18, y + 0.18)],
                GREEN.stroke_width(2),
            )))?;
            if !approved_in_legend {
                series.label("Approved").legend(|(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], GREEN.stroke_width(2))
                });
                approved_in_legend = true;
            }
        } else {
            let series =
                chart.draw_series(std::iter::once(Circle::new((x, y), 9, RED.stroke_width(2))))?;
            if !rejected_in_legend {
                series
                    .label("Rejected")
                    .legend(|(x, y)| Circle::new((x + 5, y), 5, RED.stroke_width(2)));
                rejected_in_legend = true;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    println!("Distance map saved to: {}", output_path);

    Ok(())
}

/// Render the WCSS-vs-K elbow curve
pub fn render_elbow(curve: &[(usize, f64)], output_path: &str) -> crate::Result<()> {
    if curve.is_empty() {
        anyhow::bail!("elbow curve is empty");
    }

    let k_max = curve[curve.len() - 1].0 as f64;
    let max_wcss = curve.iter().map(|&(_, w)| w).fold(0.0f64, f64::max);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("The Elbow Method", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..(k_max + 1.0), 0f64..(max_wcss * 1.05))?;

    chart
        .configure_mesh()
        .x_desc("Number of Clusters")
        .y_desc("WCSS")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        curve.iter().map(|&(k, w)| (k as f64, w)),
        &BLUE,
    ))?;
    chart.draw_series(
        curve
            .iter()
            .map(|&(k, w)| Circle::new((k as f64, w), 4, BLUE.filled())),
    )?;

    root.present()?;
    println!("Elbow plot saved to: {}", output_path);

    Ok(())
}

/// Render the cluster scatter plot with centroids overlaid
///
/// # Arguments
/// * `points` - Feature matrix (n_records, 2): income, spending score
/// * `model` - Fitted segmentation model
/// * `output_path` - Path to save the PNG plot
pub fn render_segments(
    points: ArrayView2<f64>,
    model: &SegmentModel,
    output_path: &str,
) -> crate::Result<()> {
    let x_values: Vec<f64> = points.column(0).to_vec();
    let y_values: Vec<f64> = points.column(1).to_vec();

    // Plot bounds with some padding
    let x_min = x_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 5.0;
    let x_max = x_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 5.0;
    let y_min = y_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 5.0;
    let y_max = y_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 5.0;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Clusters of Clients", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Annual Income (k$)")
        .y_desc("Spending Score (1-100)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // One series per cluster so each gets a legend entry
    for cluster in 0..model.n_clusters {
        let color = CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()];
        let members: Vec<(f64, f64)> = points
            .outer_iter()
            .zip(model.labels.iter())
            .filter(|(_, &label)| label == cluster)
            .map(|(p, _)| (p[0], p[1]))
            .collect();

        chart
            .draw_series(
                members
                    .into_iter()
                    .map(move |(x, y)| Circle::new((x, y), 4, color.filled())),
            )?
            .label(format!("Cluster {}", cluster))
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    // Centroids on top
    chart
        .draw_series(
            model
                .centroids
                .outer_iter()
                .map(|c| Cross::new((c[0], c[1]), 8, BLACK.stroke_width(3))),
        )?
        .label("Centroids")
        .legend(|(x, y)| Cross::new((x + 5, y), 5, BLACK.stroke_width(3)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    println!("Cluster plot saved to: {}", output_path);

    Ok(())
}

/// Print cluster statistics to console
pub fn print_segment_statistics(mall: &MallDataset, model: &SegmentModel) {
    println!("\n=== Cluster Statistics ===");
    println!("Number of clusters: {}", model.n_clusters);
    println!("Total customers: {}", mall.customer_ids.len());
    println!("Within-cluster sum of squares: {:.2}", model.wcss);

    let cluster_sizes = model.cluster_sizes();
    println!("\nCluster sizes:");
    for (i, &size) in cluster_sizes.iter().enumerate() {
        let percentage = (size as f64 / mall.customer_ids.len() as f64) * 100.0;
        println!("  Cluster {}: {} customers ({:.1}%)", i, size, percentage);
    }

    println!("\nCluster centroids:");
    println!("  Cluster | Income (k$) | Spending Score");
    println!("  --------|-------------|---------------");
    for (i, centroid) in model.centroids.outer_iter().enumerate() {
        println!("  {:7} | {:11.2} | {:14.2}", i, centroid[0], centroid[1]);
    }
}

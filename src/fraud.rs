//! Outlier-cell selection: turns a trained map into a flagged-customer table

use crate::scaling::MinMaxScaler;
use crate::som::TrainedSom;
use ndarray::{Array2, ArrayView2};

/// Customers mapped to outlier cells, restored to original feature space
#[derive(Debug)]
pub struct FlaggedCustomers {
    /// Cells whose normalized distance exceeded the threshold, row-major
    pub cells: Vec<(usize, usize)>,
    /// Input-row index of each flagged customer, in cell order
    pub row_indices: Vec<usize>,
    /// Winning cell of each flagged customer, parallel to `row_indices`
    pub cell_of: Vec<(usize, usize)>,
    /// Flagged customers in original (unscaled) units, one row each
    pub records: Array2<f64>,
}

impl FlaggedCustomers {
    pub fn len(&self) -> usize {
        self.row_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_indices.is_empty()
    }
}

/// Select every cell whose normalized mean interneuron distance strictly
/// exceeds `threshold` and collect the customers those cells won
///
/// Cells are enumerated in row-major order, so repeated runs on the same
/// trained map produce the same table in the same order. No deduplication
/// is needed: each record belongs to exactly one cell.
///
/// # Arguments
/// * `som` - Trained map
/// * `scaled` - The scaled feature matrix the map was trained on
/// * `scaler` - The scaler fitted on the raw table, used to restore units
/// * `threshold` - Cells score in [0, 1]; flag those strictly above this
///
/// # Returns
/// * `FlaggedCustomers` with records in original feature space
pub fn flag_customers(
    som: &TrainedSom,
    scaled: ArrayView2<f64>,
    scaler: &MinMaxScaler,
    threshold: f64,
) -> crate::Result<FlaggedCustomers> {
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("threshold must lie in [0, 1], got {threshold}");
    }

    let dist = som.distance_map();
    let mapping = som.win_map(scaled);

    let mut cells = Vec::new();
    let mut row_indices = Vec::new();
    let mut cell_of = Vec::new();
    for r in 0..som.height {
        for c in 0..som.width {
            if dist[[r, c]] > threshold {
                cells.push((r, c));
                if let Some(rows) = mapping.get(&(r, c)) {
                    for &idx in rows {
                        row_indices.push(idx);
                        cell_of.push((r, c));
                    }
                }
            }
        }
    }

    let mut flagged_scaled = Array2::zeros((row_indices.len(), scaled.ncols()));
    for (out_row, &idx) in row_indices.iter().enumerate() {
        flagged_scaled.row_mut(out_row).assign(&scaled.row(idx));
    }
    let records = scaler.inverse_transform(flagged_scaled.view())?;

    Ok(FlaggedCustomers {
        cells,
        row_indices,
        cell_of,
        records,
    })
}

/// Print the flagged table to stdout. Column 0 holds the customer id;
/// remaining features print in original units.
pub fn print_flagged_table(flagged: &FlaggedCustomers) {
    if flagged.is_empty() {
        println!("\nNo cells exceeded the threshold; nothing to flag.");
        return;
    }

    println!("\n=== Flagged Customers ===");
    println!(
        "{} customers across {} outlier cells",
        flagged.len(),
        flagged.cells.len()
    );
    println!("    cell | customer | features");
    println!("  -------|----------|---------");
    for (i, record) in flagged.records.outer_iter().enumerate() {
        let (r, c) = flagged.cell_of[i];
        let features: Vec<String> = record.iter().skip(1).map(|v| format!("{v:.2}")).collect();
        println!("  ({}, {}) | {:>8.0} | {}", r, c, record[0], features.join(", "));
    }
}

/// Write the flagged table as CSV: winning cell coordinates followed by the
/// original feature columns
pub fn export_flagged_csv(
    flagged: &FlaggedCustomers,
    headers: &[String],
    output_path: &str,
) -> crate::Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    let mut header_row = vec!["cell_row".to_string(), "cell_col".to_string()];
    header_row.extend(headers.iter().cloned());
    wtr.write_record(&header_row)?;

    for (i, record) in flagged.records.outer_iter().enumerate() {
        let (r, c) = flagged.cell_of[i];
        let mut row = vec![r.to_string(), c.to_string()];
        // The id column round-trips through scaling; write it as an integer
        row.push(format!("{:.0}", record[0]));
        row.extend(record.iter().skip(1).map(|v| v.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::som::TrainedSom;
    use ndarray::{Array2, Array3};

    // A 2x2 grid where cell (1, 1) sits far from the others, so its mean
    // neighbor distance normalizes to 1 and every other cell stays low.
    fn outlier_som() -> TrainedSom {
        let mut weights = Array3::zeros((2, 2, 2));
        weights[[0, 0, 0]] = 0.0;
        weights[[0, 0, 1]] = 0.0;
        weights[[0, 1, 0]] = 0.1;
        weights[[0, 1, 1]] = 0.0;
        weights[[1, 0, 0]] = 0.0;
        weights[[1, 0, 1]] = 0.1;
        weights[[1, 1, 0]] = 1.0;
        weights[[1, 1, 1]] = 1.0;
        TrainedSom {
            weights,
            width: 2,
            height: 2,
        }
    }

    fn scaled_records() -> Array2<f64> {
        // Two records near the (0, 0) prototype, one on the outlier cell
        Array2::from_shape_vec((3, 2), vec![0.0, 0.05, 0.05, 0.0, 0.95, 0.98]).unwrap()
    }

    fn identity_scaler(data: &Array2<f64>) -> MinMaxScaler {
        MinMaxScaler::fit(data.view(), 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_outlier_cell_flagged() {
        let som = outlier_som();
        let data = scaled_records();
        let scaler = identity_scaler(&data);

        let flagged = flag_customers(&som, data.view(), &scaler, 0.9).unwrap();

        assert_eq!(flagged.cells, vec![(1, 1)]);
        assert_eq!(flagged.row_indices, vec![2]);
        assert_eq!(flagged.cell_of, vec![(1, 1)]);
        assert_eq!(flagged.records.nrows(), 1);
    }

    #[test]
    fn test_strict_threshold_at_one_flags_nothing() {
        let som = outlier_som();
        let data = scaled_records();
        let scaler = identity_scaler(&data);

        // The normalized map tops out at exactly 1.0; strict comparison
        // keeps even the maximal cell out at threshold 1.0
        let flagged = flag_customers(&som, data.view(), &scaler, 1.0).unwrap();
        assert!(flagged.is_empty());
        assert!(flagged.cells.is_empty());
    }

    #[test]
    fn test_threshold_monotonicity() {
        let som = outlier_som();
        let data = scaled_records();
        let scaler = identity_scaler(&data);

        let loose = flag_customers(&som, data.view(), &scaler, 0.1).unwrap();
        let tight = flag_customers(&som, data.view(), &scaler, 0.9).unwrap();

        assert!(tight.len() <= loose.len());
        for idx in &tight.row_indices {
            assert!(loose.row_indices.contains(idx));
        }
    }

    #[test]
    fn test_invalid_threshold() {
        let som = outlier_som();
        let data = scaled_records();
        let scaler = identity_scaler(&data);

        assert!(flag_customers(&som, data.view(), &scaler, -0.1).is_err());
        assert!(flag_customers(&som, data.view(), &scaler, 1.5).is_err());
    }

    #[test]
    fn test_export_csv() {
        use tempfile::tempdir;

        let som = outlier_som();
        let data = scaled_records();
        let scaler = identity_scaler(&data);
        let flagged = flag_customers(&som, data.view(), &scaler, 0.9).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("flagged.csv");
        let headers = vec!["CustomerID".to_string(), "A1".to_string()];
        export_flagged_csv(&flagged, &headers, path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("cell_row,cell_col,CustomerID,A1"));
        assert_eq!(contents.lines().count(), 2);
    }
}

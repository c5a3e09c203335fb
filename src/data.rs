//! CSV ingestion with declared schemas for both input tables

use anyhow::Context;
use ndarray::Array2;
use serde::Deserialize;
use std::fs::File;

/// Number of feature columns in the credit applications table. The customer
/// id is column 0 and counts as a feature, matching the upstream dataset
/// layout.
pub const CREDIT_FEATURES: usize = 15;

/// Credit applications table: one row per customer
#[derive(Debug)]
pub struct CreditDataset {
    /// Raw feature matrix (n_customers, 15); column 0 is the customer id
    pub features: Array2<f64>,
    /// Approval label per customer (1 = approved)
    pub labels: Vec<u8>,
    /// Feature column names from the CSV header, label column excluded
    pub headers: Vec<String>,
}

/// Load the credit applications CSV
///
/// The schema is fixed: exactly 16 columns, the first 15 numeric features
/// and a trailing 0/1 approval label. Any deviation fails before training.
pub fn load_credit_applications(file_path: &str) -> crate::Result<CreditDataset> {
    let file =
        File::open(file_path).with_context(|| format!("cannot open input file {file_path}"))?;
    let mut rdr = csv::Reader::from_reader(file);

    let header_record = rdr.headers()?.clone();
    if header_record.len() != CREDIT_FEATURES + 1 {
        anyhow::bail!(
            "{file_path}: expected {} columns ({} features + approval label), found {}",
            CREDIT_FEATURES + 1,
            CREDIT_FEATURES,
            header_record.len()
        );
    }
    let headers: Vec<String> = header_record
        .iter()
        .take(CREDIT_FEATURES)
        .map(str::to_string)
        .collect();

    let mut values = Vec::new();
    let mut labels = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != CREDIT_FEATURES + 1 {
            anyhow::bail!(
                "row {}: expected {} columns, found {}",
                row + 1,
                CREDIT_FEATURES + 1,
                record.len()
            );
        }

        for (col, field) in record.iter().take(CREDIT_FEATURES).enumerate() {
            let value: f64 = field.trim().parse().with_context(|| {
                format!("row {}, column {:?}: invalid number {:?}", row + 1, headers[col], field)
            })?;
            values.push(value);
        }

        let label = match record.get(CREDIT_FEATURES).map(str::trim) {
            Some("0") => 0,
            Some("1") => 1,
            other => anyhow::bail!(
                "row {}: approval label must be 0 or 1, found {:?}",
                row + 1,
                other.unwrap_or("")
            ),
        };
        labels.push(label);
    }

    if labels.is_empty() {
        anyhow::bail!("no records found in {file_path}");
    }

    let features = Array2::from_shape_vec((labels.len(), CREDIT_FEATURES), values)?;
    Ok(CreditDataset { features, labels, headers })
}

/// One row of the mall customers CSV; extra columns are ignored
#[derive(Debug, Deserialize)]
struct MallRow {
    #[serde(rename = "CustomerID")]
    customer_id: u32,
    #[serde(rename = "Annual Income (k$)")]
    annual_income: f64,
    #[serde(rename = "Spending Score (1-100)")]
    spending_score: f64,
}

/// Mall customers table reduced to the two clustering features
#[derive(Debug)]
pub struct MallDataset {
    pub customer_ids: Vec<u32>,
    /// (n_customers, 2): annual income in k$, spending score 1-100
    pub points: Array2<f64>,
}

/// Load the mall customers CSV, selecting the income and spending-score
/// columns by name
pub fn load_mall_customers(file_path: &str) -> crate::Result<MallDataset> {
    let file =
        File::open(file_path).with_context(|| format!("cannot open input file {file_path}"))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut customer_ids = Vec::new();
    let mut values = Vec::new();
    for (row, result) in rdr.deserialize::<MallRow>().enumerate() {
        let record = result.with_context(|| format!("row {}: malformed record", row + 1))?;
        customer_ids.push(record.customer_id);
        values.push(record.annual_income);
        values.push(record.spending_score);
    }

    if customer_ids.is_empty() {
        anyhow::bail!("no records found in {file_path}");
    }

    let points = Array2::from_shape_vec((customer_ids.len(), 2), values)?;
    Ok(MallDataset { customer_ids, points })
}

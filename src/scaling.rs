//! Min-max feature scaling with an exact inverse

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Per-column min-max scaler mapping raw features into [lo, hi].
///
/// Fit once over the full table and reused for every transform and
/// inversion. The stored column extrema make the transform reversible,
/// which the fraud pipeline relies on to report flagged customers in
/// their original units.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    max: Array1<f64>,
    lo: f64,
    hi: f64,
}

impl MinMaxScaler {
    /// Fit the scaler on a table of raw features
    pub fn fit(data: ArrayView2<f64>, lo: f64, hi: f64) -> crate::Result<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            anyhow::bail!("cannot fit scaler on an empty table");
        }
        if !(lo < hi) {
            anyhow::bail!("invalid target range [{lo}, {hi}]");
        }

        let min = data.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));

        Ok(Self { min, max, lo, hi })
    }

    /// Fit on `data` and return the scaler together with the scaled table
    pub fn fit_transform(
        data: ArrayView2<f64>,
        lo: f64,
        hi: f64,
    ) -> crate::Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(data, lo, hi)?;
        let scaled = scaler.transform(data)?;
        Ok((scaler, scaled))
    }

    /// Map raw values into the target range, column by column
    pub fn transform(&self, data: ArrayView2<f64>) -> crate::Result<Array2<f64>> {
        self.check_width(data.ncols())?;
        let mut out = data.to_owned();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (col, v) in row.iter_mut().enumerate() {
                let range = self.max[col] - self.min[col];
                *v = if range == 0.0 {
                    // Constant column: every value maps to the low end
                    self.lo
                } else {
                    self.lo + (*v - self.min[col]) * (self.hi - self.lo) / range
                };
            }
        }
        Ok(out)
    }

    /// Map scaled values back to original units
    pub fn inverse_transform(&self, data: ArrayView2<f64>) -> crate::Result<Array2<f64>> {
        self.check_width(data.ncols())?;
        let mut out = data.to_owned();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (col, v) in row.iter_mut().enumerate() {
                let range = self.max[col] - self.min[col];
                *v = if range == 0.0 {
                    self.min[col]
                } else {
                    self.min[col] + (*v - self.lo) * range / (self.hi - self.lo)
                };
            }
        }
        Ok(out)
    }

    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    fn check_width(&self, ncols: usize) -> crate::Result<()> {
        if ncols != self.min.len() {
            anyhow::bail!(
                "table has {} columns but the scaler was fitted on {}",
                ncols,
                self.min.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_transform_bounds() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 40.0]];
        let (_, scaled) = MinMaxScaler::fit_transform(data.view(), 0.0, 1.0).unwrap();

        for &v in scaled.iter() {
            assert!((0.0..=1.0).contains(&v), "scaled value {} out of range", v);
        }
        // Column extrema land exactly on the range ends
        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaled[[2, 0]], 1.0);
    }

    #[test]
    fn test_round_trip() {
        let data = array![
            [15776156.0, 22.08, 11.46],
            [15739548.0, 22.67, 7.0],
            [15662854.0, 29.58, 1.75]
        ];
        let (scaler, scaled) = MinMaxScaler::fit_transform(data.view(), 0.0, 1.0).unwrap();
        let restored = scaler.inverse_transform(scaled.view()).unwrap();

        for (orig, back) in data.iter().zip(restored.iter()) {
            assert!(
                (orig - back).abs() <= orig.abs() * 1e-12 + 1e-9,
                "round trip {} -> {}",
                orig,
                back
            );
        }
    }

    #[test]
    fn test_constant_column() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let (scaler, scaled) = MinMaxScaler::fit_transform(data.view(), 0.0, 1.0).unwrap();

        assert!(scaled.column(0).iter().all(|&v| v == 0.0));

        let restored = scaler.inverse_transform(scaled.view()).unwrap();
        assert!(restored.column(0).iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_width_mismatch() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = MinMaxScaler::fit(data.view(), 0.0, 1.0).unwrap();

        let narrow = array![[1.0], [2.0]];
        assert!(scaler.transform(narrow.view()).is_err());
        assert!(scaler.inverse_transform(narrow.view()).is_err());
    }

    #[test]
    fn test_invalid_range() {
        let data = array![[1.0], [2.0]];
        assert!(MinMaxScaler::fit(data.view(), 1.0, 0.0).is_err());
        assert!(MinMaxScaler::fit(data.view(), 0.0, 0.0).is_err());
    }
}

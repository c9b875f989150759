//! Forecast error metrics
//!
//! MAE, RMSE, bias and MAPE over aligned forecast/actual pairs. Only pairs
//! with both sides present and finite take part.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::AlignedPair;

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Square Error
    pub rmse: f64,
    /// Mean signed error (forecast - actual); positive means over-forecast
    pub bias: f64,
    /// Mean Absolute Percentage Error (%), over pairs with non-zero actuals
    pub mape: f64,
    /// Number of complete pairs evaluated
    pub sample_count: usize,
    /// Number of pairs contributing to MAPE
    pub mape_sample_count: usize,
    /// Largest absolute error observed
    pub max_abs_error: f64,
}

impl ErrorMetrics {
    /// Calculate metrics from aligned pairs.
    ///
    /// An empty evaluable set yields all-zero metrics rather than NaN.
    pub fn compute(pairs: &[AlignedPair]) -> Self {
        let mut n = 0usize;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut signed_sum = 0.0;
        let mut max_abs_error = 0.0f64;
        let mut pct_sum = 0.0;
        let mut pct_n = 0usize;

        for (forecast, actual) in pairs.iter().filter_map(AlignedPair::values) {
            let error = forecast - actual;
            n += 1;
            abs_sum += error.abs();
            sq_sum += error * error;
            signed_sum += error;
            max_abs_error = max_abs_error.max(error.abs());

            // Zero actuals are excluded from MAPE only
            if actual != 0.0 {
                pct_sum += error.abs() / actual.abs();
                pct_n += 1;
            }
        }

        if n == 0 {
            return Self::default();
        }

        let count = n as f64;
        Self {
            mae: abs_sum / count,
            rmse: (sq_sum / count).sqrt(),
            bias: signed_sum / count,
            mape: if pct_n == 0 {
                0.0
            } else {
                pct_sum / pct_n as f64 * 100.0
            },
            sample_count: n,
            mape_sample_count: pct_n,
            max_abs_error,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Assess forecast quality based on MAPE
    pub fn quality(&self) -> ForecastQuality {
        if self.mape < 5.0 {
            ForecastQuality::Excellent
        } else if self.mape < 10.0 {
            ForecastQuality::Good
        } else if self.mape < 20.0 {
            ForecastQuality::Fair
        } else if self.mape < 50.0 {
            ForecastQuality::Poor
        } else {
            ForecastQuality::VeryPoor
        }
    }
}

impl fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metrics: MAE={:.3}, RMSE={:.3}, Bias={:+.3}, MAPE={:.2}%, n={}, Quality={:?}",
            self.mae,
            self.rmse,
            self.bias,
            self.mape,
            self.sample_count,
            self.quality()
        )
    }
}

/// Forecast quality classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastQuality {
    Excellent, // MAPE < 5%
    Good,      // MAPE 5-10%
    Fair,      // MAPE 10-20%
    Poor,      // MAPE 20-50%
    VeryPoor,  // MAPE > 50%
}

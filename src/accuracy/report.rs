//! Accuracy report assembly
//!
//! Runs each named comparison through aggregation, alignment and metric
//! computation. Comparisons are independent: an empty one degrades to zeroed
//! metrics without affecting the others.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use super::aggregate::SeriesInput;
use super::align::align;
use super::error::AccuracyError;
use super::metrics::ErrorMetrics;
use crate::domain::AlignedPair;

/// One named forecast-versus-actual comparison to evaluate.
#[derive(Debug, Clone)]
pub struct ComparisonInput {
    pub name: String,
    pub forecast: SeriesInput,
    pub actual: SeriesInput,
}

impl ComparisonInput {
    pub fn new(name: impl Into<String>, forecast: SeriesInput, actual: SeriesInput) -> Self {
        Self {
            name: name.into(),
            forecast,
            actual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Evaluated,
    /// No complete pair was available; metrics are zero
    EmptyInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub name: String,
    pub forecast_series: String,
    pub actual_series: String,
    pub status: ComparisonStatus,
    pub metrics: ErrorMetrics,
    /// Samples discarded during normalization
    pub dropped_forecast: usize,
    pub dropped_actual: usize,
    /// Full join, including incomplete pairs, ascending by instant
    pub pairs: Vec<AlignedPair>,
}

/// Per-comparison results in caller-declared order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub comparisons: Vec<ComparisonReport>,
}

impl AccuracyReport {
    /// Evaluate all comparisons. Fails only on caller-contract violations.
    pub fn build(inputs: Vec<ComparisonInput>) -> Result<Self, AccuracyError> {
        let mut seen = HashSet::with_capacity(inputs.len());
        for input in &inputs {
            if !seen.insert(input.name.as_str()) {
                return Err(AccuracyError::DuplicateComparison(input.name.clone()));
            }
        }

        let comparisons: Vec<_> = inputs.iter().map(evaluate).collect();

        info!(
            comparisons = comparisons.len(),
            empty = comparisons
                .iter()
                .filter(|c| c.status == ComparisonStatus::EmptyInput)
                .count(),
            "accuracy report built"
        );
        Ok(Self { comparisons })
    }

    pub fn get(&self, name: &str) -> Option<&ComparisonReport> {
        self.comparisons.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.comparisons.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

fn evaluate(input: &ComparisonInput) -> ComparisonReport {
    let forecast = input.forecast.aggregate();
    let actual = input.actual.aggregate();

    let pairs = align(&forecast.series, &actual.series);
    let metrics = ErrorMetrics::compute(&pairs);

    let status = if metrics.is_empty() {
        ComparisonStatus::EmptyInput
    } else {
        ComparisonStatus::Evaluated
    };

    debug!(
        comparison = %input.name,
        pairs = pairs.len(),
        dropped_forecast = forecast.dropped,
        dropped_actual = actual.dropped,
        status = ?status,
        "{metrics}"
    );

    ComparisonReport {
        name: input.name.clone(),
        forecast_series: input.forecast.name().to_string(),
        actual_series: input.actual.name().to_string(),
        status,
        metrics,
        dropped_forecast: forecast.dropped,
        dropped_actual: actual.dropped,
        pairs,
    }
}

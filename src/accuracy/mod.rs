//! Forecast accuracy engine
//!
//! Pure pipeline: normalize time keys, aggregate per instant, align forecast
//! against actual, compute error metrics, package the report.

pub mod aggregate;
pub mod align;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod report;

pub use aggregate::{reduce, Aggregation, SeriesInput};
pub use align::align;
pub use error::AccuracyError;
pub use metrics::{ErrorMetrics, ForecastQuality};
pub use normalize::{denormalize, normalize};
pub use report::{AccuracyReport, ComparisonInput, ComparisonReport, ComparisonStatus};

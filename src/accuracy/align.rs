use itertools::{EitherOrBoth, Itertools};

use crate::domain::{AggregatedSeries, AlignedPair};

/// Full outer join of two series on exact instant, ascending.
///
/// Instants present on one side only yield a pair with the other side empty.
pub fn align(forecast: &AggregatedSeries, actual: &AggregatedSeries) -> Vec<AlignedPair> {
    forecast
        .iter()
        .merge_join_by(actual.iter(), |(f, _), (a, _)| f.cmp(a))
        .map(|joined| match joined {
            EitherOrBoth::Both((instant, f), (_, a)) => AlignedPair {
                instant: *instant,
                forecast: *f,
                actual: *a,
            },
            EitherOrBoth::Left((instant, f)) => AlignedPair {
                instant: *instant,
                forecast: *f,
                actual: None,
            },
            EitherOrBoth::Right((instant, a)) => AlignedPair {
                instant: *instant,
                forecast: None,
                actual: *a,
            },
        })
        .collect()
}

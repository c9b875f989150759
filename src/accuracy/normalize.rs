//! TimeKey normalization
//!
//! Resolves a source label (date, hour index, convention) into an
//! hour-beginning UTC instant. The convention is always declared by the
//! caller and never inferred from the hour value.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::error::AccuracyError;
use crate::domain::{CanonicalInstant, HourConvention, TimeKey};

/// Resolve a time key into its canonical instant.
///
/// Local midnight of `key.date` is taken in `zone` (the earliest reading on a
/// DST fold) and the hour offset is added as an absolute duration:
/// hour-ending `h` begins `h - 1` hours after midnight, hour-beginning `h`
/// begins `h` hours after. The valid hour range follows the length of the
/// local day, so a 23-hour day has no HE24 and a 25-hour day has an HE25.
pub fn normalize(key: &TimeKey, zone: Tz) -> Result<CanonicalInstant, AccuracyError> {
    let midnight = local_midnight(key.date, zone)?;
    let hours_in_day = hours_in_day(key.date, midnight, zone);

    if !key.convention.hour_range(hours_in_day).contains(&key.hour) {
        return Err(AccuracyError::InvalidHourIndex {
            hour: key.hour,
            convention: key.convention,
        });
    }

    let offset = key.convention.offset_hours(key.hour);
    Ok(CanonicalInstant(midnight + Duration::hours(i64::from(offset))))
}

/// Inverse of [`normalize`]: label an instant under the given convention.
pub fn denormalize(
    instant: CanonicalInstant,
    convention: HourConvention,
    zone: Tz,
) -> Result<TimeKey, AccuracyError> {
    let date = instant.inner().with_timezone(&zone).date_naive();
    let midnight = local_midnight(date, zone)?;
    let elapsed = (instant.inner() - midnight).num_hours();

    let hour = match convention {
        HourConvention::HourEnding => elapsed + 1,
        HourConvention::HourBeginning => elapsed,
    };
    let hour = u32::try_from(hour).unwrap_or(u32::MAX);
    if !convention.hour_range(hours_in_day(date, midnight, zone)).contains(&hour) {
        return Err(AccuracyError::InvalidHourIndex { hour, convention });
    }
    Ok(TimeKey::new(date, hour, convention))
}

fn local_midnight(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>, AccuracyError> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or(AccuracyError::NonexistentMidnight { date, zone })
}

/// Elapsed hours from local midnight of `date` to the next local midnight.
/// Falls back to 24 when the next midnight is itself skipped.
fn hours_in_day(date: NaiveDate, midnight: DateTime<Utc>, zone: Tz) -> u32 {
    date.succ_opt()
        .and_then(|next| local_midnight(next, zone).ok())
        .and_then(|next| u32::try_from((next - midnight).num_hours()).ok())
        .unwrap_or(24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn utc(y: i32, m: u32, day: u32, h: u32) -> CanonicalInstant {
        CanonicalInstant(Utc.with_ymd_and_hms(y, m, day, h, 0, 0).unwrap())
    }

    #[rstest]
    #[case(TimeKey::hour_ending(d(2024, 3, 5), 1), utc(2024, 3, 5, 0))]
    #[case(TimeKey::hour_ending(d(2024, 3, 5), 24), utc(2024, 3, 5, 23))]
    #[case(TimeKey::hour_ending(d(2024, 3, 5), 14), utc(2024, 3, 5, 13))]
    #[case(TimeKey::hour_beginning(d(2024, 3, 5), 0), utc(2024, 3, 5, 0))]
    #[case(TimeKey::hour_beginning(d(2024, 3, 5), 23), utc(2024, 3, 5, 23))]
    fn test_normalize_utc(#[case] key: TimeKey, #[case] expected: CanonicalInstant) {
        assert_eq!(normalize(&key, Tz::UTC).unwrap(), expected);
    }

    #[rstest]
    #[case(TimeKey::hour_ending(d(2024, 3, 5), 0))]
    #[case(TimeKey::hour_ending(d(2024, 3, 5), 25))]
    #[case(TimeKey::hour_beginning(d(2024, 3, 5), 24))]
    fn test_normalize_rejects_out_of_range_hours(#[case] key: TimeKey) {
        let err = normalize(&key, Tz::UTC).unwrap_err();
        assert_eq!(
            err,
            AccuracyError::InvalidHourIndex {
                hour: key.hour,
                convention: key.convention
            }
        );
    }

    #[test]
    fn test_same_hour_under_both_conventions() {
        let he = normalize(&TimeKey::hour_ending(d(2024, 6, 1), 8), Tz::UTC).unwrap();
        let hb = normalize(&TimeKey::hour_beginning(d(2024, 6, 1), 7), Tz::UTC).unwrap();
        assert_eq!(he, hb);
    }

    #[test]
    fn test_normalize_market_zone() {
        // Pacific daylight time is UTC-7 in July
        let key = TimeKey::hour_ending(d(2024, 7, 1), 1);
        let instant = normalize(&key, chrono_tz::America::Los_Angeles).unwrap();
        assert_eq!(instant, utc(2024, 7, 1, 7));
    }

    // Los Angeles springs forward on 2024-03-10 and falls back on 2024-11-03
    #[rstest]
    #[case(TimeKey::hour_ending(d(2024, 3, 10), 23), utc(2024, 3, 11, 6))]
    #[case(TimeKey::hour_beginning(d(2024, 3, 10), 22), utc(2024, 3, 11, 6))]
    #[case(TimeKey::hour_ending(d(2024, 3, 11), 1), utc(2024, 3, 11, 7))]
    #[case(TimeKey::hour_ending(d(2024, 11, 3), 25), utc(2024, 11, 4, 7))]
    #[case(TimeKey::hour_beginning(d(2024, 11, 3), 24), utc(2024, 11, 4, 7))]
    #[case(TimeKey::hour_ending(d(2024, 11, 4), 1), utc(2024, 11, 4, 8))]
    fn test_normalize_dst_days(#[case] key: TimeKey, #[case] expected: CanonicalInstant) {
        let zone = chrono_tz::America::Los_Angeles;
        assert_eq!(normalize(&key, zone).unwrap(), expected);
    }

    #[rstest]
    #[case(TimeKey::hour_ending(d(2024, 3, 10), 24))]
    #[case(TimeKey::hour_beginning(d(2024, 3, 10), 23))]
    #[case(TimeKey::hour_ending(d(2024, 11, 3), 26))]
    #[case(TimeKey::hour_beginning(d(2024, 11, 3), 25))]
    fn test_normalize_rejects_hours_outside_local_day(#[case] key: TimeKey) {
        let err = normalize(&key, chrono_tz::America::Los_Angeles).unwrap_err();
        assert!(matches!(err, AccuracyError::InvalidHourIndex { .. }));
    }

    #[test]
    fn test_spring_forward_day_keeps_hours_distinct() {
        let zone = chrono_tz::America::Los_Angeles;
        let last = normalize(&TimeKey::hour_ending(d(2024, 3, 10), 23), zone).unwrap();
        let next = normalize(&TimeKey::hour_ending(d(2024, 3, 11), 1), zone).unwrap();
        assert!(last < next);
        assert!(normalize(&TimeKey::hour_ending(d(2024, 3, 10), 24), zone).is_err());
    }

    #[rstest]
    #[case(d(2024, 3, 10), 23)]
    #[case(d(2024, 11, 3), 25)]
    #[case(d(2024, 1, 15), 24)]
    fn test_round_trip_across_dst(#[case] date: NaiveDate, #[case] hours: u32) {
        let zone = chrono_tz::America::Los_Angeles;
        for hour in 1..=hours {
            let key = TimeKey::hour_ending(date, hour);
            let instant = normalize(&key, zone).unwrap();
            assert_eq!(denormalize(instant, HourConvention::HourEnding, zone).unwrap(), key);
        }
        for hour in 0..hours {
            let key = TimeKey::hour_beginning(date, hour);
            let instant = normalize(&key, zone).unwrap();
            assert_eq!(denormalize(instant, HourConvention::HourBeginning, zone).unwrap(), key);
        }
    }

    #[test]
    fn test_round_trip() {
        let zone = chrono_tz::America::Los_Angeles;
        for hour in 1..=24 {
            let key = TimeKey::hour_ending(d(2024, 1, 15), hour);
            let instant = normalize(&key, zone).unwrap();
            assert_eq!(denormalize(instant, HourConvention::HourEnding, zone).unwrap(), key);
        }

        let instant = normalize(&TimeKey::hour_ending(d(2024, 1, 15), 1), Tz::UTC).unwrap();
        assert_eq!(
            denormalize(instant, HourConvention::HourBeginning, Tz::UTC).unwrap(),
            TimeKey::hour_beginning(d(2024, 1, 15), 0)
        );
    }
}

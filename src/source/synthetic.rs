//! Deterministic demo data for running the service without a database.
//!
//! Shapes follow a daily double-peak load curve, a diurnal temperature
//! swing and a slowly varying wind profile. Forecast series are labelled
//! hour-ending, realized series hour-beginning, realized wind arrives as
//! four 15-minute readings per hour.

use std::f64::consts::PI;

use super::{InMemorySeriesSource, ObservationRow, OutlookWindow};

pub const LOAD_ZONES: [&str; 3] = ["NP15", "SP15", "ZP26"];

pub async fn seed(source: &InMemorySeriesSource, window: OutlookWindow, scenario_id: i64) {
    let mut load_fc = Vec::new();
    let mut load_rt = Vec::new();
    let mut wind_fc = Vec::new();
    let mut wind_rt = Vec::new();
    let mut temp_fc = Vec::new();
    let mut temp_obs = Vec::new();

    for (day_index, date) in window.dates().enumerate() {
        for hb in 0u32..24 {
            let t = day_index as f64 * 24.0 + f64::from(hb);
            let hh = f64::from(hb);

            for (zone_index, zone) in LOAD_ZONES.into_iter().enumerate() {
                let scale = 4000.0 + 2500.0 * zone_index as f64;
                let base = scale * load_shape(hh);
                let noise = 0.03 * scale * (0.7 * t + zone_index as f64).sin();
                load_fc.push(row(date, hb + 1, Some(base), Some(zone)));
                load_rt.push(row(date, hb, Some(base + noise), Some(zone)));
            }

            let wind = 1800.0 + 1200.0 * (2.0 * PI * t / 61.0).sin();
            wind_fc.push(row(date, hb + 1, Some(wind), None));
            for quarter in 0..4 {
                let drift = 150.0 * (0.37 * t + f64::from(quarter)).cos();
                wind_rt.push(row(date, hb, Some((wind + drift).max(0.0)), None));
            }

            let temp = 68.0 + 12.0 * (2.0 * PI * (hh - 9.0) / 24.0).sin();
            temp_fc.push(row(date, hb + 1, Some(temp), None));
            // Station gaps every eleventh hour
            let observed = (hb % 11 != 5).then(|| temp + 1.5 * (0.5 * t).sin());
            temp_obs.push(row(date, hb + 1, observed, None));
        }
    }

    source.insert("dayzer_load", Some(scenario_id), load_fc).await;
    source.insert("realtime_load", None, load_rt).await;
    source.insert("dayzer_wind", Some(scenario_id), wind_fc).await;
    source.insert("realtime_wind", None, wind_rt).await;
    source.insert("dayzer_temperature", Some(scenario_id), temp_fc).await;
    source.insert("observed_temperature", None, temp_obs).await;
}

fn row(
    obs_date: chrono::NaiveDate,
    hour_index: u32,
    value: Option<f64>,
    group_key: Option<&str>,
) -> ObservationRow {
    ObservationRow {
        obs_date,
        hour_index,
        value,
        group_key: group_key.map(str::to_string),
    }
}

fn load_shape(hh: f64) -> f64 {
    0.6 + bump(hh, 7.5, 1.5) * 0.25 + bump(hh, 18.5, 2.0) * 0.4
}

fn bump(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma.max(0.01);
    (-0.5 * z * z).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_seed_populates_every_series() {
        let source = InMemorySeriesSource::new();
        let window = OutlookWindow::seven_day(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        seed(&source, window, 42).await;

        let hours = 7 * 24;
        let expected = hours * LOAD_ZONES.len() * 2 + hours + hours * 4 + hours * 2;
        assert_eq!(source.row_count().await, expected);
    }
}

//! Dead measurement period detection and removal.
//!
//! A dead period is a (sensor, calendar day) whose summed count is exactly
//! zero, presumed a sensor outage rather than true zero traffic. The
//! decision for any row depends on its siblings, so this is a two-pass
//! dataset-wide operation: aggregate daily sums per sensor, then filter.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::observations::Observation;

/// One all-zero sensor-day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeadPeriod {
    pub counter_name: String,
    pub day: NaiveDate,
}

/// Removes every row belonging to an all-zero sensor-day.
///
/// A sensor-day with at least one non-zero reading is fully retained,
/// including its individual zero readings. Returns the surviving rows and
/// the detected dead periods in (sensor, day) order.
pub fn remove_dead_periods(rows: Vec<Observation>) -> (Vec<Observation>, Vec<DeadPeriod>) {
    let mut daily_sums: BTreeMap<(String, NaiveDate), f64> = BTreeMap::new();
    for row in &rows {
        *daily_sums
            .entry((row.counter_name.clone(), row.date.date()))
            .or_insert(0.0) += row.log_bike_count;
    }

    // log_bike_count is log1p-scaled and non-negative, so an exactly-zero
    // sum means every reading in the group was zero.
    let dead_keys: BTreeSet<(String, NaiveDate)> = daily_sums
        .into_iter()
        .filter(|(_, sum)| *sum == 0.0)
        .map(|(key, _)| key)
        .collect();

    let input_rows = rows.len();
    let kept: Vec<Observation> = rows
        .into_iter()
        .filter(|row| !dead_keys.contains(&(row.counter_name.clone(), row.date.date())))
        .collect();

    let dead_periods: Vec<DeadPeriod> = dead_keys
        .into_iter()
        .map(|(counter_name, day)| DeadPeriod { counter_name, day })
        .collect();

    if !dead_periods.is_empty() {
        info!(
            component = "dead_periods",
            event = "dead_periods.removed",
            dead_periods = dead_periods.len(),
            rows_removed = input_rows - kept.len()
        );
    }

    (kept, dead_periods)
}

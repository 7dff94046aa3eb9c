//! Timestamp-to-feature encoding and the output column contract.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::calendar::HolidaySets;
use crate::curfew::CurfewSchedule;
use crate::observations::Observation;
use crate::weather::WeatherFeatures;

pub const FEATURE_SCHEMA_VERSION: u32 = 1;

const HOUR_PERIOD: f64 = 24.0;
const MONTH_PERIOD: f64 = 12.0;

/// Season bucket from the month. `Unknown` is the sentinel for an
/// out-of-range month; it must never be produced by a valid timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
    Unknown,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureDType {
    F64,
    I64,
    Flag,
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub dtype: FeatureDType,
}

/// Versioned description of the enriched output table. The downstream
/// forecasting model checks it before consuming features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub fingerprint: String,
    pub columns: Vec<FeatureColumn>,
}

/// Calendar-derived features for one timestamp.
///
/// The raw hour and month only exist inside the encoder; the output carries
/// their sine-cosine pairs instead, and the timestamp itself has no field
/// here, so the transform cannot be applied twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    pub year: i32,
    pub day: u32,
    pub weekday: u32,
    pub season: Season,
    pub school_holiday: bool,
    pub public_holiday: bool,
    pub is_peak: bool,
    pub sin_hour: f64,
    pub cos_hour: f64,
    pub sin_month: f64,
    pub cos_month: f64,
    pub curfew: bool,
}

impl TemporalFeatures {
    pub fn from_timestamp(
        ts: NaiveDateTime,
        holidays: &HolidaySets,
        schedule: &CurfewSchedule,
    ) -> Self {
        let date = ts.date();
        let month = date.month();
        let hour = ts.hour();
        let (sin_hour, cos_hour) = cyclical_pair(hour as f64, HOUR_PERIOD);
        let (sin_month, cos_month) = cyclical_pair(month as f64, MONTH_PERIOD);

        Self {
            year: date.year(),
            day: date.day(),
            weekday: date.weekday().num_days_from_monday(),
            season: Season::from_month(month),
            school_holiday: holidays.is_school_holiday(date),
            public_holiday: holidays.is_public_holiday(date),
            is_peak: is_peak_hour(hour),
            sin_hour,
            cos_hour,
            sin_month,
            cos_month,
            curfew: schedule.is_curfew(ts),
        }
    }
}

/// One enriched output row. Field order matches the schema column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub counter_name: String,
    pub log_bike_count: f64,
    #[serde(flatten)]
    pub temporal: TemporalFeatures,
    pub t: f64,
    pub rr1: f64,
    pub ff: f64,
    #[serde(flatten)]
    pub weather: WeatherFeatures,
}

impl FeatureRecord {
    /// Values in schema column order, flags as 0/1, categories as labels.
    pub fn csv_fields(&self) -> Vec<String> {
        vec![
            self.counter_name.clone(),
            self.log_bike_count.to_string(),
            self.temporal.year.to_string(),
            self.temporal.day.to_string(),
            self.temporal.weekday.to_string(),
            self.temporal.season.as_str().to_string(),
            flag(self.temporal.school_holiday),
            flag(self.temporal.public_holiday),
            flag(self.temporal.is_peak),
            self.temporal.sin_hour.to_string(),
            self.temporal.cos_hour.to_string(),
            self.temporal.sin_month.to_string(),
            self.temporal.cos_month.to_string(),
            flag(self.temporal.curfew),
            self.t.to_string(),
            self.rr1.to_string(),
            self.ff.to_string(),
            self.weather.rain_category.as_str().to_string(),
            flag(self.weather.is_hot_day),
            flag(self.weather.is_cold_day),
            flag(self.weather.high_wind),
        ]
    }
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersionMismatch { expected: u32, actual: u32 },
    #[error("schema fingerprint mismatch: expected {expected}, got {actual}")]
    SchemaFingerprintMismatch { expected: String, actual: String },
}

/// Sine-cosine pair for a periodic value: `sin(2π·value/period)` and the
/// matching cosine.
pub fn cyclical_pair(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

/// Morning and evening commute hours: [6, 9) and [16, 19).
pub fn is_peak_hour(hour: u32) -> bool {
    (6..9).contains(&hour) || (16..19).contains(&hour)
}

/// Derives calendar features for every row. Row count is preserved; the
/// cleaner is the only component allowed to drop rows.
pub fn encode_dates(
    rows: &[Observation],
    holidays: &HolidaySets,
    schedule: &CurfewSchedule,
) -> Vec<TemporalFeatures> {
    rows.iter()
        .map(|row| TemporalFeatures::from_timestamp(row.date, holidays, schedule))
        .collect()
}

pub fn build_feature_schema() -> FeatureSchema {
    let columns: Vec<FeatureColumn> = [
        ("counter_name", FeatureDType::Label),
        ("log_bike_count", FeatureDType::F64),
        ("year", FeatureDType::I64),
        ("day", FeatureDType::I64),
        ("weekday", FeatureDType::I64),
        ("season", FeatureDType::Label),
        ("school_holiday", FeatureDType::Flag),
        ("public_holiday", FeatureDType::Flag),
        ("is_peak", FeatureDType::Flag),
        ("sin_hour", FeatureDType::F64),
        ("cos_hour", FeatureDType::F64),
        ("sin_month", FeatureDType::F64),
        ("cos_month", FeatureDType::F64),
        ("curfew", FeatureDType::Flag),
        ("t", FeatureDType::F64),
        ("rr1", FeatureDType::F64),
        ("ff", FeatureDType::F64),
        ("rain_category", FeatureDType::Label),
        ("is_hot_day", FeatureDType::Flag),
        ("is_cold_day", FeatureDType::Flag),
        ("high_wind", FeatureDType::Flag),
    ]
    .into_iter()
    .map(|(name, dtype)| FeatureColumn {
        name: name.to_string(),
        dtype,
    })
    .collect();

    let fingerprint = schema_fingerprint(&columns);

    info!(
        component = "features",
        event = "features.schema.built",
        version = FEATURE_SCHEMA_VERSION,
        column_count = columns.len(),
        fingerprint = fingerprint
    );

    FeatureSchema {
        version: FEATURE_SCHEMA_VERSION,
        fingerprint,
        columns,
    }
}

pub fn assert_schema_compatible(
    expected_version: u32,
    expected_fingerprint: &str,
    actual: &FeatureSchema,
) -> Result<(), FeatureError> {
    if expected_version != actual.version {
        return Err(FeatureError::SchemaVersionMismatch {
            expected: expected_version,
            actual: actual.version,
        });
    }

    if expected_fingerprint != actual.fingerprint {
        return Err(FeatureError::SchemaFingerprintMismatch {
            expected: expected_fingerprint.to_string(),
            actual: actual.fingerprint.clone(),
        });
    }

    Ok(())
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn schema_fingerprint(columns: &[FeatureColumn]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("version:{FEATURE_SCHEMA_VERSION};"));
    hasher.update("columns:");
    for column in columns {
        hasher.update(column.name.as_bytes());
        hasher.update(format!(":{:?};", column.dtype));
    }
    hex::encode(hasher.finalize())
}

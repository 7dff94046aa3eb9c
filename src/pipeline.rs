//! End-to-end feature pipeline: dead-period cleaning, temporal encoding,
//! weather enrichment.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::calendar::HolidaySets;
use crate::curfew::CurfewSchedule;
use crate::dead_periods::{remove_dead_periods, DeadPeriod};
use crate::features::{build_feature_schema, FeatureRecord, FeatureSchema, TemporalFeatures};
use crate::observations::Observation;
use crate::weather::{WeatherConfig, WeatherFeatures};

const MAX_REPORTED_DEAD_PERIODS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub input_rows: u64,
    pub dead_rows_removed: u64,
    pub dead_period_count: u64,
    /// First dead periods in (sensor, day) order; counts above stay exact
    /// when this list is truncated.
    pub dead_periods: Vec<DeadPeriod>,
    pub output_rows: u64,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid weather config: {0}")]
    InvalidConfig(String),
}

/// Runs the full transform: clean, encode dates, derive weather features.
///
/// Row count shrinks only in the cleaning step; both encoders are
/// one-to-one. Empty input is valid and produces an empty, fully-shaped
/// output.
pub fn run_pipeline(
    rows: Vec<Observation>,
    holidays: &HolidaySets,
    schedule: &CurfewSchedule,
    weather_cfg: &WeatherConfig,
) -> Result<(FeatureSchema, Vec<FeatureRecord>, PipelineReport), PipelineError> {
    validate_weather_config(weather_cfg)?;

    let input_rows = rows.len() as u64;
    info!(
        component = "pipeline",
        event = "pipeline.start",
        input_rows = input_rows,
        curfew_windows = schedule.windows().len(),
        school_holiday_days = holidays.school_day_count(),
        public_holiday_days = holidays.public_day_count()
    );

    let schema = build_feature_schema();

    let (kept, dead_periods) = remove_dead_periods(rows);
    let dead_rows_removed = input_rows - kept.len() as u64;

    let records: Vec<FeatureRecord> = kept
        .into_iter()
        .map(|row| {
            let temporal = TemporalFeatures::from_timestamp(row.date, holidays, schedule);
            let weather = WeatherFeatures::from_measurements(row.t, row.rr1, row.ff, weather_cfg);
            FeatureRecord {
                counter_name: row.counter_name,
                log_bike_count: row.log_bike_count,
                temporal,
                t: row.t,
                rr1: row.rr1,
                ff: row.ff,
                weather,
            }
        })
        .collect();

    let report = PipelineReport {
        input_rows,
        dead_rows_removed,
        dead_period_count: dead_periods.len() as u64,
        dead_periods: dead_periods
            .into_iter()
            .take(MAX_REPORTED_DEAD_PERIODS)
            .collect(),
        output_rows: records.len() as u64,
    };

    info!(
        component = "pipeline",
        event = "pipeline.finish",
        input_rows = report.input_rows,
        dead_rows_removed = report.dead_rows_removed,
        dead_period_count = report.dead_period_count,
        output_rows = report.output_rows
    );

    Ok((schema, records, report))
}

fn validate_weather_config(cfg: &WeatherConfig) -> Result<(), PipelineError> {
    if !cfg.hot_day_kelvin.is_finite()
        || !cfg.cold_day_kelvin.is_finite()
        || !cfg.high_wind_ms.is_finite()
    {
        return Err(PipelineError::InvalidConfig(
            "thresholds must be finite".to_string(),
        ));
    }
    if cfg.hot_day_kelvin <= cfg.cold_day_kelvin {
        return Err(PipelineError::InvalidConfig(format!(
            "hot_day_kelvin ({}) must be above cold_day_kelvin ({})",
            cfg.hot_day_kelvin, cfg.cold_day_kelvin
        )));
    }
    Ok(())
}

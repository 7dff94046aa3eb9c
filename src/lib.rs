//! Feature engineering for the Paris bicycle-count forecasting dataset.
//!
//! Turns raw time-stamped counter observations into a feature-enriched
//! table: calendar context (school and public holidays, seasons, curfews),
//! cyclical encodings of hour and month, weather-derived indicators, and a
//! cleaning pass that removes all-zero sensor-days.

mod calendar;
mod curfew;
mod dead_periods;
mod features;
mod observability;
mod observations;
mod pipeline;
mod weather;

pub use calendar::{
    CalendarError, FixedCalendar, FrenchCalendar, HolidayCalendar, HolidaySets, Zone,
};
pub use curfew::{CurfewSchedule, CurfewWindow};
pub use dead_periods::{remove_dead_periods, DeadPeriod};
pub use features::{
    assert_schema_compatible, build_feature_schema, cyclical_pair, encode_dates, is_peak_hour,
    FeatureColumn, FeatureDType, FeatureError, FeatureRecord, FeatureSchema, Season,
    TemporalFeatures, FEATURE_SCHEMA_VERSION,
};
pub use observability::{
    init_logging, log_app_start, log_run_summary, logging_config_from_env, LogFormat,
    LoggingConfig, LoggingInitError,
};
pub use observations::{
    load_observations, load_observations_from_path, write_feature_records, Observation,
    ObservationError, REQUIRED_COLUMNS,
};
pub use pipeline::{run_pipeline, PipelineError, PipelineReport};
pub use weather::{add_weather_features, RainCategory, WeatherConfig, WeatherFeatures};

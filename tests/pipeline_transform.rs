use std::collections::BTreeSet;
use std::f64::consts::PI;

use chrono::NaiveDate;
use velofe::{
    add_weather_features, assert_schema_compatible, build_feature_schema, encode_dates,
    run_pipeline, CurfewSchedule, FeatureError, FixedCalendar, HolidaySets, Observation,
    PipelineError, Season, WeatherConfig, Zone, FEATURE_SCHEMA_VERSION,
};

fn obs(counter: &str, y: i32, m: u32, d: u32, hour: u32, count: f64) -> Observation {
    Observation {
        date: NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid test date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid test time"),
        counter_name: counter.to_string(),
        log_bike_count: count,
        t: 285.0,
        rr1: 0.0,
        ff: 2.0,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn test_holidays() -> HolidaySets {
    let school: BTreeSet<NaiveDate> = [date(2020, 10, 20), date(2020, 10, 21)].into();
    let public: BTreeSet<NaiveDate> = [date(2020, 11, 11)].into();
    let calendar = FixedCalendar::new(school, public);
    HolidaySets::build(&calendar, &[2020, 2021], Zone::C).expect("sets build")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "actual={actual} expected={expected}"
    );
}

#[test]
fn schema_order_and_fingerprint_are_deterministic() {
    let schema_a = build_feature_schema();
    let schema_b = build_feature_schema();

    assert_eq!(schema_a.version, FEATURE_SCHEMA_VERSION);
    assert_eq!(schema_a.columns.len(), 21);
    assert_eq!(schema_a.columns[0].name, "counter_name");
    assert_eq!(schema_a.columns[1].name, "log_bike_count");
    assert_eq!(schema_a.columns[5].name, "season");
    assert_eq!(schema_a.columns[9].name, "sin_hour");
    assert_eq!(schema_a.columns[13].name, "curfew");
    assert_eq!(schema_a.columns[20].name, "high_wind");
    assert_eq!(schema_a, schema_b);
}

#[test]
fn schema_has_no_raw_timestamp_hour_or_month_column() {
    let schema = build_feature_schema();
    for name in ["date", "date_x", "hour", "month"] {
        assert!(
            schema.columns.iter().all(|column| column.name != name),
            "column '{name}' must not survive encoding"
        );
    }
}

#[test]
fn pipeline_is_deterministic_and_emits_expected_features() {
    let rows = vec![
        obs("totem 73", 2020, 10, 20, 22, 2.5),
        obs("totem 73", 2020, 10, 20, 10, 3.0),
        obs("totem 73", 2020, 11, 11, 8, 1.0),
    ];
    let holidays = test_holidays();
    let schedule = CurfewSchedule::french_2020_2021();
    let cfg = WeatherConfig::default();

    let out_a = run_pipeline(rows.clone(), &holidays, &schedule, &cfg).expect("first run");
    let out_b = run_pipeline(rows, &holidays, &schedule, &cfg).expect("second run");
    assert_eq!(out_a.0, out_b.0);
    assert_eq!(out_a.1, out_b.1);
    assert_eq!(out_a.2, out_b.2);

    let (_, records, report) = out_a;
    assert_eq!(records.len(), 3);
    assert_eq!(report.input_rows, 3);
    assert_eq!(report.dead_rows_removed, 0);
    assert_eq!(report.output_rows, 3);

    // 2020-10-20 22:00 is inside the first curfew window, a school holiday,
    // a Tuesday, off-peak.
    let evening = &records[0].temporal;
    assert!(evening.curfew);
    assert!(evening.school_holiday);
    assert!(!evening.public_holiday);
    assert!(!evening.is_peak);
    assert_eq!(evening.year, 2020);
    assert_eq!(evening.day, 20);
    assert_eq!(evening.weekday, 1);
    assert_eq!(evening.season, Season::Fall);
    assert_close(evening.sin_hour, (2.0 * PI * 22.0 / 24.0).sin());
    assert_close(evening.cos_hour, (2.0 * PI * 22.0 / 24.0).cos());
    assert_close(evening.sin_month, (2.0 * PI * 10.0 / 12.0).sin());
    assert_close(evening.cos_month, (2.0 * PI * 10.0 / 12.0).cos());

    // Same date at 10:00 is outside curfew hours.
    let morning = &records[1].temporal;
    assert!(!morning.curfew);
    assert!(morning.school_holiday);

    // 2020-11-11 08:00: public holiday, morning peak, no curfew window.
    let armistice = &records[2].temporal;
    assert!(armistice.public_holiday);
    assert!(!armistice.school_holiday);
    assert!(armistice.is_peak);
    assert!(!armistice.curfew);
}

#[test]
fn dead_sensor_day_is_removed_and_mixed_day_survives() {
    let rows = vec![
        obs("a", 2021, 3, 1, 8, 0.0),
        obs("a", 2021, 3, 1, 12, 0.0),
        obs("a", 2021, 3, 1, 18, 0.0),
        obs("a", 2021, 3, 2, 8, 0.0),
        obs("a", 2021, 3, 2, 12, 2.5),
    ];
    let holidays = HolidaySets::empty();
    let schedule = CurfewSchedule::french_2020_2021();

    let (_, records, report) =
        run_pipeline(rows, &holidays, &schedule, &WeatherConfig::default()).expect("run");

    assert_eq!(report.input_rows, 5);
    assert_eq!(report.dead_rows_removed, 3);
    assert_eq!(report.dead_period_count, 1);
    assert_eq!(report.dead_periods.len(), 1);
    assert_eq!(report.dead_periods[0].day, date(2021, 3, 1));
    assert_eq!(report.output_rows, 2);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.temporal.day == 2));
}

#[test]
fn encoders_preserve_row_count() {
    let rows: Vec<Observation> = (0..24)
        .map(|hour| obs("a", 2021, 6, 15, hour, 1.0))
        .collect();
    let holidays = HolidaySets::empty();
    let schedule = CurfewSchedule::french_2020_2021();

    let temporal = encode_dates(&rows, &holidays, &schedule);
    assert_eq!(temporal.len(), rows.len());

    let weather = add_weather_features(&rows, &WeatherConfig::default());
    assert_eq!(weather.len(), rows.len());
}

#[test]
fn cyclical_hour_encoding_stays_on_the_unit_circle() {
    let rows: Vec<Observation> = (0..24)
        .map(|hour| obs("a", 2021, 6, 15, hour, 1.0))
        .collect();
    let holidays = HolidaySets::empty();
    let schedule = CurfewSchedule::french_2020_2021();

    for features in encode_dates(&rows, &holidays, &schedule) {
        let norm = features.sin_hour.powi(2) + features.cos_hour.powi(2);
        assert_close(norm, 1.0);
        let month_norm = features.sin_month.powi(2) + features.cos_month.powi(2);
        assert_close(month_norm, 1.0);
    }
}

#[test]
fn season_partition_is_total_over_valid_months() {
    for month in 1..=12u32 {
        let season = Season::from_month(month);
        assert_ne!(season, Season::Unknown, "month {month}");
    }
    assert_eq!(Season::from_month(0), Season::Unknown);
    assert_eq!(Season::from_month(13), Season::Unknown);

    assert_eq!(Season::from_month(12), Season::Winter);
    assert_eq!(Season::from_month(2), Season::Winter);
    assert_eq!(Season::from_month(3), Season::Spring);
    assert_eq!(Season::from_month(8), Season::Summer);
    assert_eq!(Season::from_month(11), Season::Fall);
}

#[test]
fn empty_input_produces_correctly_shaped_empty_output() {
    let holidays = HolidaySets::empty();
    let schedule = CurfewSchedule::french_2020_2021();

    let (schema, records, report) =
        run_pipeline(Vec::new(), &holidays, &schedule, &WeatherConfig::default()).expect("run");

    assert_eq!(schema.columns.len(), 21);
    assert!(records.is_empty());
    assert_eq!(report.input_rows, 0);
    assert_eq!(report.output_rows, 0);
    assert_eq!(report.dead_period_count, 0);
}

#[test]
fn overlapping_weather_thresholds_are_rejected() {
    let cfg = WeatherConfig {
        hot_day_kelvin: 280.0,
        cold_day_kelvin: 283.0,
        high_wind_ms: 5.0,
    };
    let err = run_pipeline(
        Vec::new(),
        &HolidaySets::empty(),
        &CurfewSchedule::french_2020_2021(),
        &cfg,
    )
    .expect_err("must fail");

    assert!(matches!(err, PipelineError::InvalidConfig(_)));
}

#[test]
fn schema_compatibility_check_matches_version_and_fingerprint() {
    let schema = build_feature_schema();

    assert_schema_compatible(FEATURE_SCHEMA_VERSION, &schema.fingerprint, &schema)
        .expect("compatibility should pass");

    let err = assert_schema_compatible(FEATURE_SCHEMA_VERSION + 1, &schema.fingerprint, &schema)
        .expect_err("version mismatch expected");
    assert!(matches!(err, FeatureError::SchemaVersionMismatch { .. }));

    let err = assert_schema_compatible(FEATURE_SCHEMA_VERSION, "not-real", &schema)
        .expect_err("fingerprint mismatch expected");
    assert!(matches!(
        err,
        FeatureError::SchemaFingerprintMismatch { .. }
    ));
}

#[test]
fn weather_features_follow_the_measurements() {
    let mut rows = vec![
        obs("a", 2021, 6, 15, 8, 1.0),
        obs("a", 2021, 6, 15, 9, 1.0),
        obs("a", 2021, 6, 15, 10, 1.0),
    ];
    rows[0].t = 301.0;
    rows[0].rr1 = 0.0;
    rows[1].t = 280.0;
    rows[1].rr1 = 2.0;
    rows[2].ff = 9.0;
    rows[2].rr1 = 12.0;

    let (_, records, _) = run_pipeline(
        rows,
        &HolidaySets::empty(),
        &CurfewSchedule::french_2020_2021(),
        &WeatherConfig::default(),
    )
    .expect("run");

    assert!(records[0].weather.is_hot_day);
    assert!(!records[0].weather.is_cold_day);
    assert_eq!(records[0].weather.rain_category.as_str(), "No Rain");

    assert!(records[1].weather.is_cold_day);
    assert_eq!(records[1].weather.rain_category.as_str(), "Light Rain");

    assert!(records[2].weather.high_wind);
    assert_eq!(records[2].weather.rain_category.as_str(), "Heavy Rain");
}

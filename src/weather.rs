//! Weather-derived categorical and binary indicators.

use serde::{Deserialize, Serialize};

use crate::observations::Observation;

/// Rainfall bucket over left-open, right-closed intervals:
/// (-1, 0] no rain, (0, 2] light, (2, 10] moderate, (10, inf) heavy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RainCategory {
    NoRain,
    LightRain,
    ModerateRain,
    HeavyRain,
}

impl RainCategory {
    pub fn from_rainfall(rr1: f64) -> Self {
        if rr1 <= 0.0 {
            Self::NoRain
        } else if rr1 <= 2.0 {
            Self::LightRain
        } else if rr1 <= 10.0 {
            Self::ModerateRain
        } else {
            Self::HeavyRain
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoRain => "No Rain",
            Self::LightRain => "Light Rain",
            Self::ModerateRain => "Moderate Rain",
            Self::HeavyRain => "Heavy Rain",
        }
    }
}

/// Thresholds for the extreme-weather flags. Temperature is in Kelvin,
/// wind speed in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub hot_day_kelvin: f64,
    pub cold_day_kelvin: f64,
    pub high_wind_ms: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            hot_day_kelvin: 300.0,
            cold_day_kelvin: 283.0,
            high_wind_ms: 5.0,
        }
    }
}

/// Weather indicators for one row. Independent thresholds; hot and cold
/// are mutually exclusive as long as the hot threshold stays above the
/// cold one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherFeatures {
    pub rain_category: RainCategory,
    pub is_hot_day: bool,
    pub is_cold_day: bool,
    pub high_wind: bool,
}

impl WeatherFeatures {
    pub fn from_measurements(t: f64, rr1: f64, ff: f64, cfg: &WeatherConfig) -> Self {
        Self {
            rain_category: RainCategory::from_rainfall(rr1),
            is_hot_day: t > cfg.hot_day_kelvin,
            is_cold_day: t < cfg.cold_day_kelvin,
            high_wind: ff > cfg.high_wind_ms,
        }
    }
}

/// Derives weather indicators for every row. Purely additive; row count is
/// preserved and no input field is consumed.
pub fn add_weather_features(rows: &[Observation], cfg: &WeatherConfig) -> Vec<WeatherFeatures> {
    rows.iter()
        .map(|row| WeatherFeatures::from_measurements(row.t, row.rr1, row.ff, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_bins_are_right_closed() {
        assert_eq!(RainCategory::from_rainfall(0.0), RainCategory::NoRain);
        assert_eq!(RainCategory::from_rainfall(-0.5), RainCategory::NoRain);
        assert_eq!(RainCategory::from_rainfall(0.1), RainCategory::LightRain);
        assert_eq!(RainCategory::from_rainfall(2.0), RainCategory::LightRain);
        assert_eq!(
            RainCategory::from_rainfall(2.0001),
            RainCategory::ModerateRain
        );
        assert_eq!(RainCategory::from_rainfall(10.0), RainCategory::ModerateRain);
        assert_eq!(
            RainCategory::from_rainfall(10.0001),
            RainCategory::HeavyRain
        );
    }

    #[test]
    fn threshold_flags_are_strict_inequalities() {
        let cfg = WeatherConfig::default();

        let at_hot = WeatherFeatures::from_measurements(300.0, 0.0, 0.0, &cfg);
        assert!(!at_hot.is_hot_day);
        let above_hot = WeatherFeatures::from_measurements(300.1, 0.0, 0.0, &cfg);
        assert!(above_hot.is_hot_day);

        let at_cold = WeatherFeatures::from_measurements(283.0, 0.0, 0.0, &cfg);
        assert!(!at_cold.is_cold_day);
        let below_cold = WeatherFeatures::from_measurements(282.9, 0.0, 0.0, &cfg);
        assert!(below_cold.is_cold_day);

        let at_wind = WeatherFeatures::from_measurements(290.0, 0.0, 5.0, &cfg);
        assert!(!at_wind.high_wind);
        let above_wind = WeatherFeatures::from_measurements(290.0, 0.0, 5.1, &cfg);
        assert!(above_wind.high_wind);
    }

    #[test]
    fn hot_and_cold_never_coincide_with_default_thresholds() {
        let cfg = WeatherConfig::default();
        for t in [250.0, 283.0, 290.0, 300.0, 310.0] {
            let features = WeatherFeatures::from_measurements(t, 0.0, 0.0, &cfg);
            assert!(!(features.is_hot_day && features.is_cold_day), "t={t}");
        }
    }
}

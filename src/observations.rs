//! Raw bicycle-count observation model and CSV I/O.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::features::{FeatureRecord, FeatureSchema};

/// Column contract for the raw observation table. Extra columns are
/// ignored; a missing column fails the whole load.
pub const REQUIRED_COLUMNS: [&str; 6] = ["date", "counter_name", "log_bike_count", "t", "rr1", "ff"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One measurement at a timestamp for one named counting sensor.
///
/// `log_bike_count` is the already log1p-transformed count; `t` is air
/// temperature in Kelvin, `rr1` hourly rainfall in mm, `ff` wind speed
/// in m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDateTime,
    pub counter_name: String,
    pub log_bike_count: f64,
    pub t: f64,
    pub rr1: f64,
    pub ff: f64,
}

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("missing required column '{0}' in observation header")]
    MissingColumn(&'static str),
    #[error("record {index} has {found} columns, expected at least {expected}")]
    InvalidRecordColumns {
        index: usize,
        found: usize,
        expected: usize,
    },
    #[error("failed to parse field {field} value '{value}'")]
    ParseField { field: &'static str, value: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads observations from CSV with a header row.
///
/// Enforces the documented column contract before touching any record so a
/// misnamed column fails fast with the offending name.
pub fn load_observations<R: Read>(reader: R) -> Result<Vec<Observation>, ObservationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        rows.push(layout.parse_record(&record, index)?);
    }

    info!(
        component = "observations",
        event = "observations.load.finish",
        rows = rows.len()
    );

    Ok(rows)
}

pub fn load_observations_from_path(path: &Path) -> Result<Vec<Observation>, ObservationError> {
    let file = File::open(path)?;
    load_observations(file)
}

/// Writes enriched feature records as CSV in the schema's column order.
pub fn write_feature_records<W: Write>(
    writer: W,
    schema: &FeatureSchema,
    records: &[FeatureRecord],
) -> Result<(), ObservationError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    csv_writer.write_record(&header)?;

    for record in records {
        csv_writer.write_record(record.csv_fields())?;
    }
    csv_writer.flush()?;

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    date: usize,
    counter_name: usize,
    log_bike_count: usize,
    t: usize,
    rr1: usize,
    ff: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, ObservationError> {
        Ok(Self {
            date: column_index(headers, "date")?,
            counter_name: column_index(headers, "counter_name")?,
            log_bike_count: column_index(headers, "log_bike_count")?,
            t: column_index(headers, "t")?,
            rr1: column_index(headers, "rr1")?,
            ff: column_index(headers, "ff")?,
        })
    }

    fn parse_record(
        &self,
        record: &StringRecord,
        index: usize,
    ) -> Result<Observation, ObservationError> {
        let min_len = [
            self.date,
            self.counter_name,
            self.log_bike_count,
            self.t,
            self.rr1,
            self.ff,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1;
        if record.len() < min_len {
            return Err(ObservationError::InvalidRecordColumns {
                index,
                found: record.len(),
                expected: min_len,
            });
        }

        Ok(Observation {
            date: parse_datetime(record, self.date, "date")?,
            counter_name: record[self.counter_name].to_string(),
            log_bike_count: parse_f64(record, self.log_bike_count, "log_bike_count")?,
            t: parse_f64(record, self.t, "t")?,
            rr1: parse_f64(record, self.rr1, "rr1")?,
            ff: parse_f64(record, self.ff, "ff")?,
        })
    }
}

fn column_index(headers: &StringRecord, name: &'static str) -> Result<usize, ObservationError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or(ObservationError::MissingColumn(name))
}

fn parse_f64(
    record: &StringRecord,
    index: usize,
    field: &'static str,
) -> Result<f64, ObservationError> {
    let raw = &record[index];
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ObservationError::ParseField {
            field,
            value: raw.to_string(),
        })
}

fn parse_datetime(
    record: &StringRecord,
    index: usize,
    field: &'static str,
) -> Result<NaiveDateTime, ObservationError> {
    let raw = record[index].trim();
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    Err(ObservationError::ParseField {
        field,
        value: raw.to_string(),
    })
}

//! Nightly curfew classification.
//!
//! A curfew window restricts movement between `start_hour` (inclusive) and
//! `end_hour` (exclusive, past midnight) on every calendar day within its
//! date range. The hour test is the disjunction
//! `hour >= start_hour || hour < end_hour`: only the hour of day is
//! inspected, which encodes the midnight wrap without a true
//! interval-spanning check. A window with `start_hour < end_hour` would
//! therefore match all hours *outside* the intended daytime interval; the
//! historical table only contains wrapping windows and the semantics are
//! kept unchanged so the produced features stay identical to what the
//! downstream model was trained on.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Recurring nightly restriction over an inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurfewWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl CurfewWindow {
    fn covers_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    fn covers_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour || hour < self.end_hour
    }
}

/// Ordered list of curfew windows; an explicit value, not a global, so
/// tests can substitute their own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurfewSchedule {
    windows: Vec<CurfewWindow>,
}

impl CurfewSchedule {
    pub fn new(windows: Vec<CurfewWindow>) -> Self {
        Self { windows }
    }

    /// The five French COVID curfew periods of 2020-2021.
    pub fn french_2020_2021() -> Self {
        Self::new(vec![
            window(2020, 10, 17, 2020, 10, 29, 21, 6),
            window(2021, 1, 16, 2021, 3, 20, 18, 6),
            window(2021, 3, 21, 2021, 5, 19, 19, 6),
            window(2021, 5, 20, 2021, 6, 9, 21, 6),
            window(2021, 6, 10, 2021, 6, 20, 23, 6),
        ])
    }

    pub fn windows(&self) -> &[CurfewWindow] {
        &self.windows
    }

    /// First-match test over the ordered window list. Minutes and seconds
    /// are ignored; only the calendar date and the hour matter.
    pub fn is_curfew(&self, ts: NaiveDateTime) -> bool {
        let date = ts.date();
        let hour = ts.hour();
        self.windows
            .iter()
            .any(|w| w.covers_date(date) && w.covers_hour(hour))
    }
}

impl Default for CurfewSchedule {
    fn default() -> Self {
        Self::french_2020_2021()
    }
}

#[allow(clippy::too_many_arguments)]
fn window(
    sy: i32,
    sm: u32,
    sd: u32,
    ey: i32,
    em: u32,
    ed: u32,
    start_hour: u32,
    end_hour: u32,
) -> CurfewWindow {
    CurfewWindow {
        start_date: NaiveDate::from_ymd_opt(sy, sm, sd).expect("valid curfew table date"),
        end_date: NaiveDate::from_ymd_opt(ey, em, ed).expect("valid curfew table date"),
        start_hour,
        end_hour,
    }
}

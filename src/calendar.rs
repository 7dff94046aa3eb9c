//! Holiday calendar providers.
//!
//! The feature encoder only needs day-level membership tests against two
//! date sets: school holidays (zone-specific) and public holidays. The
//! `HolidayCalendar` trait keeps live providers substitutable; tests and
//! callers with their own data use [`FixedCalendar`], and the bundled
//! [`FrenchCalendar`] carries the 2020-2021 tables the bicycle-count
//! dataset spans.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// French school-holiday administrative zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    A,
    B,
    C,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("holiday sets requested for an empty year list")]
    EmptyYears,
}

/// Source of holiday dates for a set of years.
pub trait HolidayCalendar {
    fn school_holidays(&self, years: &[i32], zone: Zone) -> BTreeSet<NaiveDate>;
    fn public_holidays(&self, years: &[i32]) -> BTreeSet<NaiveDate>;
}

/// Calendar backed by explicit date sets, filtered to the requested years.
#[derive(Debug, Clone, Default)]
pub struct FixedCalendar {
    school: BTreeSet<NaiveDate>,
    public: BTreeSet<NaiveDate>,
}

impl FixedCalendar {
    pub fn new(school: BTreeSet<NaiveDate>, public: BTreeSet<NaiveDate>) -> Self {
        Self { school, public }
    }
}

impl HolidayCalendar for FixedCalendar {
    fn school_holidays(&self, years: &[i32], _zone: Zone) -> BTreeSet<NaiveDate> {
        filter_years(&self.school, years)
    }

    fn public_holidays(&self, years: &[i32]) -> BTreeSet<NaiveDate> {
        filter_years(&self.public, years)
    }
}

/// Built-in French holiday tables for 2020 and 2021.
///
/// School-holiday data is carried for Zone C only (the Paris counting
/// network); other zones yield an empty set, as do years outside the
/// table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrenchCalendar;

impl HolidayCalendar for FrenchCalendar {
    fn school_holidays(&self, years: &[i32], zone: Zone) -> BTreeSet<NaiveDate> {
        let mut out = BTreeSet::new();
        if zone != Zone::C {
            return out;
        }
        for year in years {
            for (start, end) in zone_c_school_periods(*year) {
                let mut day = start;
                while day <= end {
                    out.insert(day);
                    day = day.succ_opt().expect("school holiday range stays in-calendar");
                }
            }
        }
        out
    }

    fn public_holidays(&self, years: &[i32]) -> BTreeSet<NaiveDate> {
        let mut out = BTreeSet::new();
        for year in years {
            for (month, day) in public_holiday_days(*year) {
                out.insert(ymd(*year, *month, *day));
            }
        }
        out
    }
}

/// Both holiday sets materialized once per run.
#[derive(Debug, Clone)]
pub struct HolidaySets {
    school: BTreeSet<NaiveDate>,
    public: BTreeSet<NaiveDate>,
}

impl HolidaySets {
    pub fn build(
        calendar: &dyn HolidayCalendar,
        years: &[i32],
        zone: Zone,
    ) -> Result<Self, CalendarError> {
        if years.is_empty() {
            return Err(CalendarError::EmptyYears);
        }

        let school = calendar.school_holidays(years, zone);
        let public = calendar.public_holidays(years);

        info!(
            component = "calendar",
            event = "calendar.sets.built",
            years = ?years,
            zone = zone.as_str(),
            school_days = school.len(),
            public_days = public.len()
        );

        Ok(Self { school, public })
    }

    /// Empty sets; every membership test is false.
    pub fn empty() -> Self {
        Self {
            school: BTreeSet::new(),
            public: BTreeSet::new(),
        }
    }

    pub fn is_school_holiday(&self, date: NaiveDate) -> bool {
        self.school.contains(&date)
    }

    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.public.contains(&date)
    }

    pub fn school_day_count(&self) -> usize {
        self.school.len()
    }

    pub fn public_day_count(&self) -> usize {
        self.public.len()
    }
}

fn filter_years(dates: &BTreeSet<NaiveDate>, years: &[i32]) -> BTreeSet<NaiveDate> {
    dates
        .iter()
        .filter(|date| years.contains(&date.year()))
        .copied()
        .collect()
}

/// French public holidays, fixed-date and movable feasts as explicit days.
fn public_holiday_days(year: i32) -> &'static [(u32, u32)] {
    match year {
        // Easter Monday Apr 13, Ascension May 21, Whit Monday Jun 1.
        2020 => &[
            (1, 1),
            (4, 13),
            (5, 1),
            (5, 8),
            (5, 21),
            (6, 1),
            (7, 14),
            (8, 15),
            (11, 1),
            (11, 11),
            (12, 25),
        ],
        // Easter Monday Apr 5, Ascension May 13, Whit Monday May 24.
        2021 => &[
            (1, 1),
            (4, 5),
            (5, 1),
            (5, 8),
            (5, 13),
            (5, 24),
            (7, 14),
            (8, 15),
            (11, 1),
            (11, 11),
            (12, 25),
        ],
        _ => &[],
    }
}

/// Zone C school-holiday periods within a calendar year, inclusive bounds.
///
/// Periods spanning New Year appear split across the two years, matching a
/// per-calendar-year provider.
fn zone_c_school_periods(year: i32) -> Vec<(NaiveDate, NaiveDate)> {
    let spans: &[((u32, u32), (u32, u32))] = match year {
        2020 => &[
            ((1, 1), (1, 5)),
            ((2, 8), (2, 23)),
            ((4, 4), (4, 19)),
            ((7, 4), (8, 31)),
            ((10, 17), (11, 1)),
            ((12, 19), (12, 31)),
        ],
        2021 => &[
            ((1, 1), (1, 3)),
            ((2, 13), (2, 28)),
            ((4, 10), (4, 25)),
            ((7, 6), (9, 1)),
            ((10, 23), (11, 7)),
            ((12, 18), (12, 31)),
        ],
        _ => &[],
    };

    spans
        .iter()
        .map(|((sm, sd), (em, ed))| (ymd(year, *sm, *sd), ymd(year, *em, *ed)))
        .collect()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid holiday table date")
}

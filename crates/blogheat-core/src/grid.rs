//! Contribution calendar grid
//!
//! Lays days out as week columns of seven rows, starting from the week that
//! contains the day `lookback_years` before the reference date. The number of
//! columns is checked against that start so the reference date is always on
//! the grid.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bucket::BucketMap;
use crate::daykey::DayKey;
use crate::error::{CalendarError, Result};
use crate::summary;

pub const DEFAULT_LOOKBACK_YEARS: u32 = 1;
pub const DEFAULT_WEEK_COUNT: u32 = 53;
pub const DAYS_PER_WEEK: u32 = 7;
/// Largest accepted `lookback_years`.
pub const MAX_LOOKBACK_YEARS: u32 = 100;
/// Largest accepted `week_count`. Covers the columns `MAX_LOOKBACK_YEARS` needs.
pub const MAX_WEEK_COUNT: u32 = MAX_LOOKBACK_YEARS * 53 + 1;

/// First row of every week column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Row index of `date` under this convention, 0..=6.
    pub fn day_of_week(self, date: NaiveDate) -> u8 {
        let days = match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        };
        days as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStart {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            "monday" | "mon" => Ok(WeekStart::Monday),
            _ => Err(CalendarError::InvalidOptions(format!(
                "unknown week start '{}' (expected sunday or monday)",
                s
            ))),
        }
    }
}

/// What to do when the requested week count cannot reach the reference date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSizing {
    /// Grow the grid to the minimum week count.
    #[default]
    Expand,
    /// Reject with `WeekCountTooSmall`.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    pub lookback_years: u32,
    pub week_count: u32,
    pub week_start: WeekStart,
    pub sizing: GridSizing,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            lookback_years: DEFAULT_LOOKBACK_YEARS,
            week_count: DEFAULT_WEEK_COUNT,
            week_start: WeekStart::Sunday,
            sizing: GridSizing::Expand,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub day_key: DayKey,
    pub count: u32,
    pub week_index: u32,
    pub day_of_week: u8,
    /// 0..=4, relative to the busiest day on the grid.
    pub intensity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPosition {
    pub week_index: u32,
    pub day_of_week: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLabel {
    pub week_index: u32,
    pub month: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub reference_date: DayKey,
    pub start: DayKey,
    pub end: DayKey,
    pub week_start: WeekStart,
    pub lookback_years: u32,
    pub requested_week_count: u32,
    pub weeks: Vec<Vec<GridCell>>,
}

impl Grid {
    pub fn week_count(&self) -> u32 {
        self.weeks.len() as u32
    }

    /// Cells in calendar order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.weeks.iter().flatten()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut GridCell> + '_ {
        self.weeks.iter_mut().flatten()
    }

    pub fn locate(&self, day_key: &DayKey) -> Option<GridPosition> {
        locate(self, day_key)
    }

    pub fn contains(&self, day_key: &DayKey) -> bool {
        self.locate(day_key).is_some()
    }

    pub fn cell(&self, position: GridPosition) -> Option<&GridCell> {
        self.weeks
            .get(position.week_index as usize)?
            .get(position.day_of_week as usize)
    }

    pub fn total_count(&self) -> u64 {
        self.cells().map(|c| c.count as u64).sum()
    }

    /// One label per column in which a month begins; the first column is
    /// always labelled.
    pub fn month_labels(&self) -> Vec<MonthLabel> {
        let mut labels = Vec::new();
        for (week_index, week) in self.weeks.iter().enumerate() {
            let first_of_month = week.iter().find(|c| c.day_key.date().day() == 1);
            let labelled = match (first_of_month, week_index) {
                (Some(cell), _) => Some(cell),
                (None, 0) => week.first(),
                (None, _) => None,
            };
            if let Some(cell) = labelled {
                labels.push(MonthLabel {
                    week_index: week_index as u32,
                    month: cell.day_key.month_key(),
                });
            }
        }
        labels
    }
}

/// `reference` moved back `years` calendar years.
///
/// A Feb 29 reference that lands on a non-leap year resolves to Feb 28.
pub fn lookback_anchor(reference: NaiveDate, years: u32) -> Result<NaiveDate> {
    years
        .checked_mul(12)
        .and_then(|months| reference.checked_sub_months(Months::new(months)))
        .ok_or_else(|| {
            CalendarError::InvalidOptions(format!(
                "cannot look back {} years from {}",
                years,
                DayKey::from_date(reference)
            ))
        })
}

/// Walk `date` back to the first day of its week.
pub fn align_to_week_start(date: NaiveDate, week_start: WeekStart) -> Result<NaiveDate> {
    let offset = week_start.day_of_week(date) as u64;
    date.checked_sub_days(Days::new(offset))
        .ok_or_else(|| CalendarError::InvalidDate(DayKey::from_date(date).to_string()))
}

/// Smallest number of week columns starting at `aligned_start` that still
/// contains `reference`.
pub fn required_week_count(aligned_start: NaiveDate, reference: NaiveDate) -> u32 {
    let days = (reference - aligned_start).num_days().max(0) as u32;
    days / DAYS_PER_WEEK + 1
}

/// Build the grid ending around `reference_date`.
pub fn build(buckets: &BucketMap, reference_date: NaiveDate, options: &GridOptions) -> Result<Grid> {
    if options.lookback_years == 0 {
        return Err(CalendarError::InvalidOptions(
            "lookback years must be at least 1".to_string(),
        ));
    }
    if options.week_count == 0 {
        return Err(CalendarError::InvalidOptions(
            "week count must be at least 1".to_string(),
        ));
    }
    if options.lookback_years > MAX_LOOKBACK_YEARS {
        return Err(CalendarError::InvalidOptions(format!(
            "lookback years must be at most {}, got {}",
            MAX_LOOKBACK_YEARS, options.lookback_years
        )));
    }
    if options.week_count > MAX_WEEK_COUNT {
        return Err(CalendarError::InvalidOptions(format!(
            "week count must be at most {}, got {}",
            MAX_WEEK_COUNT, options.week_count
        )));
    }

    let anchor = lookback_anchor(reference_date, options.lookback_years)?;
    let start = align_to_week_start(anchor, options.week_start)?;
    let required = required_week_count(start, reference_date);

    let week_count = if options.week_count >= required {
        options.week_count
    } else {
        match options.sizing {
            GridSizing::Expand => required,
            GridSizing::Strict => {
                return Err(CalendarError::WeekCountTooSmall {
                    requested: options.week_count,
                    required,
                })
            }
        }
    };

    let mut weeks = Vec::with_capacity(week_count as usize);
    for week_index in 0..week_count {
        let mut week = Vec::with_capacity(DAYS_PER_WEEK as usize);
        for row in 0..DAYS_PER_WEEK {
            let offset = (week_index * DAYS_PER_WEEK + row) as u64;
            let date = start
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| CalendarError::InvalidDate(DayKey::from_date(start).to_string()))?;
            let day_key = DayKey::from_date(date);
            week.push(GridCell {
                day_key,
                count: buckets.get(&day_key),
                week_index,
                day_of_week: row as u8,
                intensity: 0,
            });
        }
        weeks.push(week);
    }

    let end = weeks
        .last()
        .and_then(|week| week.last())
        .map(|cell| cell.day_key)
        .unwrap_or_else(|| DayKey::from_date(start));

    let mut grid = Grid {
        reference_date: DayKey::from_date(reference_date),
        start: DayKey::from_date(start),
        end,
        week_start: options.week_start,
        lookback_years: options.lookback_years,
        requested_week_count: options.week_count,
        weeks,
    };
    summary::apply_intensities(&mut grid);

    Ok(grid)
}

/// Column and row of `day_key`, or `None` when it is off the grid.
pub fn locate(grid: &Grid, day_key: &DayKey) -> Option<GridPosition> {
    grid.cells()
        .find(|cell| cell.day_key == *day_key)
        .map(|cell| GridPosition {
            week_index: cell.week_index,
            day_of_week: cell.day_of_week,
        })
}

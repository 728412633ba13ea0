//! Grid statistics: intensity levels, streaks and monthly archive counts

use serde::Serialize;
use std::collections::BTreeMap;

use crate::bucket::BucketMap;
use crate::daykey::DayKey;
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub total_events: u64,
    pub total_days: u32,
    pub active_days: u32,
    pub average_per_active_day: f64,
    pub max_in_single_day: u32,
    pub busiest_day: Option<DayKey>,
    pub longest_streak: u32,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthArchive {
    /// `YYYY-MM`, serialized as `date` like the blog's archive API.
    #[serde(rename = "date")]
    pub month: String,
    pub count: u64,
}

/// Intensity level 0..=4 of `count` relative to `max`.
pub fn intensity_level(count: u32, max: u32) -> u8 {
    if max == 0 || count == 0 {
        return 0;
    }

    let ratio = count as f64 / max as f64;
    if ratio >= 0.75 {
        4
    } else if ratio >= 0.5 {
        3
    } else if ratio >= 0.25 {
        2
    } else {
        1
    }
}

pub fn apply_intensities(grid: &mut Grid) {
    let max = grid.cells().map(|c| c.count).max().unwrap_or(0);
    for cell in grid.cells_mut() {
        cell.intensity = intensity_level(cell.count, max);
    }
}

pub fn summarize(grid: &Grid) -> GridSummary {
    let mut total_events = 0u64;
    let mut active_days = 0u32;
    let mut max_in_single_day = 0u32;
    let mut busiest_day = None;
    let mut longest_streak = 0u32;
    let mut streak = 0u32;

    for cell in grid.cells() {
        total_events += cell.count as u64;
        if cell.count > 0 {
            active_days += 1;
            streak += 1;
            longest_streak = longest_streak.max(streak);
        } else {
            streak = 0;
        }
        if cell.count > max_in_single_day {
            max_in_single_day = cell.count;
            busiest_day = Some(cell.day_key);
        }
    }

    GridSummary {
        total_events,
        total_days: grid.cells().count() as u32,
        active_days,
        average_per_active_day: if active_days > 0 {
            total_events as f64 / active_days as f64
        } else {
            0.0
        },
        max_in_single_day,
        busiest_day,
        longest_streak,
        current_streak: current_streak(grid),
    }
}

/// Consecutive active days ending on the reference date, or on the day
/// before it when nothing has been posted yet today.
fn current_streak(grid: &Grid) -> u32 {
    let cells: Vec<_> = grid
        .cells()
        .take_while(|c| c.day_key <= grid.reference_date)
        .collect();

    let mut remaining = cells.as_slice();
    if let Some((today, rest)) = remaining.split_last() {
        if today.day_key == grid.reference_date && today.count == 0 {
            remaining = rest;
        }
    }

    remaining
        .iter()
        .rev()
        .take_while(|c| c.count > 0)
        .count() as u32
}

/// Event counts per `YYYY-MM`, newest month first.
pub fn monthly_archive(buckets: &BucketMap) -> Vec<MonthArchive> {
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for (day, count) in buckets.iter() {
        *months.entry(day.month_key()).or_insert(0) += count as u64;
    }

    months
        .into_iter()
        .rev()
        .map(|(month, count)| MonthArchive { month, count })
        .collect()
}

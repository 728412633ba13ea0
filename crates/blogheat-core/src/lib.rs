#![deny(clippy::all)]

pub mod bucket;
pub mod daykey;
pub mod error;
pub mod grid;
pub mod summary;

pub use bucket::{bucket_records, bucket_timestamps, BucketMap, BucketReport, SkippedEvent};
pub use daykey::{normalize, parse_timestamp, DayKey, DisplayZone, EventTime};
pub use error::{CalendarError, Result};
pub use grid::{
    build, locate, Grid, GridCell, GridOptions, GridPosition, GridSizing, MonthLabel, WeekStart,
    DEFAULT_LOOKBACK_YEARS, DEFAULT_WEEK_COUNT,
};
pub use summary::{monthly_archive, summarize, GridSummary, MonthArchive};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A piece of published content. Only the creation time matters to the
/// calendar; the other fields identify the record in diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(default, alias = "ID")]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "CreatedAt", alias = "created_at")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMeta {
    pub version: String,
    pub zone: DisplayZone,
    pub reference_date: DayKey,
    pub start: DayKey,
    pub end: DayKey,
    pub week_count: u32,
    pub requested_week_count: u32,
    pub records_accepted: usize,
    pub records_skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridReport {
    pub meta: GridMeta,
    pub summary: GridSummary,
    pub month_labels: Vec<MonthLabel>,
    pub grid: Grid,
}

/// Bucket `records`, build the grid around `reference_date` and summarize it.
///
/// Returns the bucketing pass alongside the report so callers can inspect
/// skipped records.
pub fn generate_grid_report(
    records: &[ContentRecord],
    reference_date: NaiveDate,
    zone: &DisplayZone,
    options: &GridOptions,
) -> Result<(GridReport, BucketReport)> {
    let bucket_report = bucket_records(records, zone);
    let grid = build(&bucket_report.buckets, reference_date, options)?;

    let report = GridReport {
        meta: GridMeta {
            version: version(),
            zone: *zone,
            reference_date: grid.reference_date,
            start: grid.start,
            end: grid.end,
            week_count: grid.week_count(),
            requested_week_count: grid.requested_week_count,
            records_accepted: bucket_report.accepted,
            records_skipped: bucket_report.skipped.len(),
        },
        summary: summarize(&grid),
        month_labels: grid.month_labels(),
        grid,
    };

    Ok((report, bucket_report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_record_field_aliases() {
        let json = r#"[
            {"ID": 1, "title": "a", "CreatedAt": "2026-02-01T10:00:00+08:00"},
            {"id": 2, "createdAt": "2026-02-01T12:00:00+08:00"},
            {"created_at": "2026-02-02T12:00:00+08:00", "content": "ignored"},
            {"title": "draft"}
        ]"#;
        let records: Vec<ContentRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[0].created_at.as_deref(), Some("2026-02-01T10:00:00+08:00"));
        assert_eq!(records[1].created_at.as_deref(), Some("2026-02-01T12:00:00+08:00"));
        assert_eq!(records[2].created_at.as_deref(), Some("2026-02-02T12:00:00+08:00"));
        assert_eq!(records[3].created_at, None);
    }

    #[test]
    fn test_generate_grid_report() {
        let records: Vec<ContentRecord> = [
            Some("2026-02-01T10:00:00+08:00"),
            Some("2026-02-01T12:00:00+08:00"),
            Some("2026-02-01T14:00:00+08:00"),
            Some("2026-02-01T16:00:00+08:00"),
            Some("2026-02-01T18:00:00+08:00"),
            Some("not a time"),
            None,
        ]
        .into_iter()
        .map(|ts| ContentRecord {
            created_at: ts.map(str::to_string),
            ..Default::default()
        })
        .collect();

        let zone: DisplayZone = "+08:00".parse().unwrap();
        let reference = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let (report, buckets) =
            generate_grid_report(&records, reference, &zone, &GridOptions::default()).unwrap();

        assert_eq!(report.meta.records_accepted, 5);
        assert_eq!(report.meta.records_skipped, 2);
        assert_eq!(report.meta.week_count, 54);
        assert_eq!(report.meta.requested_week_count, 53);
        assert_eq!(report.meta.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(report.summary.total_events, 5);
        assert_eq!(report.summary.current_streak, 1);
        assert_eq!(buckets.skipped.len(), 2);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["meta"]["zone"], "+08:00");
        assert_eq!(value["meta"]["referenceDate"], "2026-02-01");
        assert_eq!(value["summary"]["busiestDay"], "2026-02-01");
    }
}

//! Terminal rendering of the calendar grid and its summaries

use blogheat_core::{Grid, GridCell, GridMeta, GridSummary, MonthArchive};
use colored::{ColoredString, Colorize};
use comfy_table::{ContentArrangement, Table};

const CELL: &str = "■";
const TODAY_CELL: &str = "▣";
const FUTURE_CELL: &str = "·";
const LABEL_WIDTH: usize = 4;
const COLUMN_WIDTH: usize = 2;

const GRADE_COLORS: [(u8, u8, u8); 5] = [
    (0x2D, 0x33, 0x3B),
    (0x0E, 0x44, 0x29),
    (0x00, 0x6D, 0x32),
    (0x26, 0xA6, 0x41),
    (0x39, 0xD3, 0x53),
];

fn paint(symbol: &str, intensity: u8) -> ColoredString {
    let (r, g, b) = GRADE_COLORS[(intensity as usize).min(GRADE_COLORS.len() - 1)];
    symbol.truecolor(r, g, b)
}

fn paint_cell(cell: &GridCell, grid: &Grid) -> ColoredString {
    if cell.day_key > grid.reference_date {
        FUTURE_CELL.bright_black()
    } else if cell.day_key == grid.reference_date {
        paint(TODAY_CELL, cell.intensity).bold()
    } else {
        paint(CELL, cell.intensity)
    }
}

/// Month names above the first column each month starts in.
fn month_header(grid: &Grid) -> String {
    let width = LABEL_WIDTH + grid.weeks.len() * COLUMN_WIDTH;
    let mut header = vec![' '; width];
    let mut next_free = 0;

    for label in grid.month_labels() {
        let column = LABEL_WIDTH + label.week_index as usize * COLUMN_WIDTH;
        if column < next_free {
            continue;
        }

        // The labelled month may begin mid-column
        let Some(name) = grid.weeks[label.week_index as usize]
            .iter()
            .find(|c| c.day_key.month_key() == label.month)
            .map(|c| c.day_key.date().format("%b").to_string())
        else {
            continue;
        };

        for (offset, ch) in name.chars().enumerate() {
            if let Some(slot) = header.get_mut(column + offset) {
                *slot = ch;
            }
        }
        next_free = column + name.len() + 1;
    }

    header.into_iter().collect::<String>().trim_end().to_string()
}

pub fn render_heatmap(grid: &Grid) -> String {
    let mut lines = Vec::with_capacity(10);
    lines.push(month_header(grid));

    let mut weekday = grid.week_start.weekday();
    for row in 0..7 {
        let mut line = format!("{:<width$}", weekday.to_string(), width = LABEL_WIDTH);
        for week in &grid.weeks {
            if let Some(cell) = week.get(row) {
                line.push_str(&paint_cell(cell, grid).to_string());
                line.push(' ');
            }
        }
        lines.push(line.trim_end().to_string());
        weekday = weekday.succ();
    }

    let legend: Vec<String> = (0..GRADE_COLORS.len() as u8)
        .map(|level| paint(CELL, level).to_string())
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "{:<width$}Less {} More",
        "",
        legend.join(" "),
        width = LABEL_WIDTH
    ));

    lines.join("\n")
}

pub fn summary_table(meta: &GridMeta, summary: &GridSummary) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);

    let rows: Vec<(&str, String)> = vec![
        ("Range", format!("{} .. {}", meta.start, meta.end)),
        ("Reference date", meta.reference_date.to_string()),
        ("Time zone", meta.zone.to_string()),
        ("Weeks", format_weeks(meta)),
        ("Articles", summary.total_events.to_string()),
        ("Active days", summary.active_days.to_string()),
        ("Busiest day", format_busiest(summary)),
        ("Longest streak", format!("{}d", summary.longest_streak)),
        ("Current streak", format!("{}d", summary.current_streak)),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }

    table
}

pub fn archive_table(archive: &[MonthArchive]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Month", "Articles"]);
    for entry in archive {
        table.add_row(vec![entry.month.clone(), entry.count.to_string()]);
    }
    table
}

fn format_weeks(meta: &GridMeta) -> String {
    if meta.week_count == meta.requested_week_count {
        meta.week_count.to_string()
    } else {
        format!(
            "{} (expanded from {})",
            meta.week_count, meta.requested_week_count
        )
    }
}

fn format_busiest(summary: &GridSummary) -> String {
    match summary.busiest_day {
        Some(day) => format!("{} ({})", day, summary.max_in_single_day),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogheat_core::{build, BucketMap, DayKey, GridOptions, WeekStart};

    fn grid(reference: &str, week_start: WeekStart) -> Grid {
        let options = GridOptions {
            week_start,
            ..Default::default()
        };
        build(
            &BucketMap::new(),
            DayKey::parse(reference).unwrap().date(),
            &options,
        )
        .unwrap()
    }

    #[test]
    fn test_heatmap_has_seven_weekday_rows() {
        colored::control::set_override(false);
        let rendered = render_heatmap(&grid("2026-02-01", WeekStart::Sunday));
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[1].starts_with("Sun"));
        assert!(lines[7].starts_with("Sat"));
        assert!(lines[8].is_empty());
        assert!(lines[9].contains("Less"));
        // Reference date is the Sunday of the last column
        assert!(lines[1].ends_with(TODAY_CELL));
    }

    #[test]
    fn test_heatmap_monday_rows() {
        colored::control::set_override(false);
        let rendered = render_heatmap(&grid("2026-02-01", WeekStart::Monday));
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[1].starts_with("Mon"));
        assert!(lines[7].starts_with("Sun"));
    }

    #[test]
    fn test_month_header_names_months() {
        let header = month_header(&grid("2026-02-01", WeekStart::Sunday));
        assert!(header.contains("Feb"));
        assert!(header.contains("Jun"));
        assert!(header.contains("Dec"));
    }
}

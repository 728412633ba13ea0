mod config;
mod input;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use blogheat_core::{
    bucket_records, generate_grid_report, monthly_archive, BucketReport, ContentRecord, DayKey,
    DisplayZone,
};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use config::{BlogheatConfig, CalendarOverrides, CalendarSettings};

#[derive(Parser)]
#[command(name = "blogheat")]
#[command(author, version, about = "Contribution calendar for blog publishing activity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[arg(long, global = true, help = "Config file (TOML), defaults to ~/.blogheat.toml")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CalendarArgs {
    #[arg(help = "Article list JSON file, or - for stdin")]
    input: String,

    #[arg(long, help = "Reference date (YYYY-MM-DD), defaults to today in the display zone")]
    today: Option<String>,

    #[arg(long, help = "Display time zone (+08:00, UTC, Asia/Shanghai)")]
    zone: Option<String>,

    #[arg(long, help = "Years of history before the reference date")]
    lookback_years: Option<u32>,

    #[arg(long, help = "Number of week columns")]
    weeks: Option<u32>,

    #[arg(long, help = "First day of the week (sunday or monday)")]
    week_start: Option<String>,

    #[arg(long, help = "Fail instead of adding weeks when the grid cannot reach the reference date")]
    strict: bool,
}

impl CalendarArgs {
    fn overrides(&self) -> CalendarOverrides {
        CalendarOverrides {
            zone: self.zone.clone(),
            lookback_years: self.lookback_years,
            week_count: self.weeks,
            week_start: self.week_start.clone(),
            strict: self.strict,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Build the contribution calendar grid")]
    Grid {
        #[command(flatten)]
        calendar: CalendarArgs,
        #[arg(long, help = "Output as JSON")]
        json: bool,
        #[arg(long, help = "Write JSON to file instead of stdout")]
        output: Option<String>,
    },
    #[command(about = "Find the week column and weekday row of a date")]
    Locate {
        #[command(flatten)]
        calendar: CalendarArgs,
        #[arg(help = "Date to locate (YYYY-MM-DD)")]
        day: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show article counts per month")]
    Archive {
        #[arg(help = "Article list JSON file, or - for stdin")]
        input: String,
        #[arg(long, help = "Display time zone (+08:00, UTC, Asia/Shanghai)")]
        zone: Option<String>,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = BlogheatConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Grid {
            calendar,
            json,
            output,
        } => run_grid_command(&config, &calendar, json || output.is_some(), output),
        Commands::Locate {
            calendar,
            day,
            json,
        } => run_locate_command(&config, &calendar, &day, json),
        Commands::Archive { input, zone, json } => {
            run_archive_command(&config, &input, zone, json)
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn reference_date(today: Option<&str>, zone: &DisplayZone) -> Result<NaiveDate> {
    match today {
        Some(raw) => Ok(DayKey::parse(raw)
            .context("--today must be a date in YYYY-MM-DD form")?
            .date()),
        None => Ok(zone.local_date(&Utc::now())),
    }
}

fn log_skipped(records: &[ContentRecord], report: &BucketReport) {
    for skipped in &report.skipped {
        let record = records.get(skipped.index);
        tracing::debug!(
            index = skipped.index,
            id = ?record.and_then(|r| r.id),
            title = ?record.and_then(|r| r.title.as_deref()),
            error = %skipped.error,
            "skipping record"
        );
    }
    if !report.skipped.is_empty() {
        tracing::warn!(
            "skipped {} of {} records without a valid creation timestamp",
            report.skipped.len(),
            records.len()
        );
    }
}

fn load_calendar(
    config: &BlogheatConfig,
    calendar: &CalendarArgs,
) -> Result<(Vec<ContentRecord>, CalendarSettings, NaiveDate)> {
    let settings = config.resolve(&calendar.overrides())?;
    let reference = reference_date(calendar.today.as_deref(), &settings.zone)?;
    let records = input::load_records(&calendar.input)?;
    Ok((records, settings, reference))
}

fn run_grid_command(
    config: &BlogheatConfig,
    calendar: &CalendarArgs,
    json: bool,
    output: Option<String>,
) -> Result<()> {
    let (records, settings, reference) = load_calendar(config, calendar)?;

    let (report, buckets) =
        generate_grid_report(&records, reference, &settings.zone, &settings.options)?;
    log_skipped(&records, &buckets);
    tracing::info!(
        start = %report.meta.start,
        end = %report.meta.end,
        weeks = report.meta.week_count,
        "built grid"
    );
    if report.meta.week_count != report.meta.requested_week_count {
        tracing::debug!(
            requested = report.meta.requested_week_count,
            actual = report.meta.week_count,
            "expanded week count to reach the reference date"
        );
    }

    if !json {
        println!("{}", render::render_heatmap(&report.grid));
        println!();
        println!("{}", render::summary_table(&report.meta, &report.summary));
        return Ok(());
    }

    let json_output = serde_json::to_string_pretty(&report)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json_output)
            .with_context(|| format!("Failed to write '{}'", output_path))?;

        eprintln!("{}", format!("✓ Grid data written to {}", output_path).green());
        eprintln!(
            "{}",
            format!(
                "  {} weeks, {} articles on {} days",
                report.meta.week_count, report.summary.total_events, report.summary.active_days
            )
            .bright_black()
        );
        if report.meta.records_skipped > 0 {
            eprintln!(
                "{}",
                format!("  {} records skipped", report.meta.records_skipped).yellow()
            );
        }
    } else {
        println!("{}", json_output);
    }

    Ok(())
}

fn run_locate_command(
    config: &BlogheatConfig,
    calendar: &CalendarArgs,
    day: &str,
    json: bool,
) -> Result<()> {
    let target = DayKey::parse(day).context("day must be a date in YYYY-MM-DD form")?;
    let (records, settings, reference) = load_calendar(config, calendar)?;

    let (report, buckets) =
        generate_grid_report(&records, reference, &settings.zone, &settings.options)?;
    log_skipped(&records, &buckets);

    let position = report.grid.locate(&target);
    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LocateJson {
            day_key: DayKey,
            week_index: u32,
            day_of_week: u8,
            count: u32,
            intensity: u8,
        }

        let found = position.and_then(|p| report.grid.cell(p)).map(|cell| LocateJson {
            day_key: cell.day_key,
            week_index: cell.week_index,
            day_of_week: cell.day_of_week,
            count: cell.count,
            intensity: cell.intensity,
        });
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    match position.and_then(|p| report.grid.cell(p)) {
        Some(cell) => println!(
            "{} is at week {}, day {} ({} articles)",
            target, cell.week_index, cell.day_of_week, cell.count
        ),
        None => println!(
            "{} is not in grid ({} .. {})",
            target, report.meta.start, report.meta.end
        ),
    }

    Ok(())
}

fn run_archive_command(
    config: &BlogheatConfig,
    input: &str,
    zone: Option<String>,
    json: bool,
) -> Result<()> {
    let settings = config.resolve(&CalendarOverrides {
        zone,
        ..Default::default()
    })?;
    let records = input::load_records(input)?;

    let report = bucket_records(&records, &settings.zone);
    log_skipped(&records, &report);
    let archive = monthly_archive(&report.buckets);

    if json {
        println!("{}", serde_json::to_string_pretty(&archive)?);
    } else if archive.is_empty() {
        println!("No articles with a valid creation time.");
    } else {
        println!("{}", render::archive_table(&archive));
    }

    Ok(())
}

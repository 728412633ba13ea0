use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blogheat_core::{DisplayZone, GridOptions, GridSizing, WeekStart};
use serde::Deserialize;

const CONFIG_ENV: &str = "BLOGHEAT_CONFIG";
const CONFIG_FILE_NAME: &str = ".blogheat.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogheatConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// `[calendar]` table. Every key is optional; command-line flags win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub lookback_years: Option<u32>,
    #[serde(default)]
    pub week_count: Option<u32>,
    #[serde(default)]
    pub week_start: Option<WeekStart>,
    #[serde(default)]
    pub strict: Option<bool>,
}

/// Command-line overrides for the calendar settings.
#[derive(Debug, Clone, Default)]
pub struct CalendarOverrides {
    pub zone: Option<String>,
    pub lookback_years: Option<u32>,
    pub week_count: Option<u32>,
    pub week_start: Option<String>,
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSettings {
    pub zone: DisplayZone,
    pub options: GridOptions,
}

impl BlogheatConfig {
    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
    }

    /// Load from `explicit`, else `$BLOGHEAT_CONFIG`, else `~/.blogheat.toml`.
    ///
    /// A missing default file yields the defaults; a file that was asked for
    /// explicitly must exist, and any file that exists must parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let path = match requested {
            Some(path) => path,
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn resolve(&self, overrides: &CalendarOverrides) -> Result<CalendarSettings> {
        let calendar = &self.calendar;
        let defaults = GridOptions::default();

        let zone = match overrides.zone.as_deref().or(calendar.zone.as_deref()) {
            Some(raw) => raw.parse::<DisplayZone>()?,
            None => DisplayZone::utc(),
        };

        let week_start = match overrides.week_start.as_deref() {
            Some(raw) => raw.parse::<WeekStart>()?,
            None => calendar.week_start.unwrap_or(defaults.week_start),
        };

        let sizing = if overrides.strict || calendar.strict.unwrap_or(false) {
            GridSizing::Strict
        } else {
            GridSizing::Expand
        };

        Ok(CalendarSettings {
            zone,
            options: GridOptions {
                lookback_years: overrides
                    .lookback_years
                    .or(calendar.lookback_years)
                    .unwrap_or(defaults.lookback_years),
                week_count: overrides
                    .week_count
                    .or(calendar.week_count)
                    .unwrap_or(defaults.week_count),
                week_start,
                sizing,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn restore_env(var: &str, previous: Option<std::ffi::OsString>) {
        match previous {
            Some(value) => unsafe { std::env::set_var(var, value) },
            None => unsafe { std::env::remove_var(var) },
        }
    }

    #[test]
    fn test_parse_full_config() {
        let config = BlogheatConfig::parse(
            r#"
            [calendar]
            zone = "Asia/Shanghai"
            lookback_years = 2
            week_count = 110
            week_start = "monday"
            strict = true
            "#,
        )
        .unwrap();

        let settings = config.resolve(&CalendarOverrides::default()).unwrap();
        assert_eq!(settings.zone, "Asia/Shanghai".parse().unwrap());
        assert_eq!(settings.options.lookback_years, 2);
        assert_eq!(settings.options.week_count, 110);
        assert_eq!(settings.options.week_start, WeekStart::Monday);
        assert_eq!(settings.options.sizing, GridSizing::Strict);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BlogheatConfig::parse("").unwrap();
        let settings = config.resolve(&CalendarOverrides::default()).unwrap();
        assert_eq!(settings.zone, DisplayZone::utc());
        assert_eq!(settings.options, GridOptions::default());
    }

    #[test]
    fn test_overrides_win() {
        let config = BlogheatConfig::parse(
            r#"
            [calendar]
            zone = "+08:00"
            week_start = "monday"
            week_count = 60
            "#,
        )
        .unwrap();
        let overrides = CalendarOverrides {
            zone: Some("UTC".to_string()),
            week_start: Some("sunday".to_string()),
            week_count: Some(53),
            lookback_years: None,
            strict: true,
        };

        let settings = config.resolve(&overrides).unwrap();
        assert_eq!(settings.zone, DisplayZone::utc());
        assert_eq!(settings.options.week_start, WeekStart::Sunday);
        assert_eq!(settings.options.week_count, 53);
        assert_eq!(settings.options.sizing, GridSizing::Strict);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(BlogheatConfig::parse("[calendar]\nweek_start = \"friday\"").is_err());

        let config = BlogheatConfig::default();
        let bad_zone = CalendarOverrides {
            zone: Some("Nowhere/Special".to_string()),
            ..Default::default()
        };
        assert!(config.resolve(&bad_zone).is_err());
    }

    #[test]
    #[serial]
    fn test_load_from_env_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blogheat.toml");
        fs::write(&path, "[calendar]\nzone = \"+08:00\"\n").unwrap();

        let previous = std::env::var_os(CONFIG_ENV);
        unsafe { std::env::set_var(CONFIG_ENV, &path) };
        let loaded = BlogheatConfig::load(None);
        restore_env(CONFIG_ENV, previous);

        let config = loaded.unwrap();
        assert_eq!(config.calendar.zone.as_deref(), Some("+08:00"));
    }

    #[test]
    #[serial]
    fn test_explicit_missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(BlogheatConfig::load(Some(&missing)).is_err());
    }
}

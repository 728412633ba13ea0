use thiserror::Error;

/// Errors produced by the calendar core.
///
/// `InvalidTimestamp` and `MissingTimestamp` are raised per event and are
/// expected to be skipped by callers; the remaining variants reject bad
/// options or inputs up front.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("missing creation timestamp")]
    MissingTimestamp,

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid time zone '{0}'")]
    InvalidZone(String),

    #[error("invalid grid options: {0}")]
    InvalidOptions(String),

    #[error("week count {requested} cannot contain the reference date, at least {required} weeks are required")]
    WeekCountTooSmall { requested: u32, required: u32 },
}

pub type Result<T> = std::result::Result<T, CalendarError>;

//! Error types for schedule-engine operations.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::model::{DayOfWeek, HubId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("No schedule settings configured for hub {0}")]
    MissingSettings(HubId),

    #[error("No weekly business hours configured for hub {0}")]
    MissingWeeklyHours(HubId),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid slot duration: {0} minutes (must be > 0)")]
    InvalidSlotDuration(u32),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown hub: {0}")]
    UnknownHub(HubId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(String),
}

impl ScheduleError {
    /// True for errors meaning "availability cannot be determined for this hub".
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScheduleError::MissingSettings(_)
                | ScheduleError::MissingWeeklyHours(_)
                | ScheduleError::InvalidTimezone(_)
                | ScheduleError::InvalidSlotDuration(_)
                | ScheduleError::UnknownHub(_)
        )
    }
}

/// A record that violates one of the model invariants.
///
/// Raised by the CRUD layer (see [`crate::store::InMemoryStore`]) and the
/// `validate` helpers before records ever reach the resolver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Slot duration must be positive")]
    ZeroSlotDuration,

    #[error("Invalid timezone: {0}")]
    UnknownTimezone(String),

    #[error("{day}: open time {open} must be before close time {close}")]
    OpenAfterClose {
        day: String,
        open: NaiveTime,
        close: NaiveTime,
    },

    #[error("{0}: break start and break end must both be set")]
    IncompleteBreak(DayOfWeek),

    #[error("{day}: break start {start} must be before break end {end}")]
    BreakStartAfterEnd {
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("{day}: break {start}-{end} must fall within open hours {open}-{close}")]
    BreakOutsideHours {
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
        open: NaiveTime,
        close: NaiveTime,
    },

    #[error("{0}: open time and close time are required when the day is not fully closed")]
    MissingSpecialHours(NaiveDate),

    #[error("Override '{0}': open time and close time must be given together")]
    PartialOverrideHours(String),

    #[error("Override '{reason}': start date {start} must be on or before end date {end}")]
    OverrideRangeInverted {
        reason: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Overrides '{first}' and '{second}' overlap")]
    OverlappingOverrides { first: String, second: String },

    #[error("More than one special day on {0}")]
    DuplicateSpecialDay(NaiveDate),

    #[error("More than one recurring special day on {month:02}-{day:02}")]
    DuplicateRecurringDay { month: u32, day: u32 },

    #[error("More than one business hours record for {0}")]
    DuplicateWeekday(DayOfWeek),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

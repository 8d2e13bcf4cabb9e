//! Record invariants, checked by the CRUD layer before records reach the resolver.
//!
//! Single-record checks live on the record types; the `check_*` functions
//! enforce the cross-record uniqueness rules (one row per weekday, one special
//! day per date, non-overlapping overrides).

use std::collections::HashSet;

use chrono::Datelike;

use crate::error::ValidationError;
use crate::model::{BusinessHours, ScheduleOverride, ScheduleSettings, SpecialDay};

type Result<T> = std::result::Result<T, ValidationError>;

impl ScheduleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.slot_duration == 0 {
            return Err(ValidationError::ZeroSlotDuration);
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ValidationError::UnknownTimezone(self.timezone.clone()));
        }
        Ok(())
    }
}

impl BusinessHours {
    /// Closed days are not checked: their times are ignored.
    pub fn validate(&self) -> Result<()> {
        if self.is_closed {
            return Ok(());
        }
        if self.open_time >= self.close_time {
            return Err(ValidationError::OpenAfterClose {
                day: self.day_of_week.to_string(),
                open: self.open_time,
                close: self.close_time,
            });
        }
        let (start, end) = match (self.break_start, self.break_end) {
            (None, None) => return Ok(()),
            (Some(start), Some(end)) => (start, end),
            _ => return Err(ValidationError::IncompleteBreak(self.day_of_week)),
        };
        if start >= end {
            return Err(ValidationError::BreakStartAfterEnd {
                day: self.day_of_week,
                start,
                end,
            });
        }
        if start < self.open_time || end > self.close_time {
            return Err(ValidationError::BreakOutsideHours {
                day: self.day_of_week,
                start,
                end,
                open: self.open_time,
                close: self.close_time,
            });
        }
        Ok(())
    }
}

impl SpecialDay {
    pub fn validate(&self) -> Result<()> {
        if self.is_closed {
            return Ok(());
        }
        match (self.open_time, self.close_time) {
            (Some(open), Some(close)) if open >= close => Err(ValidationError::OpenAfterClose {
                day: self.date.to_string(),
                open,
                close,
            }),
            (Some(_), Some(_)) => Ok(()),
            _ => Err(ValidationError::MissingSpecialHours(self.date)),
        }
    }
}

impl ScheduleOverride {
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(ValidationError::OverrideRangeInverted {
                reason: self.reason.clone(),
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.is_closed {
            return Ok(());
        }
        match (self.open_time, self.close_time) {
            (Some(open), Some(close)) if open >= close => Err(ValidationError::OpenAfterClose {
                day: self.reason.clone(),
                open,
                close,
            }),
            (Some(_), None) | (None, Some(_)) => {
                Err(ValidationError::PartialOverrideHours(self.reason.clone()))
            }
            _ => Ok(()),
        }
    }
}

pub fn check_unique_weekdays(hours: &[BusinessHours]) -> Result<()> {
    let mut seen = HashSet::new();
    for h in hours {
        if !seen.insert(h.day_of_week) {
            return Err(ValidationError::DuplicateWeekday(h.day_of_week));
        }
    }
    Ok(())
}

/// One special day per calendar date, and one recurring day per month/day.
pub fn check_unique_special_days(days: &[SpecialDay]) -> Result<()> {
    let mut dates = HashSet::new();
    let mut anniversaries = HashSet::new();
    for d in days {
        if !dates.insert(d.date) {
            return Err(ValidationError::DuplicateSpecialDay(d.date));
        }
        if d.recurring_yearly && !anniversaries.insert((d.date.month(), d.date.day())) {
            return Err(ValidationError::DuplicateRecurringDay {
                month: d.date.month(),
                day: d.date.day(),
            });
        }
    }
    Ok(())
}

/// Overrides may not share a single date.
pub fn check_override_overlaps(overrides: &[ScheduleOverride]) -> Result<()> {
    let mut sorted: Vec<&ScheduleOverride> = overrides.iter().collect();
    sorted.sort_by_key(|o| (o.start_date, o.end_date));

    for pair in sorted.windows(2) {
        if let [a, b] = pair {
            if a.range().intersects(&b.range()) {
                return Err(ValidationError::OverlappingOverrides {
                    first: a.reason.clone(),
                    second: b.reason.clone(),
                });
            }
        }
    }
    Ok(())
}

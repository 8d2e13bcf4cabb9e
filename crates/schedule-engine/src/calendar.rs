//! Week grid and upcoming special days, as shown on a schedule dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BusinessHours, DateRange, DayOfWeek, HubId, SpecialDay};
use crate::resolver::AvailabilityResolver;
use crate::store::ScheduleStore;

/// One row of the weekly hours grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayEntry {
    pub day: DayOfWeek,
    /// `None` when no row is configured for this weekday.
    pub hours: Option<BusinessHours>,
}

/// A special day projected onto its next occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingSpecialDay {
    pub date: NaiveDate,
    pub special_day: SpecialDay,
}

impl<S: ScheduleStore> AvailabilityResolver<S> {
    /// Seven entries starting at the hub's `week_starts_on`, gaps filled with `None`.
    pub fn week_view(&self, hub: &HubId) -> Result<Vec<WeekdayEntry>> {
        let settings = self.settings(hub)?;
        let hours = self.store().weekly_hours(hub)?;
        Ok(settings
            .week_starts_on
            .week_from()
            .map(|day| WeekdayEntry {
                day,
                hours: hours.iter().find(|h| h.day_of_week == day).cloned(),
            })
            .collect())
    }

    /// The next special day on or after `from`.
    pub fn next_special_day(
        &self,
        hub: &HubId,
        from: NaiveDate,
    ) -> Result<Option<UpcomingSpecialDay>> {
        Ok(self.upcoming_special_days(hub, from, 1)?.into_iter().next())
    }

    /// Up to `limit` special days on or after `from`, soonest first.
    /// Recurring days appear once, at their next anniversary.
    pub fn upcoming_special_days(
        &self,
        hub: &HubId,
        from: NaiveDate,
        limit: usize,
    ) -> Result<Vec<UpcomingSpecialDay>> {
        let range = DateRange {
            start: from,
            end: NaiveDate::MAX,
        };
        let mut upcoming: Vec<UpcomingSpecialDay> = self
            .store()
            .special_days(hub, range)?
            .into_iter()
            .filter_map(|day| {
                day.next_occurrence(from).map(|date| UpcomingSpecialDay {
                    date,
                    special_day: day,
                })
            })
            .collect();
        upcoming.sort_by_key(|u| u.date);
        upcoming.truncate(limit);
        Ok(upcoming)
    }
}

//! The precedence chain: override > special day > weekly hours > closed.
//!
//! Each level is a [`LookupStrategy`] that either resolves a date or passes.
//! [`resolve_with`] tries them in order and the first answer wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{BusinessHours, DayOfWeek, OpeningWindow, OverrideEffect, ScheduleOverride, SpecialDay};

/// Which record kind decided a day's hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoursSource {
    Override,
    SpecialDay,
    WeeklyHours,
    /// No record covers the day; it is implicitly closed.
    None,
}

/// The outcome of running the precedence chain for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    pub source: HoursSource,
    /// `None` when the day is closed.
    pub window: Option<OpeningWindow>,
    /// Override reason or special day name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ResolvedDay {
    pub fn closed(date: NaiveDate, source: HoursSource) -> Self {
        Self {
            date,
            source,
            window: None,
            label: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.window.is_none()
    }

    fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// The records a hub has for the dates being resolved.
#[derive(Debug, Clone, Default)]
pub struct DayRecords {
    pub overrides: Vec<ScheduleOverride>,
    pub special_days: Vec<SpecialDay>,
    pub weekly_hours: Vec<BusinessHours>,
}

/// One level of the precedence chain.
pub trait LookupStrategy {
    fn source(&self) -> HoursSource;

    /// `Some` when this level decides the day, `None` to defer to the next one.
    fn lookup(&self, records: &DayRecords, date: NaiveDate) -> Option<ResolvedDay>;
}

/// Date-range overrides. Overrides that are neither closed nor carry hours defer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideLookup;

impl LookupStrategy for OverrideLookup {
    fn source(&self) -> HoursSource {
        HoursSource::Override
    }

    fn lookup(&self, records: &DayRecords, date: NaiveDate) -> Option<ResolvedDay> {
        let mut covering: Vec<&ScheduleOverride> =
            records.overrides.iter().filter(|o| o.covers(date)).collect();
        if covering.len() > 1 {
            warn!(%date, count = covering.len(), "overlapping overrides; using the latest start date");
        }
        // Stable sort keeps store order among equal start dates.
        covering.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        let ov = covering.into_iter().next()?;

        let resolved = match ov.effect() {
            OverrideEffect::Closed => ResolvedDay::closed(date, HoursSource::Override),
            OverrideEffect::Hours(window) => ResolvedDay {
                date,
                source: HoursSource::Override,
                window: Some(window),
                label: None,
            },
            OverrideEffect::Defer => return None,
        };
        Some(resolved.labelled(&ov.reason))
    }
}

/// Special days: an exact date match first, then a yearly-recurring month/day match.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialDayLookup;

impl LookupStrategy for SpecialDayLookup {
    fn source(&self) -> HoursSource {
        HoursSource::SpecialDay
    }

    fn lookup(&self, records: &DayRecords, date: NaiveDate) -> Option<ResolvedDay> {
        let exact: Vec<&SpecialDay> = records.special_days.iter().filter(|d| d.is_on(date)).collect();
        let candidates: Vec<&SpecialDay> = if exact.is_empty() {
            records
                .special_days
                .iter()
                .filter(|d| d.recurs_on(date))
                .collect()
        } else {
            exact
        };
        if candidates.len() > 1 {
            warn!(%date, count = candidates.len(), "several special days match; using the first");
        }
        let day = candidates.into_iter().next()?;

        Some(
            ResolvedDay {
                date,
                source: HoursSource::SpecialDay,
                window: day.window(),
                label: None,
            }
            .labelled(&day.name),
        )
    }
}

/// Regular weekly hours. A weekday without a row is closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyLookup;

impl LookupStrategy for WeeklyLookup {
    fn source(&self) -> HoursSource {
        HoursSource::WeeklyHours
    }

    fn lookup(&self, records: &DayRecords, date: NaiveDate) -> Option<ResolvedDay> {
        let weekday = DayOfWeek::of(date);
        let resolved = match records.weekly_hours.iter().find(|h| h.day_of_week == weekday) {
            Some(hours) => ResolvedDay {
                date,
                source: HoursSource::WeeklyHours,
                window: hours.window(),
                label: None,
            },
            None => ResolvedDay::closed(date, HoursSource::None),
        };
        Some(resolved)
    }
}

/// The standard chain, highest precedence first.
pub fn default_chain() -> Vec<Box<dyn LookupStrategy + Send + Sync>> {
    vec![
        Box::new(OverrideLookup),
        Box::new(SpecialDayLookup),
        Box::new(WeeklyLookup),
    ]
}

/// Run `chain` in order; a date nobody claims is implicitly closed.
pub fn resolve_with(
    chain: &[Box<dyn LookupStrategy + Send + Sync>],
    records: &DayRecords,
    date: NaiveDate,
) -> ResolvedDay {
    for strategy in chain {
        if let Some(day) = strategy.lookup(records, date) {
            debug!(%date, level = ?strategy.source(), source = ?day.source, "day resolved");
            return day;
        }
    }
    ResolvedDay::closed(date, HoursSource::None)
}

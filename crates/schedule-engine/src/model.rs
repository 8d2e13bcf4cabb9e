//! Schedule records: settings, weekly hours, special days and overrides.
//!
//! These are plain data owned by an external CRUD layer. The resolver only
//! reads them; invariants are checked by [`crate::validate`].

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::serde_time::{hhmm, option_hhmm};

/// Opaque identifier of a hub (tenant / business unit).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HubId(String);

impl HubId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HubId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for HubId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Day of the week, ISO ordered (Monday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// ISO index, 0 = Monday .. 6 = Sunday.
    pub fn index(self) -> u32 {
        Weekday::from(self).num_days_from_monday()
    }

    /// Inverse of [`DayOfWeek::index`]. Returns `None` for indexes above 6.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// The seven days starting at `self`, wrapping around Sunday.
    pub fn week_from(self) -> impl Iterator<Item = DayOfWeek> {
        let start = self.index() as usize;
        Self::ALL.into_iter().cycle().skip(start).take(7)
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(d: DayOfWeek) -> Self {
        match d {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        };
        f.write_str(name)
    }
}

/// A half-open wall-clock interval `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// The hours a hub keeps on one resolved day: `[open, close)` minus an optional break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningWindow {
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
    #[serde(rename = "break", skip_serializing_if = "Option::is_none", default)]
    pub break_window: Option<TimeRange>,
}

impl OpeningWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            open,
            close,
            break_window: None,
        }
    }

    pub fn with_break(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.break_window = Some(TimeRange::new(start, end));
        self
    }

    pub fn hours(&self) -> TimeRange {
        TimeRange::new(self.open, self.close)
    }

    /// Whether `t` falls within opening hours and outside the break.
    pub fn is_open_at(&self, t: NaiveTime) -> bool {
        self.hours().contains(t) && !self.break_window.is_some_and(|b| b.contains(t))
    }

    /// The bookable sub-intervals: `[open, close)` with the break carved out.
    pub fn segments(&self) -> Vec<TimeRange> {
        match self.break_window {
            Some(b) if b.start < b.end => [
                TimeRange::new(self.open, b.start.max(self.open)),
                TimeRange::new(b.end.min(self.close), self.close),
            ]
            .into_iter()
            .filter(|r| r.start < r.end)
            .collect(),
            _ if self.open < self.close => vec![self.hours()],
            _ => Vec::new(),
        }
    }
}

/// Per-hub schedule configuration. One per hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// IANA timezone, e.g. `Europe/Madrid`.
    pub timezone: String,
    pub week_starts_on: DayOfWeek,
    /// Default slot length in minutes.
    pub slot_duration: u32,
    /// When false, the hub keeps reporting "open" after closing time until midnight.
    pub auto_close_enabled: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            timezone: "Europe/Madrid".to_string(),
            week_starts_on: DayOfWeek::Monday,
            slot_duration: 30,
            auto_close_enabled: false,
        }
    }
}

impl ScheduleSettings {
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(self.timezone.clone()))
    }
}

fn default_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_close() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_true() -> bool {
    true
}

/// Regular weekly hours, one record per weekday per hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm", default = "default_open")]
    pub open_time: NaiveTime,
    #[serde(with = "hhmm", default = "default_close")]
    pub close_time: NaiveTime,
    #[serde(with = "option_hhmm", default, skip_serializing_if = "Option::is_none")]
    pub break_start: Option<NaiveTime>,
    #[serde(with = "option_hhmm", default, skip_serializing_if = "Option::is_none")]
    pub break_end: Option<NaiveTime>,
    #[serde(default)]
    pub is_closed: bool,
}

impl BusinessHours {
    pub fn open(day_of_week: DayOfWeek, open_time: NaiveTime, close_time: NaiveTime) -> Self {
        Self {
            day_of_week,
            open_time,
            close_time,
            break_start: None,
            break_end: None,
            is_closed: false,
        }
    }

    pub fn closed(day_of_week: DayOfWeek) -> Self {
        Self {
            day_of_week,
            open_time: default_open(),
            close_time: default_close(),
            break_start: None,
            break_end: None,
            is_closed: true,
        }
    }

    pub fn with_break(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.break_start = Some(start);
        self.break_end = Some(end);
        self
    }

    /// The break, only when both ends are set.
    pub fn break_window(&self) -> Option<TimeRange> {
        match (self.break_start, self.break_end) {
            (Some(start), Some(end)) => Some(TimeRange::new(start, end)),
            _ => None,
        }
    }

    /// Opening window for this weekday, `None` when the day is closed.
    pub fn window(&self) -> Option<OpeningWindow> {
        if self.is_closed {
            return None;
        }
        Some(OpeningWindow {
            open: self.open_time,
            close: self.close_time,
            break_window: self.break_window(),
        })
    }

    pub fn is_open_at(&self, t: NaiveTime) -> bool {
        self.window().is_some_and(|w| w.is_open_at(t))
    }
}

impl fmt::Display for BusinessHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_closed {
            return write!(f, "{}: Closed", self.day_of_week);
        }
        write!(
            f,
            "{}: {}-{}",
            self.day_of_week,
            self.open_time.format("%H:%M"),
            self.close_time.format("%H:%M")
        )
    }
}

/// A holiday or other one-off day, optionally recurring every year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialDay {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_closed: bool,
    #[serde(with = "option_hhmm", default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<NaiveTime>,
    #[serde(with = "option_hhmm", default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub recurring_yearly: bool,
    #[serde(default)]
    pub notes: String,
}

impl SpecialDay {
    pub fn closed(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            is_closed: true,
            open_time: None,
            close_time: None,
            recurring_yearly: false,
            notes: String::new(),
        }
    }

    pub fn with_hours(
        date: NaiveDate,
        name: impl Into<String>,
        open_time: NaiveTime,
        close_time: NaiveTime,
    ) -> Self {
        Self {
            is_closed: false,
            open_time: Some(open_time),
            close_time: Some(close_time),
            ..Self::closed(date, name)
        }
    }

    pub fn yearly(mut self) -> Self {
        self.recurring_yearly = true;
        self
    }

    /// Exact calendar match, ignoring recurrence.
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    /// Month/day match for yearly-recurring days. Feb 29 only matches leap years.
    pub fn recurs_on(&self, date: NaiveDate) -> bool {
        self.recurring_yearly && self.date.month() == date.month() && self.date.day() == date.day()
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.is_on(date) || self.recurs_on(date)
    }

    /// First date on or after `from` on which this day occurs.
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        if !self.recurring_yearly {
            return (self.date >= from).then_some(self.date);
        }
        // The stored year plays no part in recurrence.
        // Eight years always contains a leap year for Feb 29.
        (from.year()..=from.year() + 8)
            .filter_map(|year| NaiveDate::from_ymd_opt(year, self.date.month(), self.date.day()))
            .find(|d| *d >= from)
    }

    /// Whether [`SpecialDay::occurs_on`] holds for some date of `range`.
    pub fn occurs_within(&self, range: DateRange) -> bool {
        self.next_occurrence(range.start)
            .is_some_and(|d| d <= range.end)
    }

    /// Custom hours, `None` when the day is a full closure.
    pub fn window(&self) -> Option<OpeningWindow> {
        if self.is_closed {
            return None;
        }
        match (self.open_time, self.close_time) {
            (Some(open), Some(close)) => Some(OpeningWindow::new(open, close)),
            _ => None,
        }
    }
}

impl fmt::Display for SpecialDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window() {
            Some(w) => write!(
                f,
                "{} ({}): {}-{}",
                self.name,
                self.date,
                w.open.format("%H:%M"),
                w.close.format("%H:%M")
            ),
            None => write!(f, "{} ({}): Closed", self.name, self.date),
        }
    }
}

/// What an override does to the days it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideEffect {
    Closed,
    Hours(OpeningWindow),
    /// Neither closed nor custom hours: regular rules apply.
    Defer,
}

/// Temporary schedule change for an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(with = "option_hhmm", default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<NaiveTime>,
    #[serde(with = "option_hhmm", default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_closed: bool,
}

impl ScheduleOverride {
    pub fn closed(start_date: NaiveDate, end_date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            start_date,
            end_date,
            reason: reason.into(),
            open_time: None,
            close_time: None,
            is_closed: true,
        }
    }

    pub fn with_hours(
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
        open_time: NaiveTime,
        close_time: NaiveTime,
    ) -> Self {
        Self {
            open_time: Some(open_time),
            close_time: Some(close_time),
            is_closed: false,
            ..Self::closed(start_date, end_date, reason)
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn effect(&self) -> OverrideEffect {
        if self.is_closed {
            return OverrideEffect::Closed;
        }
        match (self.open_time, self.close_time) {
            (Some(open), Some(close)) => OverrideEffect::Hours(OpeningWindow::new(open, close)),
            _ => OverrideEffect::Defer,
        }
    }
}

impl fmt::Display for ScheduleOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.reason, self.start_date, self.end_date)
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ScheduleError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn intersects(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start).filter(|s| *s <= end), move |d| {
            d.checked_add_days(Days::new(1)).filter(|next| *next <= end)
        })
    }
}

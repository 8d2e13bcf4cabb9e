//! "Is the hub open right now" answers.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::TimeRange;
use crate::precedence::{HoursSource, ResolvedDay};
use crate::serde_time::hhmm;

/// Open/closed status of a hub at one local time, with the facts behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenStatus {
    pub open: bool,
    /// Open only because auto-close is disabled and closing time has passed.
    pub held_open: bool,
    pub source: HoursSource,
    /// The resolved `[open, close)` hours, absent when the day is closed.
    pub effective_hours: Option<TimeRange>,
    #[serde(rename = "break")]
    pub break_window: Option<TimeRange>,
    /// Human-readable explanation, e.g. an override reason or "Regular hours".
    pub reason: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub local_time: NaiveTime,
}

/// Compare `t` against the day's boundaries.
///
/// With `auto_close_enabled` off, a time at or after closing on a day that had
/// hours still reports open. That only affects this status; slots never extend
/// past closing time.
pub fn evaluate(day: &ResolvedDay, t: NaiveTime, auto_close_enabled: bool) -> OpenStatus {
    let (open, held_open) = match &day.window {
        Some(w) if w.is_open_at(t) => (true, false),
        Some(w) if !auto_close_enabled && t >= w.close => (true, true),
        _ => (false, false),
    };

    let reason = match (day.source, &day.label) {
        (HoursSource::Override | HoursSource::SpecialDay, Some(label)) => label.clone(),
        (HoursSource::None, _) => "No hours configured".to_string(),
        _ if day.is_closed() => "Closed today".to_string(),
        _ if held_open => "After hours (auto-close disabled)".to_string(),
        _ if open => "Regular hours".to_string(),
        _ if day.window.and_then(|w| w.break_window).is_some_and(|b| b.contains(t)) => {
            "On break".to_string()
        }
        _ => "Outside business hours".to_string(),
    };

    OpenStatus {
        open,
        held_open,
        source: day.source,
        effective_hours: day.window.map(|w| w.hours()),
        break_window: day.window.and_then(|w| w.break_window),
        reason,
        date: day.date,
        local_time: t,
    }
}

//! DST transition policies for mapping local slot times to instants.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Policy for local wall-clock times that fall into a DST gap
/// (e.g. 02:30 on a spring-forward night).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Drop slots whose start does not exist in the hub's zone.
    #[default]
    Skip,
    /// Move the slot start to the first valid instant after the gap.
    ShiftForward,
}

impl DstPolicy {
    /// Resolve a local time in `tz`. Ambiguous times (fall back) take the earliest instant.
    pub fn localize(self, tz: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => match self {
                DstPolicy::Skip => None,
                DstPolicy::ShiftForward => shift_past_gap(tz, local),
            },
        }
    }
}

/// Gaps are at most a couple of hours; probe minute by minute up to three hours.
fn shift_past_gap(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    (1..=180).find_map(|m| match tz.from_local_datetime(&(local + Duration::minutes(m))) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    })
}

//! Bookable slot generation.
//!
//! A day's opening window is split into segments around the break, and each
//! segment is cut into consecutive fixed-length slots. A slot is emitted only
//! if its full duration fits before the segment boundary; leftovers shorter
//! than the slot length are dropped, never truncated.
//!
//! Slot start instants are strictly increasing and slots never overlap: when
//! a DST gap pushes a start onto time already covered by the previous slot,
//! that slot is dropped.
//!
//! [`SlotPlan`] holds the inputs and computes slots lazily on iteration, so a
//! plan can be iterated any number of times.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::model::{OpeningWindow, TimeRange};
use crate::serde_time::hhmm;

/// One bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Wall-clock start in the hub's timezone.
    #[serde(with = "hhmm")]
    pub local_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub local_end: NaiveTime,
    /// The instant the slot starts.
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The recipe for one day's slots. Cheap to clone; iterating recomputes.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlan {
    date: NaiveDate,
    tz: Tz,
    policy: DstPolicy,
    duration_minutes: u32,
    segments: Vec<TimeRange>,
}

impl SlotPlan {
    pub fn new(
        date: NaiveDate,
        tz: Tz,
        policy: DstPolicy,
        duration_minutes: u32,
        window: Option<OpeningWindow>,
    ) -> Self {
        Self {
            date,
            tz,
            policy,
            duration_minutes,
            segments: window.map(|w| w.segments()).unwrap_or_default(),
        }
    }

    /// A plan that yields nothing (closed day).
    pub fn empty(date: NaiveDate, tz: Tz) -> Self {
        Self::new(date, tz, DstPolicy::default(), 1, None)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn segments(&self) -> &[TimeRange] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> SlotIter<'_> {
        SlotIter {
            plan: self,
            times: LocalSlotTimes::new(&self.segments, self.duration_minutes),
            last_end: None,
        }
    }

    /// Local start times only, without timezone mapping.
    pub fn local_starts(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        LocalSlotTimes::new(&self.segments, self.duration_minutes).map(|(start, _)| start)
    }
}

impl<'a> IntoIterator for &'a SlotPlan {
    type Item = Slot;
    type IntoIter = SlotIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`SlotPlan`]'s slots.
#[derive(Debug, Clone)]
pub struct SlotIter<'a> {
    plan: &'a SlotPlan,
    times: LocalSlotTimes<'a>,
    last_end: Option<DateTime<Utc>>,
}

impl Iterator for SlotIter<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let length = Duration::minutes(i64::from(self.plan.duration_minutes));
        for (local_start, local_end) in self.times.by_ref() {
            let Some(localized) = self
                .plan
                .policy
                .localize(self.plan.tz, self.plan.date.and_time(local_start))
            else {
                continue;
            };
            let start = localized.with_timezone(&Utc);
            if self.last_end.is_some_and(|end| start < end) {
                continue;
            }
            // A start moved past a DST gap reports the wall time it landed on.
            let wall = localized.naive_local().time();
            let (local_start, local_end) = if wall == local_start {
                (local_start, local_end)
            } else {
                (wall, wall.overflowing_add_signed(length).0)
            };
            let end = start + length;
            self.last_end = Some(end);
            return Some(Slot {
                local_start,
                local_end,
                start,
                end,
            });
        }
        None
    }
}

/// Walks segments emitting `(start, end)` wall-clock pairs, in seconds from midnight.
#[derive(Debug, Clone)]
struct LocalSlotTimes<'a> {
    segments: std::slice::Iter<'a, TimeRange>,
    step: u32,
    cursor: u32,
    boundary: u32,
}

impl<'a> LocalSlotTimes<'a> {
    fn new(segments: &'a [TimeRange], duration_minutes: u32) -> Self {
        Self {
            segments: segments.iter(),
            step: duration_minutes.saturating_mul(60),
            cursor: 0,
            boundary: 0,
        }
    }
}

impl Iterator for LocalSlotTimes<'_> {
    type Item = (NaiveTime, NaiveTime);

    fn next(&mut self) -> Option<Self::Item> {
        if self.step == 0 {
            return None;
        }
        loop {
            let end = self.cursor.saturating_add(self.step);
            if end <= self.boundary {
                let start = NaiveTime::from_num_seconds_from_midnight_opt(self.cursor, 0)?;
                // A slot ending exactly at midnight reads as 00:00.
                let local_end = NaiveTime::from_num_seconds_from_midnight_opt(end % 86_400, 0)?;
                self.cursor = end;
                return Some((start, local_end));
            }
            let segment = self.segments.next()?;
            self.cursor = segment.start.num_seconds_from_midnight();
            self.boundary = segment.end.num_seconds_from_midnight();
        }
    }
}

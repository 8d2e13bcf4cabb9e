//! AvailabilityResolver: open/closed answers and slot plans for a hub.
//!
//! A pure read-time projection over the hub's records. Every call fetches the
//! records it needs from the store and recomputes; nothing is cached or
//! written back.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::dst::DstPolicy;
use crate::error::{Result, ScheduleError};
use crate::model::{DateRange, HubId, ScheduleSettings};
use crate::precedence::{self, DayRecords, LookupStrategy, ResolvedDay};
use crate::slots::SlotPlan;
use crate::status::{self, OpenStatus};
use crate::store::ScheduleStore;

type Chain = Vec<Box<dyn LookupStrategy + Send + Sync>>;

/// Resolves availability for hubs held in a [`ScheduleStore`].
pub struct AvailabilityResolver<S> {
    store: S,
    chain: Chain,
    dst_policy: DstPolicy,
}

impl<S: ScheduleStore> AvailabilityResolver<S> {
    /// A resolver using the standard override > special day > weekly chain.
    pub fn new(store: S) -> Self {
        Self {
            store,
            chain: precedence::default_chain(),
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    /// Replace the precedence chain. Strategies are tried in order.
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    /// The hub's settings. Absent settings are a configuration error, not a default.
    pub fn settings(&self, hub: &HubId) -> Result<ScheduleSettings> {
        self.store
            .settings(hub)?
            .ok_or_else(|| ScheduleError::MissingSettings(hub.clone()))
    }

    pub(crate) fn records(&self, hub: &HubId, range: DateRange) -> Result<DayRecords> {
        let weekly_hours = self.store.weekly_hours(hub)?;
        if weekly_hours.is_empty() {
            return Err(ScheduleError::MissingWeeklyHours(hub.clone()));
        }
        Ok(DayRecords {
            overrides: self.store.overrides(hub, range)?,
            special_days: self.store.special_days(hub, range)?,
            weekly_hours,
        })
    }

    /// Run the precedence chain for one date.
    pub fn resolve_day(&self, hub: &HubId, date: NaiveDate) -> Result<ResolvedDay> {
        self.settings(hub)?;
        let records = self.records(hub, DateRange::single(date))?;
        Ok(precedence::resolve_with(&self.chain, &records, date))
    }

    /// Resolve every date in `[start, end]`, fetching records once.
    pub fn resolve_range(
        &self,
        hub: &HubId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ResolvedDay>> {
        let range = DateRange::new(start, end)?;
        self.settings(hub)?;
        let records = self.records(hub, range)?;
        Ok(range
            .days()
            .map(|date| precedence::resolve_with(&self.chain, &records, date))
            .collect())
    }

    /// Whether the hub is open at `instant`, read in the hub's timezone.
    pub fn is_open(&self, hub: &HubId, instant: DateTime<Utc>) -> Result<OpenStatus> {
        let settings = self.settings(hub)?;
        let local = instant.with_timezone(&settings.tz()?).naive_local();
        self.evaluate_local(hub, &settings, local)
    }

    /// Whether the hub is open at a wall-clock time already in its timezone.
    pub fn is_open_local(&self, hub: &HubId, local: NaiveDateTime) -> Result<OpenStatus> {
        let settings = self.settings(hub)?;
        settings.tz()?;
        self.evaluate_local(hub, &settings, local)
    }

    fn evaluate_local(
        &self,
        hub: &HubId,
        settings: &ScheduleSettings,
        local: NaiveDateTime,
    ) -> Result<OpenStatus> {
        let records = self.records(hub, DateRange::single(local.date()))?;
        let day = precedence::resolve_with(&self.chain, &records, local.date());
        let status = status::evaluate(&day, local.time(), settings.auto_close_enabled);
        debug!(%hub, %local, open = status.open, source = ?status.source, "availability evaluated");
        Ok(status)
    }

    /// Slots for `date` using the hub's configured slot duration.
    pub fn generate_slots(&self, hub: &HubId, date: NaiveDate) -> Result<SlotPlan> {
        let duration = self.settings(hub)?.slot_duration;
        self.generate_slots_with_duration(hub, date, duration)
    }

    /// Slots for `date` with an explicit slot length in minutes.
    pub fn generate_slots_with_duration(
        &self,
        hub: &HubId,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<SlotPlan> {
        if duration_minutes == 0 {
            return Err(ScheduleError::InvalidSlotDuration(duration_minutes));
        }
        let settings = self.settings(hub)?;
        let tz = settings.tz()?;
        let records = self.records(hub, DateRange::single(date))?;
        let day = precedence::resolve_with(&self.chain, &records, date);
        debug!(%hub, %date, source = ?day.source, closed = day.is_closed(), "generating slots");
        Ok(SlotPlan::new(
            date,
            tz,
            self.dst_policy,
            duration_minutes,
            day.window,
        ))
    }
}

//! The read port the resolver consumes, plus an in-memory CRUD implementation.
//!
//! Persistence and tenancy belong to the host application. It implements
//! [`ScheduleStore`] over whatever it stores records in; [`InMemoryStore`]
//! covers tests, the CLI and the WASM bindings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::model::{BusinessHours, DateRange, HubId, ScheduleOverride, ScheduleSettings, SpecialDay};
use crate::validate;

/// Read accessors to a hub's four record kinds.
pub trait ScheduleStore {
    fn settings(&self, hub: &HubId) -> Result<Option<ScheduleSettings>>;

    /// At most seven rows, one per weekday.
    fn weekly_hours(&self, hub: &HubId) -> Result<Vec<BusinessHours>>;

    /// Special days dated within `range`, plus yearly-recurring days whose
    /// month/day falls on any date of `range`.
    fn special_days(&self, hub: &HubId, range: DateRange) -> Result<Vec<SpecialDay>>;

    /// Overrides whose date range intersects `range`.
    fn overrides(&self, hub: &HubId, range: DateRange) -> Result<Vec<ScheduleOverride>>;
}

impl<S: ScheduleStore + ?Sized> ScheduleStore for &S {
    fn settings(&self, hub: &HubId) -> Result<Option<ScheduleSettings>> {
        (**self).settings(hub)
    }

    fn weekly_hours(&self, hub: &HubId) -> Result<Vec<BusinessHours>> {
        (**self).weekly_hours(hub)
    }

    fn special_days(&self, hub: &HubId, range: DateRange) -> Result<Vec<SpecialDay>> {
        (**self).special_days(hub, range)
    }

    fn overrides(&self, hub: &HubId, range: DateRange) -> Result<Vec<ScheduleOverride>> {
        (**self).overrides(hub, range)
    }
}

/// Everything configured for one hub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSchedule {
    pub settings: Option<ScheduleSettings>,
    pub weekly_hours: Vec<BusinessHours>,
    pub special_days: Vec<SpecialDay>,
    pub overrides: Vec<ScheduleOverride>,
}

impl HubSchedule {
    /// Check every record and the cross-record uniqueness rules.
    pub fn validate(&self) -> std::result::Result<(), crate::error::ValidationError> {
        if let Some(settings) = &self.settings {
            settings.validate()?;
        }
        for h in &self.weekly_hours {
            h.validate()?;
        }
        for d in &self.special_days {
            d.validate()?;
        }
        for o in &self.overrides {
            o.validate()?;
        }
        validate::check_unique_weekdays(&self.weekly_hours)?;
        validate::check_unique_special_days(&self.special_days)?;
        validate::check_override_overlaps(&self.overrides)
    }
}

/// JSON document holding every hub: `{ "hubs": { "<id>": HubSchedule } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default)]
    pub hubs: BTreeMap<HubId, HubSchedule>,
}

/// In-memory store. Writes are validated the way a CRUD form would be.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    hubs: BTreeMap<HubId, HubSchedule>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a document, rejecting invalid hubs.
    pub fn from_document(doc: ScheduleDocument) -> Result<Self> {
        for schedule in doc.hubs.values() {
            schedule.validate()?;
        }
        Ok(Self { hubs: doc.hubs })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ScheduleDocument =
            serde_json::from_str(json).map_err(|e| ScheduleError::Store(e.to_string()))?;
        Self::from_document(doc)
    }

    /// A store holding a single validated hub.
    pub fn with_hub(hub: impl Into<HubId>, schedule: HubSchedule) -> Result<Self> {
        schedule.validate()?;
        let mut hubs = BTreeMap::new();
        hubs.insert(hub.into(), schedule);
        Ok(Self { hubs })
    }

    pub fn to_document(&self) -> ScheduleDocument {
        ScheduleDocument {
            hubs: self.hubs.clone(),
        }
    }

    pub fn hub_ids(&self) -> impl Iterator<Item = &HubId> {
        self.hubs.keys()
    }

    pub fn hub(&self, hub: &HubId) -> Option<&HubSchedule> {
        self.hubs.get(hub)
    }

    fn get(&self, hub: &HubId) -> Result<&HubSchedule> {
        self.hubs
            .get(hub)
            .ok_or_else(|| ScheduleError::UnknownHub(hub.clone()))
    }

    pub fn put_settings(&mut self, hub: &HubId, settings: ScheduleSettings) -> Result<()> {
        settings.validate()?;
        self.hubs.entry(hub.clone()).or_default().settings = Some(settings);
        Ok(())
    }

    /// Create or replace the row for `hours.day_of_week`.
    pub fn upsert_weekly_hours(&mut self, hub: &HubId, hours: BusinessHours) -> Result<()> {
        hours.validate()?;
        let schedule = self.hubs.entry(hub.clone()).or_default();
        match schedule
            .weekly_hours
            .iter_mut()
            .find(|h| h.day_of_week == hours.day_of_week)
        {
            Some(existing) => *existing = hours,
            None => schedule.weekly_hours.push(hours),
        }
        schedule.weekly_hours.sort_by_key(|h| h.day_of_week);
        Ok(())
    }

    pub fn add_special_day(&mut self, hub: &HubId, day: SpecialDay) -> Result<()> {
        day.validate()?;
        let schedule = self.hubs.entry(hub.clone()).or_default();
        let mut candidate = schedule.special_days.clone();
        candidate.push(day);
        validate::check_unique_special_days(&candidate)?;
        candidate.sort_by_key(|d| d.date);
        schedule.special_days = candidate;
        Ok(())
    }

    /// Remove the special day stored for `date`. Returns whether one existed.
    pub fn remove_special_day(&mut self, hub: &HubId, date: NaiveDate) -> Result<bool> {
        let schedule = self
            .hubs
            .get_mut(hub)
            .ok_or_else(|| ScheduleError::UnknownHub(hub.clone()))?;
        let before = schedule.special_days.len();
        schedule.special_days.retain(|d| d.date != date);
        Ok(schedule.special_days.len() != before)
    }

    pub fn add_override(&mut self, hub: &HubId, ov: ScheduleOverride) -> Result<()> {
        ov.validate()?;
        let schedule = self.hubs.entry(hub.clone()).or_default();
        let mut candidate = schedule.overrides.clone();
        candidate.push(ov);
        validate::check_override_overlaps(&candidate)?;
        // Most recent first, as the admin lists them.
        candidate.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        schedule.overrides = candidate;
        Ok(())
    }

    /// Remove the override starting on `start_date`. Returns whether one existed.
    pub fn remove_override(&mut self, hub: &HubId, start_date: NaiveDate) -> Result<bool> {
        let schedule = self
            .hubs
            .get_mut(hub)
            .ok_or_else(|| ScheduleError::UnknownHub(hub.clone()))?;
        let before = schedule.overrides.len();
        schedule.overrides.retain(|o| o.start_date != start_date);
        Ok(schedule.overrides.len() != before)
    }
}

impl ScheduleStore for InMemoryStore {
    fn settings(&self, hub: &HubId) -> Result<Option<ScheduleSettings>> {
        Ok(self.get(hub)?.settings.clone())
    }

    fn weekly_hours(&self, hub: &HubId) -> Result<Vec<BusinessHours>> {
        Ok(self.get(hub)?.weekly_hours.clone())
    }

    fn special_days(&self, hub: &HubId, range: DateRange) -> Result<Vec<SpecialDay>> {
        let days = &self.get(hub)?.special_days;
        Ok(days
            .iter()
            .filter(|d| d.occurs_within(range))
            .cloned()
            .collect())
    }

    fn overrides(&self, hub: &HubId, range: DateRange) -> Result<Vec<ScheduleOverride>> {
        Ok(self
            .get(hub)?
            .overrides
            .iter()
            .filter(|o| o.range().intersects(&range))
            .cloned()
            .collect())
    }
}

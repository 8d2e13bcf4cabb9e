//! # schedule-engine
//!
//! Deterministic business-hours resolution for multi-hub schedules.
//!
//! Given a hub's weekly hours, special days (holidays, optionally recurring
//! yearly) and date-range overrides, the engine answers "is the hub open at
//! this instant" and produces the bookable slots for a day. Resolution is a
//! pure read over records supplied by a [`ScheduleStore`]; nothing is cached.
//!
//! ## Modules
//!
//! - [`model`] - settings, weekly hours, special days, overrides
//! - [`validate`] - record invariants enforced by the CRUD layer
//! - [`store`] - the read port and an in-memory implementation
//! - [`precedence`] - override > special day > weekly hours lookup chain
//! - [`resolver`] - `is_open` and `generate_slots`
//! - [`slots`] - lazy, restartable slot plans
//! - [`calendar`] - week grid and upcoming special days
//! - [`dst`] - DST gap policies for slot instants
//! - [`error`] - Error types

pub mod calendar;
pub mod dst;
pub mod error;
pub mod model;
pub mod precedence;
pub mod resolver;
mod serde_time;
pub mod slots;
pub mod status;
pub mod store;
pub mod validate;

pub use calendar::{UpcomingSpecialDay, WeekdayEntry};
pub use dst::DstPolicy;
pub use error::{ScheduleError, ValidationError};
pub use model::{
    BusinessHours, DateRange, DayOfWeek, HubId, OpeningWindow, ScheduleOverride, ScheduleSettings,
    SpecialDay, TimeRange,
};
pub use precedence::{HoursSource, ResolvedDay};
pub use resolver::AvailabilityResolver;
pub use slots::{Slot, SlotPlan};
pub use status::OpenStatus;
pub use store::{HubSchedule, InMemoryStore, ScheduleDocument, ScheduleStore};

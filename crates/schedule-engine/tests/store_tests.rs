//! Record validation and the in-memory CRUD store.

use chrono::{NaiveDate, NaiveTime};
use schedule_engine::validate::{
    check_override_overlaps, check_unique_special_days, check_unique_weekdays,
};
use schedule_engine::{
    BusinessHours, DateRange, DayOfWeek, HubId, HubSchedule, InMemoryStore, ScheduleError,
    ScheduleOverride, ScheduleSettings, ScheduleStore, SpecialDay, ValidationError,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ── Single-record invariants ────────────────────────────────────────────────

#[test]
fn settings_require_positive_duration_and_known_zone() {
    assert!(ScheduleSettings::default().validate().is_ok());

    let zero = ScheduleSettings {
        slot_duration: 0,
        ..ScheduleSettings::default()
    };
    assert_eq!(zero.validate(), Err(ValidationError::ZeroSlotDuration));

    let bad_zone = ScheduleSettings {
        timezone: "Atlantis/Capital".to_string(),
        ..ScheduleSettings::default()
    };
    assert!(matches!(
        bad_zone.validate(),
        Err(ValidationError::UnknownTimezone(_))
    ));
}

#[test]
fn business_hours_open_before_close() {
    let inverted = BusinessHours::open(DayOfWeek::Monday, t(18, 0), t(9, 0));
    assert!(matches!(
        inverted.validate(),
        Err(ValidationError::OpenAfterClose { .. })
    ));
    let equal = BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(9, 0));
    assert!(equal.validate().is_err());
}

#[test]
fn closed_business_hours_skip_time_checks() {
    let mut closed = BusinessHours::closed(DayOfWeek::Sunday);
    closed.open_time = t(18, 0);
    closed.close_time = t(9, 0);
    assert!(closed.validate().is_ok());
}

#[test]
fn break_must_sit_inside_hours() {
    let base = BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(18, 0));

    assert!(base.clone().with_break(t(13, 0), t(14, 0)).validate().is_ok());
    assert!(matches!(
        base.clone().with_break(t(14, 0), t(13, 0)).validate(),
        Err(ValidationError::BreakStartAfterEnd { .. })
    ));
    assert!(matches!(
        base.clone().with_break(t(8, 0), t(10, 0)).validate(),
        Err(ValidationError::BreakOutsideHours { .. })
    ));
    assert!(matches!(
        base.clone().with_break(t(17, 0), t(19, 0)).validate(),
        Err(ValidationError::BreakOutsideHours { .. })
    ));

    let mut half = base;
    half.break_start = Some(t(13, 0));
    assert_eq!(
        half.validate(),
        Err(ValidationError::IncompleteBreak(DayOfWeek::Monday))
    );
}

#[test]
fn open_special_day_needs_hours() {
    let mut day = SpecialDay::closed(d(2026, 5, 1), "Labour day");
    assert!(day.validate().is_ok());
    day.is_closed = false;
    assert_eq!(
        day.validate(),
        Err(ValidationError::MissingSpecialHours(d(2026, 5, 1)))
    );
    let inverted = SpecialDay::with_hours(d(2026, 5, 1), "Odd", t(14, 0), t(10, 0));
    assert!(matches!(
        inverted.validate(),
        Err(ValidationError::OpenAfterClose { .. })
    ));
}

#[test]
fn override_range_and_hours() {
    let inverted = ScheduleOverride::closed(d(2026, 5, 3), d(2026, 5, 1), "Backwards");
    assert!(matches!(
        inverted.validate(),
        Err(ValidationError::OverrideRangeInverted { .. })
    ));

    let single_day = ScheduleOverride::closed(d(2026, 5, 1), d(2026, 5, 1), "One day");
    assert!(single_day.validate().is_ok());

    let mut partial = ScheduleOverride::closed(d(2026, 5, 1), d(2026, 5, 2), "Partial");
    partial.is_closed = false;
    partial.open_time = Some(t(10, 0));
    assert!(matches!(
        partial.validate(),
        Err(ValidationError::PartialOverrideHours(_))
    ));

    let inverted_hours =
        ScheduleOverride::with_hours(d(2026, 5, 1), d(2026, 5, 2), "Late", t(20, 0), t(8, 0));
    assert!(inverted_hours.validate().is_err());
}

// ── Cross-record rules ──────────────────────────────────────────────────────

#[test]
fn duplicate_weekdays_are_rejected() {
    let rows = vec![
        BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(17, 0)),
        BusinessHours::closed(DayOfWeek::Monday),
    ];
    assert_eq!(
        check_unique_weekdays(&rows),
        Err(ValidationError::DuplicateWeekday(DayOfWeek::Monday))
    );
}

#[test]
fn duplicate_special_days_are_rejected() {
    let same_date = vec![
        SpecialDay::closed(d(2026, 12, 25), "Christmas"),
        SpecialDay::closed(d(2026, 12, 25), "Also Christmas"),
    ];
    assert!(check_unique_special_days(&same_date).is_err());

    let same_anniversary = vec![
        SpecialDay::closed(d(2023, 12, 25), "Christmas").yearly(),
        SpecialDay::closed(d(2024, 12, 25), "Christmas again").yearly(),
    ];
    assert_eq!(
        check_unique_special_days(&same_anniversary),
        Err(ValidationError::DuplicateRecurringDay { month: 12, day: 25 })
    );
}

#[test]
fn overlapping_overrides_are_rejected() {
    let touching = vec![
        ScheduleOverride::closed(d(2026, 8, 1), d(2026, 8, 10), "A"),
        ScheduleOverride::closed(d(2026, 8, 10), d(2026, 8, 20), "B"),
    ];
    assert!(matches!(
        check_override_overlaps(&touching),
        Err(ValidationError::OverlappingOverrides { .. })
    ));

    let nested = vec![
        ScheduleOverride::closed(d(2026, 8, 1), d(2026, 8, 31), "Outer"),
        ScheduleOverride::closed(d(2026, 9, 5), d(2026, 9, 6), "Later"),
        ScheduleOverride::closed(d(2026, 8, 15), d(2026, 8, 16), "Inner"),
    ];
    assert!(check_override_overlaps(&nested).is_err());

    let disjoint = vec![
        ScheduleOverride::closed(d(2026, 8, 1), d(2026, 8, 9), "A"),
        ScheduleOverride::closed(d(2026, 8, 10), d(2026, 8, 20), "B"),
    ];
    assert!(check_override_overlaps(&disjoint).is_ok());
}

// ── InMemoryStore ───────────────────────────────────────────────────────────

#[test]
fn store_writes_are_validated() {
    let hub = HubId::new("h");
    let mut store = InMemoryStore::new();

    let err = store
        .upsert_weekly_hours(&hub, BusinessHours::open(DayOfWeek::Monday, t(18, 0), t(9, 0)))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
    assert!(!err.is_configuration());

    store
        .add_override(&hub, ScheduleOverride::closed(d(2026, 8, 1), d(2026, 8, 10), "A"))
        .unwrap();
    let err = store
        .add_override(&hub, ScheduleOverride::closed(d(2026, 8, 5), d(2026, 8, 6), "B"))
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::Validation(ValidationError::OverlappingOverrides { .. })
    ));
    // The rejected override was not stored.
    assert_eq!(store.hub(&hub).unwrap().overrides.len(), 1);
}

#[test]
fn upsert_replaces_existing_weekday() {
    let hub = HubId::new("h");
    let mut store = InMemoryStore::new();
    store
        .upsert_weekly_hours(&hub, BusinessHours::open(DayOfWeek::Friday, t(9, 0), t(17, 0)))
        .unwrap();
    store
        .upsert_weekly_hours(&hub, BusinessHours::open(DayOfWeek::Monday, t(8, 0), t(16, 0)))
        .unwrap();
    store
        .upsert_weekly_hours(&hub, BusinessHours::closed(DayOfWeek::Friday))
        .unwrap();

    let rows = store.weekly_hours(&hub).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].day_of_week, DayOfWeek::Monday);
    assert!(rows[1].is_closed);
}

#[test]
fn special_day_queries_include_recurring_days() {
    let hub = HubId::new("h");
    let mut store = InMemoryStore::new();
    store
        .add_special_day(&hub, SpecialDay::closed(d(2020, 12, 25), "Christmas").yearly())
        .unwrap();
    store
        .add_special_day(&hub, SpecialDay::closed(d(2026, 12, 8), "Immaculate Conception"))
        .unwrap();

    let december_2031 = DateRange::new(d(2031, 12, 1), d(2031, 12, 31)).unwrap();
    let found = store.special_days(&hub, december_2031).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Christmas");

    let december_2026 = DateRange::new(d(2026, 12, 1), d(2026, 12, 31)).unwrap();
    assert_eq!(store.special_days(&hub, december_2026).unwrap().len(), 2);
}

#[test]
fn remove_records() {
    let hub = HubId::new("h");
    let mut store = InMemoryStore::new();
    store
        .add_special_day(&hub, SpecialDay::closed(d(2026, 12, 8), "Holiday"))
        .unwrap();
    store
        .add_override(&hub, ScheduleOverride::closed(d(2026, 8, 1), d(2026, 8, 2), "Off"))
        .unwrap();

    assert!(store.remove_special_day(&hub, d(2026, 12, 8)).unwrap());
    assert!(!store.remove_special_day(&hub, d(2026, 12, 8)).unwrap());
    assert!(store.remove_override(&hub, d(2026, 8, 1)).unwrap());
    assert!(store
        .overrides(&hub, DateRange::single(d(2026, 8, 1)))
        .unwrap()
        .is_empty());
    assert!(matches!(
        store.remove_override(&HubId::new("other"), d(2026, 8, 1)),
        Err(ScheduleError::UnknownHub(_))
    ));
}

#[test]
fn document_loads_from_json() {
    let json = r#"{
        "hubs": {
            "madrid": {
                "settings": { "timezone": "Europe/Madrid", "slot_duration": 20 },
                "weekly_hours": [
                    { "day_of_week": "monday", "open_time": "09:00", "close_time": "14:00",
                      "break_start": "", "break_end": null },
                    { "day_of_week": "sunday", "is_closed": true }
                ],
                "special_days": [
                    { "date": "2023-01-06", "name": "Reyes", "recurring_yearly": true }
                ],
                "overrides": [
                    { "start_date": "2026-08-01", "end_date": "2026-08-15", "reason": "Summer",
                      "open_time": "10:00:00", "close_time": "13:00:00" }
                ]
            }
        }
    }"#;
    let store = InMemoryStore::from_json(json).unwrap();
    let hub = HubId::new("madrid");
    let schedule: &HubSchedule = store.hub(&hub).unwrap();

    let settings = schedule.settings.as_ref().unwrap();
    assert_eq!(settings.slot_duration, 20);
    assert!(!settings.auto_close_enabled);
    assert_eq!(settings.week_starts_on, DayOfWeek::Monday);

    assert_eq!(schedule.weekly_hours[0].break_start, None);
    assert_eq!(schedule.weekly_hours[1].open_time, t(9, 0));
    assert!(schedule.special_days[0].is_closed);
    assert_eq!(schedule.overrides[0].open_time, Some(t(10, 0)));
}

#[test]
fn invalid_document_is_rejected() {
    let json = r#"{ "hubs": { "x": { "weekly_hours": [
        { "day_of_week": "monday", "open_time": "18:00", "close_time": "09:00" }
    ] } } }"#;
    assert!(matches!(
        InMemoryStore::from_json(json),
        Err(ScheduleError::Validation(_))
    ));
    assert!(matches!(
        InMemoryStore::from_json("not json"),
        Err(ScheduleError::Store(_))
    ));
}

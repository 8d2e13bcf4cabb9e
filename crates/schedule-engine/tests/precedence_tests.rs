//! Each lookup strategy in isolation, then the chain.

use chrono::{NaiveDate, NaiveTime};
use schedule_engine::precedence::{
    default_chain, resolve_with, DayRecords, LookupStrategy, OverrideLookup, SpecialDayLookup,
    WeeklyLookup,
};
use schedule_engine::{BusinessHours, DayOfWeek, HoursSource, ScheduleOverride, SpecialDay};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn override_lookup_passes_when_nothing_covers_the_date() {
    let records = DayRecords {
        overrides: vec![ScheduleOverride::closed(d(2026, 1, 1), d(2026, 1, 2), "New year")],
        ..DayRecords::default()
    };
    assert!(OverrideLookup.lookup(&records, d(2026, 1, 3)).is_none());
    let day = OverrideLookup.lookup(&records, d(2026, 1, 2)).unwrap();
    assert!(day.is_closed());
    assert_eq!(day.label.as_deref(), Some("New year"));
}

#[test]
fn override_lookup_prefers_latest_start_when_records_overlap() {
    let records = DayRecords {
        overrides: vec![
            ScheduleOverride::closed(d(2026, 8, 1), d(2026, 8, 31), "Summer"),
            ScheduleOverride::with_hours(d(2026, 8, 10), d(2026, 8, 12), "Event", t(10, 0), t(20, 0)),
        ],
        ..DayRecords::default()
    };
    let day = OverrideLookup.lookup(&records, d(2026, 8, 11)).unwrap();
    assert_eq!(day.label.as_deref(), Some("Event"));
    assert!(!day.is_closed());
}

#[test]
fn special_day_lookup_recurring_match() {
    let records = DayRecords {
        special_days: vec![SpecialDay::closed(d(2019, 1, 6), "Epiphany").yearly()],
        ..DayRecords::default()
    };
    assert!(SpecialDayLookup.lookup(&records, d(2027, 1, 6)).is_some());
    assert!(SpecialDayLookup.lookup(&records, d(2027, 1, 7)).is_none());
}

#[test]
fn special_day_without_hours_is_a_closure() {
    let mut day = SpecialDay::closed(d(2026, 5, 1), "Labour day");
    day.is_closed = false;
    let records = DayRecords {
        special_days: vec![day],
        ..DayRecords::default()
    };
    let resolved = SpecialDayLookup.lookup(&records, d(2026, 5, 1)).unwrap();
    assert!(resolved.is_closed());
    assert_eq!(resolved.source, HoursSource::SpecialDay);
}

#[test]
fn leap_day_recurs_only_in_leap_years() {
    let day = SpecialDay::closed(d(2024, 2, 29), "Leap day").yearly();
    assert!(day.recurs_on(d(2028, 2, 29)));
    assert!(!day.recurs_on(d(2027, 2, 28)));
    assert!(!day.recurs_on(d(2027, 3, 1)));
}

#[test]
fn weekly_lookup_always_answers() {
    let records = DayRecords {
        weekly_hours: vec![BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(17, 0))],
        ..DayRecords::default()
    };
    // 2026-03-16 is a Monday, 2026-03-17 a Tuesday.
    let monday = WeeklyLookup.lookup(&records, d(2026, 3, 16)).unwrap();
    assert_eq!(monday.source, HoursSource::WeeklyHours);
    assert!(!monday.is_closed());

    let tuesday = WeeklyLookup.lookup(&records, d(2026, 3, 17)).unwrap();
    assert_eq!(tuesday.source, HoursSource::None);
    assert!(tuesday.is_closed());
}

#[test]
fn chain_falls_through_to_weekly_hours() {
    let records = DayRecords {
        overrides: vec![ScheduleOverride::closed(d(2026, 4, 1), d(2026, 4, 5), "Easter")],
        special_days: vec![SpecialDay::closed(d(2026, 5, 1), "Labour day")],
        weekly_hours: vec![BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(17, 0))],
    };
    let day = resolve_with(&default_chain(), &records, d(2026, 3, 16));
    assert_eq!(day.source, HoursSource::WeeklyHours);
}

#[test]
fn empty_chain_is_implicitly_closed() {
    let records = DayRecords {
        weekly_hours: vec![BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(17, 0))],
        ..DayRecords::default()
    };
    let day = resolve_with(&[], &records, d(2026, 3, 16));
    assert!(day.is_closed());
    assert_eq!(day.source, HoursSource::None);
}

#[test]
fn chain_order_matters() {
    let records = DayRecords {
        special_days: vec![SpecialDay::closed(d(2026, 3, 16), "Holiday")],
        weekly_hours: vec![BusinessHours::open(DayOfWeek::Monday, t(9, 0), t(17, 0))],
        ..DayRecords::default()
    };
    let weekly_first: Vec<Box<dyn LookupStrategy + Send + Sync>> =
        vec![Box::new(WeeklyLookup), Box::new(SpecialDayLookup)];
    let day = resolve_with(&weekly_first, &records, d(2026, 3, 16));
    assert_eq!(day.source, HoursSource::WeeklyHours);

    let day = resolve_with(&default_chain(), &records, d(2026, 3, 16));
    assert_eq!(day.source, HoursSource::SpecialDay);
}

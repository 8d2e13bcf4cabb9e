//! WASM bindings for schedule-engine.
//!
//! Exposes open/closed status, slot generation, the weekly grid and record
//! validation to JavaScript via `wasm-bindgen`. A hub's configuration is
//! passed as a JSON `HubSchedule` document and results come back as JSON
//! strings, the same convention the other bindings use.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p schedule-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/schedule-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/schedule_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use schedule_engine::{AvailabilityResolver, HubId, HubSchedule, InMemoryStore};
use serde::Serialize;
use wasm_bindgen::prelude::*;

const HUB: &str = "wasm";

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SlotDto {
    start: String,
    end: String,
    local_start: String,
    local_end: String,
}

#[derive(Serialize)]
struct ValidationDto {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolver(hub_json: &str) -> Result<AvailabilityResolver<InMemoryStore>, String> {
    let schedule: HubSchedule =
        serde_json::from_str(hub_json).map_err(|e| format!("Invalid hub JSON: {}", e))?;
    let store = InMemoryStore::with_hub(HUB, schedule).map_err(|e| e.to_string())?;
    Ok(AvailabilityResolver::new(store))
}

/// Parse an ISO 8601 instant. Strings without an offset are read as UTC.
fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// JSON entry points (plain Rust, usable outside a JS host)
// ---------------------------------------------------------------------------

pub mod json {
    use super::*;

    /// `OpenStatus` for `instant` as JSON.
    pub fn is_open(hub_json: &str, instant: &str) -> Result<String, String> {
        let r = resolver(hub_json)?;
        let status = r
            .is_open(&HubId::new(HUB), parse_instant(instant)?)
            .map_err(|e| e.to_string())?;
        to_json(&status)
    }

    /// Array of `{start, end, local_start, local_end}` for `date`.
    pub fn generate_slots(
        hub_json: &str,
        date: &str,
        duration_minutes: Option<u32>,
    ) -> Result<String, String> {
        let r = resolver(hub_json)?;
        let hub = HubId::new(HUB);
        let date = parse_date(date)?;
        let plan = match duration_minutes {
            Some(minutes) => r.generate_slots_with_duration(&hub, date, minutes),
            None => r.generate_slots(&hub, date),
        }
        .map_err(|e| e.to_string())?;

        let dtos: Vec<SlotDto> = plan
            .iter()
            .map(|s| SlotDto {
                start: s.start.to_rfc3339(),
                end: s.end.to_rfc3339(),
                local_start: s.local_start.format("%H:%M").to_string(),
                local_end: s.local_end.format("%H:%M").to_string(),
            })
            .collect();
        to_json(&dtos)
    }

    /// Seven weekday entries starting at the hub's configured week start.
    pub fn week_view(hub_json: &str) -> Result<String, String> {
        let r = resolver(hub_json)?;
        let week = r.week_view(&HubId::new(HUB)).map_err(|e| e.to_string())?;
        to_json(&week)
    }

    /// `{valid, error?}`. Malformed JSON is an error, invalid records are not.
    pub fn validate_hub(hub_json: &str) -> Result<String, String> {
        let schedule: HubSchedule =
            serde_json::from_str(hub_json).map_err(|e| format!("Invalid hub JSON: {}", e))?;
        let dto = match schedule.validate() {
            Ok(()) => ValidationDto {
                valid: true,
                error: None,
            },
            Err(e) => ValidationDto {
                valid: false,
                error: Some(e.to_string()),
            },
        };
        to_json(&dto)
    }
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether the hub is open at `instant` (ISO 8601), as an `OpenStatus` JSON object.
#[wasm_bindgen(js_name = "isOpen")]
pub fn is_open(hub_json: &str, instant: &str) -> Result<String, JsValue> {
    json::is_open(hub_json, instant).map_err(|e| JsValue::from_str(&e))
}

/// Bookable slots for `date` (`YYYY-MM-DD`). `duration_minutes` overrides the
/// hub's configured slot length when given.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    hub_json: &str,
    date: &str,
    duration_minutes: Option<u32>,
) -> Result<String, JsValue> {
    json::generate_slots(hub_json, date, duration_minutes).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = "weekView")]
pub fn week_view(hub_json: &str) -> Result<String, JsValue> {
    json::week_view(hub_json).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = "validateHub")]
pub fn validate_hub(hub_json: &str) -> Result<String, JsValue> {
    json::validate_hub(hub_json).map_err(|e| JsValue::from_str(&e))
}

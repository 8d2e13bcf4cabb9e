//! `schedule` CLI - query business hours, open status and slots from a JSON schedule.
//!
//! ## Usage
//!
//! ```sh
//! # Is the hub open right now? (JSON status on stdout)
//! schedule status -f hubs.json --hub madrid
//!
//! # Status at a given instant
//! schedule status -f hubs.json --hub madrid --at 2026-12-24T10:00:00Z
//!
//! # Bookable slots for a day, one per line
//! schedule slots -f hubs.json --hub madrid --date 2026-03-16
//!
//! # Resolved hours for the next two weeks
//! schedule week -f hubs.json --hub madrid --days 14
//!
//! # Upcoming holidays
//! schedule upcoming -f hubs.json --hub madrid --limit 5
//!
//! # Check every record in the document
//! schedule validate -f hubs.json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` or pass `-v` for resolution details.

use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use schedule_engine::{
    AvailabilityResolver, HubId, InMemoryStore, ResolvedDay, ScheduleDocument, ScheduleStore,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Business hours, holidays and bookable slots"
)]
struct Cli {
    /// JSON schedule document (`{"hubs": {...}}`)
    #[arg(short, long, env = "SCHEDULE_FILE", global = true)]
    file: Option<String>,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print whether a hub is open, as JSON
    Status {
        #[arg(long)]
        hub: String,
        /// RFC 3339 instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List bookable slots for a day
    Slots {
        #[arg(long)]
        hub: String,
        /// Day to list (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Slot length in minutes (defaults to the hub's setting)
        #[arg(long)]
        duration: Option<u32>,
        /// Print slots as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Show resolved hours for a run of days
    Week {
        #[arg(long)]
        hub: String,
        /// First day (defaults to today in the hub's timezone)
        #[arg(long)]
        from: Option<String>,
        /// Number of days to show (1-366)
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
    },
    /// List upcoming special days
    Upcoming {
        #[arg(long)]
        hub: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Validate every record in the document
    Validate,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let path = cli
        .file
        .context("No schedule file given (use --file or SCHEDULE_FILE)")?;

    match cli.command {
        Commands::Status { hub, at } => {
            let resolver = load_resolver(&path)?;
            let instant = match at {
                Some(raw) => parse_instant(&raw)?,
                None => Utc::now(),
            };
            let status = resolver
                .is_open(&HubId::new(hub), instant)
                .context("Failed to resolve status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Slots {
            hub,
            date,
            duration,
            json,
        } => {
            let resolver = load_resolver(&path)?;
            let hub = HubId::new(hub);
            let date = parse_date(&date)?;
            let plan = match duration {
                Some(minutes) => resolver.generate_slots_with_duration(&hub, date, minutes),
                None => resolver.generate_slots(&hub, date),
            }
            .context("Failed to generate slots")?;

            if json {
                let slots: Vec<_> = plan.iter().collect();
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                for slot in &plan {
                    println!(
                        "{}-{}",
                        slot.local_start.format("%H:%M"),
                        slot.local_end.format("%H:%M")
                    );
                }
            }
        }
        Commands::Week { hub, from, days } => {
            let resolver = load_resolver(&path)?;
            let hub = HubId::new(hub);
            let start = match from {
                Some(raw) => parse_date(&raw)?,
                None => today(&resolver, &hub)?,
            };
            let end = start
                .checked_add_days(chrono::Days::new(u64::from(days.saturating_sub(1))))
                .context("Date range out of bounds")?;
            for day in resolver
                .resolve_range(&hub, start, end)
                .context("Failed to resolve days")?
            {
                println!("{}", describe_day(&day));
            }
        }
        Commands::Upcoming { hub, from, limit } => {
            let resolver = load_resolver(&path)?;
            let hub = HubId::new(hub);
            let start = match from {
                Some(raw) => parse_date(&raw)?,
                None => today(&resolver, &hub)?,
            };
            for upcoming in resolver
                .upcoming_special_days(&hub, start, limit)
                .context("Failed to list special days")?
            {
                let day = &upcoming.special_day;
                let hours = match day.window() {
                    Some(w) => format!("{}-{}", w.open.format("%H:%M"), w.close.format("%H:%M")),
                    None => "closed".to_string(),
                };
                println!("{}  {}  {}", upcoming.date, day.name, hours);
            }
        }
        Commands::Validate => validate(&path)?,
    }

    Ok(())
}

fn load_document(path: &str) -> Result<ScheduleDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse schedule JSON: {}", path))
}

fn load_resolver(path: &str) -> Result<AvailabilityResolver<InMemoryStore>> {
    let doc = load_document(path)?;
    info!(path, hubs = doc.hubs.len(), "schedule loaded");
    let store = InMemoryStore::from_document(doc).context("Invalid schedule document")?;
    Ok(AvailabilityResolver::new(store))
}

fn validate(path: &str) -> Result<()> {
    let doc = load_document(path)?;
    let mut failures = 0;
    for (hub, schedule) in &doc.hubs {
        match schedule.validate() {
            Ok(()) => debug!(%hub, "hub valid"),
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", hub, e);
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{} of {} hubs failed validation", failures, doc.hubs.len());
    }
    println!("OK");
    Ok(())
}

/// Today's date in the hub's timezone.
fn today<S: ScheduleStore>(resolver: &AvailabilityResolver<S>, hub: &HubId) -> Result<NaiveDate> {
    let tz = resolver.settings(hub)?.tz()?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

fn describe_day(day: &ResolvedDay) -> String {
    let hours = match &day.window {
        Some(w) => match w.break_window {
            Some(b) => format!(
                "{}-{} (break {}-{})",
                w.open.format("%H:%M"),
                w.close.format("%H:%M"),
                b.start.format("%H:%M"),
                b.end.format("%H:%M")
            ),
            None => format!("{}-{}", w.open.format("%H:%M"), w.close.format("%H:%M")),
        },
        None => "closed".to_string(),
    };
    let label = day
        .label
        .as_deref()
        .map(|l| format!("  [{}]", l))
        .unwrap_or_default();
    format!(
        "{} {}  {}  {:?}{}",
        day.date,
        day.date.format("%a"),
        hours,
        day.source,
        label
    )
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid RFC 3339 instant: {}", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw))
}

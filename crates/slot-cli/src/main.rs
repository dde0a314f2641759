//! `slots` CLI: query free appointment slots and validate bookings from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Free slots of a business for an explicit window
//! slots available --rules rules.jsonl --busy busy.json --business barber \
//!     --from 2026-01-05T00:00:00Z --to 2026-01-06T00:00:00Z
//!
//! # Free slots for the rest of this week (or all of next week)
//! slots available --rules rules.jsonl --business barber --week next
//!
//! # Check whether a batch of slots can be booked
//! slots check --rules rules.jsonl --busy busy.json --business barber \
//!     --slot 2026-01-05T09:00:00Z/2026-01-05T10:00:00Z
//!
//! # Expand a single encoded rule
//! slots expand --rule '{"rule":{"rrule":"...","duration":3600},"kind":"inclusion"}'
//! ```
//!
//! The rules file holds one encoded tagged rule per line. The busy file is a
//! JSON array of `{"owner", "start", "end"}` objects.

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slot_engine::calendar;
use slot_engine::service::decode_rules;
use slot_engine::{AvailabilityService, BusySlot, Config, Interval, MemoryStore, RuleKind};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Appointment availability and booking checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the free intervals of a business inside a window
    Available {
        #[command(flatten)]
        source: Source,
        /// Window start (RFC 3339)
        #[arg(long, value_parser = parse_time, requires = "to", conflicts_with = "week")]
        from: Option<DateTime<Utc>>,
        /// Window end (RFC 3339)
        #[arg(long, value_parser = parse_time, requires = "from")]
        to: Option<DateTime<Utc>>,
        /// Use the current or the following calendar week as the window
        #[arg(long, value_enum)]
        week: Option<Week>,
        /// Reference time for --week (defaults to the current time)
        #[arg(long, value_parser = parse_time, requires = "week")]
        now: Option<DateTime<Utc>>,
    },
    /// Check whether a batch of slots can be booked
    Check {
        #[command(flatten)]
        source: Source,
        /// Candidate slot as START/END (RFC 3339), repeatable
        #[arg(long = "slot", value_parser = parse_slot, required = true)]
        slots: Vec<Interval>,
        /// Reference time for rejecting past slots (defaults to the current time)
        #[arg(long, value_parser = parse_time)]
        now: Option<DateTime<Utc>>,
    },
    /// Print the occurrences of one encoded tagged rule
    Expand {
        /// Encoded tagged rule (JSON)
        #[arg(long)]
        rule: String,
    },
}

/// Where a business's rules and bookings come from.
#[derive(Args)]
struct Source {
    /// File with one encoded tagged rule per line
    #[arg(long)]
    rules: PathBuf,
    /// JSON array of busy slots
    #[arg(long)]
    busy: Option<PathBuf>,
    /// Business the rules and busy slots belong to
    #[arg(long)]
    business: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Week {
    This,
    Next,
}

#[derive(Serialize)]
struct Expansion<'a> {
    kind: RuleKind,
    rrule: String,
    occurrences: &'a [Interval],
}

fn main() -> Result<()> {
    logging::init_with_level("warn");

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Available {
            source,
            from,
            to,
            week,
            now,
        } => {
            let window = match (from, to, week) {
                (Some(from), Some(to), None) => Interval::try_new(from, to)
                    .context("Query window must end after it starts")?,
                (None, None, Some(week)) => {
                    let now = now.unwrap_or_else(Utc::now);
                    match week {
                        Week::This => calendar::this_week(now),
                        Week::Next => calendar::next_week(now),
                    }
                }
                _ => anyhow::bail!("Either --from/--to or --week is required"),
            };

            let service = AvailabilityService::with_config(load_store(&source)?, &config);
            let free = service
                .available_slots_in_range(&source.business, &window)
                .context("Failed to compute availability")?;
            print_json(&free)?;
        }
        Commands::Check { source, slots, now } => {
            let service = AvailabilityService::with_config(load_store(&source)?, &config);
            let accepted = service
                .check_booking(&source.business, slots, now.unwrap_or_else(Utc::now))
                .context("Booking rejected")?;
            print_json(&serde_json::json!({ "accepted": accepted }))?;
        }
        Commands::Expand { rule } => {
            let mut tagged = decode_rules(&[rule], config.expansion_limits())
                .context("Failed to decode rule")?;
            let Some(tagged) = tagged.pop() else {
                anyhow::bail!("No rule given");
            };
            let occurrences = tagged
                .rule
                .get_intervals()
                .context("Failed to expand rule")?;
            print_json(&Expansion {
                kind: tagged.kind,
                rrule: tagged.rule.pattern().to_string(),
                occurrences: &occurrences,
            })?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Fill an in-memory store with the business's rules and busy slots.
fn load_store(source: &Source) -> Result<MemoryStore> {
    let mut store = MemoryStore::new();

    let rules = std::fs::read_to_string(&source.rules)
        .with_context(|| format!("Failed to read file: {}", source.rules.display()))?;
    for line in rules.lines().map(str::trim).filter(|line| !line.is_empty()) {
        store.add_rule(&source.business, line);
    }

    if let Some(path) = &source.busy {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let busy: Vec<BusySlot> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse busy slots: {}", path.display()))?;
        for slot in &busy {
            store
                .add_busy_slots(&source.business, &slot.owner, &[slot.interval])
                .with_context(|| format!("Bad busy slot in {}", path.display()))?;
        }
        tracing::debug!(count = busy.len(), "loaded busy slots");
    }

    Ok(store)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    println!("{}", pretty);
    Ok(())
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time '{}': {}", raw, e))
}

fn parse_slot(raw: &str) -> Result<Interval, String> {
    let (start, end) = raw
        .split_once('/')
        .ok_or_else(|| format!("expected START/END, got '{}'", raw))?;
    Ok(Interval::new(parse_time(start)?, parse_time(end)?))
}

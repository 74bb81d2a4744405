//! `lexdesk` command line.
//!
//! Each subcommand loads the configured snapshot into an in-process
//! [`MemoryBackend`], runs one engine operation over it, and prints the
//! result as text or JSON.

mod render;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::db::memory::MemoryBackend;
use crate::db::snapshot::Snapshot;
use crate::db::{
    ClientStore, DocumentFilter, DocumentRecord, DocumentStore, DocumentType, HearingFilter,
    HearingStore, MatterFilter, MatterStore, TimeEntryFilter, TimeEntryRecord, TimeEntryStore,
};
use crate::practice::intake::record_time_entry;
use crate::practice::metrics::{
    ClientField, DocumentField, HearingField, MatterField, Searchable, TimeTotals,
    aggregate_time_entries, count_by_type, file_size_label, fuzzy_search, partition_hearings,
};
use crate::practice::tracker::{TimeTracker, TrackedSession};
use crate::practice::{LogNotifier, load_dashboard};

#[derive(Parser, Debug)]
#[command(name = "lexdesk", about = "Practice management reporting", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON snapshot to read (overrides LEXDESK_SNAPSHOT and the config file)
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true, env = "LEXDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stat cards, recent matters and next hearings
    Dashboard {
        /// Acting user for the this-month hours figure
        #[arg(long, env = "LEXDESK_USER")]
        user: String,
        /// Evaluate as of this RFC 3339 instant instead of the current time
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Upcoming and past hearings
    Hearings {
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        #[arg(long)]
        matter: Option<Uuid>,
    },

    /// Time entries with hour and revenue totals
    Time {
        #[arg(long, env = "LEXDESK_USER")]
        user: Option<String>,
        #[arg(long)]
        matter: Option<Uuid>,
    },

    /// Documents with per-type counts
    Documents {
        /// List every document type, including those with no documents
        #[arg(long)]
        all_types: bool,
    },

    /// Case-insensitive search over one record kind
    Search {
        target: SearchTarget,
        query: String,
        /// Restrict to these fields (repeatable); defaults to all text fields
        #[arg(long = "field")]
        fields: Vec<String>,
    },

    /// Run the live timer, then record the tracked time
    Track {
        /// How long to track before stopping
        #[arg(long)]
        seconds: u64,
        /// Record the session as this user's time entry
        #[arg(long, env = "LEXDESK_USER")]
        user: Option<String>,
        #[arg(long)]
        matter: Option<String>,
        #[arg(long, default_value = "Tracked time")]
        description: String,
        #[arg(long)]
        rate: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchTarget {
    Matters,
    Documents,
    Clients,
    Hearings,
}

#[derive(Serialize)]
struct TimeReport<'a> {
    entries: &'a [TimeEntryRecord],
    totals: TimeTotals,
}

#[derive(Serialize)]
struct TypeCount {
    document_type: DocumentType,
    count: usize,
}

#[derive(Serialize)]
struct DocumentRow<'a> {
    #[serde(flatten)]
    document: &'a DocumentRecord,
    size_label: String,
}

#[derive(Serialize)]
struct DocumentReport<'a> {
    counts: Vec<TypeCount>,
    documents: Vec<DocumentRow<'a>>,
}

#[derive(Serialize)]
struct TrackReport {
    session: TrackedSession,
    recorded: Option<TimeEntryRecord>,
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to encode JSON output")?;
    writeln!(out)?;
    Ok(())
}

fn open_backend(path: Option<&Path>) -> anyhow::Result<MemoryBackend> {
    let path = path.context("no snapshot configured; pass --snapshot or set LEXDESK_SNAPSHOT")?;
    let snapshot = Snapshot::load(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    Ok(MemoryBackend::from_snapshot(snapshot))
}

fn resolve_fields<F: Copy>(
    names: &[String],
    all: &[F],
    lookup: fn(&str) -> Option<F>,
) -> anyhow::Result<Vec<F>> {
    if names.is_empty() {
        return Ok(all.to_vec());
    }
    names
        .iter()
        .map(|name| {
            lookup(&name.to_ascii_lowercase())
                .with_context(|| format!("unknown search field '{name}'"))
        })
        .collect()
}

fn matter_field(name: &str) -> Option<MatterField> {
    match name {
        "title" => Some(MatterField::Title),
        "matter_number" | "number" => Some(MatterField::MatterNumber),
        "client_name" | "client" => Some(MatterField::ClientName),
        _ => None,
    }
}

fn document_field(name: &str) -> Option<DocumentField> {
    match name {
        "title" => Some(DocumentField::Title),
        "matter_number" | "number" => Some(DocumentField::MatterNumber),
        _ => None,
    }
}

fn client_field(name: &str) -> Option<ClientField> {
    match name {
        "full_name" | "name" => Some(ClientField::FullName),
        "email" => Some(ClientField::Email),
        "company_name" | "company" => Some(ClientField::CompanyName),
        _ => None,
    }
}

fn hearing_field(name: &str) -> Option<HearingField> {
    match name {
        "title" => Some(HearingField::Title),
        "court" | "court_name" => Some(HearingField::Court),
        "judge" | "judge_name" => Some(HearingField::Judge),
        "location" => Some(HearingField::Location),
        _ => None,
    }
}

fn print_matches<T: Searchable + Serialize>(
    out: &mut dyn Write,
    json: bool,
    records: &[T],
    query: &str,
    fields: &[T::Field],
    line: fn(&mut dyn Write, &T) -> std::io::Result<()>,
) -> anyhow::Result<()> {
    let matches = fuzzy_search(records, query, fields);
    tracing::debug!(query, matched = matches.len(), total = records.len(), "Search finished");
    if json {
        return write_json(out, &matches);
    }
    for record in matches {
        line(out, record)?;
    }
    Ok(())
}

/// Run one subcommand, writing its output to `out`.
pub async fn run(cli: Cli, config: &Config, out: &mut dyn Write) -> anyhow::Result<()> {
    let snapshot_path = cli
        .snapshot
        .clone()
        .or_else(|| config.practice.snapshot_path.clone());
    let currency = config.practice.currency_symbol.as_str();

    match cli.command {
        Command::Dashboard { user, now } => {
            let db = open_backend(snapshot_path.as_deref())?;
            let now = now.unwrap_or_else(Utc::now);
            let dashboard = load_dashboard(&db, &user, now, config.practice.limits).await?;
            if cli.json {
                write_json(out, &dashboard)?;
            } else {
                render::dashboard(out, &dashboard)?;
            }
        }
        Command::Hearings { now, matter } => {
            let db = open_backend(snapshot_path.as_deref())?;
            let now = now.unwrap_or_else(Utc::now);
            let hearings = db
                .list_hearings(&HearingFilter {
                    matter_id: matter,
                    ..HearingFilter::default()
                })
                .await?;
            let partition = partition_hearings(&hearings, now);
            if cli.json {
                write_json(out, &partition)?;
            } else {
                render::hearings(out, &partition)?;
            }
        }
        Command::Time { user, matter } => {
            let db = open_backend(snapshot_path.as_deref())?;
            let entries = db
                .list_time_entries(&TimeEntryFilter {
                    user_id: user,
                    matter_id: matter,
                    since: None,
                })
                .await?;
            let totals = aggregate_time_entries(&entries);
            if cli.json {
                write_json(
                    out,
                    &TimeReport {
                        entries: &entries,
                        totals,
                    },
                )?;
            } else {
                for entry in &entries {
                    render::time_entry_line(out, entry, currency)?;
                }
                render::time_totals(out, &totals, currency)?;
            }
        }
        Command::Documents { all_types } => {
            let db = open_backend(snapshot_path.as_deref())?;
            let documents = db.list_documents(&DocumentFilter::default()).await?;
            let include_zero = all_types || config.practice.include_zero_document_types;
            let counts: Vec<(DocumentType, usize)> =
                count_by_type(&documents, include_zero).into_iter().collect();
            if cli.json {
                write_json(
                    out,
                    &DocumentReport {
                        counts: counts
                            .iter()
                            .map(|&(document_type, count)| TypeCount {
                                document_type,
                                count,
                            })
                            .collect(),
                        documents: documents
                            .iter()
                            .map(|document| DocumentRow {
                                document,
                                size_label: file_size_label(document.file_size),
                            })
                            .collect(),
                    },
                )?;
            } else {
                for document in &documents {
                    render::document_line(out, document)?;
                }
                render::document_counts(out, &counts)?;
            }
        }
        Command::Search {
            target,
            query,
            fields,
        } => {
            let db = open_backend(snapshot_path.as_deref())?;
            match target {
                SearchTarget::Matters => {
                    let fields = resolve_fields(&fields, &MatterField::ALL, matter_field)?;
                    let records = db.list_matters(&MatterFilter::default()).await?;
                    print_matches(out, cli.json, &records, &query, &fields, render::matter_line)?;
                }
                SearchTarget::Documents => {
                    let fields = resolve_fields(&fields, &DocumentField::ALL, document_field)?;
                    let records = db.list_documents(&DocumentFilter::default()).await?;
                    print_matches(out, cli.json, &records, &query, &fields, render::document_line)?;
                }
                SearchTarget::Clients => {
                    let fields = resolve_fields(&fields, &ClientField::ALL, client_field)?;
                    let records = db.list_clients().await?;
                    print_matches(out, cli.json, &records, &query, &fields, render::client_line)?;
                }
                SearchTarget::Hearings => {
                    let fields = resolve_fields(&fields, &HearingField::ALL, hearing_field)?;
                    let records = db.list_hearings(&HearingFilter::default()).await?;
                    print_matches(out, cli.json, &records, &query, &fields, render::hearing_line)?;
                }
            }
        }
        Command::Track {
            seconds,
            user,
            matter,
            description,
            rate,
        } => {
            if seconds == 0 {
                bail!("--seconds must be greater than zero");
            }
            let session = track_for(
                config.practice.tracker_tick,
                Duration::from_secs(seconds),
                !cli.json,
            )
            .await?;

            let recorded = match user {
                Some(user) => {
                    let db = match snapshot_path.as_deref() {
                        Some(path) => open_backend(Some(path))?,
                        None => MemoryBackend::new(),
                    };
                    let input = session
                        .clone()
                        .into_time_entry_input(matter, description, rate);
                    Some(record_time_entry(&db, &LogNotifier, &user, input).await?)
                }
                None => None,
            };

            if cli.json {
                write_json(out, &TrackReport { session, recorded })?;
            } else {
                render::tracked_session(out, &session)?;
                if let Some(entry) = &recorded {
                    writeln!(out, "Recorded:")?;
                    render::time_entry_line(out, entry, currency)?;
                }
            }
        }
    }
    Ok(())
}

/// Run a tracker session for `duration`, echoing each tick to stderr.
async fn track_for(tick: Duration, duration: Duration, echo: bool) -> anyhow::Result<TrackedSession> {
    let tracker = TimeTracker::new(tick);
    let mut updates = tracker.start()?;
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if echo {
                    eprintln!("{}", updates.borrow_and_update().display);
                }
            }
        }
    }

    Ok(tracker.stop()?)
}

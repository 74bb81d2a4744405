//! Plain-text rendering for CLI output.

use std::io::{self, Write};

use crate::db::{
    ClientRecord, DocumentRecord, DocumentType, HearingRecord, MatterRecord, TimeEntryRecord,
};
use crate::practice::Dashboard;
use crate::practice::metrics::{
    HearingPartition, TimeTotals, elapsed_time_format, file_size_label, format_currency,
    format_hours,
};
use crate::practice::tracker::TrackedSession;

pub fn dashboard(out: &mut dyn Write, dashboard: &Dashboard) -> io::Result<()> {
    let stats = &dashboard.stats;
    writeln!(out, "Active matters:     {}", stats.active_matters)?;
    writeln!(out, "Upcoming hearings:  {}", stats.upcoming_hearings)?;
    writeln!(out, "Pending tasks:      {}", stats.pending_tasks)?;
    writeln!(out, "Total documents:    {}", stats.total_documents)?;
    writeln!(out, "Hours this month:   {}", stats.this_month_hours)?;

    writeln!(out, "\nRecent matters")?;
    if dashboard.recent_matters.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for matter in &dashboard.recent_matters {
        matter_line(out, matter)?;
    }

    writeln!(out, "\nNext hearings")?;
    if dashboard.next_hearings.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for hearing in &dashboard.next_hearings {
        hearing_line(out, hearing)?;
    }
    Ok(())
}

pub fn matter_line(out: &mut dyn Write, matter: &MatterRecord) -> io::Result<()> {
    writeln!(
        out,
        "  {}  {}  [{}/{}]{}",
        matter.matter_number,
        matter.title,
        matter.status.as_str(),
        matter.priority.as_str(),
        matter
            .client_name
            .as_deref()
            .map(|name| format!("  {name}"))
            .unwrap_or_default(),
    )
}

pub fn hearing_line(out: &mut dyn Write, hearing: &HearingRecord) -> io::Result<()> {
    let venue = [hearing.court_name.as_deref(), hearing.location.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(
        out,
        "  {}  {}  [{}]{}",
        hearing.hearing_date.format("%Y-%m-%d %H:%M"),
        hearing.title,
        hearing.status.as_str(),
        if venue.is_empty() {
            String::new()
        } else {
            format!("  {venue}")
        },
    )
}

pub fn hearings(out: &mut dyn Write, partition: &HearingPartition<'_>) -> io::Result<()> {
    writeln!(out, "Upcoming ({})", partition.upcoming.len())?;
    for hearing in &partition.upcoming {
        hearing_line(out, hearing)?;
    }
    writeln!(out, "\nPast ({})", partition.past.len())?;
    for hearing in &partition.past {
        hearing_line(out, hearing)?;
    }
    Ok(())
}

pub fn time_entry_line(
    out: &mut dyn Write,
    entry: &TimeEntryRecord,
    currency: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "  {}  {:>6}h  {}{}",
        entry.date,
        format_hours(entry.hours),
        entry.description,
        match (entry.is_billable, entry.billable_rate) {
            (true, Some(rate)) => format!("  @ {}", format_currency(rate, currency)),
            (true, None) => "  (billable)".to_string(),
            (false, _) => "  (non-billable)".to_string(),
        },
    )
}

pub fn time_totals(out: &mut dyn Write, totals: &TimeTotals, currency: &str) -> io::Result<()> {
    writeln!(out, "Total hours:    {}", totals.display_total_hours())?;
    writeln!(out, "Billable hours: {}", totals.display_billable_hours())?;
    writeln!(
        out,
        "Total revenue:  {}",
        format_currency(totals.total_revenue, currency)
    )
}

pub fn document_counts(out: &mut dyn Write, counts: &[(DocumentType, usize)]) -> io::Result<()> {
    writeln!(out, "By type")?;
    for (kind, count) in counts {
        writeln!(out, "  {:<16} {}", kind.as_str(), count)?;
    }
    Ok(())
}

pub fn document_line(out: &mut dyn Write, document: &DocumentRecord) -> io::Result<()> {
    writeln!(
        out,
        "  {}  {}  {}  {}",
        document.matter_number.as_deref().unwrap_or("-"),
        document.title,
        document
            .document_type
            .map(DocumentType::as_str)
            .unwrap_or("untyped"),
        file_size_label(document.file_size),
    )
}

pub fn client_line(out: &mut dyn Write, client: &ClientRecord) -> io::Result<()> {
    let details = [client.company_name.as_deref(), client.email.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    if details.is_empty() {
        writeln!(out, "  {}", client.full_name)
    } else {
        writeln!(out, "  {}  {}", client.full_name, details)
    }
}

pub fn tracked_session(out: &mut dyn Write, session: &TrackedSession) -> io::Result<()> {
    writeln!(
        out,
        "Tracked {} ({}h) from {}",
        elapsed_time_format(session.elapsed_secs),
        format_hours(session.hours()),
        session.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

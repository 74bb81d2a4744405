//! JSON snapshot rows and their validation into typed records.
//!
//! A snapshot is the raw export of the practice tables. Columns arrive loosely
//! typed (nullable enums, nullable booleans) and are checked here, once, so
//! everything past this module can rely on the record invariants.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{
    ClientRecord, DocumentRecord, DocumentType, HearingRecord, HearingStatus, MAX_BILLABLE_RATE,
    MAX_ENTRY_HOURS, MatterRecord, MatterStatus, Priority, TaskRecord, TaskStatus,
    TimeEntryRecord,
};
use crate::error::DatabaseError;

#[derive(Debug, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub matters: Vec<RawMatterRow>,
    #[serde(default)]
    pub hearings: Vec<RawHearingRow>,
    #[serde(default)]
    pub documents: Vec<RawDocumentRow>,
    #[serde(default)]
    pub time_entries: Vec<RawTimeEntryRow>,
    #[serde(default)]
    pub clients: Vec<RawClientRow>,
    #[serde(default)]
    pub tasks: Vec<RawTaskRow>,
}

#[derive(Debug, Deserialize)]
pub struct RawMatterRow {
    pub id: Uuid,
    pub matter_number: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RawHearingRow {
    pub id: Uuid,
    pub matter_id: Uuid,
    pub title: String,
    pub hearing_date: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub court_name: Option<String>,
    #[serde(default)]
    pub judge_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub struct RawDocumentRow {
    pub id: Uuid,
    pub matter_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RawTimeEntryRow {
    pub id: Uuid,
    #[serde(default)]
    pub matter_id: Option<Uuid>,
    pub user_id: String,
    pub description: String,
    pub date: NaiveDate,
    pub hours: Decimal,
    #[serde(default)]
    pub is_billable: Option<bool>,
    #[serde(default)]
    pub billable_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct RawClientRow {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RawTaskRow {
    pub id: Uuid,
    #[serde(default)]
    pub matter_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Fully validated snapshot tables.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub matters: Vec<MatterRecord>,
    pub hearings: Vec<HearingRecord>,
    pub documents: Vec<DocumentRecord>,
    pub time_entries: Vec<TimeEntryRecord>,
    pub clients: Vec<ClientRecord>,
    pub tasks: Vec<TaskRecord>,
}

fn row_error(table: &str, id: Uuid, message: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Serialization(format!("{table} row {id}: {message}"))
}

fn parse_enum<T>(
    table: &str,
    id: Uuid,
    column: &str,
    raw: Option<&str>,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> Result<T, DatabaseError> {
    match raw {
        None => Ok(default),
        Some(value) => parse(value)
            .ok_or_else(|| row_error(table, id, format!("invalid {column} '{value}'"))),
    }
}

fn row_to_matter_record(
    row: RawMatterRow,
    clients: &[ClientRecord],
) -> Result<MatterRecord, DatabaseError> {
    let status = parse_enum(
        "matters",
        row.id,
        "status",
        row.status.as_deref(),
        MatterStatus::Active,
        MatterStatus::from_db_value,
    )?;
    let priority = parse_enum(
        "matters",
        row.id,
        "priority",
        row.priority.as_deref(),
        Priority::Medium,
        Priority::from_db_value,
    )?;
    let client_name = clients
        .iter()
        .find(|client| client.id == row.client_id)
        .map(|client| client.full_name.clone());

    Ok(MatterRecord {
        id: row.id,
        matter_number: row.matter_number,
        title: row.title,
        status,
        priority,
        client_id: row.client_id,
        client_name,
        created_at: row.created_at,
    })
}

fn require_matter(
    table: &str,
    id: Uuid,
    matter_id: Uuid,
    matters: &[MatterRecord],
) -> Result<(), DatabaseError> {
    if matters.iter().any(|matter| matter.id == matter_id) {
        Ok(())
    } else {
        Err(row_error(table, id, format!("unknown matter_id {matter_id}")))
    }
}

fn row_to_hearing_record(
    row: RawHearingRow,
    matters: &[MatterRecord],
) -> Result<HearingRecord, DatabaseError> {
    require_matter("hearings", row.id, row.matter_id, matters)?;
    let status = parse_enum(
        "hearings",
        row.id,
        "status",
        row.status.as_deref(),
        HearingStatus::Scheduled,
        HearingStatus::from_db_value,
    )?;
    Ok(HearingRecord {
        id: row.id,
        matter_id: row.matter_id,
        title: row.title,
        hearing_date: row.hearing_date,
        status,
        court_name: row.court_name,
        judge_name: row.judge_name,
        location: row.location,
        notes: row.notes,
        created_by: row.created_by,
    })
}

fn row_to_document_record(
    row: RawDocumentRow,
    matters: &[MatterRecord],
) -> Result<DocumentRecord, DatabaseError> {
    let document_type = match row.document_type.as_deref() {
        None => None,
        Some(value) => Some(DocumentType::from_db_value(value).ok_or_else(|| {
            row_error("documents", row.id, format!("invalid document_type '{value}'"))
        })?),
    };
    let file_size = match row.file_size {
        None => None,
        Some(size) => Some(u64::try_from(size).map_err(|_| {
            row_error("documents", row.id, format!("negative file_size {size}"))
        })?),
    };
    require_matter("documents", row.id, row.matter_id, matters)?;
    let matter_number = matters
        .iter()
        .find(|matter| matter.id == row.matter_id)
        .map(|matter| matter.matter_number.clone());

    Ok(DocumentRecord {
        id: row.id,
        matter_id: row.matter_id,
        title: row.title,
        matter_number,
        document_type,
        file_size,
        created_at: row.created_at,
    })
}

fn row_to_time_entry_record(
    row: RawTimeEntryRow,
    matters: &[MatterRecord],
) -> Result<TimeEntryRecord, DatabaseError> {
    if let Some(matter_id) = row.matter_id {
        require_matter("time_entries", row.id, matter_id, matters)?;
    }
    if row.hours < Decimal::ZERO {
        return Err(row_error(
            "time_entries",
            row.id,
            format!("negative hours {}", row.hours),
        ));
    }
    if row.hours > Decimal::from(MAX_ENTRY_HOURS) {
        return Err(row_error(
            "time_entries",
            row.id,
            format!("hours {} exceed {MAX_ENTRY_HOURS}", row.hours),
        ));
    }
    if let Some(rate) = row.billable_rate {
        if rate < Decimal::ZERO {
            return Err(row_error(
                "time_entries",
                row.id,
                format!("negative billable_rate {rate}"),
            ));
        }
        if rate > Decimal::from(MAX_BILLABLE_RATE) {
            return Err(row_error(
                "time_entries",
                row.id,
                format!("billable_rate {rate} exceeds {MAX_BILLABLE_RATE}"),
            ));
        }
    }
    Ok(TimeEntryRecord {
        id: row.id,
        matter_id: row.matter_id,
        user_id: row.user_id,
        description: row.description,
        date: row.date,
        hours: row.hours,
        is_billable: row.is_billable.unwrap_or(false),
        billable_rate: row.billable_rate,
    })
}

fn row_to_client_record(row: RawClientRow) -> Result<ClientRecord, DatabaseError> {
    if row.full_name.trim().is_empty() {
        return Err(row_error("clients", row.id, "full_name is empty"));
    }
    Ok(ClientRecord {
        id: row.id,
        full_name: row.full_name,
        email: row.email,
        phone: row.phone,
        company_name: row.company_name,
        address: row.address,
        notes: row.notes,
        created_by: row.created_by,
        created_at: row.created_at,
    })
}

fn row_to_task_record(
    row: RawTaskRow,
    matters: &[MatterRecord],
) -> Result<TaskRecord, DatabaseError> {
    if let Some(matter_id) = row.matter_id {
        require_matter("tasks", row.id, matter_id, matters)?;
    }
    let status = parse_enum(
        "tasks",
        row.id,
        "status",
        row.status.as_deref(),
        TaskStatus::Pending,
        TaskStatus::from_db_value,
    )?;
    let priority = parse_enum(
        "tasks",
        row.id,
        "priority",
        row.priority.as_deref(),
        Priority::Medium,
        Priority::from_db_value,
    )?;
    Ok(TaskRecord {
        id: row.id,
        matter_id: row.matter_id,
        title: row.title,
        status,
        priority,
    })
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = DatabaseError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        // Clients first, then matters: later tables join against and
        // reference earlier ones.
        let clients = raw
            .clients
            .into_iter()
            .map(row_to_client_record)
            .collect::<Result<Vec<_>, _>>()?;
        let matters = raw
            .matters
            .into_iter()
            .map(|row| row_to_matter_record(row, &clients))
            .collect::<Result<Vec<_>, _>>()?;
        let documents = raw
            .documents
            .into_iter()
            .map(|row| row_to_document_record(row, &matters))
            .collect::<Result<Vec<_>, _>>()?;
        let hearings = raw
            .hearings
            .into_iter()
            .map(|row| row_to_hearing_record(row, &matters))
            .collect::<Result<Vec<_>, _>>()?;
        let time_entries = raw
            .time_entries
            .into_iter()
            .map(|row| row_to_time_entry_record(row, &matters))
            .collect::<Result<Vec<_>, _>>()?;
        let tasks = raw
            .tasks
            .into_iter()
            .map(|row| row_to_task_record(row, &matters))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            matters,
            hearings,
            documents,
            time_entries,
            clients,
            tasks,
        })
    }
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self, DatabaseError> {
        let parsed: RawSnapshot =
            serde_json::from_str(raw).map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        Self::try_from(parsed)
    }

    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DatabaseError::Storage(format!("failed to read snapshot {}: {}", path.display(), e))
        })?;
        let snapshot = Self::from_json(&raw)?;
        tracing::debug!(
            path = %path.display(),
            matters = snapshot.matters.len(),
            hearings = snapshot.hearings.len(),
            documents = snapshot.documents.len(),
            time_entries = snapshot.time_entries.len(),
            "Loaded practice snapshot"
        );
        Ok(snapshot)
    }
}

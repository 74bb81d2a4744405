//! Persistence collaborator.
//!
//! The metrics engine never talks to storage itself. Callers fetch typed rows
//! through the per-entity store traits below and hand plain slices to
//! `crate::practice::metrics`. The `Database` supertrait combines the
//! sub-traits so call sites can hold a single `Arc<dyn Database>`.
//!
//! One implementation ships with the crate: [`memory::MemoryBackend`], an
//! in-process table set that can be seeded from a JSON snapshot
//! (see [`snapshot`]).

pub mod memory;
pub mod snapshot;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Upper bound on the hours of one time entry.
pub const MAX_ENTRY_HOURS: u32 = 100_000;

/// Upper bound on a time entry's billable rate.
pub const MAX_BILLABLE_RATE: u32 = 1_000_000_000;

/// Matter lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatterStatus {
    Active,
    Pending,
    Closed,
    Archived,
}

impl MatterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "closed" => Some(Self::Closed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Priority shared by matters and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Hearing state.
///
/// `Scheduled` is the only non-terminal state. Stores are expected to refuse
/// transitions back into it; the "upcoming" classification relies on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingStatus {
    Scheduled,
    Completed,
    Postponed,
    Cancelled,
}

impl HearingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Postponed => "postponed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "postponed" => Some(Self::Postponed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scheduled)
    }

    pub fn can_transition_to(self, next: HearingStatus) -> bool {
        self == Self::Scheduled && next.is_terminal()
    }
}

/// Document classification.
///
/// Variant order is the display order used by type counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    Pleading,
    Evidence,
    Correspondence,
    CourtOrder,
    Affidavit,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 7] = [
        Self::Contract,
        Self::Pleading,
        Self::Evidence,
        Self::Correspondence,
        Self::CourtOrder,
        Self::Affidavit,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Pleading => "pleading",
            Self::Evidence => "evidence",
            Self::Correspondence => "correspondence",
            Self::CourtOrder => "court_order",
            Self::Affidavit => "affidavit",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "contract" => Some(Self::Contract),
            "pleading" => Some(Self::Pleading),
            "evidence" => Some(Self::Evidence),
            "correspondence" => Some(Self::Correspondence),
            "court_order" => Some(Self::CourtOrder),
            "affidavit" => Some(Self::Affidavit),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Work still on someone's plate.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatterRecord {
    pub id: Uuid,
    pub matter_number: String,
    pub title: String,
    pub status: MatterStatus,
    pub priority: Priority,
    pub client_id: Uuid,
    /// Joined from the client row when the store can resolve it.
    pub client_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingRecord {
    pub id: Uuid,
    pub matter_id: Uuid,
    pub title: String,
    pub hearing_date: DateTime<Utc>,
    pub status: HearingStatus,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct CreateHearingParams {
    pub matter_id: Uuid,
    pub title: String,
    pub hearing_date: DateTime<Utc>,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub matter_id: Uuid,
    pub title: String,
    /// Joined from the matter row when the store can resolve it.
    pub matter_number: Option<String>,
    pub document_type: Option<DocumentType>,
    pub file_size: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryRecord {
    pub id: Uuid,
    pub matter_id: Option<Uuid>,
    pub user_id: String,
    pub description: String,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub is_billable: bool,
    pub billable_rate: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct CreateTimeEntryParams {
    pub matter_id: Option<Uuid>,
    pub description: String,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub is_billable: bool,
    pub billable_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateClientParams {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub matter_id: Option<Uuid>,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

// ==================== Filters ====================

#[derive(Debug, Clone, Default)]
pub struct MatterFilter {
    pub status: Option<MatterStatus>,
}

impl MatterFilter {
    pub fn matches(&self, matter: &MatterRecord) -> bool {
        self.status.is_none_or(|status| matter.status == status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HearingFilter {
    pub status: Option<HearingStatus>,
    pub matter_id: Option<Uuid>,
    /// Inclusive lower bound on `hearing_date`.
    pub from: Option<DateTime<Utc>>,
}

impl HearingFilter {
    /// Filter matching the "upcoming" definition at `now`.
    pub fn upcoming(now: DateTime<Utc>) -> Self {
        Self {
            status: Some(HearingStatus::Scheduled),
            matter_id: None,
            from: Some(now),
        }
    }

    pub fn matches(&self, hearing: &HearingRecord) -> bool {
        self.status.is_none_or(|status| hearing.status == status)
            && self.matter_id.is_none_or(|id| hearing.matter_id == id)
            && self.from.is_none_or(|from| hearing.hearing_date >= from)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub matter_id: Option<Uuid>,
    pub document_type: Option<DocumentType>,
}

impl DocumentFilter {
    pub fn matches(&self, document: &DocumentRecord) -> bool {
        self.matter_id.is_none_or(|id| document.matter_id == id)
            && self
                .document_type
                .is_none_or(|kind| document.document_type == Some(kind))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeEntryFilter {
    pub user_id: Option<String>,
    pub matter_id: Option<Uuid>,
    /// Inclusive lower bound on `date`.
    pub since: Option<NaiveDate>,
}

impl TimeEntryFilter {
    pub fn matches(&self, entry: &TimeEntryRecord) -> bool {
        self.user_id
            .as_deref()
            .is_none_or(|user| entry.user_id == user)
            && self
                .matter_id
                .is_none_or(|id| entry.matter_id == Some(id))
            && self.since.is_none_or(|since| entry.date >= since)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Empty means any status.
    pub statuses: Vec<TaskStatus>,
}

impl TaskFilter {
    pub fn open() -> Self {
        Self {
            statuses: vec![TaskStatus::Pending, TaskStatus::InProgress],
        }
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&task.status)
    }
}

// ==================== Sub-traits ====================
//
// Each sub-trait covers one table. Listing returns rows in the order the
// screens expect (documented per method) so callers never re-sort.

#[async_trait]
pub trait MatterStore: Send + Sync {
    /// Newest first by `created_at`.
    async fn list_matters(&self, filter: &MatterFilter) -> Result<Vec<MatterRecord>, DatabaseError>;
    async fn count_matters(&self, filter: &MatterFilter) -> Result<usize, DatabaseError>;
}

#[async_trait]
pub trait HearingStore: Send + Sync {
    /// Ascending by `hearing_date`.
    async fn list_hearings(
        &self,
        filter: &HearingFilter,
    ) -> Result<Vec<HearingRecord>, DatabaseError>;
    async fn count_hearings(&self, filter: &HearingFilter) -> Result<usize, DatabaseError>;
    async fn create_hearing(
        &self,
        user_id: &str,
        input: &CreateHearingParams,
    ) -> Result<HearingRecord, DatabaseError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Newest first by `created_at`.
    async fn list_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<DocumentRecord>, DatabaseError>;
    async fn count_documents(&self, filter: &DocumentFilter) -> Result<usize, DatabaseError>;
}

#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    /// Newest first by `date`.
    async fn list_time_entries(
        &self,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntryRecord>, DatabaseError>;
    async fn count_time_entries(&self, filter: &TimeEntryFilter) -> Result<usize, DatabaseError>;
    async fn create_time_entry(
        &self,
        user_id: &str,
        input: &CreateTimeEntryParams,
    ) -> Result<TimeEntryRecord, DatabaseError>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Newest first by `created_at`.
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DatabaseError>;
    async fn count_clients(&self) -> Result<usize, DatabaseError>;
    async fn create_client(
        &self,
        user_id: &str,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, DatabaseError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>, DatabaseError>;
    async fn count_tasks(&self, filter: &TaskFilter) -> Result<usize, DatabaseError>;
}

/// Backend-agnostic database supertrait.
pub trait Database:
    MatterStore + HearingStore + DocumentStore + TimeEntryStore + ClientStore + TaskStore + Send + Sync
{
}

impl<T> Database for T where
    T: MatterStore
        + HearingStore
        + DocumentStore
        + TimeEntryStore
        + ClientStore
        + TaskStore
        + Send
        + Sync
{
}

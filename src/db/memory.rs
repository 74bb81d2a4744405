//! In-process `Database` backend.
//!
//! Holds every table behind one `tokio::sync::RwLock`. Reads clone rows out so
//! no lock is held across an await in callers.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::snapshot::Snapshot;
use crate::db::{
    ClientRecord, ClientStore, CreateClientParams, CreateHearingParams, CreateTimeEntryParams,
    DocumentFilter, DocumentRecord, DocumentStore, HearingFilter, HearingRecord, HearingStatus,
    HearingStore, MatterFilter, MatterRecord, MatterStore, TaskFilter, TaskRecord, TaskStore,
    TimeEntryFilter, TimeEntryRecord, TimeEntryStore,
};
use crate::error::DatabaseError;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Snapshot>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
        }
    }

    /// Copy of every table, in insertion order.
    pub async fn snapshot(&self) -> Snapshot {
        self.tables.read().await.clone()
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(DatabaseError::Constraint(format!("{field} must not be empty")));
    }
    Ok(())
}

#[async_trait]
impl MatterStore for MemoryBackend {
    async fn list_matters(&self, filter: &MatterFilter) -> Result<Vec<MatterRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MatterRecord> = tables
            .matters
            .iter()
            .filter(|matter| filter.matches(matter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_matters(&self, filter: &MatterFilter) -> Result<usize, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.matters.iter().filter(|m| filter.matches(m)).count())
    }
}

#[async_trait]
impl HearingStore for MemoryBackend {
    async fn list_hearings(
        &self,
        filter: &HearingFilter,
    ) -> Result<Vec<HearingRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<HearingRecord> = tables
            .hearings
            .iter()
            .filter(|hearing| filter.matches(hearing))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.hearing_date.cmp(&b.hearing_date));
        Ok(rows)
    }

    async fn count_hearings(&self, filter: &HearingFilter) -> Result<usize, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.hearings.iter().filter(|h| filter.matches(h)).count())
    }

    async fn create_hearing(
        &self,
        user_id: &str,
        input: &CreateHearingParams,
    ) -> Result<HearingRecord, DatabaseError> {
        require_non_empty("created_by", user_id)?;
        require_non_empty("title", &input.title)?;

        let mut tables = self.tables.write().await;
        if !tables.matters.iter().any(|m| m.id == input.matter_id) {
            return Err(DatabaseError::NotFound {
                entity: "matter".to_string(),
                id: input.matter_id.to_string(),
            });
        }
        let record = HearingRecord {
            id: Uuid::new_v4(),
            matter_id: input.matter_id,
            title: input.title.clone(),
            hearing_date: input.hearing_date,
            status: HearingStatus::Scheduled,
            court_name: input.court_name.clone(),
            judge_name: input.judge_name.clone(),
            location: input.location.clone(),
            notes: input.notes.clone(),
            created_by: user_id.to_string(),
        };
        tables.hearings.push(record.clone());
        tracing::debug!(hearing_id = %record.id, matter_id = %record.matter_id, "Inserted hearing");
        Ok(record)
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn list_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<DocumentRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<DocumentRecord> = tables
            .documents
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_documents(&self, filter: &DocumentFilter) -> Result<usize, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.documents.iter().filter(|d| filter.matches(d)).count())
    }
}

#[async_trait]
impl TimeEntryStore for MemoryBackend {
    async fn list_time_entries(
        &self,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntryRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TimeEntryRecord> = tables
            .time_entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn count_time_entries(&self, filter: &TimeEntryFilter) -> Result<usize, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .time_entries
            .iter()
            .filter(|e| filter.matches(e))
            .count())
    }

    async fn create_time_entry(
        &self,
        user_id: &str,
        input: &CreateTimeEntryParams,
    ) -> Result<TimeEntryRecord, DatabaseError> {
        require_non_empty("user_id", user_id)?;
        require_non_empty("description", &input.description)?;

        let mut tables = self.tables.write().await;
        if let Some(matter_id) = input.matter_id
            && !tables.matters.iter().any(|m| m.id == matter_id)
        {
            return Err(DatabaseError::NotFound {
                entity: "matter".to_string(),
                id: matter_id.to_string(),
            });
        }
        let record = TimeEntryRecord {
            id: Uuid::new_v4(),
            matter_id: input.matter_id,
            user_id: user_id.to_string(),
            description: input.description.clone(),
            date: input.date,
            hours: input.hours,
            is_billable: input.is_billable,
            billable_rate: input.billable_rate,
        };
        tables.time_entries.push(record.clone());
        tracing::debug!(entry_id = %record.id, user_id, "Inserted time entry");
        Ok(record)
    }
}

#[async_trait]
impl ClientStore for MemoryBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows = tables.clients.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_clients(&self) -> Result<usize, DatabaseError> {
        Ok(self.tables.read().await.clients.len())
    }

    async fn create_client(
        &self,
        user_id: &str,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, DatabaseError> {
        require_non_empty("created_by", user_id)?;
        require_non_empty("full_name", &input.full_name)?;

        let record = ClientRecord {
            id: Uuid::new_v4(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            company_name: input.company_name.clone(),
            address: input.address.clone(),
            notes: input.notes.clone(),
            created_by: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.clients.push(record.clone());
        tracing::debug!(client_id = %record.id, "Inserted client");
        Ok(record)
    }
}

#[async_trait]
impl TaskStore for MemoryBackend {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect())
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<usize, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().filter(|t| filter.matches(t)).count())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::MemoryBackend;
    use crate::db::snapshot::Snapshot;
    use crate::db::{
        ClientStore, CreateClientParams, CreateHearingParams, CreateTimeEntryParams,
        HearingFilter, HearingStore, MatterRecord, MatterStatus, Priority, TimeEntryFilter,
        TimeEntryStore,
    };
    use crate::error::DatabaseError;

    fn matter(id: Uuid) -> MatterRecord {
        MatterRecord {
            id,
            matter_number: "M-1".to_string(),
            title: "Acme v. Foo".to_string(),
            status: MatterStatus::Active,
            priority: Priority::High,
            client_id: Uuid::new_v4(),
            client_name: None,
            created_at: Utc::now(),
        }
    }

    fn entry_params(matter_id: Option<Uuid>, day: u32) -> CreateTimeEntryParams {
        CreateTimeEntryParams {
            matter_id,
            description: "Research".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).expect("valid date"),
            hours: dec!(1.5),
            is_billable: true,
            billable_rate: Some(dec!(250)),
        }
    }

    #[tokio::test]
    async fn time_entries_are_attributed_and_listed_newest_first() {
        let matter_id = Uuid::new_v4();
        let db = MemoryBackend::from_snapshot(Snapshot {
            matters: vec![matter(matter_id)],
            ..Snapshot::default()
        });

        db.create_time_entry("alice", &entry_params(Some(matter_id), 2))
            .await
            .expect("insert");
        db.create_time_entry("alice", &entry_params(None, 9))
            .await
            .expect("insert");
        db.create_time_entry("bob", &entry_params(None, 5))
            .await
            .expect("insert");

        let filter = TimeEntryFilter {
            user_id: Some("alice".to_string()),
            ..TimeEntryFilter::default()
        };
        let rows = db.list_time_entries(&filter).await.expect("list");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.user_id == "alice"));
        assert_eq!(rows[0].date.to_string(), "2026-03-09");
        assert_eq!(db.count_time_entries(&filter).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn time_entry_for_unknown_matter_is_rejected() {
        let db = MemoryBackend::new();
        let err = db
            .create_time_entry("alice", &entry_params(Some(Uuid::new_v4()), 2))
            .await
            .expect_err("unknown matter");
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn hearings_list_ascending_and_start_scheduled() {
        let matter_id = Uuid::new_v4();
        let db = MemoryBackend::from_snapshot(Snapshot {
            matters: vec![matter(matter_id)],
            ..Snapshot::default()
        });
        for day in [20, 4, 12] {
            db.create_hearing(
                "alice",
                &CreateHearingParams {
                    matter_id,
                    title: format!("Hearing {day}"),
                    hearing_date: Utc
                        .with_ymd_and_hms(2026, 5, day, 9, 30, 0)
                        .single()
                        .expect("valid date"),
                    court_name: None,
                    judge_name: None,
                    location: None,
                    notes: None,
                },
            )
            .await
            .expect("insert");
        }

        let rows = db
            .list_hearings(&HearingFilter::default())
            .await
            .expect("list");
        let titles: Vec<&str> = rows.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Hearing 4", "Hearing 12", "Hearing 20"]);
        assert!(rows.iter().all(|h| h.created_by == "alice"));
    }

    #[tokio::test]
    async fn client_insert_requires_name_and_actor() {
        let db = MemoryBackend::new();
        let params = CreateClientParams {
            full_name: "  ".to_string(),
            email: None,
            phone: None,
            company_name: None,
            address: None,
            notes: None,
        };
        assert!(matches!(
            db.create_client("alice", &params).await,
            Err(DatabaseError::Constraint(_))
        ));

        let params = CreateClientParams {
            full_name: "Jane Roe".to_string(),
            ..params
        };
        assert!(db.create_client("", &params).await.is_err());
        let created = db.create_client("alice", &params).await.expect("insert");
        assert_eq!(created.created_by, "alice");
        assert_eq!(db.count_clients().await.expect("count"), 1);
    }
}

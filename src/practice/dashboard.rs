//! Landing-page projection: stat cards plus the two short lists.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{
    Database, DocumentFilter, DocumentRecord, HearingFilter, HearingRecord, MatterFilter,
    MatterRecord, MatterStatus, TaskFilter, TaskRecord, TimeEntryFilter, TimeEntryRecord,
};
use crate::error::DatabaseError;
use crate::practice::metrics::{is_upcoming, round_to_tenth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub recent_matters: usize,
    pub upcoming_hearings: usize,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            recent_matters: 5,
            upcoming_hearings: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub active_matters: usize,
    pub upcoming_hearings: usize,
    pub pending_tasks: usize,
    pub total_documents: usize,
    /// The actor's own hours this calendar month, to one decimal place.
    pub this_month_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_matters: Vec<MatterRecord>,
    pub next_hearings: Vec<HearingRecord>,
}

/// Rows the dashboard is computed from.
#[derive(Debug, Clone, Copy)]
pub struct PracticeRows<'a> {
    pub matters: &'a [MatterRecord],
    pub hearings: &'a [HearingRecord],
    pub documents: &'a [DocumentRecord],
    pub time_entries: &'a [TimeEntryRecord],
    pub tasks: &'a [TaskRecord],
}

/// First day of the month containing `now` (UTC).
pub fn month_start(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive().with_day(1).unwrap_or(now.date_naive())
}

fn hours_since(entries: &[TimeEntryRecord], user_id: &str, since: NaiveDate) -> Decimal {
    let total = entries
        .iter()
        .filter(|entry| entry.user_id == user_id && entry.date >= since)
        .fold(Decimal::ZERO, |acc, entry| acc + entry.hours);
    round_to_tenth(total)
}

/// Compute the dashboard over rows already in memory.
pub fn build_dashboard(
    rows: PracticeRows<'_>,
    user_id: &str,
    now: DateTime<Utc>,
    limits: DashboardLimits,
) -> Dashboard {
    let active_matters = rows
        .matters
        .iter()
        .filter(|m| m.status == MatterStatus::Active)
        .count();

    let mut upcoming: Vec<&HearingRecord> =
        rows.hearings.iter().filter(|h| is_upcoming(h, now)).collect();
    upcoming.sort_by(|a, b| a.hearing_date.cmp(&b.hearing_date));

    let mut recent: Vec<&MatterRecord> = rows.matters.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Dashboard {
        stats: DashboardStats {
            active_matters,
            upcoming_hearings: upcoming.len(),
            pending_tasks: rows.tasks.iter().filter(|t| t.status.is_open()).count(),
            total_documents: rows.documents.len(),
            this_month_hours: hours_since(rows.time_entries, user_id, month_start(now)),
        },
        recent_matters: recent
            .into_iter()
            .take(limits.recent_matters)
            .cloned()
            .collect(),
        next_hearings: upcoming
            .into_iter()
            .take(limits.upcoming_hearings)
            .cloned()
            .collect(),
    }
}

/// Compute the dashboard through the store, using counts where the screen
/// only needs a number.
pub async fn load_dashboard(
    db: &dyn Database,
    user_id: &str,
    now: DateTime<Utc>,
    limits: DashboardLimits,
) -> Result<Dashboard, DatabaseError> {
    let active_matters = db
        .count_matters(&MatterFilter {
            status: Some(MatterStatus::Active),
        })
        .await?;
    let recent_matters: Vec<MatterRecord> = db
        .list_matters(&MatterFilter::default())
        .await?
        .into_iter()
        .take(limits.recent_matters)
        .collect();

    let upcoming_filter = HearingFilter::upcoming(now);
    let upcoming_hearings = db.count_hearings(&upcoming_filter).await?;
    let next_hearings: Vec<HearingRecord> = db
        .list_hearings(&upcoming_filter)
        .await?
        .into_iter()
        .take(limits.upcoming_hearings)
        .collect();

    let pending_tasks = db.count_tasks(&TaskFilter::open()).await?;
    let total_documents = db.count_documents(&DocumentFilter::default()).await?;

    let since = month_start(now);
    let entries = db
        .list_time_entries(&TimeEntryFilter {
            user_id: Some(user_id.to_string()),
            matter_id: None,
            since: Some(since),
        })
        .await?;

    tracing::debug!(
        user_id,
        active_matters,
        upcoming_hearings,
        pending_tasks,
        total_documents,
        "Loaded dashboard"
    );

    Ok(Dashboard {
        stats: DashboardStats {
            active_matters,
            upcoming_hearings,
            pending_tasks,
            total_documents,
            this_month_hours: hours_since(&entries, user_id, since),
        },
        recent_matters,
        next_hearings,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::db::memory::MemoryBackend;
    use crate::db::snapshot::Snapshot;
    use crate::db::{HearingStatus, Priority, TaskStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 18, 14, 0, 0)
            .single()
            .expect("valid now")
    }

    fn fixture() -> Snapshot {
        let now = now();
        let matters: Vec<MatterRecord> = (0..7)
            .map(|i| MatterRecord {
                id: Uuid::new_v4(),
                matter_number: format!("M-{i}"),
                title: format!("Matter {i}"),
                status: if i % 3 == 0 {
                    MatterStatus::Closed
                } else {
                    MatterStatus::Active
                },
                priority: Priority::Medium,
                client_id: Uuid::nil(),
                client_name: None,
                created_at: now - Duration::days(i),
            })
            .collect();
        let matter_id = matters[0].id;

        let hearings: Vec<HearingRecord> = (-2..6)
            .map(|offset| HearingRecord {
                id: Uuid::new_v4(),
                matter_id,
                title: format!("Hearing {offset}"),
                hearing_date: now + Duration::days(offset),
                status: if offset == 1 {
                    HearingStatus::Postponed
                } else {
                    HearingStatus::Scheduled
                },
                court_name: None,
                judge_name: None,
                location: None,
                notes: None,
                created_by: "alice".to_string(),
            })
            .collect();

        let entry = |user: &str, date: NaiveDate, hours| TimeEntryRecord {
            id: Uuid::new_v4(),
            matter_id: None,
            user_id: user.to_string(),
            description: "Work".to_string(),
            date,
            hours,
            is_billable: true,
            billable_rate: None,
        };
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date");
        let time_entries = vec![
            entry("alice", day(1), dec!(1.25)),
            entry("alice", day(17), dec!(2.2)),
            entry("bob", day(10), dec!(8)),
            entry(
                "alice",
                NaiveDate::from_ymd_opt(2026, 2, 28).expect("valid date"),
                dec!(5),
            ),
        ];

        let tasks = [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
            TaskStatus::Pending,
        ]
        .into_iter()
        .map(|status| TaskRecord {
            id: Uuid::new_v4(),
            matter_id: None,
            title: "Task".to_string(),
            status,
            priority: Priority::Low,
        })
        .collect();

        let documents = (0..3)
            .map(|i| DocumentRecord {
                id: Uuid::new_v4(),
                matter_id,
                title: format!("Doc {i}"),
                matter_number: None,
                document_type: None,
                file_size: None,
                created_at: now,
            })
            .collect();

        Snapshot {
            matters,
            hearings,
            documents,
            time_entries,
            clients: Vec::new(),
            tasks,
        }
    }

    fn rows(snapshot: &Snapshot) -> PracticeRows<'_> {
        PracticeRows {
            matters: &snapshot.matters,
            hearings: &snapshot.hearings,
            documents: &snapshot.documents,
            time_entries: &snapshot.time_entries,
            tasks: &snapshot.tasks,
        }
    }

    #[test]
    fn stats_follow_dashboard_rules() {
        let snapshot = fixture();
        let dashboard = build_dashboard(rows(&snapshot), "alice", now(), DashboardLimits::default());

        assert_eq!(
            dashboard.stats,
            DashboardStats {
                active_matters: 4,
                upcoming_hearings: 5,
                pending_tasks: 3,
                total_documents: 3,
                this_month_hours: dec!(3.5),
            }
        );

        let recent: Vec<&str> = dashboard
            .recent_matters
            .iter()
            .map(|m| m.matter_number.as_str())
            .collect();
        assert_eq!(recent, vec!["M-0", "M-1", "M-2", "M-3", "M-4"]);

        let next: Vec<&str> = dashboard
            .next_hearings
            .iter()
            .map(|h| h.title.as_str())
            .collect();
        assert_eq!(
            next,
            vec!["Hearing 0", "Hearing 2", "Hearing 3", "Hearing 4", "Hearing 5"]
        );
    }

    #[test]
    fn limits_cap_the_lists() {
        let snapshot = fixture();
        let dashboard = build_dashboard(
            rows(&snapshot),
            "alice",
            now(),
            DashboardLimits {
                recent_matters: 2,
                upcoming_hearings: 1,
            },
        );
        assert_eq!(dashboard.recent_matters.len(), 2);
        assert_eq!(dashboard.next_hearings.len(), 1);
        assert_eq!(dashboard.stats.upcoming_hearings, 5);
    }

    #[test]
    fn month_start_is_first_day() {
        assert_eq!(month_start(now()).to_string(), "2026-03-01");
    }

    #[tokio::test]
    async fn store_backed_dashboard_matches_in_memory_projection() {
        let snapshot = fixture();
        let expected = build_dashboard(rows(&snapshot), "alice", now(), DashboardLimits::default());

        let db = MemoryBackend::from_snapshot(snapshot.clone());
        let loaded = load_dashboard(&db, "alice", now(), DashboardLimits::default())
            .await
            .expect("dashboard loads");
        assert_eq!(loaded, expected);
    }
}

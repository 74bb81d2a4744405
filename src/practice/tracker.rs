//! Live time tracking.
//!
//! A [`TimeTracker`] runs at most one session. Each session owns one tokio
//! task that republishes the elapsed time every tick until the session is
//! stopped or the tracker is dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::TrackerError;
use crate::practice::intake::TimeEntryInput;
use crate::practice::metrics::{elapsed_time_format, format_hours};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Value published on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Elapsed {
    pub secs: u64,
    pub display: String,
}

impl Elapsed {
    fn from_secs(secs: u64) -> Self {
        Self {
            secs,
            display: elapsed_time_format(secs),
        }
    }
}

struct ActiveSession {
    started_at: DateTime<Utc>,
    started: Instant,
    updates: watch::Receiver<Elapsed>,
    task: JoinHandle<()>,
}

/// Result of a stopped session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedSession {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
}

impl TrackedSession {
    /// Elapsed time in hours, rounded to two decimal places.
    pub fn hours(&self) -> Decimal {
        (Decimal::from(self.elapsed_secs) / Decimal::from(3600u32))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Pre-fill a time entry form from this session.
    pub fn into_time_entry_input(
        self,
        matter_id: Option<String>,
        description: String,
        billable_rate: Option<String>,
    ) -> TimeEntryInput {
        TimeEntryInput {
            matter_id,
            description,
            hours: format_hours(self.hours()),
            date: self.started_at.date_naive().format("%Y-%m-%d").to_string(),
            billable_rate,
            is_billable: Some(true),
        }
    }
}

pub struct TimeTracker {
    tick: Duration,
    session: Mutex<Option<ActiveSession>>,
}

impl Default for TimeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl TimeTracker {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            session: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    /// Begin a session and return a receiver for the ticking counter.
    ///
    /// Fails with [`TrackerError::NoRuntime`] outside a tokio runtime.
    pub fn start(&self) -> Result<watch::Receiver<Elapsed>, TrackerError> {
        let mut session = self.lock();
        if session.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }
        let runtime = Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;

        let started = Instant::now();
        let (tx, rx) = watch::channel(Elapsed::from_secs(0));
        let tick = self.tick;
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let secs = started.elapsed().as_secs();
                tx.send_replace(Elapsed::from_secs(secs));
            }
        });

        let started_at = Utc::now();
        tracing::debug!(started_at = %started_at, "Time tracking started");
        *session = Some(ActiveSession {
            started_at,
            started,
            updates: rx.clone(),
            task,
        });
        Ok(rx)
    }

    /// Another receiver for the running session's counter.
    pub fn subscribe(&self) -> Option<watch::Receiver<Elapsed>> {
        self.lock().as_ref().map(|s| s.updates.clone())
    }

    /// End the session, cancelling its ticking task.
    pub fn stop(&self) -> Result<TrackedSession, TrackerError> {
        let session = self.lock().take().ok_or(TrackerError::NotRunning)?;
        session.task.abort();
        let tracked = TrackedSession {
            started_at: session.started_at,
            elapsed_secs: session.started.elapsed().as_secs(),
        };
        tracing::debug!(elapsed_secs = tracked.elapsed_secs, "Time tracking stopped");
        Ok(tracked)
    }
}

impl Drop for TimeTracker {
    fn drop(&mut self) {
        if let Some(session) = self.lock().take() {
            session.task.abort();
        }
    }
}

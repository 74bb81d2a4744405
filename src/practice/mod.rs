//! Practice management engine.
//!
//! Pure projections over typed rows (`metrics`, `dashboard`) plus the
//! operator-facing pieces that touch the store or a clock (`intake`,
//! `tracker`, `notify`).

pub mod dashboard;
pub mod intake;
pub mod metrics;
pub mod notify;
pub mod tracker;

pub use dashboard::{Dashboard, DashboardLimits, DashboardStats, build_dashboard, load_dashboard};
pub use intake::{ClientInput, HearingInput, TimeEntryInput};
pub use metrics::{TimeTotals, aggregate_time_entries, fuzzy_search, partition_hearings};
pub use notify::{LogNotifier, Notice, Notifier};
pub use tracker::{TimeTracker, TrackedSession};

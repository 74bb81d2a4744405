//! Operator feedback.
//!
//! Notices are fire-and-forget: a notifier may drop them, and callers never
//! wait on or inspect the outcome.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.variant {
            NoticeVariant::Default => {
                tracing::info!(title = %notice.title, "{}", notice.description)
            }
            NoticeVariant::Destructive => {
                tracing::warn!(title = %notice.title, "{}", notice.description)
            }
        }
    }
}

/// Keeps every notice in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: std::sync::Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(e) => tracing::warn!("Notice buffer lock poisoned: {}", e),
        }
    }
}

//! Due-reminder scan.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::reminder::Reminder;
use crate::storage::ReminderStore;

/// Thin wrapper over the store's due query. A store failure is swallowed as
/// "nothing due"; the reminders are picked up again on the next tick once
/// the store recovers.
pub struct DueReminderScanner {
    store: Arc<dyn ReminderStore>,
}

impl DueReminderScanner {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }

    pub async fn scan(&self, now: NaiveDateTime) -> Vec<Reminder> {
        match self.store.fetch_due(now).await {
            Ok(batch) => batch,
            Err(err) => {
                log::warn!("Due reminder scan failed, treating as empty batch. [error = {err}]");
                Vec::new()
            }
        }
    }
}

//! In-memory reminder store used by the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::RwLock;

use crate::account::UserId;
use crate::reminder::{NewReminder, Reminder};

use super::{ReminderStore, StoreError};

type Key = (UserId, String);

#[derive(Default)]
pub struct InMemoryReminderStore {
    reminders: RwLock<HashMap<Key, Reminder>>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn fetch_due(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, StoreError> {
        let reminders = self.reminders.read().await;
        Ok(reminders
            .values()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect())
    }

    async fn fetch(&self, user_id: UserId, name: &str) -> Result<Option<Reminder>, StoreError> {
        let reminders = self.reminders.read().await;
        Ok(reminders.get(&(user_id, name.to_string())).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Reminder>, StoreError> {
        let reminders = self.reminders.read().await;
        Ok(reminders
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, StoreError> {
        let mut reminders = self.reminders.write().await;
        let key = (reminder.user_id, reminder.name.clone());
        if reminders.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                user_id: reminder.user_id,
                name: reminder.name,
            });
        }

        let stored = Reminder {
            user_id: reminder.user_id,
            name: reminder.name,
            date: reminder.date,
            time: reminder.time,
            intervals: reminder.intervals,
            message: reminder.message,
            active: true,
        };
        reminders.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, reminder: Reminder) -> Result<Reminder, StoreError> {
        let mut reminders = self.reminders.write().await;
        let key = (reminder.user_id, reminder.name.clone());
        if !reminders.contains_key(&key) {
            return Err(StoreError::NotFound {
                user_id: reminder.user_id,
                name: reminder.name,
            });
        }
        reminders.insert(key, reminder.clone());
        Ok(reminder)
    }

    async fn update_schedule(
        &self,
        user_id: UserId,
        name: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), StoreError> {
        let mut reminders = self.reminders.write().await;
        let reminder = reminders.get_mut(&(user_id, name.to_string())).ok_or_else(|| {
            StoreError::NotFound {
                user_id,
                name: name.to_string(),
            }
        })?;
        reminder.date = date;
        reminder.time = time;
        Ok(())
    }

    async fn delete(&self, user_id: UserId, name: &str) -> Result<(), StoreError> {
        let mut reminders = self.reminders.write().await;
        reminders
            .remove(&(user_id, name.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                user_id,
                name: name.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn new_reminder(user_id: UserId, name: &str, date: &str, time: &str) -> NewReminder {
        NewReminder::from_wire(user_id, name, time, date, "", "ping").unwrap()
    }

    fn at(date: (i32, u32, u32), time: (u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap())
    }

    #[tokio::test]
    async fn insert_then_fetch_roundtrips() {
        let store = InMemoryReminderStore::new();
        let created = store
            .insert(new_reminder(1, "tea", "01/01/2024", "10:00"))
            .await
            .unwrap();
        assert!(created.active);

        let fetched = store.fetch(1, "tea").await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(store.fetch(1, "coffee").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_name_per_user_is_rejected() {
        let store = InMemoryReminderStore::new();
        store
            .insert(new_reminder(1, "tea", "01/01/2024", "10:00"))
            .await
            .unwrap();

        let err = store
            .insert(new_reminder(1, "tea", "02/01/2024", "11:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        // Same name under a different user is fine.
        store
            .insert(new_reminder(2, "tea", "01/01/2024", "10:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fetch_due_applies_the_scan_predicate() {
        let store = InMemoryReminderStore::new();
        store
            .insert(new_reminder(1, "due", "02/01/2024", "09:00"))
            .await
            .unwrap();
        store
            .insert(new_reminder(1, "later today", "02/01/2024", "23:00"))
            .await
            .unwrap();
        store
            .insert(new_reminder(1, "stale", "01/01/2024", "09:00"))
            .await
            .unwrap();

        let mut inactive = store
            .insert(new_reminder(1, "paused", "02/01/2024", "09:00"))
            .await
            .unwrap();
        inactive.active = false;
        store.update(inactive).await.unwrap();

        let due = store.fetch_due(at((2024, 1, 2), (10, 0))).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "due");
    }

    #[tokio::test]
    async fn day_stale_reminder_is_never_returned() {
        let store = InMemoryReminderStore::new();
        store
            .insert(new_reminder(1, "missed", "01/01/2024", "10:00"))
            .await
            .unwrap();

        // The process was down over the date boundary; the scan predicate is
        // date-exact so the reminder stays invisible from then on.
        for day in 2..=4 {
            let due = store.fetch_due(at((2024, 1, day), (10, 0))).await.unwrap();
            assert!(due.is_empty());
        }
    }

    #[tokio::test]
    async fn update_schedule_moves_only_the_instant() {
        let store = InMemoryReminderStore::new();
        store
            .insert(new_reminder(1, "tea", "01/01/2024", "10:00"))
            .await
            .unwrap();

        store
            .update_schedule(
                1,
                "tea",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
            )
            .await
            .unwrap();

        let fetched = store.fetch(1, "tea").await.unwrap().unwrap();
        assert_eq!(fetched.time, NaiveTime::from_hms_opt(10, 15, 0).unwrap());
        assert_eq!(fetched.message, "ping");

        let err = store
            .update_schedule(
                1,
                "gone",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_the_reminder() {
        let store = InMemoryReminderStore::new();
        store
            .insert(new_reminder(1, "tea", "01/01/2024", "10:00"))
            .await
            .unwrap();

        store.delete(1, "tea").await.unwrap();
        assert!(store.fetch(1, "tea").await.unwrap().is_none());
        assert!(store.delete(1, "tea").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_for_user_filters_by_owner() {
        let store = InMemoryReminderStore::new();
        store
            .insert(new_reminder(1, "tea", "01/01/2024", "10:00"))
            .await
            .unwrap();
        store
            .insert(new_reminder(2, "coffee", "01/01/2024", "10:00"))
            .await
            .unwrap();

        let mine = store.list_for_user(1).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "tea");
    }
}

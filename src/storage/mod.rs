//! Persistence contracts for reminders and accounts.
//!
//! The scheduler only ever calls `fetch_due` and `update_schedule`; the rest
//! of the surface backs reminder and account CRUD at the input boundary.

#[cfg(test)]
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::account::{Account, UserId};
use crate::reminder::{NewReminder, Reminder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no reminder named {name:?} for user {user_id}")]
    NotFound { user_id: UserId, name: String },

    #[error("a reminder named {name:?} already exists for user {user_id}")]
    AlreadyExists { user_id: UserId, name: String },

    #[error("corrupt stored row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Returns every active reminder scheduled for `now`'s date whose
    /// time-of-day has passed. Ordering within the batch is unspecified.
    async fn fetch_due(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, StoreError>;

    async fn fetch(&self, user_id: UserId, name: &str) -> Result<Option<Reminder>, StoreError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Reminder>, StoreError>;

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, StoreError>;

    /// Replaces every mutable field of the reminder keyed by `(user_id, name)`.
    async fn update(&self, reminder: Reminder) -> Result<Reminder, StoreError>;

    /// Advances only the scheduled instant. The scheduler treats `NotFound`
    /// as recoverable: the reminder may have been deleted mid-tick.
    async fn update_schedule(
        &self,
        user_id: UserId,
        name: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), StoreError>;

    async fn delete(&self, user_id: UserId, name: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<Option<Account>, StoreError>;
    async fn upsert(&self, account: Account) -> Result<(), StoreError>;
    async fn delete(&self, user_id: UserId) -> Result<(), StoreError>;
}

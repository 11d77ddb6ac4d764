//! SQLite-backed stores.
//!
//! Date and time columns persist the wire formats verbatim (`DD/MM/YYYY`,
//! `HH:MM`). Zero-padded `HH:MM` compares lexically in the same order as
//! chronologically, which is what the due query relies on.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqlitePool;

use crate::account::{Account, UserId};
use crate::reminder::{self, NewReminder, Reminder};

use super::{AccountStore, ReminderStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reminders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    r_name TEXT NOT NULL,
    r_time TEXT NOT NULL,
    r_date TEXT NOT NULL,
    r_intervals TEXT NOT NULL DEFAULT '',
    r_message TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    UNIQUE (user_id, r_name)
);

CREATE TABLE IF NOT EXISTS accounts (
    user_id INTEGER PRIMARY KEY,
    tg_chat_id INTEGER,
    timezone TEXT NOT NULL
);
";

/// Creates the schema if it does not exist yet. Run once at startup.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct ReminderRow {
    id: i64,
    user_id: i64,
    r_name: String,
    r_time: String,
    r_date: String,
    r_intervals: String,
    r_message: String,
    is_active: bool,
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = StoreError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let time = reminder::parse_time(&row.r_time)
            .map_err(|e| StoreError::Corrupt(format!("reminder {}: {e}", row.id)))?;
        let date = reminder::parse_date(&row.r_date)
            .map_err(|e| StoreError::Corrupt(format!("reminder {}: {e}", row.id)))?;

        Ok(Reminder {
            user_id: row.user_id,
            name: row.r_name,
            date,
            time,
            intervals: row.r_intervals,
            message: row.r_message,
            active: row.is_active,
        })
    }
}

pub struct SqliteReminderStore {
    pool: SqlitePool,
}

impl SqliteReminderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    async fn fetch_due(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, StoreError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders WHERE is_active = 1 AND r_date = ? AND r_time <= ?",
        )
        .bind(reminder::format_date(now.date()))
        .bind(reminder::format_time(now.time()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reminder::try_from).collect()
    }

    async fn fetch(&self, user_id: UserId, name: &str) -> Result<Option<Reminder>, StoreError> {
        let row = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders WHERE user_id = ? AND r_name = ?",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reminder::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Reminder>, StoreError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders WHERE user_id = ? ORDER BY r_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reminder::try_from).collect()
    }

    async fn insert(&self, new: NewReminder) -> Result<Reminder, StoreError> {
        let row = sqlx::query_as::<_, ReminderRow>(
            "INSERT INTO reminders (user_id, r_name, r_time, r_date, r_intervals, r_message)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.name)
        .bind(reminder::format_time(new.time))
        .bind(reminder::format_date(new.date))
        .bind(&new.intervals)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists {
                user_id: new.user_id,
                name: new.name.clone(),
            },
            _ => StoreError::Sqlx(err),
        })?;

        Reminder::try_from(row)
    }

    async fn update(&self, update: Reminder) -> Result<Reminder, StoreError> {
        let result = sqlx::query(
            "UPDATE reminders
             SET r_time = ?, r_date = ?, r_intervals = ?, r_message = ?, is_active = ?
             WHERE user_id = ? AND r_name = ?",
        )
        .bind(reminder::format_time(update.time))
        .bind(reminder::format_date(update.date))
        .bind(&update.intervals)
        .bind(&update.message)
        .bind(update.active)
        .bind(update.user_id)
        .bind(&update.name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                user_id: update.user_id,
                name: update.name,
            });
        }
        Ok(update)
    }

    async fn update_schedule(
        &self,
        user_id: UserId,
        name: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE reminders SET r_date = ?, r_time = ? WHERE user_id = ? AND r_name = ?",
        )
        .bind(reminder::format_date(date))
        .bind(reminder::format_time(time))
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                user_id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, user_id: UserId, name: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM reminders WHERE user_id = ? AND r_name = ?")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                user_id,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    user_id: i64,
    tg_chat_id: Option<i64>,
    timezone: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let timezone = row
            .timezone
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("account {}: bad timezone", row.user_id)))?;

        Ok(Account {
            user_id: row.user_id,
            tg_chat_id: row.tg_chat_id,
            timezone,
        })
    }
}

pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn get(&self, user_id: UserId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn upsert(&self, account: Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO accounts (user_id, tg_chat_id, timezone) VALUES (?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET tg_chat_id = excluded.tg_chat_id,
                                                 timezone = excluded.timezone",
        )
        .bind(account.user_id)
        .bind(account.tg_chat_id)
        .bind(account.timezone.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                user_id,
                name: String::new(),
            });
        }
        Ok(())
    }
}

mod account;
mod appsettings;
mod delivery;
mod interval;
mod occurrence;
mod reminder;
mod scheduling;
mod storage;
mod telegram;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tokio_util::sync::CancellationToken;

use crate::delivery::Notifier;
use crate::scheduling::SchedulerLoop;
use crate::storage::sqlite::{SqliteAccountStore, SqliteReminderStore, migrate};
use crate::storage::{AccountStore, ReminderStore};
use crate::telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::get();

    let options =
        SqliteConnectOptions::from_str(&settings.database.url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    migrate(&pool).await?;

    let reminder_store: Arc<dyn ReminderStore> = Arc::new(SqliteReminderStore::new(pool.clone()));
    let account_store: Arc<dyn AccountStore> = Arc::new(SqliteAccountStore::new(pool));

    let bot = teloxide::Bot::new(settings.telegram.token.clone());
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot, account_store));

    let cancellation_token = CancellationToken::new();
    let scheduler = SchedulerLoop::new(reminder_store, notifier).start(cancellation_token.clone());
    log::info!("Scheduler started");

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");
    cancellation_token.cancel();
    scheduler.await?;

    Ok(())
}

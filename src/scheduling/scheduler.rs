//! The tick loop: wake once a minute, deliver due reminders, advance
//! recurring ones.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::delivery::{DeliveryError, Notifier};
use crate::interval;
use crate::occurrence::next_occurrence;
use crate::reminder::{self, Reminder};
use crate::storage::ReminderStore;

use super::DueReminderScanner;

const TICK_PERIOD: Duration = Duration::from_secs(60);

pub struct SchedulerLoop {
    scanner: DueReminderScanner,
    store: Arc<dyn ReminderStore>,
    notifier: Arc<dyn Notifier>,
}

impl SchedulerLoop {
    pub fn new(store: Arc<dyn ReminderStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            scanner: DueReminderScanner::new(Arc::clone(&store)),
            store,
            notifier,
        }
    }

    /// Runs until the token is cancelled. Exactly one instance is expected
    /// to run against a given store.
    pub fn start(self, cancellation_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancellation_token).await })
    }

    async fn run(self, cancellation_token: CancellationToken) {
        // Phase-align the first tick to the minute boundary so tick
        // timestamps stay predictable across restarts.
        let start_delay = delay_until_next_minute(Local::now().time());
        log::info!("Waiting until next minute. [delay = {start_delay:?}]");
        tokio::select! {
            _ = cancellation_token.cancelled() => return,
            _ = tokio::time::sleep(start_delay) => {}
        }

        let mut ticks = tokio::time::interval(TICK_PERIOD);
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Scheduler loop stopped");
                    return;
                }
                _ = ticks.tick() => {}
            }

            self.tick(Local::now().naive_local()).await;
        }
    }

    /// One tick: scan, then process every due reminder in sequence. No
    /// failure of a single item escapes; the loop always reaches the next
    /// tick.
    pub(crate) async fn tick(&self, now: NaiveDateTime) {
        let due = self.scanner.scan(now).await;
        if due.is_empty() {
            return;
        }

        log::info!("Found {} due reminders", due.len());
        for reminder in &due {
            self.process(reminder).await;
        }
    }

    async fn process(&self, reminder: &Reminder) {
        match self.notifier.deliver(reminder.user_id, &reminder.message).await {
            Ok(()) => {
                log::info!(
                    "Reminder delivered. [user_id = {}, name = {:?}]",
                    reminder.user_id,
                    reminder.name
                );
            }
            // Failed deliveries are not retried; the reminder is still
            // advanced below so it cannot wedge the schedule.
            Err(DeliveryError::Undeliverable(user_id)) => {
                log::error!("Cannot reach user, dropping this firing. [user_id = {user_id}]");
            }
            Err(DeliveryError::Transient(err)) => {
                log::error!(
                    "Delivery failed. [user_id = {}, error = {err:#}]",
                    reminder.user_id
                );
            }
        }

        if reminder.intervals.is_empty() {
            // One-shot: firing does not deactivate or delete it here, that
            // lifecycle belongs to the surrounding system.
            return;
        }

        if let Err(err) = self.reschedule(reminder).await {
            log::error!(
                "Failed to reschedule reminder. [user_id = {}, name = {:?}, error = {err:#}]",
                reminder.user_id,
                reminder.name
            );
        }
    }

    async fn reschedule(&self, due: &Reminder) -> anyhow::Result<()> {
        let parsed = interval::parse(&due.intervals)?;
        let next = next_occurrence(due.scheduled_at(), &parsed)?;

        match self
            .store
            .update_schedule(due.user_id, &due.name, next.date(), next.time())
            .await
        {
            Ok(()) => {
                log::info!(
                    "Reminder advanced. [user_id = {}, name = {:?}, next = {} {}]",
                    due.user_id,
                    due.name,
                    reminder::format_date(next.date()),
                    reminder::format_time(next.time())
                );
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                log::info!(
                    "Reminder vanished before reschedule, likely deleted. [user_id = {}, name = {:?}]",
                    due.user_id,
                    due.name
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn delay_until_next_minute(now: NaiveTime) -> Duration {
    Duration::from_secs(60 - u64::from(now.second()))
}

//! Delivery collaborator contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::account::UserId;

/// Failure kinds are distinguished for logging only; the scheduler advances
/// the reminder either way and the next tick is the only retry mechanism.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("user {0} is permanently unreachable")]
    Undeliverable(UserId),

    #[error("delivery failed: {0}")]
    Transient(#[source] anyhow::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, user_id: UserId, message: &str) -> Result<(), DeliveryError>;
}

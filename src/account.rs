//! User accounts.

pub type UserId = i64;

/// Per-user account data. The timezone is captured at registration but is
/// not consulted by the scheduler; all reminder instants are naive local
/// time of the host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user_id: UserId,
    pub tg_chat_id: Option<i64>,
    pub timezone: chrono_tz::Tz,
}

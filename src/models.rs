use chrono::{DateTime, Utc};
use poise::serenity_prelude::UserId;

use crate::db::Database;

/// A stored per-user birthday
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BirthdayRecord {
    pub user_id: UserId,
    /// Midnight UTC of the birthday's month/day in the sentinel year
    pub birthday: DateTime<Utc>,
}

/// Bot state shared across all handlers
#[derive(Clone)]
pub struct Data {
    /// Database connection
    pub db: Database,
}

impl Data {
    /// Create a new Data instance with the given database connection
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
